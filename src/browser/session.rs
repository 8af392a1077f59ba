//! The browser capability the workflows drive: navigation, element lookup
//! and simulated user input.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Element lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Id,
    ClassName,
    LinkText,
    XPath,
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            By::Id => "id",
            By::ClassName => "class name",
            By::LinkText => "link text",
            By::XPath => "xpath",
        };
        write!(f, "{}", s)
    }
}

/// A strategy plus the value it matches against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub by: By,
    pub value: String,
}

impl Locator {
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Self {
            by,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(By::Id, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(By::ClassName, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(By::LinkText, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(By::XPath, value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.by, self.value)
    }
}

/// Opaque reference to an element found by a session.
///
/// `id` is backend specific (a CDP remote object id for the real browser).
/// Handles are only meaningful to the session that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: String,
    pub locator: Locator,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>, locator: Locator) -> Self {
        Self {
            id: id.into(),
            locator,
        }
    }
}

/// Special keys that can be pressed on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
}

impl Key {
    /// DOM `key` value.
    pub fn name(&self) -> &'static str {
        match self {
            Key::Enter => "Enter",
        }
    }

    /// Windows virtual key code, which Chrome needs for synthesized events.
    pub fn key_code(&self) -> i64 {
        match self {
            Key::Enter => 13,
        }
    }

    /// Text the key produces, if any.
    pub fn text(&self) -> Option<&'static str> {
        match self {
            Key::Enter => Some("\r"),
        }
    }
}

/// Browser capability consumed by the workflow engine.
///
/// Lookups fail with `ElementNotFound` when nothing matches at call time;
/// actions fail with `Interaction` when the element refuses them. Waiting is
/// layered on top by [`crate::workflow::wait`].
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle>;

    /// Lookup scoped to the subtree of `parent`.
    async fn find_child(&self, parent: &ElementHandle, locator: &Locator) -> Result<ElementHandle>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<()>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Submit the form the element belongs to.
    async fn submit(&self, element: &ElementHandle) -> Result<()>;

    /// Visible text of the element.
    async fn text(&self, element: &ElementHandle) -> Result<String>;

    /// Let the backend drop its reference to the element. The handle must
    /// not be used afterwards.
    async fn release(&self, _element: &ElementHandle) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()>;
}
