//! Scripted in-memory browser session for workflow tests.
//!
//! Elements are keyed by locator. Each one can start hidden, refuse a number
//! of clicks, reveal other elements when clicked or when a key is pressed on
//! it, and report a sequence of texts over successive reads.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use vws_web_tools::browser::{BrowserSession, ElementHandle, Key, Locator};
use vws_web_tools::{Result, VwsError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    Find(Locator),
    FindChild(Locator, Locator),
    SendKeys(Locator, String),
    PressKey(Locator, Key),
    Click { locator: Locator, ok: bool },
    Submit(Locator),
    Text(Locator),
    Release(Locator),
    Close,
}

#[derive(Debug, Default)]
struct FakeElement {
    present: bool,
    click_failures: u32,
    reveals_on_click: Vec<Locator>,
    reveals_on_key: Vec<(Key, Locator)>,
    children: Vec<Locator>,
    texts: Vec<String>,
    reads: usize,
}

#[derive(Default)]
pub struct FakeSession {
    elements: Mutex<HashMap<Locator, FakeElement>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry<F: FnOnce(&mut FakeElement)>(self, locator: &Locator, f: F) -> Self {
        {
            let mut elements = self.elements.lock().unwrap();
            f(elements.entry(locator.clone()).or_default());
        }
        self
    }

    /// Present from the start.
    pub fn with(self, locator: &Locator) -> Self {
        self.entry(locator, |e| e.present = true)
    }

    pub fn with_text(self, locator: &Locator, text: &str) -> Self {
        self.with_texts(locator, &[text])
    }

    /// Successive reads return successive texts; the last one sticks.
    pub fn with_texts(self, locator: &Locator, texts: &[&str]) -> Self {
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        self.entry(locator, move |e| {
            e.present = true;
            e.texts = texts;
        })
    }

    /// Known but absent until revealed.
    pub fn hidden(self, locator: &Locator) -> Self {
        self.entry(locator, |e| e.present = false)
    }

    pub fn reveal_on_click(self, trigger: &Locator, target: &Locator) -> Self {
        let target = target.clone();
        self.hidden(&target)
            .entry(trigger, move |e| e.reveals_on_click.push(target))
    }

    pub fn reveal_on_key(self, trigger: &Locator, key: Key, target: &Locator) -> Self {
        let target = target.clone();
        self.hidden(&target)
            .entry(trigger, move |e| e.reveals_on_key.push((key, target)))
    }

    /// The first `n` clicks on `locator` are refused.
    pub fn fail_clicks(self, locator: &Locator, n: u32) -> Self {
        self.entry(locator, move |e| e.click_failures = n)
    }

    /// `child` is reachable from `parent` and can be acted on once found.
    pub fn with_child(self, parent: &Locator, child: &Locator) -> Self {
        let scoped = child.clone();
        self.with(child)
            .entry(parent, move |e| e.children.push(scoped))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// `(ok)` flag of every click on `locator`, in order.
    pub fn clicks_on(&self, locator: &Locator) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Click { locator: l, ok } if &l == locator => Some(ok),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn reveal(elements: &mut HashMap<Locator, FakeElement>, targets: Vec<Locator>) {
        for target in targets {
            elements.entry(target).or_default().present = true;
        }
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(Call::Navigate(url.to_string()));
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        self.record(Call::Find(locator.clone()));
        let elements = self.elements.lock().unwrap();
        match elements.get(locator) {
            Some(e) if e.present => Ok(ElementHandle::new(locator.value.clone(), locator.clone())),
            _ => Err(VwsError::not_found(locator)),
        }
    }

    async fn find_child(&self, parent: &ElementHandle, locator: &Locator) -> Result<ElementHandle> {
        self.record(Call::FindChild(parent.locator.clone(), locator.clone()));
        let elements = self.elements.lock().unwrap();
        let has_child = elements
            .get(&parent.locator)
            .map(|p| p.children.contains(locator))
            .unwrap_or(false);
        if has_child {
            Ok(ElementHandle::new(locator.value.clone(), locator.clone()))
        } else {
            Err(VwsError::not_found(locator))
        }
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.record(Call::SendKeys(element.locator.clone(), text.to_string()));
        Ok(())
    }

    async fn press_key(&self, element: &ElementHandle, key: Key) -> Result<()> {
        self.record(Call::PressKey(element.locator.clone(), key));
        let mut elements = self.elements.lock().unwrap();
        let targets: Vec<Locator> = elements
            .get(&element.locator)
            .map(|e| {
                e.reveals_on_key
                    .iter()
                    .filter(|(k, _)| *k == key)
                    .map(|(_, t)| t.clone())
                    .collect()
            })
            .unwrap_or_default();
        Self::reveal(&mut elements, targets);
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let mut elements = self.elements.lock().unwrap();
        let Some(target) = elements.get_mut(&element.locator) else {
            return Err(VwsError::not_found(&element.locator));
        };

        if target.click_failures > 0 {
            target.click_failures -= 1;
            drop(elements);
            self.record(Call::Click {
                locator: element.locator.clone(),
                ok: false,
            });
            return Err(VwsError::interaction(&element.locator, "element is not clickable"));
        }

        let targets = target.reveals_on_click.clone();
        Self::reveal(&mut elements, targets);
        drop(elements);
        self.record(Call::Click {
            locator: element.locator.clone(),
            ok: true,
        });
        Ok(())
    }

    async fn submit(&self, element: &ElementHandle) -> Result<()> {
        self.record(Call::Submit(element.locator.clone()));
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        self.record(Call::Text(element.locator.clone()));
        let mut elements = self.elements.lock().unwrap();
        let target = elements
            .get_mut(&element.locator)
            .ok_or_else(|| VwsError::not_found(&element.locator))?;
        let index = target.reads.min(target.texts.len().saturating_sub(1));
        target.reads += 1;
        Ok(target.texts.get(index).cloned().unwrap_or_default())
    }

    async fn release(&self, element: &ElementHandle) -> Result<()> {
        self.record(Call::Release(element.locator.clone()));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.record(Call::Close);
        Ok(())
    }
}
