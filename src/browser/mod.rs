//! Browser control: the session contract and its CDP implementation.

pub mod cdp;
pub mod launcher;
pub mod port;
pub mod session;

pub use cdp::CdpSession;
pub use session::{BrowserSession, By, ElementHandle, Key, Locator};
