//! Workflow engine: the console actions as step chains over a browser session.

pub mod engine;
pub mod locators;
pub mod retry;
pub mod schema;
pub mod wait;

pub use engine::WorkflowEngine;
pub use locators::Locators;
pub use retry::{RetryOutcome, RetryPolicy};
pub use schema::*;
