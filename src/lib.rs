pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod workflow;

pub use error::{Result, VwsError};
