//! Values passed into and returned from the console workflows.

use crate::config::schema::{AppConfig, ConfirmationMode};
use crate::error::Result;
use crate::workflow::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Console login. Used once per session and never persisted.
#[derive(Clone)]
pub struct Credentials {
    email_address: String,
    password: String,
}

impl Credentials {
    pub fn new(email_address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            password: password.into(),
        }
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email_address", &self.email_address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The four keys shown on a database's "Database Access Keys" tab.
///
/// Fields are declared in alphabetical order so the serialized document
/// lists them the same way a sorted YAML dump would.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCredentialSet {
    client_access_key: String,
    client_secret_key: String,
    database_name: String,
    server_access_key: String,
    server_secret_key: String,
}

impl DatabaseCredentialSet {
    pub fn new(
        database_name: impl Into<String>,
        server_access_key: impl Into<String>,
        server_secret_key: impl Into<String>,
        client_access_key: impl Into<String>,
        client_secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client_access_key: client_access_key.into(),
            client_secret_key: client_secret_key.into(),
            database_name: database_name.into(),
            server_access_key: server_access_key.into(),
            server_secret_key: server_secret_key.into(),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn server_access_key(&self) -> &str {
        &self.server_access_key
    }

    pub fn server_secret_key(&self) -> &str {
        &self.server_secret_key
    }

    pub fn client_access_key(&self) -> &str {
        &self.client_access_key
    }

    pub fn client_secret_key(&self) -> &str {
        &self.client_secret_key
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Timing and behavior knobs for [`crate::workflow::WorkflowEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    /// Console scheme and host, no trailing slash.
    pub base_url: String,
    /// Bound for every element-presence wait.
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Policy for triggers that are present before they are clickable.
    pub click_retry: RetryPolicy,
    /// Bound for the license dropdown to list the wanted option.
    pub dropdown_timeout: Duration,
    /// Unconditional pause between the two sort clicks.
    pub sort_settle: Duration,
    /// Bound for the access key fields to stop being empty.
    pub key_settle_timeout: Duration,
    pub confirmation: ConfirmationMode,
}

impl WorkflowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let timing = &config.timing;
        Self {
            base_url: config.console.base_url.clone(),
            wait_timeout: timing.wait_timeout(),
            poll_interval: timing.poll_interval(),
            click_retry: RetryPolicy::new(timing.click_attempts, timing.click_delay()),
            dropdown_timeout: timing.dropdown_timeout(),
            sort_settle: timing.sort_settle(),
            key_settle_timeout: timing.key_settle_timeout(),
            confirmation: config.confirmation,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
