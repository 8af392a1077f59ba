use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Which console to drive
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Waits, retries and settle delays
    #[serde(default)]
    pub timing: TimingConfig,

    /// How create workflows decide they succeeded
    #[serde(default)]
    pub confirmation: ConfirmationMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            console: ConsoleConfig::default(),
            timing: TimingConfig::default(),
            confirmation: ConfirmationMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserConfig {
    /// Chrome executable path
    #[serde(default = "default_chrome_path")]
    pub chrome_path: PathBuf,

    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Extra Chrome command-line arguments
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// How many times to poll the DevTools endpoint after launch
    #[serde(default = "default_launch_retries")]
    pub launch_retries: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: default_chrome_path(),
            headless: false,
            extra_args: Vec::new(),
            launch_retries: default_launch_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// Scheme and host of the developer console, no trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// All durations in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_click_attempts")]
    pub click_attempts: u32,

    #[serde(default = "default_click_delay_ms")]
    pub click_delay_ms: u64,

    /// Upper bound for the license dropdown to list the wanted option
    #[serde(default = "default_dropdown_timeout_ms")]
    pub dropdown_timeout_ms: u64,

    /// Unconditional pause between the two sort clicks
    #[serde(default = "default_sort_settle_ms")]
    pub sort_settle_ms: u64,

    /// Upper bound for the access key fields to be filled in
    #[serde(default = "default_key_settle_timeout_ms")]
    pub key_settle_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            click_attempts: default_click_attempts(),
            click_delay_ms: default_click_delay_ms(),
            dropdown_timeout_ms: default_dropdown_timeout_ms(),
            sort_settle_ms: default_sort_settle_ms(),
            key_settle_timeout_ms: default_key_settle_timeout_ms(),
        }
    }
}

impl TimingConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    pub fn dropdown_timeout(&self) -> Duration {
        Duration::from_millis(self.dropdown_timeout_ms)
    }

    pub fn sort_settle(&self) -> Duration {
        Duration::from_millis(self.sort_settle_ms)
    }

    pub fn key_settle_timeout(&self) -> Duration {
        Duration::from_millis(self.key_settle_timeout_ms)
    }
}

/// Whether a create workflow re-reads the console to confirm its effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
    /// Success whenever no step failed.
    #[default]
    Assume,
    /// Navigate back to the listing and wait for the new entry. Databases
    /// are looked up with the list sorted by recency; licenses are looked up
    /// on the first page as loaded.
    ReadBack,
}

fn default_chrome_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        PathBuf::from("C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe")
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome")
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        PathBuf::from("/usr/bin/google-chrome")
    }
}

fn default_launch_retries() -> u32 {
    30
}

fn default_base_url() -> String {
    "https://developer.vuforia.com".to_string()
}

fn default_wait_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_click_attempts() -> u32 {
    20
}

fn default_click_delay_ms() -> u64 {
    1_000
}

fn default_dropdown_timeout_ms() -> u64 {
    10_000
}

fn default_sort_settle_ms() -> u64 {
    10_000
}

fn default_key_settle_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.timing.click_attempts, 20);
        assert_eq!(config.timing.wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.confirmation, ConfirmationMode::Assume);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            confirmation = "read_back"

            [browser]
            headless = true

            [timing]
            click_attempts = 5
            "#,
        )
        .unwrap();

        assert!(config.browser.headless);
        assert_eq!(config.browser.launch_retries, 30);
        assert_eq!(config.timing.click_attempts, 5);
        assert_eq!(config.timing.click_delay_ms, 1_000);
        assert_eq!(config.console.base_url, "https://developer.vuforia.com");
        assert_eq!(config.confirmation, ConfirmationMode::ReadBack);
    }
}
