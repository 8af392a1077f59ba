use crate::config::schema::AppConfig;
use crate::error::{Result, VwsError};
use std::path::Path;

/// Validate Chrome executable path
pub fn validate_chrome_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(VwsError::Validation(format!(
            "Chrome executable not found at {:?}",
            path
        )));
    }

    if !path.is_file() {
        return Err(VwsError::Validation(format!(
            "Chrome path {:?} is not a file",
            path
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = path.metadata().map_err(|e| {
            VwsError::Validation(format!("Cannot read Chrome file metadata: {}", e))
        })?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(VwsError::Validation(format!(
                "Chrome executable {:?} is not executable",
                path
            )));
        }
    }

    Ok(())
}

/// Validate settings that do not depend on the filesystem.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.browser.chrome_path.as_os_str().is_empty() {
        return Err(VwsError::Validation(
            "Chrome path cannot be empty".to_string(),
        ));
    }

    if config.browser.launch_retries == 0 {
        return Err(VwsError::Validation(
            "launch_retries must be at least 1".to_string(),
        ));
    }

    let base_url = &config.console.base_url;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(VwsError::Validation(format!(
            "Invalid console base_url: {}. Must start with http:// or https://",
            base_url
        )));
    }
    if base_url.ends_with('/') {
        return Err(VwsError::Validation(format!(
            "Console base_url must not end with '/': {}",
            base_url
        )));
    }

    let timing = &config.timing;
    if timing.click_attempts == 0 {
        return Err(VwsError::Validation(
            "click_attempts must be at least 1".to_string(),
        ));
    }
    if timing.wait_timeout_ms == 0 {
        return Err(VwsError::Validation(
            "wait_timeout_ms must be greater than 0".to_string(),
        ));
    }
    if timing.poll_interval_ms == 0 {
        return Err(VwsError::Validation(
            "poll_interval_ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
