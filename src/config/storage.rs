use crate::config::schema::AppConfig;
use crate::config::validation::validate_config;
use crate::error::{Result, VwsError};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the default configuration file path for this platform
pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("vws-web-tools"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// and a missing file means built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(VwsError::Config(format!(
                    "Config file not found at {:?}",
                    p
                )));
            }
            p.to_path_buf()
        }
        None => {
            let p = get_config_path();
            if !p.exists() {
                tracing::debug!("No config file at {:?}, using defaults", p);
                return Ok(AppConfig::default());
            }
            p
        }
    };

    let content = fs::read_to_string(&config_path).map_err(|e| {
        VwsError::Config(format!(
            "Failed to read config from {:?}: {}",
            config_path, e
        ))
    })?;

    let config: AppConfig = toml::from_str(&content)?;
    validate_config(&config)?;

    tracing::info!("Loaded config from {:?}", config_path);
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VwsError::Config(format!(
                "Failed to create config directory {:?}: {}",
                parent, e
            ))
        })?;
    }

    let content = toml::to_string_pretty(config)?;

    fs::write(path, content).map_err(|e| {
        VwsError::Config(format!("Failed to write config to {:?}: {}", path, e))
    })?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Write the default configuration to `path`. Refuses to clobber an
/// existing file unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<AppConfig> {
    if path.exists() && !force {
        return Err(VwsError::Config(format!(
            "Config file already exists at {:?} (use --force to overwrite)",
            path
        )));
    }
    let config = AppConfig::default();
    save_config(&config, path)?;
    Ok(config)
}
