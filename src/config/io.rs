use std::path::{Path, PathBuf};

use crate::app_dirs;

use super::{ConfigError, LabelerConfig};

/// Default filename used to store the labeler configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Location of the config file inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the config from the app directory, falling back to defaults when no
/// file exists yet. The category list is validated before returning.
pub fn load_or_default() -> Result<LabelerConfig, ConfigError> {
    load_from(&config_path()?)
}

/// Load and validate a config file; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<LabelerConfig, ConfigError> {
    if !path.exists() {
        tracing::info!("No config at {}; using defaults", path.display());
        return Ok(LabelerConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str::<LabelerConfig>(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?
        .normalized();
    config.category_set()?;
    Ok(config)
}

/// Write the config, creating parent directories as needed.
pub fn save_to_path(config: &LabelerConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
