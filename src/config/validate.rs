// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HotReloadError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HotReloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch_section(cfg)?;
    validate_on_change(cfg)?;
    Ok(())
}

fn validate_watch_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.interval_ms == 0 {
        return Err(HotReloadError::ConfigError(
            "[watch].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(path) = &cfg.watch.path {
        if path.trim().is_empty() {
            return Err(HotReloadError::ConfigError(
                "[watch].path must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_on_change(cfg: &RawConfigFile) -> Result<()> {
    if let Some(cmd) = &cfg.on_change.cmd {
        if cmd.trim().is_empty() {
            return Err(HotReloadError::ConfigError(
                "[on_change].cmd must not be empty; remove the key to only log changes"
                    .to_string(),
            ));
        }
    }
    Ok(())
}
