// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

/// Construction-time contract violations.
///
/// These signal programmer errors in the embedding application; a correctly
/// wired watcher never produces them at runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("no change callback was provided")]
    MissingCallback,

    #[error("watched path does not exist: {0:?}")]
    PathNotFound(PathBuf),

    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

#[derive(Error, Debug)]
pub enum HotReloadError {
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotReloadError>;
