// src/lib.rs

//! Polling hot-reload watcher.
//!
//! [`Watcher`] polls a file or directory tree for modification-time changes
//! and delivers one debounced callback per detected change, on a dispatch
//! context separate from the polling loop. The timer and dispatch contexts
//! are injected ([`schedule`]), as is the filesystem ([`fs`]).
//!
//! The `hotreload` binary wraps this into a small live-reload tool; see
//! [`run`].

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod schedule;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::errors::HotReloadError;
use crate::schedule::{Dispatcher, TokioDispatcher, TokioScheduler};

pub use crate::errors::PreconditionError;
pub use crate::types::{SeedPolicy, WatchOptions};
pub use crate::watch::{Watcher, WatcherBuilder};

/// Everything the binary needs to start a watcher, after merging the config
/// file with command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path: PathBuf,
    pub options: WatchOptions,
    pub command: Option<String>,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the tokio scheduler and dispatcher
/// - the watcher and the reload command
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let settings = resolve_settings(&args, &cfg)?;

    let watcher = start_watcher(&settings).await?;

    info!(path = ?watcher.path(), "watching for changes; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("listening for Ctrl-C")?;

    info!("shutdown requested");
    watcher.stop();
    Ok(())
}

/// Start a watcher for `settings` on the current tokio runtime.
///
/// With `run_immediately` the first scan pass runs inside `Watcher::start`;
/// it is moved to the blocking pool so a large tree does not stall an async
/// worker.
pub async fn start_watcher(settings: &Settings) -> Result<Watcher> {
    let scheduler = TokioScheduler::current()?;
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(TokioDispatcher::current()?);

    let path = settings.path.clone();
    let options = settings.options;
    let command = settings.command.clone();

    let watcher = tokio::task::spawn_blocking(move || {
        Watcher::start(
            path,
            move |root: &Path| on_change(root, command.as_deref()),
            options,
            &scheduler,
            dispatcher,
        )
    })
    .await
    .context("joining watcher startup")??;

    Ok(watcher)
}

/// Load the config named on the command line, or `HotReload.toml` when it
/// exists, or fall back to defaults.
pub fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    if let Some(path) = &args.config {
        return load_and_validate(path)
            .with_context(|| format!("loading config {:?}", path));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = ?default_path, "using default config file");
        return load_and_validate(&default_path)
            .with_context(|| format!("loading config {:?}", default_path));
    }

    Ok(ConfigFile::default())
}

/// Merge command-line overrides on top of the config file.
pub fn resolve_settings(
    args: &CliArgs,
    cfg: &ConfigFile,
) -> std::result::Result<Settings, HotReloadError> {
    let path = args
        .path
        .clone()
        .or_else(|| cfg.path().map(Path::to_path_buf))
        .ok_or_else(|| {
            HotReloadError::ConfigError(
                "no path to watch: pass PATH or set [watch].path".to_string(),
            )
        })?;

    let mut options = *cfg.options();
    if let Some(ms) = args.interval_ms {
        if ms == 0 {
            return Err(HotReloadError::ConfigError(
                "--interval-ms must be >= 1 (got 0)".to_string(),
            ));
        }
        options.interval = std::time::Duration::from_millis(ms);
    }
    if args.no_recursive {
        options.recursive = false;
    }
    if args.no_initial_scan {
        options.run_immediately = false;
    }
    if args.notify_on_seed {
        options.seed = SeedPolicy::Notify;
    }

    let command = if args.command.is_empty() {
        cfg.command().map(str::to_string)
    } else {
        Some(args.command.join(" "))
    };

    Ok(Settings {
        path,
        options,
        command,
    })
}

fn on_change(root: &Path, command: Option<&str>) {
    match command {
        Some(cmd) => {
            if let Err(err) = exec::run_reload_command(cmd, root) {
                error!(error = %err, "reload command could not be run");
            }
        }
        None => println!("{}", root.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;

    fn args(argv: &[&str]) -> CliArgs {
        let mut full = vec!["hotreload"];
        full.extend_from_slice(argv);
        CliArgs::try_parse_from(full).unwrap()
    }

    fn parse_config(src: &str) -> ConfigFile {
        let raw: config::RawConfigFile = toml::from_str(src).unwrap();
        ConfigFile::try_from(raw).unwrap()
    }

    #[test]
    fn cli_overrides_config() {
        let cfg = parse_config(
            r#"
            [watch]
            path = "from-config"
            interval_ms = 900
            [on_change]
            cmd = "echo config"
            "#,
        );
        let settings = resolve_settings(
            &args(&["cli-path", "--interval-ms", "20", "--no-recursive", "--", "echo", "cli"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(settings.path, PathBuf::from("cli-path"));
        assert_eq!(settings.options.interval, Duration::from_millis(20));
        assert!(!settings.options.recursive);
        assert_eq!(settings.command.as_deref(), Some("echo cli"));
    }

    #[test]
    fn config_fills_in_missing_flags() {
        let cfg = parse_config("[watch]\npath = \"assets\"\n[on_change]\ncmd = \"make\"\n");
        let settings = resolve_settings(&args(&["--notify-on-seed", "--no-initial-scan"]), &cfg).unwrap();

        assert_eq!(settings.path, PathBuf::from("assets"));
        assert_eq!(settings.options.seed, SeedPolicy::Notify);
        assert!(!settings.options.run_immediately);
        assert_eq!(settings.command.as_deref(), Some("make"));
    }

    #[test]
    fn missing_path_is_a_config_error() {
        let err = resolve_settings(&args(&[]), &ConfigFile::default()).unwrap_err();
        assert!(matches!(err, HotReloadError::ConfigError(_)));
    }

    #[test]
    fn zero_interval_flag_is_rejected() {
        let err = resolve_settings(&args(&["p", "--interval-ms", "0"]), &ConfigFile::default())
            .unwrap_err();
        assert!(matches!(err, HotReloadError::ConfigError(ref m) if m.contains("interval")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_watcher_seeds_from_a_real_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.toml"), "x = 1").unwrap();

        let settings = Settings {
            path: dir.path().to_path_buf(),
            options: WatchOptions::default(),
            command: None,
        };
        let watcher = start_watcher(&settings).await.unwrap();

        assert_eq!(watcher.path(), dir.path());
        assert!(watcher.is_running());
        assert!(watcher.last_modified().is_some());
        watcher.stop();
    }

    #[tokio::test]
    async fn start_watcher_reports_a_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            path: dir.path().join("nope"),
            options: WatchOptions::default(),
            command: None,
        };

        let err = start_watcher(&settings).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HotReloadError>(),
            Some(HotReloadError::Precondition(PreconditionError::PathNotFound(_)))
        ));
    }
}
