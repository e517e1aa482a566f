// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hotreload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hotreload",
    version,
    about = "Poll a file or directory tree and run a command whenever it changes.",
    long_about = None
)]
pub struct CliArgs {
    /// File or directory to watch. Overrides `[watch].path` from the config.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `HotReload.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Poll interval in milliseconds.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Only compare the watched path's own modification time.
    #[arg(long)]
    pub no_recursive: bool,

    /// Skip the startup scan and wait one interval before the first pass.
    #[arg(long)]
    pub no_initial_scan: bool,

    /// Run the command once for the first scan pass.
    #[arg(long)]
    pub notify_on_seed: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTRELOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Command to run on change, after `--`. Overrides `[on_change].cmd`.
    ///
    /// Without a command the watched path is printed to stdout instead.
    #[arg(last = true, value_name = "CMD")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
