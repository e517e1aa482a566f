// src/exec/command.rs

use std::path::Path;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Environment variable carrying the watched path into the reload command.
pub const CHANGED_PATH_ENV: &str = "HOTRELOAD_PATH";

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` through the shell and wait for it, inheriting stdio.
///
/// A non-zero exit is logged and returned, not treated as an error; only a
/// failure to spawn or wait is.
pub fn run_reload_command(cmd: &str, root: &Path) -> Result<ExitStatus> {
    info!(cmd = %cmd, path = ?root, "running reload command");

    let status = shell_command(cmd)
        .env(CHANGED_PATH_ENV, root)
        .status()
        .with_context(|| format!("running reload command '{cmd}'"))?;

    if status.success() {
        info!(cmd = %cmd, "reload command finished");
    } else {
        warn!(
            cmd = %cmd,
            exit_code = status.code().unwrap_or(-1),
            "reload command failed"
        );
    }

    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_reported() {
        let status = run_reload_command("exit 3", Path::new("/tmp")).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn watched_path_is_exported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let cmd = format!("printf %s \"${CHANGED_PATH_ENV}\" > '{}'", out.display());

        let status = run_reload_command(&cmd, Path::new("/some/root")).unwrap();

        assert!(status.success());
        assert_eq!(std::fs::read_to_string(out).unwrap(), "/some/root");
    }
}
