// tests/config_loading.rs

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use hotreload::SeedPolicy;
use hotreload::config::{load_and_validate, load_from_path};
use hotreload::errors::HotReloadError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn loads_and_validates_file_from_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("HotReload.toml");
    std::fs::write(
        &path,
        r#"
[watch]
path = "shaders"
interval_ms = 125
notify_on_seed = true

[on_change]
cmd = "make shaders"
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.path(), Some(Path::new("shaders")));
    assert_eq!(cfg.options().interval, Duration::from_millis(125));
    assert!(cfg.options().recursive);
    assert_eq!(cfg.options().seed, SeedPolicy::Notify);
    assert_eq!(cfg.command(), Some("make shaders"));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, HotReloadError::IoError(_)));
}

#[test]
fn invalid_values_are_config_errors() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("HotReload.toml");
    std::fs::write(&path, "[watch]\ninterval_ms = 0\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, HotReloadError::ConfigError(_)));
    Ok(())
}
