//! Tests for dotenv loading behavior.
//!
//! Responsibilities:
//! - Test that missing `.env` files are silently ignored.
//! - Test that `.env` variables feed environment detection and the overlay.
//! - Test that invalid `.env` files return errors without leaking secrets.
//! - Test that `DOTENV_DISABLED=1`/`true` skips dotenv loading.
//!
//! Invariants / Assumptions:
//! - Tests use `env_lock()` to prevent cross-test contamination.
//! - Variables a `.env` file may set are listed in `temp_env` scopes so they are
//!   removed again when the test ends.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use super::{env_lock, write_config};
use crate::constants::{DOTENV_DISABLED_VAR, ENV_VAR};
use crate::loader::builder::{ConfigLoader, ResolveOptions};
use crate::loader::error::ConfigError;
use crate::test_util::CwdGuard;

const DOTENV_VARS: [(&str, Option<&str>); 3] = [
    (DOTENV_DISABLED_VAR, None),
    (ENV_VAR, None),
    ("__ENV__APP_FROM_DOTENV", None),
];

fn resolve_with_dotenv(temp_dir: &TempDir) -> Result<crate::snapshot::Snapshot, ConfigError> {
    ConfigLoader::resolve(&ResolveOptions {
        search_dir: Some(temp_dir.path().to_path_buf()),
        load_dotenv: true,
    })
}

#[test]
#[serial]
fn test_missing_dotenv_is_ok() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_vars(DOTENV_VARS, || {
        let temp_dir = TempDir::new().unwrap();
        let _cwd_guard = CwdGuard::new(temp_dir.path());

        let result = ConfigLoader::new().load_dotenv();
        assert!(result.is_ok(), "Missing .env file should be silently ignored");
    });
}

#[test]
#[serial]
fn test_dotenv_feeds_detection_and_overlay() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_vars(DOTENV_VARS, || {
        let temp_dir = TempDir::new().unwrap();
        let _cwd_guard = CwdGuard::new(temp_dir.path());
        fs::write(
            temp_dir.path().join(".env"),
            "__ENV__=testing\n__ENV__APP_FROM_DOTENV=True\n",
        )
        .unwrap();
        write_config(temp_dir.path(), "config.testing.ini", "[APP]\nNAME = svc\n");

        let snapshot = resolve_with_dotenv(&temp_dir).unwrap();
        assert_eq!(snapshot.get_env().unwrap().as_str(), "testing");
        assert_eq!(snapshot.get_option("APP", "FROM_DOTENV").unwrap(), true);
        assert_eq!(snapshot.get_option("APP", "NAME").unwrap(), "svc");
    });
}

#[test]
#[serial]
fn test_dotenv_does_not_override_process_env() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_vars(
        [
            (DOTENV_DISABLED_VAR, None),
            (ENV_VAR, None),
            ("__ENV__APP_FROM_DOTENV", Some("process")),
        ],
        || {
            let temp_dir = TempDir::new().unwrap();
            let _cwd_guard = CwdGuard::new(temp_dir.path());
            fs::write(temp_dir.path().join(".env"), "__ENV__APP_FROM_DOTENV=file\n").unwrap();

            let snapshot = resolve_with_dotenv(&temp_dir).unwrap();
            assert_eq!(snapshot.get_option("APP", "FROM_DOTENV").unwrap(), "process");
        },
    );
}

#[test]
#[serial]
fn test_dotenv_not_loaded_unless_requested() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_vars(DOTENV_VARS, || {
        let temp_dir = TempDir::new().unwrap();
        let _cwd_guard = CwdGuard::new(temp_dir.path());
        fs::write(temp_dir.path().join(".env"), "__ENV__APP_FROM_DOTENV=True\n").unwrap();

        let snapshot = super::resolve_in(temp_dir.path()).unwrap();
        assert!(!snapshot.has_section("APP"));
    });
}

#[test]
#[serial]
fn test_invalid_dotenv_returns_parse_error() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_vars(DOTENV_VARS, || {
        let temp_dir = TempDir::new().unwrap();
        let _cwd_guard = CwdGuard::new(temp_dir.path());
        fs::write(temp_dir.path().join(".env"), "INVALID_LINE_WITHOUT_EQUALS").unwrap();

        match resolve_with_dotenv(&temp_dir) {
            Err(ConfigError::DotenvParse { .. }) => {}
            Err(other) => panic!("Invalid .env should return DotenvParse error, got {}", other),
            Ok(_) => panic!("Invalid .env should return DotenvParse error, got Ok"),
        }
    });
}

#[test]
#[serial]
fn test_dotenv_parse_error_does_not_leak_secrets() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_vars(
        [
            (DOTENV_DISABLED_VAR, None::<&str>),
            ("__ENV__APP_SECRET_KEY", None),
        ],
        || {
            let temp_dir = TempDir::new().unwrap();
            let _cwd_guard = CwdGuard::new(temp_dir.path());
            let secret_value = "supersecret_token_12345";
            fs::write(
                temp_dir.path().join(".env"),
                format!(
                    "__ENV__APP_SECRET_KEY={}\nINVALID_LINE_WITHOUT_EQUALS",
                    secret_value
                ),
            )
            .unwrap();

            let error_string = ConfigLoader::new().load_dotenv().unwrap_err().to_string();
            assert!(
                !error_string.contains(secret_value),
                "Error message should NOT contain the secret value: {}",
                error_string
            );
            assert!(error_string.contains(".env"));
            assert!(error_string.contains("DOTENV_DISABLED"));
        },
    );
}

#[test]
#[serial]
fn test_dotenv_disabled_values() {
    let _lock = env_lock().lock().unwrap();
    for value in ["1", "true"] {
        temp_env::with_var(DOTENV_DISABLED_VAR, Some(value), || {
            let temp_dir = TempDir::new().unwrap();
            let _cwd_guard = CwdGuard::new(temp_dir.path());
            fs::write(temp_dir.path().join(".env"), "INVALID_LINE_WITHOUT_EQUALS").unwrap();

            assert!(
                ConfigLoader::new().load_dotenv().is_ok(),
                "DOTENV_DISABLED={value} should skip .env loading even if file is invalid"
            );
        });
    }
}

#[test]
#[serial]
fn test_dotenv_disabled_other_values_not_disabled() {
    let _lock = env_lock().lock().unwrap();
    temp_env::with_var(DOTENV_DISABLED_VAR, Some("false"), || {
        let temp_dir = TempDir::new().unwrap();
        let _cwd_guard = CwdGuard::new(temp_dir.path());
        fs::write(temp_dir.path().join(".env"), "INVALID_LINE_WITHOUT_EQUALS").unwrap();

        assert!(matches!(
            ConfigLoader::new().load_dotenv(),
            Err(ConfigError::DotenvParse { .. })
        ));
    });
}
