//! Tests for the configuration resolution pipeline.
//!
//! Responsibilities:
//! - Test file pass ordering, precedence and the environment-file policy.
//! - Test default and overridden search directories.
//! - Test the environment overlay against the real process environment.
//! - Test dotenv loading behavior.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `env_lock()` for additional synchronization.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::builder::{ConfigLoader, ResolveOptions};
use super::error::ConfigError;
use crate::snapshot::Snapshot;

pub mod dotenv_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Write `content` to `dir/name` and return the path.
pub fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Resolve with only `dir` searched.
pub fn resolve_in(dir: &Path) -> Result<Snapshot, ConfigError> {
    ConfigLoader::resolve(&ResolveOptions {
        search_dir: Some(dir.to_path_buf()),
        ..Default::default()
    })
}

pub const BASE_CONFIG: &str = "[APP]
DEVELOPMENT = True
DEBUG = True
SECRET_KEY = VERY-SECRET-K3Y
SQLALCHEMY_DATABASE_URI = postgresql://user:@localhost:5434/app
SQLALCHEMY_POOL_SIZE = 100
SQLALCHEMY_TRACK_MODIFICATIONS = False
BASE_URL = http://0.0.0.0:5000
X_RATE = 1.23
";
