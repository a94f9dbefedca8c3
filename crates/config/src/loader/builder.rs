//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` that runs the resolution pipeline.
//! - Run the base pass, then the environment pass, then the environment overlay.
//! - Produce an immutable `Snapshot` of the merged result.
//!
//! Does NOT handle:
//! - Candidate path computation and file parsing (delegated to locator.rs).
//! - Overlay variable decoding (delegated to overlay.rs).
//! - Publishing snapshots to readers (see `handle`).
//!
//! Invariants / Assumptions:
//! - Environment file values override base file values key-for-key.
//! - Overlay variables override both file passes.
//! - `from_files()` starts from an empty store, so no earlier state leaks in.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::path::PathBuf;

use super::error::ConfigError;
use super::locator::{Pass, file_name_for, load_first, search_dirs};
use super::overlay::{apply_overlay, overlay_vars};
use crate::constants::DOTENV_DISABLED_VAR;
use crate::environment::Environment;
use crate::snapshot::Snapshot;
use crate::store::Store;

/// Settings a `LayeredConfig` keeps between resolutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Replaces the default cwd/parent/grandparent search when set.
    pub search_dir: Option<PathBuf>,
    /// Load a `.env` file into the process environment before detection.
    pub load_dotenv: bool,
}

/// Configuration loader that merges files and environment variables.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    search_dir: Option<PathBuf>,
    environment: Option<Environment>,
    store: Store,
    loaded_files: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full pipeline for `options`.
    pub fn resolve(options: &ResolveOptions) -> Result<Snapshot, ConfigError> {
        let mut loader = Self::new();
        if let Some(dir) = &options.search_dir {
            loader = loader.with_search_dir(dir.clone());
        }
        if options.load_dotenv {
            loader = loader.load_dotenv()?;
        }
        Ok(loader.detect_environment().from_files()?.from_env().build())
    }

    /// Search only `dir` for configuration files.
    pub fn with_search_dir(mut self, dir: PathBuf) -> Self {
        self.search_dir = Some(dir);
        self
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded. Variables already set in the
    /// process environment are not overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read the active environment from `__ENV__`.
    pub fn detect_environment(mut self) -> Self {
        self.environment = Environment::detect();
        tracing::debug!(environment = ?self.environment.as_ref().map(Environment::as_str), "Detected environment");
        self
    }

    /// Load the base file, then the environment file, into a fresh store.
    ///
    /// Anything merged before this call is discarded.
    pub fn from_files(mut self) -> Result<Self, ConfigError> {
        self.store = Store::new();
        self.loaded_files.clear();

        let dirs = search_dirs(self.search_dir.as_deref())?;
        for pass in [Pass::Base, Pass::Environment] {
            let file_name = file_name_for(pass, self.environment.as_ref());
            if let Some(loaded) = load_first(&dirs, &file_name, pass)? {
                self.store.merge(loaded.store);
                self.loaded_files.push(loaded.path);
            }
        }
        Ok(self)
    }

    /// Apply `__ENV__<SECTION>_<OPTION>` variables on top of the file values.
    pub fn from_env(mut self) -> Self {
        let applied = apply_overlay(&mut self.store, overlay_vars());
        tracing::debug!(applied, "Applied environment overlay");
        self
    }

    /// Finish resolution.
    pub fn build(self) -> Snapshot {
        Snapshot::new(self.environment, self.store, self.loaded_files, self.search_dir)
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    pub fn search_dir(&self) -> Option<&PathBuf> {
        self.search_dir.as_ref()
    }
}
