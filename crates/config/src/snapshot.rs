//! Immutable result of one resolution, and the read-side query API.
//!
//! Responsibilities:
//! - Hold the detected environment, merged store, loaded file record and search override.
//! - Serve decoded, raw and typed lookups.
//!
//! Does NOT handle:
//! - Running the resolution pipeline (see `loader`).
//! - Replacing the current snapshot (see `handle`).
//!
//! Invariants:
//! - A snapshot never changes after it is built.
//! - Values are decoded on every read; the store keeps original text.

use std::path::{Path, PathBuf};

use crate::environment::Environment;
use crate::loader::{ConfigError, LookupError};
use crate::store::{Section, Store};
use crate::value::{FromValue, Value, decode};

/// One fully merged configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    environment: Option<Environment>,
    store: Store,
    loaded_files: Vec<PathBuf>,
    search_dir: Option<PathBuf>,
}

impl Snapshot {
    pub(crate) fn new(
        environment: Option<Environment>,
        store: Store,
        loaded_files: Vec<PathBuf>,
        search_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            environment,
            store,
            loaded_files,
            search_dir,
        }
    }

    /// Raw stored text of an option.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<&str, LookupError> {
        let found = self
            .store
            .section(section)
            .ok_or_else(|| LookupError::no_section(section, option))?;
        found
            .get(option)
            .ok_or_else(|| LookupError::no_option(section, option))
    }

    /// Decoded value of an option.
    pub fn get_option(&self, section: &str, option: &str) -> Result<Value, LookupError> {
        self.get_raw(section, option).map(decode)
    }

    /// Decoded value converted to `T`.
    pub fn get<T: FromValue>(&self, section: &str, option: &str) -> Result<T, ConfigError> {
        let value = self.get_option(section, option)?;
        T::from_value(&value).ok_or_else(|| ConfigError::TypeMismatch {
            section: section.to_string(),
            option: option.to_string(),
            expected: std::any::type_name::<T>(),
            found: value.kind(),
        })
    }

    /// Like `get`, but a missing section or option yields `default`.
    ///
    /// A present value of the wrong type is still an error.
    pub fn get_or<T: FromValue>(
        &self,
        section: &str,
        option: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.get(section, option) {
            Err(ConfigError::Lookup(_)) => Ok(default),
            other => other,
        }
    }

    /// All decoded options of a section.
    pub fn get_section(&self, section: &str) -> Result<Section<Value>, LookupError> {
        self.store
            .section(section)
            .map(Section::decoded)
            .ok_or_else(|| LookupError::missing_section(section))
    }

    /// The whole store, decoded. Empty when nothing was loaded.
    pub fn get_sections(&self) -> Store<Value> {
        self.store.decoded()
    }

    /// The whole store as original text.
    pub fn raw(&self) -> &Store {
        &self.store
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.store.has_section(section)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.store.get(section, option).is_some()
    }

    pub fn get_env(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Files merged, in load order (earlier = lower precedence).
    pub fn get_loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    pub fn get_search_directory(&self) -> Option<&Path> {
        self.search_dir.as_deref()
    }
}
