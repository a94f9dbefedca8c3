//! Configuration handle with an explicit lifecycle.
//!
//! Responsibilities:
//! - Own the current `Snapshot` and the `ResolveOptions` used to build it.
//! - Re-resolve on `refresh()` and `set_search_directory()`, publishing the result atomically.
//! - Provide `global()`, an optional process-wide handle.
//!
//! Does NOT handle:
//! - Resolution logic (see `loader`).
//! - Watching files or the environment for changes.
//!
//! Invariants:
//! - Readers see either the previous snapshot or the next one, never a partial merge.
//! - A failed resolution leaves the previous snapshot and options in effect.
//! - Resolutions are serialized; reads never wait on one.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

use crate::environment::Environment;
use crate::loader::{ConfigError, ConfigLoader, LookupError, ResolveOptions};
use crate::snapshot::Snapshot;
use crate::store::{Section, Store};
use crate::value::{FromValue, Value};

/// Layered configuration: `config.ini`, then `config.<env>.ini`, then `__ENV__*` variables.
#[derive(Debug)]
pub struct LayeredConfig {
    current: RwLock<Arc<Snapshot>>,
    options: Mutex<ResolveOptions>,
}

impl LayeredConfig {
    /// Resolve with default options (cwd search, no `.env`).
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_options(ResolveOptions::default())
    }

    pub fn with_options(options: ResolveOptions) -> Result<Self, ConfigError> {
        let snapshot = ConfigLoader::resolve(&options)?;
        Ok(Self::from_parts(snapshot, options))
    }

    /// A handle with nothing loaded. `refresh()` resolves with default options.
    pub fn empty() -> Self {
        Self::from_parts(Snapshot::default(), ResolveOptions::default())
    }

    fn from_parts(snapshot: Snapshot, options: ResolveOptions) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            options: Mutex::new(options),
        }
    }

    /// The current snapshot. Holding it gives consistent reads across calls.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, snapshot: Snapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    fn lock_options(&self) -> MutexGuard<'_, ResolveOptions> {
        self.options.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-run detection, both file passes and the overlay from a clean state.
    pub fn refresh(&self) -> Result<(), ConfigError> {
        let options = self.lock_options();
        let snapshot = ConfigLoader::resolve(&options).inspect_err(|e| {
            tracing::debug!(error = %e, "Refresh failed, keeping previous configuration");
        })?;
        self.publish(snapshot);
        Ok(())
    }

    /// Search only `dir`, or restore the default search path with `None`,
    /// then re-resolve from scratch.
    pub fn set_search_directory(&self, dir: Option<&Path>) -> Result<(), ConfigError> {
        let mut options = self.lock_options();
        let next = ResolveOptions {
            search_dir: dir.map(Path::to_path_buf),
            ..options.clone()
        };
        let snapshot = ConfigLoader::resolve(&next).inspect_err(|e| {
            tracing::debug!(error = %e, "Search directory change rejected, keeping previous configuration");
        })?;
        *options = next;
        self.publish(snapshot);
        Ok(())
    }

    pub fn get_search_directory(&self) -> Option<PathBuf> {
        self.snapshot().get_search_directory().map(Path::to_path_buf)
    }

    pub fn get_option(&self, section: &str, option: &str) -> Result<Value, LookupError> {
        self.snapshot().get_option(section, option)
    }

    pub fn get_raw(&self, section: &str, option: &str) -> Result<String, LookupError> {
        self.snapshot().get_raw(section, option).map(str::to_string)
    }

    pub fn get<T: FromValue>(&self, section: &str, option: &str) -> Result<T, ConfigError> {
        self.snapshot().get(section, option)
    }

    pub fn get_or<T: FromValue>(
        &self,
        section: &str,
        option: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        self.snapshot().get_or(section, option, default)
    }

    pub fn get_section(&self, section: &str) -> Result<Section<Value>, LookupError> {
        self.snapshot().get_section(section)
    }

    pub fn get_sections(&self) -> Store<Value> {
        self.snapshot().get_sections()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.snapshot().has_section(section)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.snapshot().has_option(section, option)
    }

    pub fn get_env(&self) -> Option<Environment> {
        self.snapshot().get_env().cloned()
    }

    pub fn get_loaded_files(&self) -> Vec<PathBuf> {
        self.snapshot().get_loaded_files().to_vec()
    }
}

/// Process-wide handle, resolved on first use with default options.
///
/// If that first resolution fails the handle starts empty; call
/// `refresh()` once the problem is fixed.
pub fn global() -> &'static LayeredConfig {
    static GLOBAL: OnceLock<LayeredConfig> = OnceLock::new();
    GLOBAL.get_or_init(|| or_empty(LayeredConfig::new()))
}

fn or_empty(resolved: Result<LayeredConfig, ConfigError>) -> LayeredConfig {
    resolved.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to resolve configuration, starting empty");
        LayeredConfig::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ENV_VAR;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn handle_for(dir: &Path) -> LayeredConfig {
        LayeredConfig::with_options(ResolveOptions {
            search_dir: Some(dir.to_path_buf()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LayeredConfig>();
    }

    #[test]
    #[serial]
    fn test_set_search_directory_toggles_file() {
        temp_env::with_var_unset(ENV_VAR, || {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "config.ini", "[APP]\nDEBUG = True\n");
            let config = handle_for(temp_dir.path());
            assert_eq!(
                config.get_loaded_files(),
                vec![temp_dir.path().join("config.ini")]
            );

            let empty_dir = TempDir::new().unwrap();
            config.set_search_directory(Some(empty_dir.path())).unwrap();
            assert!(config.get_loaded_files().is_empty());
            assert_eq!(config.get_search_directory(), Some(empty_dir.path().to_path_buf()));

            config.set_search_directory(Some(temp_dir.path())).unwrap();
            assert_eq!(config.get_option("APP", "DEBUG").unwrap(), true);
        });
    }

    #[test]
    #[serial]
    fn test_failed_refresh_keeps_previous_snapshot() {
        temp_env::with_var_unset(ENV_VAR, || {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "config.ini", "[APP]\nDEBUG = True\n");
            let config = handle_for(temp_dir.path());
            let before = config.snapshot();

            write(temp_dir.path(), "config.ini", "[APP]\n[APP]\n");
            let err = config.refresh().unwrap_err();
            assert!(matches!(err, ConfigError::ConfigFileParse { line: 2, .. }));

            assert_eq!(*config.snapshot(), *before);
            assert_eq!(config.get_option("APP", "DEBUG").unwrap(), true);
        });
    }

    #[test]
    #[serial]
    fn test_failed_search_directory_change_keeps_override() {
        temp_env::with_var_unset(ENV_VAR, || {
            let good = TempDir::new().unwrap();
            write(good.path(), "config.ini", "[APP]\nA = 1\n");
            let bad = TempDir::new().unwrap();
            write(bad.path(), "config.ini", "no header = here\n");

            let config = handle_for(good.path());
            assert!(config.set_search_directory(Some(bad.path())).is_err());
            assert_eq!(config.get_search_directory(), Some(good.path().to_path_buf()));

            // The rejected directory is not retried on refresh.
            config.refresh().unwrap();
            assert_eq!(config.get_option("APP", "A").unwrap(), 1);
        });
    }

    #[test]
    #[serial]
    fn test_refresh_picks_up_environment_changes() {
        temp_env::with_var_unset(ENV_VAR, || {
            let temp_dir = TempDir::new().unwrap();
            let config = handle_for(temp_dir.path());
            assert_eq!(config.get_env(), None);
            assert!(!config.has_section("APP"));

            temp_env::with_vars(
                [(ENV_VAR, Some("Production")), ("__ENV__APP_DEBUG", Some("True"))],
                || {
                    config.refresh().unwrap();
                    assert_eq!(config.get_env().unwrap().as_str(), "production");
                    assert!(config.has_option("APP", "DEBUG"));
                },
            );

            config.refresh().unwrap();
            assert_eq!(config.get_env(), None);
            assert!(!config.has_section("APP"));
        });
    }

    #[test]
    #[serial]
    fn test_held_snapshot_is_unaffected_by_refresh() {
        temp_env::with_var_unset(ENV_VAR, || {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "config.ini", "[APP]\nVERSION = 1\n");
            let config = handle_for(temp_dir.path());
            let held = config.snapshot();

            write(temp_dir.path(), "config.ini", "[APP]\nVERSION = 2\n");
            config.refresh().unwrap();

            assert_eq!(held.get_option("APP", "VERSION").unwrap(), 1);
            assert_eq!(config.get_option("APP", "VERSION").unwrap(), 2);
        });
    }

    #[test]
    #[serial]
    fn test_concurrent_reads_during_refresh() {
        temp_env::with_var_unset(ENV_VAR, || {
            let temp_dir = TempDir::new().unwrap();
            write(
                temp_dir.path(),
                "config.ini",
                "[APP]\nA = 1\nB = 1\n",
            );
            write(
                temp_dir.path(),
                "config.development.ini",
                "[APP]\nB = 1\n",
            );
            let config = handle_for(temp_dir.path());

            std::thread::scope(|scope| {
                let reader = scope.spawn(|| {
                    for _ in 0..200 {
                        let snapshot = config.snapshot();
                        // Both passes are always visible together.
                        assert_eq!(snapshot.get_loaded_files().len(), 2);
                        assert!(snapshot.has_option("APP", "A"));
                    }
                });
                for _ in 0..20 {
                    config.refresh().unwrap();
                }
                reader.join().unwrap();
            });
        });
    }

    #[test]
    #[serial]
    fn test_refresh_twice_is_idempotent() {
        temp_env::with_vars(
            [(ENV_VAR, None), ("__ENV__DB_CACHE", Some("False"))],
            || {
                let temp_dir = TempDir::new().unwrap();
                write(temp_dir.path(), "config.ini", "[APP]\nDEBUG = True\nX_RATE = 1.23\n");
                write(temp_dir.path(), "config.development.ini", "[APP]\nDEBUG = False\n");
                let config = handle_for(temp_dir.path());

                config.refresh().unwrap();
                let first = config.snapshot();
                config.refresh().unwrap();
                let second = config.snapshot();

                assert!(!Arc::ptr_eq(&first, &second));
                assert_eq!(*first, *second);
                assert_eq!(second.get_option("APP", "DEBUG").unwrap(), false);
                assert_eq!(second.get_option("DB", "CACHE").unwrap(), false);
            },
        );
    }

    #[test]
    #[serial]
    fn test_global_is_shared() {
        let first = global();
        let second = global();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_failed_first_resolution_starts_empty() {
        let failed = Err(ConfigError::ConfigFileParse {
            path: PathBuf::from("config.ini"),
            line: 1,
            kind: crate::ini::ParseErrorKind::MissingSectionHeader,
        });
        let config = or_empty(failed);
        assert!(config.get_sections().is_empty());
        assert!(config.get_loaded_files().is_empty());
        assert_eq!(config.get_env(), None);
    }

    #[test]
    fn test_empty_handle() {
        let config = LayeredConfig::empty();
        assert!(config.get_sections().is_empty());
        assert!(config.get_loaded_files().is_empty());
        assert!(config.get_section("APP").unwrap_err().is_missing_section());
    }
}
