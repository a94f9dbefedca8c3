//! Configuration file location and loading.
//!
//! Responsibilities:
//! - Compute candidate directories (override, or cwd/parent/grandparent).
//! - Choose the environment-specific file name for the detected environment.
//! - Load the first existing candidate for a pass and parse it.
//!
//! Does NOT handle:
//! - Merging passes together or ordering them (see builder.rs).
//! - Environment variable overlay (see overlay.rs).
//!
//! Invariants:
//! - An explicit search directory is the only directory searched.
//! - First existing regular file wins; at most one file is loaded per pass.
//! - A missing candidate is never an error; an unreadable or malformed one always is.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::{BASE_FILE_NAME, DEFAULT_ENVIRONMENT, DEFAULT_SEARCH_ANCESTORS, env_file_name};
use crate::environment::Environment;
use crate::ini;
use crate::store::Store;

use super::error::ConfigError;

/// One of the two file passes, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Base,
    Environment,
}

/// A file that was found and parsed.
#[derive(Debug)]
pub(crate) struct LoadedFile {
    pub path: PathBuf,
    pub store: Store,
}

/// Default search path: `cwd`, its parent, its grandparent.
///
/// Near the filesystem root fewer directories are returned.
pub(crate) fn default_search_dirs(cwd: &Path) -> Vec<PathBuf> {
    cwd.ancestors()
        .take(1 + DEFAULT_SEARCH_ANCESTORS)
        .map(Path::to_path_buf)
        .collect()
}

/// Directories to search, in order.
pub(crate) fn search_dirs(search_dir: Option<&Path>) -> Result<Vec<PathBuf>, ConfigError> {
    match search_dir {
        Some(dir) => Ok(vec![dir.to_path_buf()]),
        None => {
            let cwd = std::env::current_dir().map_err(ConfigError::CurrentDirUnavailable)?;
            Ok(default_search_dirs(&cwd))
        }
    }
}

/// Environment-specific file name.
///
/// Recognized environments select `config.<env>.ini`; an absent or
/// unrecognized environment falls back to `config.development.ini`.
pub fn env_file_for(environment: Option<&Environment>) -> String {
    match environment {
        Some(env) if env.is_recognized() => env_file_name(env.as_str()),
        _ => env_file_name(DEFAULT_ENVIRONMENT),
    }
}

/// File name searched by a pass.
pub(crate) fn file_name_for(pass: Pass, environment: Option<&Environment>) -> String {
    match pass {
        Pass::Base => BASE_FILE_NAME.to_string(),
        Pass::Environment => env_file_for(environment),
    }
}

/// Load the first candidate `dir/file_name` that exists as a regular file.
pub(crate) fn load_first(
    dirs: &[PathBuf],
    file_name: &str,
    pass: Pass,
) -> Result<Option<LoadedFile>, ConfigError> {
    for path in dirs.iter().map(|dir| dir.join(file_name)) {
        if !path.is_file() {
            tracing::trace!(path = %path.display(), ?pass, "Config candidate not found");
            continue;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            // Removed between the existence check and the read.
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(source) => return Err(ConfigError::ConfigFileRead { path, source }),
        };

        let store = ini::parse(&text).map_err(|e| ConfigError::ConfigFileParse {
            path: path.clone(),
            line: e.line,
            kind: e.kind,
        })?;

        tracing::debug!(
            path = %path.display(),
            ?pass,
            sections = store.len(),
            "Loaded config file"
        );
        return Ok(Some(LoadedFile { path, store }));
    }

    Ok(None)
}
