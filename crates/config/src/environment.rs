//! Active environment detection.
//!
//! Responsibilities:
//! - Read the reserved `__ENV__` variable and normalize it into an `Environment`.
//! - Provide helper functions for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Choosing the environment-specific file name (see `loader::locator`).
//! - Decoding overlay variables (see `loader::overlay`).
//!
//! Invariants:
//! - Empty or whitespace-only values are treated as unset.
//! - Environment names are always lowercase.
//! - Detection never fails and has no side effects beyond reading the process environment.

use std::fmt;

use serde::Serialize;

use crate::constants::{ENV_VAR, RECOGNIZED_ENVIRONMENTS};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// A logical deployment context name such as `development` or `production`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    /// Normalize a raw name. Returns `None` for empty or whitespace-only input.
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    /// Detect the active environment from the `__ENV__` variable.
    ///
    /// Reflects the process environment at the time of the call.
    pub fn detect() -> Option<Self> {
        env_var_or_none(ENV_VAR).and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this environment selects its own `config.<env>.ini`.
    pub fn is_recognized(&self) -> bool {
        RECOGNIZED_ENVIRONMENTS.contains(&self.0.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Environment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
