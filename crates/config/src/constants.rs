//! Centralized constants for the layered configuration resolver.
//!
//! This module contains the reserved names the resolver reads from the
//! process environment and the filesystem.

// =============================================================================
// Environment Variables
// =============================================================================

/// Variable that designates the active environment (e.g. `production`).
pub const ENV_VAR: &str = "__ENV__";

/// Prefix of overlay variables. `__ENV__APP_DEBUG` targets section `APP`,
/// option `DEBUG`.
pub const OVERLAY_PREFIX: &str = "__ENV__";

/// Separator between the section and option parts of an overlay variable.
pub const OVERLAY_SEPARATOR: char = '_';

/// Setting this to `1` or `true` disables `.env` file loading.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// Files
// =============================================================================

/// Base configuration file, always attempted first.
pub const BASE_FILE_NAME: &str = "config.ini";

/// Environment used for the environment-specific file when none is detected
/// or the detected one is not recognized.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment names that select their own `config.<env>.ini`.
pub const RECOGNIZED_ENVIRONMENTS: &[&str] = &["development", "testing", "staging", "production"];

/// Number of ancestors of the working directory searched after the working
/// directory itself (parent and grandparent).
pub const DEFAULT_SEARCH_ANCESTORS: usize = 2;

/// Build the environment-specific file name for an environment.
pub fn env_file_name(environment: &str) -> String {
    format!("config.{environment}.ini")
}
