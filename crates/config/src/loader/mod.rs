//! Configuration resolution from files and environment variables.
//!
//! Responsibilities:
//! - Locate and parse `config.ini` and the environment-specific file.
//! - Overlay `__ENV__<SECTION>_<OPTION>` variables on top of file values.
//! - Provide a builder-pattern `ConfigLoader` that produces a `Snapshot`.
//!
//! Does NOT handle:
//! - Persisting configuration. The resolver only reads.
//! - Publishing snapshots to concurrent readers (see `handle`).
//!
//! Invariants / Assumptions:
//! - Precedence, lowest to highest: base file, environment file, environment variables.
//! - A missing file is not an error; a malformed one aborts the resolution.

mod builder;
mod error;
mod locator;
mod overlay;

pub use builder::{ConfigLoader, ResolveOptions};
pub use error::{ConfigError, LookupError, LookupReason};
pub use locator::{Pass, env_file_for};
pub use overlay::decode_var_name;

#[cfg(test)]
mod tests;
