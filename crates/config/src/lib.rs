//! Layered INI configuration resolver.
//!
//! Settings are merged from `config.ini`, an environment-specific
//! `config.<env>.ini`, and `__ENV__<SECTION>_<OPTION>` environment variables,
//! with later sources overriding earlier ones.

pub mod constants;
pub mod environment;
mod handle;
pub mod ini;
mod loader;
mod snapshot;
pub mod store;
pub mod value;

pub use environment::{Environment, env_var_or_none};
pub use handle::{LayeredConfig, global};
pub use loader::{
    ConfigError, ConfigLoader, LookupError, LookupReason, Pass, ResolveOptions, decode_var_name,
    env_file_for,
};
pub use snapshot::Snapshot;
pub use store::{Section, Store};
pub use value::{FromValue, Value, decode};
