//! Environment variable overlay.
//!
//! Responsibilities:
//! - Decode `__ENV__<SECTION>_<OPTION>` variable names into (section, option) pairs.
//! - Apply decoded pairs on top of a store, creating sections as needed.
//!
//! Does NOT handle:
//! - Active environment detection from the bare `__ENV__` variable (see `environment`).
//! - Value decoding (values are stored as original text).
//!
//! Invariants:
//! - Only the leading prefix is stripped; the remainder splits on its first underscore.
//! - Names that cannot form a non-empty (section, option) pair are skipped, never an error.
//! - Variables are applied in ascending name order. Distinct names decode to
//!   distinct pairs, so the result does not depend on that order.
//! - Variable values are never logged.

use crate::constants::{OVERLAY_PREFIX, OVERLAY_SEPARATOR};
use crate::store::Store;

/// Decode an overlay variable name into `(section, option)`.
pub fn decode_var_name(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix(OVERLAY_PREFIX)?;
    let (section, option) = rest.split_once(OVERLAY_SEPARATOR)?;
    if section.is_empty() || option.is_empty() {
        return None;
    }
    Some((section, option))
}

/// Snapshot the process environment's overlay candidates, sorted by name.
///
/// Variables whose name or value is not valid Unicode are skipped.
pub(crate) fn overlay_vars() -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = std::env::vars_os()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            if !name.starts_with(OVERLAY_PREFIX) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((name, value)),
                Err(_) => {
                    tracing::trace!(var = %name, "Skipping overlay variable with non-Unicode value");
                    None
                }
            }
        })
        .collect();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    vars
}

/// Apply overlay variables to `store`. Returns how many were applied.
pub(crate) fn apply_overlay<I>(store: &mut Store, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut applied = 0;
    for (name, value) in vars {
        match decode_var_name(&name) {
            Some((section, option)) => {
                store.set(section, option, value);
                applied += 1;
            }
            None => tracing::trace!(var = %name, "Skipping overlay variable without section/option"),
        }
    }
    applied
}
