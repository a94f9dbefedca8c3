//! Error types for configuration resolution and lookup.
//!
//! Responsibilities:
//! - Define error variants for all resolution failures (files, dotenv, working directory).
//! - Define `LookupError`, the single tagged error for missing sections and options.
//!
//! Does NOT handle:
//! - Missing candidate files. Those are not errors and never reach the caller.
//! - Malformed overlay variables. Those are skipped silently.
//!
//! Invariants:
//! - All error variants include context for debugging (paths, line numbers, names).
//! - Errors NEVER include raw file or `.env` line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::ini::ParseErrorKind;

/// Errors that can occur during configuration resolution or typed lookup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to determine the current working directory: {0}")]
    CurrentDirUnavailable(#[source] std::io::Error),

    #[error("Failed to read config file at {path}")]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path} (line {line}): {kind}")]
    ConfigFileParse {
        path: PathBuf,
        line: usize,
        kind: ParseErrorKind,
    },

    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Option '{option}' in section '{section}' is a {found}, expected {expected}")]
    TypeMismatch {
        section: String,
        option: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Which part of a lookup was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupReason {
    SectionMissing,
    OptionMissing,
}

/// A requested section or option is absent.
///
/// `option` is set when the failure came from an option lookup, so callers
/// can tell `get_option` on a missing section apart from `get_section`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.describe())]
pub struct LookupError {
    reason: LookupReason,
    section: String,
    option: Option<String>,
}

impl LookupError {
    pub(crate) fn no_section(section: &str, option: &str) -> Self {
        Self {
            reason: LookupReason::SectionMissing,
            section: section.to_string(),
            option: Some(option.to_string()),
        }
    }

    pub(crate) fn no_option(section: &str, option: &str) -> Self {
        Self {
            reason: LookupReason::OptionMissing,
            section: section.to_string(),
            option: Some(option.to_string()),
        }
    }

    pub(crate) fn missing_section(section: &str) -> Self {
        Self {
            reason: LookupReason::SectionMissing,
            section: section.to_string(),
            option: None,
        }
    }

    pub fn reason(&self) -> LookupReason {
        self.reason
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn option(&self) -> Option<&str> {
        self.option.as_deref()
    }

    /// Section absent during an option lookup.
    pub fn is_no_section(&self) -> bool {
        self.reason == LookupReason::SectionMissing && self.option.is_some()
    }

    /// Option absent within an existing section.
    pub fn is_no_option(&self) -> bool {
        self.reason == LookupReason::OptionMissing
    }

    /// Section absent during a section lookup.
    pub fn is_missing_section(&self) -> bool {
        self.reason == LookupReason::SectionMissing && self.option.is_none()
    }

    /// Either kind of missing section.
    pub fn is_section_missing(&self) -> bool {
        self.reason == LookupReason::SectionMissing
    }

    fn describe(&self) -> String {
        match (self.reason, &self.option) {
            (LookupReason::SectionMissing, _) => format!("No section: '{}'", self.section),
            (LookupReason::OptionMissing, Some(option)) => {
                format!("No option '{}' in section: '{}'", option, self.section)
            }
            (LookupReason::OptionMissing, None) => format!("No option in section: '{}'", self.section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_kinds_are_distinguishable() {
        let no_section = LookupError::no_section("APP", "DEBUG");
        let no_option = LookupError::no_option("APP", "DEBUG");
        let missing = LookupError::missing_section("APP");

        assert!(no_section.is_no_section() && !no_section.is_missing_section());
        assert!(missing.is_missing_section() && !missing.is_no_section());
        assert!(no_section.is_section_missing() && missing.is_section_missing());
        assert!(no_option.is_no_option() && !no_option.is_section_missing());
        assert_eq!(no_option.option(), Some("DEBUG"));
        assert_eq!(missing.option(), None);

        assert_eq!(no_section.reason(), LookupReason::SectionMissing);
        assert_eq!(missing.reason(), LookupReason::SectionMissing);
        assert_eq!(no_option.reason(), LookupReason::OptionMissing);
        assert_eq!(no_option.section(), "APP");
        assert_eq!(missing.section(), "APP");
    }

    #[test]
    fn test_lookup_messages() {
        assert_eq!(
            LookupError::no_option("APP", "DEBUG1").to_string(),
            "No option 'DEBUG1' in section: 'APP'"
        );
        assert_eq!(LookupError::missing_section("DB").to_string(), "No section: 'DB'");
    }

    #[test]
    fn test_parse_error_message_names_path_and_line() {
        let err = ConfigError::ConfigFileParse {
            path: PathBuf::from("/etc/app/config.ini"),
            line: 3,
            kind: ParseErrorKind::DuplicateSection("APP".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("/etc/app/config.ini"));
        assert!(message.contains("line 3"));
        assert!(message.contains("'APP'"));
    }
}
