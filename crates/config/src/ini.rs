//! INI-style text parser.
//!
//! Responsibilities:
//! - Parse `[SECTION]` headers and `KEY = VALUE` / `KEY : VALUE` lines into a `Store`.
//! - Report structural problems with the 1-based line number.
//!
//! Does NOT handle:
//! - Reading files from disk (see `loader::locator`).
//! - Decoding values (stored as original text; see `value`).
//! - `%`-style interpolation or `[DEFAULT]` inheritance.
//!
//! Invariants:
//! - Parse errors never include the offending line content, so values cannot leak.
//! - Keys and section names are case-sensitive and trimmed.
//! - A section defined twice in one text is an error; a repeated option overwrites.
//! - Blank lines inside a multi-line value are kept when a deeper-indented line
//!   follows them; trailing blank lines are dropped. A comment line ends the value.

use thiserror::Error;

use crate::store::Store;

/// Structural problem found while parsing INI text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("option line appears before any section header")]
    MissingSectionHeader,

    #[error("malformed section header")]
    MalformedSectionHeader,

    #[error("section header has an empty name")]
    EmptySectionName,

    #[error("section '{0}' is defined more than once")]
    DuplicateSection(String),

    #[error("line has no '=' or ':' delimiter")]
    MissingDelimiter,

    #[error("option has an empty name")]
    EmptyOptionName,
}

/// A parse failure at a specific line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Option currently open for continuation lines.
struct OpenOption {
    name: String,
    indent: usize,
    /// Blank lines seen since the last line of the value.
    pending_blank: usize,
}

/// Parse INI text into a fresh `Store`.
pub fn parse(text: &str) -> Result<Store, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut store = Store::new();
    let mut current: Option<String> = None;
    let mut open: Option<OpenOption> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let fail = |kind| ParseError { line, kind };
        let trimmed = raw_line.trim();

        if trimmed.is_empty() {
            if let Some(opt) = open.as_mut() {
                opt.pending_blank += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            open = None;
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start().len();

        // Deeper indentation continues the previous option's value.
        if let (Some(opt), Some(section)) = (open.as_mut(), current.as_deref())
            && indent > opt.indent
        {
            if let Some(value) = store.section_mut(section).get_mut(&opt.name) {
                for _ in 0..=opt.pending_blank {
                    value.push('\n');
                }
                value.push_str(trimmed);
            }
            opt.pending_blank = 0;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            // Text after the last `]` is ignored.
            let name = rest
                .rfind(']')
                .map(|end| rest[..end].trim())
                .ok_or_else(|| fail(ParseErrorKind::MalformedSectionHeader))?;
            if name.is_empty() {
                return Err(fail(ParseErrorKind::EmptySectionName));
            }
            if store.has_section(name) {
                return Err(fail(ParseErrorKind::DuplicateSection(name.to_string())));
            }
            store.section_mut(name);
            current = Some(name.to_string());
            open = None;
            continue;
        }

        let section = current
            .as_deref()
            .ok_or_else(|| fail(ParseErrorKind::MissingSectionHeader))?;
        let delimiter = trimmed
            .find(['=', ':'])
            .ok_or_else(|| fail(ParseErrorKind::MissingDelimiter))?;
        let key = trimmed[..delimiter].trim();
        if key.is_empty() {
            return Err(fail(ParseErrorKind::EmptyOptionName));
        }
        let value = trimmed[delimiter + 1..].trim();

        store.set(section, key, value);
        open = Some(OpenOption {
            name: key.to_string(),
            indent,
            pending_blank: 0,
        });
    }

    Ok(store)
}
