//! The section-reader registry (SPEC_FULL §4.7/§10): a first-match
//! dispatch over pluggable readers, one per top-level section kind. Hosts
//! embedding the parser can prepend their own readers ahead of the built-ins
//! via [`ReaderRegistry::with_reader`].

mod command_reader;
mod copy_reader;
mod file_reader;
mod include_reader;
mod test_reader;

use clibate_common::ParseError;

use super::ParseState;
use crate::document::line_cursor::LineCursor;

/// What a [`SectionReader`] reports after looking at the cursor's current
/// line: either it claimed the section (and has already consumed it,
/// mutating `state`), or it declined and left the cursor untouched.
pub enum SectionOutcome {
    Matched,
    NoMatch,
}

/// A pluggable matcher for one top-level section kind.
pub trait SectionReader {
    /// # Errors
    ///
    /// Returns a [`ParseError`] if this reader recognizes the section but
    /// its body is malformed.
    fn try_read(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<SectionOutcome, ParseError>;
}

/// An ordered list of section readers, tried top to bottom until one
/// matches.
pub struct ReaderRegistry {
    readers: Vec<Box<dyn SectionReader>>,
}

impl ReaderRegistry {
    /// The registry clibate ships: `include:`, `file:`, `copy:`, `command:`,
    /// `test:` (with its nested `edit:`/`success:`/`failure:` bodies), in
    /// that order.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            readers: vec![
                Box::new(include_reader::IncludeReader),
                Box::new(file_reader::FileReader),
                Box::new(copy_reader::CopyReader),
                Box::new(command_reader::CommandReader),
                Box::new(test_reader::TestReader),
            ],
        }
    }

    /// Prepend a host-supplied reader so it is tried before every built-in
    /// one.
    #[must_use]
    pub fn with_reader(mut self, reader: Box<dyn SectionReader>) -> Self {
        self.readers.insert(0, reader);
        self
    }

    /// Try every reader in order against the cursor's current line.
    /// Returns `Ok(true)` if one matched (and consumed the section),
    /// `Ok(false)` if none recognized it.
    ///
    /// # Errors
    ///
    /// Propagates whichever reader matched-but-failed's [`ParseError`].
    pub fn dispatch(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<bool, ParseError> {
        for reader in &self.readers {
            match reader.try_read(cursor, state)? {
                SectionOutcome::Matched => return Ok(true),
                SectionOutcome::NoMatch => {}
            }
        }
        Ok(false)
    }
}

/// Shared helper: does `line` start with `keyword` followed by `:`? Returns
/// the text after the colon, trimmed.
pub(super) fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim())
}

/// Strip a leading/trailing matching quote pair (`'...'` or `"..."`) if
/// present; otherwise return the text unchanged. Section header arguments
/// (paths, commands) are simple enough not to need the edit engine's full
/// quoting/escaping machinery, but quoting lets a path contain `#` or
/// leading/trailing whitespace.
pub(super) fn unquote(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' || first == b'"') && first == last {
            return text[1..text.len() - 1].to_string();
        }
    }
    text.to_string()
}
