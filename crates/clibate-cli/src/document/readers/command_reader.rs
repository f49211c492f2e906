//! `command: <text>` — the document-level command line, run (unless a
//! `test:` block declares its own override) against the sandboxed tree.

use clibate_common::ParseError;

use super::{strip_keyword, unquote, SectionOutcome, SectionReader};
use crate::document::line_cursor::LineCursor;
use crate::document::ParseState;

pub(crate) struct CommandReader;

impl SectionReader for CommandReader {
    fn try_read(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<SectionOutcome, ParseError> {
        let Some(header) = cursor.peek() else {
            return Ok(SectionOutcome::NoMatch);
        };
        let Some(rest) = strip_keyword(&header.trimmed, "command") else {
            return Ok(SectionOutcome::NoMatch);
        };
        state.spec.command = Some(unquote(rest));
        cursor.advance();
        Ok(SectionOutcome::Matched)
    }
}
