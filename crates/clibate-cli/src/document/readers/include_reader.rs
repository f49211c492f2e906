//! `include: <path>` — recursively parses another spec document, pushing
//! this site onto the include chain of every diagnostic raised inside it.

use clibate_common::{IncludeSite, ParseError};

use super::{strip_keyword, unquote, SectionOutcome, SectionReader};
use crate::document::line_cursor::LineCursor;
use crate::document::{parse_into, ParseState};

pub(crate) struct IncludeReader;

impl SectionReader for IncludeReader {
    fn try_read(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<SectionOutcome, ParseError> {
        let Some(header) = cursor.peek() else {
            return Ok(SectionOutcome::NoMatch);
        };
        let Some(rest) = strip_keyword(&header.trimmed, "include") else {
            return Ok(SectionOutcome::NoMatch);
        };
        let path = unquote(rest);
        cursor.advance();

        let resolved = state.base_dir.join(&path);
        let site = IncludeSite {
            file: header.location.file.clone(),
            line: header.location.line,
            col: header.location.col,
        };
        let mut chain = vec![site];
        chain.extend(state.include_chain.iter().cloned());

        parse_into(state.spec, &resolved, chain, &mut state.visiting)?;
        Ok(SectionOutcome::Matched)
    }
}
