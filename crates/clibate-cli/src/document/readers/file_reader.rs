//! `file: <name>` — declares a base file, whose initial content is the
//! following indented block, dedented and taken verbatim.

use clibate_common::ParseError;

use super::{strip_keyword, unquote, SectionOutcome, SectionReader};
use crate::document::line_cursor::{dedent_block, LineCursor};
use crate::document::{DeclaredFile, ParseState};

pub(crate) struct FileReader;

impl SectionReader for FileReader {
    fn try_read(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<SectionOutcome, ParseError> {
        let Some(header) = cursor.peek() else {
            return Ok(SectionOutcome::NoMatch);
        };
        let Some(name) = strip_keyword(&header.trimmed, "file") else {
            return Ok(SectionOutcome::NoMatch);
        };
        let name = unquote(name);
        cursor.advance();
        let body = cursor.take_indented_block(header.indent);
        let raw_lines: Vec<&str> = body.iter().map(|l| l.raw.as_str()).collect();
        let initial_content = dedent_block(&raw_lines);
        state.spec.files.push(DeclaredFile {
            name,
            initial_content,
            location: header.location,
        });
        Ok(SectionOutcome::Matched)
    }
}
