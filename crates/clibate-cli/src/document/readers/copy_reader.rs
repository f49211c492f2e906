//! `copy: <src> -> <name>` — declares a new file by copying a previously
//! declared one's content, giving later `test:` blocks a distinct base to
//! edit without disturbing the original.

use clibate_common::{ParseError, ParseErrorKind};

use super::{strip_keyword, unquote, SectionOutcome, SectionReader};
use crate::document::line_cursor::LineCursor;
use crate::document::{DeclaredFile, ParseState};

pub(crate) struct CopyReader;

impl SectionReader for CopyReader {
    fn try_read(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<SectionOutcome, ParseError> {
        let Some(header) = cursor.peek() else {
            return Ok(SectionOutcome::NoMatch);
        };
        let Some(rest) = strip_keyword(&header.trimmed, "copy") else {
            return Ok(SectionOutcome::NoMatch);
        };
        let Some((src, name)) = rest.split_once("->") else {
            return Err(ParseError::new(
                ParseErrorKind::Structure,
                "Expected 'copy: <src> -> <name>'.",
                header.location,
            ));
        };
        let src = unquote(src.trim());
        let name = unquote(name.trim());
        let Some(base) = state.find_file(&src) else {
            return Err(ParseError::new(
                ParseErrorKind::Semantic,
                format!("copy: source file '{src}' was not declared above this point."),
                header.location,
            ));
        };
        let initial_content = base.initial_content.clone();
        cursor.advance();
        state.spec.files.push(DeclaredFile {
            name,
            initial_content,
            location: header.location,
        });
        Ok(SectionOutcome::Matched)
    }
}
