//! REMOVE: a single match line. `()` means "no indent, no prefix"; a
//! one-value tuple `(prefix)` names a prefix to require.

use clibate_common::ParseError;

use crate::cursor::Cursor;
use crate::ops::{EditOp, Header, LineSpec};

use super::{decode_tuple_values, try_consume_word, KeywordToken};

pub(super) fn parse(cursor: &mut Cursor, header: KeywordToken) -> Result<EditOp, ParseError> {
    let location = header.location.clone();
    let all = try_consume_word(cursor, "ALL");

    let tuple = cursor.read_tuple()?;
    let (prefix, no_indent_no_prefix) = match &tuple {
        Some((values, _)) if values.is_empty() => (None, true),
        Some((values, _)) => {
            let (prefix, _) = decode_tuple_values(values, header.regex_mode, false)?;
            (prefix, false)
        }
        None => (None, false),
    };
    let (body, loc) = cursor.read_body()?;
    let match_spec = LineSpec::from_body(prefix, None, body, header.star, no_indent_no_prefix, loc);
    cursor.consume_newline();

    Ok(EditOp::Remove {
        header: Header {
            location,
            all,
            regex_mode: header.regex_mode,
        },
        match_spec,
    })
}
