//! PREFIX: insert an "extra" pattern between an (optionally matched)
//! prefix and the line's body. Requires a parenthesized tuple: `(extra)`
//! or `(prefix, extra)`.

use clibate_common::{ParseError, ParseErrorKind};

use crate::cursor::Cursor;
use crate::ops::{EditOp, Header, LineSpec};

use super::{decode_tuple_values, try_consume_word, KeywordToken};

pub(super) fn parse(cursor: &mut Cursor, header: KeywordToken) -> Result<EditOp, ParseError> {
    let location = header.location.clone();
    let all = try_consume_word(cursor, "ALL");

    let Some((values, tuple_loc)) = cursor.read_tuple()? else {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Missing parenthesized prefix pattern(s) for PREFIX instruction.",
            cursor.location(),
        ));
    };
    if values.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Missing parenthesized prefix pattern(s) for PREFIX instruction.",
            tuple_loc,
        ));
    }
    let (prefix, extra) = decode_tuple_values(&values, header.regex_mode, values.len() == 1)?;

    let (body, loc) = cursor.read_body()?;
    let match_spec = LineSpec::from_body(prefix, extra, body, header.star, false, loc);
    cursor.consume_newline();

    Ok(EditOp::Prefix {
        header: Header {
            location,
            all,
            regex_mode: header.regex_mode,
        },
        match_spec,
    })
}
