//! UNPREF: strip a matched prefix from the line. Requires a one-value
//! parenthesized tuple naming the prefix to remove.

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
            "Missing parenthesized prefix pattern to remove for UNPREF instruction.",
            cursor.location(),
        ));
    };
    if values.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Missing parenthesized prefix pattern to remove for UNPREF instruction.",
            tuple_loc,
        ));
    }
    let (prefix, _) = decode_tuple_values(&values, header.regex_mode, false)?;

    let (body, loc) = cursor.read_body()?;
    let match_spec = LineSpec::from_body(prefix, None, body, header.star, false, loc);
    cursor.consume_newline();

    Ok(EditOp::Unpref {
        header: Header {
            location,
            all,
            regex_mode: header.regex_mode,
        },
        match_spec,
    })
}
