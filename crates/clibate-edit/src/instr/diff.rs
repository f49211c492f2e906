//! DIFF: a two-line instruction — a match line, then a `~`-introduced
//! replace line that may carry its own star-mode tail modifier.

use clibate_common::{ParseError, ParseErrorKind};

use crate::cursor::Cursor;
use crate::linemodel::validate_star_legality;
use crate::ops::{EditOp, Header, LineSpec, StarMode};

use super::{decode_tuple_values, try_consume_word, KeywordToken};

pub(super) fn parse(cursor: &mut Cursor, header: KeywordToken) -> Result<EditOp, ParseError> {
    let location = header.location.clone();
    let all = try_consume_word(cursor, "ALL");

    let tuple = cursor.read_tuple()?;
    let (prefix, extra) = match tuple {
        Some((values, _)) => decode_tuple_values(&values, header.regex_mode, false)?,
        None => (None, None),
    };
    let (body, body_loc) = cursor.read_body()?;
    let match_spec = LineSpec::from_body(prefix, extra, body, header.star, false, body_loc);
    cursor.consume_newline();

    if cursor.at_eof() || cursor.peek_significant() != Some('~') {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Missing introducing tilde '~' on second diff line.",
            cursor.location(),
        ));
    }
    cursor.skip_inline_ws();
    let tilde_loc = cursor.location();
    cursor.consume_if_starts_with("~");
    let replace_star = if cursor.consume_if_starts_with("**") {
        StarMode::DoubleStar
    } else if cursor.consume_if_starts_with("*") {
        StarMode::Star
    } else {
        StarMode::None
    };
    validate_star_legality(
        replace_star,
        match_spec.has_prefix(),
        match_spec.no_indent_no_prefix,
        &tilde_loc,
    )?;

    let replace_tuple = cursor.read_tuple()?;
    let (replace_prefix, replace_extra) = match replace_tuple {
        Some((values, _)) => decode_tuple_values(&values, header.regex_mode, true)?,
        None => (None, None),
    };
    let (replace_body, replace_loc) = cursor.read_body()?;
    let replace_spec = LineSpec::from_body(
        replace_prefix,
        replace_extra,
        replace_body,
        replace_star,
        false,
        replace_loc,
    );
    cursor.consume_newline();

    Ok(EditOp::Diff {
        header: Header {
            location,
            all,
            regex_mode: header.regex_mode,
        },
        match_spec,
        replace_spec,
    })
}
