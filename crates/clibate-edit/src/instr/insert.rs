//! INSERT BELOW / INSERT ABOVE: a match line plus one or more `+`-prefixed
//! new lines. BELOW is the default direction when `BELOW`/`ABOVE` is
//! elided. The first `+` line may share the keyword's own physical line
//! (`INSERT ABOVE + X`); subsequent ones each get their own line.

use clibate_common::{ParseError, ParseErrorKind};

use crate::cursor::Cursor;
use crate::linemodel::validate_star_legality;
use crate::ops::{EditOp, Header, LineSpec, StarMode};

use super::{decode_tuple_values, try_consume_word, KeywordToken};

enum Direction {
    Below,
    Above,
}

pub(super) fn parse(cursor: &mut Cursor, header: KeywordToken) -> Result<EditOp, ParseError> {
    let location = header.location.clone();
    let direction = if try_consume_word(cursor, "BELOW") {
        Direction::Below
    } else if try_consume_word(cursor, "ABOVE") {
        Direction::Above
    } else {
        Direction::Below
    };
    let all = try_consume_word(cursor, "ALL");

    match direction {
        Direction::Below => {
            let match_spec = parse_match_line(cursor, header.regex_mode, header.star)?;
            cursor.consume_newline();
            let mut new_lines = Vec::new();
            while let Some(spec) = try_read_plus_line(cursor, header.regex_mode)? {
                validate_star_legality(
                    spec.star,
                    match_spec.has_prefix(),
                    match_spec.no_indent_no_prefix,
                    &spec.location,
                )?;
                new_lines.push(spec);
                cursor.consume_newline();
            }
            if new_lines.is_empty() {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    "Found no lines to INSERT BELOW the match line.",
                    cursor.location(),
                ));
            }
            Ok(EditOp::InsertBelow {
                header: Header {
                    location,
                    all,
                    regex_mode: header.regex_mode,
                },
                match_spec,
                new_lines,
            })
        }
        Direction::Above => {
            let mut new_lines = Vec::new();
            if let Some(spec) = try_read_plus_line(cursor, header.regex_mode)? {
                new_lines.push(spec);
                cursor.consume_newline();
            }
            loop {
                match try_read_plus_line(cursor, header.regex_mode)? {
                    Some(spec) => {
                        new_lines.push(spec);
                        cursor.consume_newline();
                    }
                    None => break,
                }
            }
            if new_lines.is_empty() {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    "Missing '+' symbol to introduce lines to INSERT ABOVE the match line.",
                    cursor.location(),
                ));
            }
            let match_spec = parse_match_line(cursor, header.regex_mode, header.star)?;
            for spec in &new_lines {
                validate_star_legality(
                    spec.star,
                    match_spec.has_prefix(),
                    match_spec.no_indent_no_prefix,
                    &spec.location,
                )?;
            }
            cursor.consume_newline();
            Ok(EditOp::InsertAbove {
                header: Header {
                    location,
                    all,
                    regex_mode: header.regex_mode,
                },
                new_lines,
                match_spec,
            })
        }
    }
}

fn parse_match_line(
    cursor: &mut Cursor,
    regex_mode: bool,
    star: StarMode,
) -> Result<LineSpec, ParseError> {
    let tuple = cursor.read_tuple()?;
    let (prefix, extra) = match tuple {
        Some((values, _)) => decode_tuple_values(&values, regex_mode, false)?,
        None => (None, None),
    };
    let (body, loc) = cursor.read_body()?;
    Ok(LineSpec::from_body(prefix, extra, body, star, false, loc))
}

/// Attempt to read a `+`-prefixed new-line spec starting at the cursor's
/// current position (which may be mid-line, right after the keyword).
/// Returns `None` without consuming anything but insignificant leading
/// whitespace if the next significant character isn't `+`.
fn try_read_plus_line(cursor: &mut Cursor, regex_mode: bool) -> Result<Option<LineSpec>, ParseError> {
    cursor.skip_inline_ws();
    if cursor.peek_significant() != Some('+') {
        return Ok(None);
    }
    cursor.consume_if_starts_with("+");
    let star = if cursor.consume_if_starts_with("**") {
        StarMode::DoubleStar
    } else if cursor.consume_if_starts_with("*") {
        StarMode::Star
    } else {
        StarMode::None
    };
    let tuple = cursor.read_tuple()?;
    let (prefix, extra) = match tuple {
        Some((values, _)) => decode_tuple_values(&values, regex_mode, true)?,
        None => (None, None),
    };
    let (body, loc) = cursor.read_body()?;
    Ok(Some(LineSpec::from_body(prefix, extra, body, star, false, loc)))
}
