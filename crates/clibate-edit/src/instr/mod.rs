//! Instruction parsers: one module per family (DIFF, INSERT, REMOVE,
//! PREFIX, UNPREF, REPLACE), dispatched by keyword from [`parse_instruction`].

mod diff;
mod insert;
mod prefix_instr;
mod remove;
mod replace;
mod unpref;

use clibate_common::{Location, ParseError, ParseErrorKind};

use crate::cursor::{Body, Cursor};
use crate::ops::{EditOp, StarMode};
use crate::prefix::{decode_extra, decode_prefix, Notation};

/// The keyword plus the modifiers glued directly onto it (`DIFF/`,
/// `UNPREF*`, `PREFIX/**`, …): an optional `/` regex-mode mark and an
/// optional `*`/`**` star.
pub(crate) struct KeywordToken {
    pub keyword: String,
    pub regex_mode: bool,
    pub star: StarMode,
    pub location: Location,
}

fn split_keyword_token(tok: &str, location: Location) -> KeywordToken {
    let upper_end = tok
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(tok.len());
    let keyword = tok[..upper_end].to_string();
    let rest = &tok[upper_end..];
    let regex_mode = rest.starts_with('/');
    let after_slash = if regex_mode { &rest[1..] } else { rest };
    let star = if after_slash.starts_with("**") {
        StarMode::DoubleStar
    } else if after_slash.starts_with('*') {
        StarMode::Star
    } else {
        StarMode::None
    };
    KeywordToken {
        keyword,
        regex_mode,
        star,
        location,
    }
}

/// Read the leading instruction keyword token (e.g. `DIFF`, `UNPREF*`,
/// `REPLACE`) from the current line.
///
/// # Errors
///
/// Returns a parse error if the line doesn't start with one.
pub(crate) fn read_keyword(cursor: &mut Cursor) -> Result<KeywordToken, ParseError> {
    let loc = cursor.location();
    let Some((tok, tok_loc)) = cursor.read_raw_word() else {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Expected an instruction keyword.",
            loc,
        ));
    };
    Ok(split_keyword_token(&tok, tok_loc))
}

/// Try to consume an exact following word (case-sensitive), without
/// disturbing the cursor if it isn't there.
pub(crate) fn try_consume_word(cursor: &mut Cursor, word: &str) -> bool {
    let mut probe = cursor.clone();
    if let Some((w, _)) = probe.read_raw_word() {
        if w == word {
            *cursor = probe;
            return true;
        }
    }
    false
}

/// Decode an optional tuple into (prefix, extra) given the instruction's
/// regex-mode flag. `arity` values are consumed positionally: 1 value is
/// `(prefix)` or `(extra)` depending on `first_is_extra`; 2 values are
/// always `(prefix, extra)`.
pub(crate) fn decode_tuple_values(
    values: &[(Body, Location)],
    regex_mode: bool,
    first_is_extra: bool,
) -> Result<(Option<Notation>, Option<String>), ParseError> {
    match values.len() {
        0 => Ok((None, None)),
        1 => {
            let (body, loc) = &values[0];
            if first_is_extra {
                Ok((None, Some(decode_extra(body))))
            } else {
                Ok((Some(decode_prefix(body, regex_mode, loc)?), None))
            }
        }
        2 => {
            let (pbody, ploc) = &values[0];
            let (ebody, _) = &values[1];
            Ok((
                Some(decode_prefix(pbody, regex_mode, ploc)?),
                Some(decode_extra(ebody)),
            ))
        }
        n => Err(ParseError::new(
            ParseErrorKind::Semantic,
            format!("Expected 1 or 2 values in tuple, found {n} instead."),
            values[0].1.clone(),
        )),
    }
}

/// Dispatch on the instruction keyword and parse the full (possibly
/// multi-line) instruction starting at the cursor's current position.
///
/// # Errors
///
/// Propagates whatever the specific instruction parser reports.
pub fn parse_instruction(cursor: &mut Cursor) -> Result<EditOp, ParseError> {
    let start = cursor.clone();
    let header = read_keyword(cursor)?;
    match header.keyword.as_str() {
        "DIFF" => diff::parse(cursor, header),
        "INSERT" => insert::parse(cursor, header),
        "REMOVE" => remove::parse(cursor, header),
        "PREFIX" => prefix_instr::parse(cursor, header),
        "UNPREF" => unpref::parse(cursor, header),
        "REPLACE" => replace::parse(cursor, header),
        other => Err(ParseError::new(
            ParseErrorKind::Structure,
            format!("Unrecognized instruction keyword '{other}'."),
            start.location(),
        )),
    }
}
