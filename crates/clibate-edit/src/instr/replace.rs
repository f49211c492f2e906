//! REPLACE: free-form `REPLACE [ALL] <pattern> BY <replacement>`, both
//! sides possibly raw or quoted, either side possibly split across several
//! physical lines via leading `/` continuations, with the transition from
//! pattern to replacement introduced by a bare `BY` keyword.

use clibate_common::{Location, ParseError, ParseErrorKind};
use regex::Regex;

use crate::cursor::Cursor;
use crate::ops::{EditOp, Header};
use crate::prefix::convert_backreferences;

use super::{try_consume_word, KeywordToken};

fn missing_by_error(location: Location) -> ParseError {
    ParseError::new(
        ParseErrorKind::Structure,
        "Missing 'BY' keyword or '/' line continuation symbol for REPLACE instruction.",
        location,
    )
}

/// Byte offsets of `word` occurring as a whole word (ASCII word-boundary)
/// inside `text`.
fn word_positions(text: &str, word: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let wlen = word.len();
    let is_word_byte = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut out = Vec::new();
    let mut i = 0;
    while i + wlen <= bytes.len() {
        if &text[i..i + wlen] == word {
            let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
            let after_ok = i + wlen == bytes.len() || !is_word_byte(bytes[i + wlen]);
            if before_ok && after_ok {
                out.push(i);
            }
        }
        i += 1;
    }
    out
}

/// Read one quoted-or-raw segment on the current line. For raw segments on
/// the pattern side, also hunts for a `BY` word boundary so a single-line
/// `REPLACE pattern BY replacement` can be split without a separate `BY`
/// continuation line.
enum Segment {
    /// Plain text with no embedded `BY` found (quoted, or raw with none).
    Plain(String),
    /// A raw segment whose text splits into (`before`, `after`) around
    /// exactly one `BY` occurrence.
    SplitOnBy(String, String),
    /// A raw segment containing more than one `BY` occurrence.
    Ambiguous(Location),
}

fn read_segment(cursor: &mut Cursor, scan_for_by: bool) -> Result<Segment, ParseError> {
    cursor.skip_inline_ws();
    if let Some((value, _raw, _loc)) = cursor.read_quoted()? {
        cursor.skip_comment();
        return Ok(Segment::Plain(value));
    }
    let loc = cursor.location();
    let raw = cursor.read_rest_of_line_trimmed();
    if !scan_for_by {
        return Ok(Segment::Plain(raw));
    }
    let positions = word_positions(&raw, "BY");
    match positions.len() {
        0 => Ok(Segment::Plain(raw)),
        1 => {
            let pos = positions[0];
            let before = raw[..pos].trim_end().to_string();
            let after = raw[pos + 2..].trim_start().to_string();
            Ok(Segment::SplitOnBy(before, after))
        }
        _ => Ok(Segment::Ambiguous(loc)),
    }
}

pub(super) fn parse(cursor: &mut Cursor, header: KeywordToken) -> Result<EditOp, ParseError> {
    let location = header.location.clone();
    let all = try_consume_word(cursor, "ALL");

    let mut pattern = String::new();
    let mut replacement: Option<String> = None;

    loop {
        match read_segment(cursor, true)? {
            Segment::Ambiguous(loc) => {
                return Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    "Ambiguous raw REPLACE line with more than 1 occurrence of the 'BY' keyword. Consider quoting match and/or replace pattern(s).",
                    loc,
                ));
            }
            Segment::SplitOnBy(before, after) => {
                pattern.push_str(&before);
                replacement = Some(after);
                break;
            }
            Segment::Plain(text) => {
                pattern.push_str(&text);
            }
        }

        cursor.consume_newline();
        cursor.skip_inline_ws();
        if cursor.consume_if_starts_with("/") {
            continue;
        }
        if try_consume_word(cursor, "BY") {
            match read_segment(cursor, false)? {
                Segment::Plain(text) => replacement = Some(text),
                _ => unreachable!("scan_for_by is false"),
            }
            break;
        }
        return Err(missing_by_error(cursor.location()));
    }

    let mut replacement = replacement.ok_or_else(|| missing_by_error(cursor.location()))?;
    cursor.consume_newline();

    loop {
        let mut probe = cursor.clone();
        probe.skip_inline_ws();
        if probe.consume_if_starts_with("/") {
            *cursor = probe;
            match read_segment(cursor, false)? {
                Segment::Plain(text) => replacement.push_str(&text),
                _ => unreachable!("scan_for_by is false"),
            }
            cursor.consume_newline();
        } else {
            break;
        }
    }

    if pattern.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Missing match pattern before 'BY' keyword.",
            location.clone(),
        ));
    }
    if replacement.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Missing expected data: 'replace pattern'.",
            location.clone(),
        ));
    }

    let compiled = Regex::new(&pattern).map_err(|e| {
        ParseError::new(
            ParseErrorKind::PatternCompile,
            format!("Could not compile regex pattern /{pattern}/: {e}"),
            location.clone(),
        )
    })?;
    let replacement = convert_backreferences(&replacement);

    Ok(EditOp::Replace {
        header: Header {
            location,
            all,
            regex_mode: true,
        },
        pattern: compiled,
        replacement,
    })
}
