//! Prefix notation decoder: expands the condensed mini-language used for
//! prefix/extra tuple values (`4#`, `2t#t`, `s`, …) into concrete text, or
//! compiles it as a regex pattern when the enclosing instruction carries the
//! `/` mode mark.

use clibate_common::{Location, ParseError, ParseErrorKind};
use regex::Regex;

use crate::cursor::Body;

/// A decoded prefix/extra notation: either literal text to match or emit
/// verbatim, or — in regex mode — a compiled pattern paired with its
/// (still-templated) substitution counterpart.
#[derive(Debug, Clone)]
pub enum Notation {
    Literal(String),
    Regex(Regex),
}

impl Notation {
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            Self::Regex(_) => None,
        }
    }
}

/// Expand the condensed mini-language: a leading/embedded digit run `N`
/// repeats the next unit `N` times (`t` => tab, `s` => space, anything else
/// => itself, literally); a trailing digit run with nothing following it
/// repeats a space (the natural "space after prefix" default). Bare `t`/`s`
/// not preceded by digits stand for a single tab/space. Every other
/// character passes through unchanged.
#[must_use]
pub fn expand_condensed(notation: &str) -> String {
    let chars: Vec<char> = notation.chars().collect();
    let mut out = String::with_capacity(notation.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_ascii_digit() {
            let mut j = i;
            let mut n = 0usize;
            while j < chars.len() && chars[j].is_ascii_digit() {
                n = n * 10 + chars[j].to_digit(10).unwrap_or(0) as usize;
                j += 1;
            }
            if j < chars.len() {
                let unit = match chars[j] {
                    't' => '\t',
                    's' => ' ',
                    other => other,
                };
                for _ in 0..n {
                    out.push(unit);
                }
                i = j + 1;
            } else {
                for _ in 0..n {
                    out.push(' ');
                }
                i = j;
            }
        } else if ch == 't' {
            out.push('\t');
            i += 1;
        } else if ch == 's' {
            out.push(' ');
            i += 1;
        } else {
            out.push(ch);
            i += 1;
        }
    }
    out
}

/// Decode a raw (unquoted) prefix/extra notation into literal text,
/// appending the implicit trailing space unless the decoded text already
/// ends in whitespace. This is what makes a bare `#` decode as `# ` the same
/// way `#1` does (spec round-trip invariant).
#[must_use]
pub fn decode_raw_notation(notation: &str) -> String {
    let expanded = expand_condensed(notation);
    if expanded.ends_with(' ') || expanded.ends_with('\t') {
        expanded
    } else {
        expanded + " "
    }
}

/// Decode a lexed body into match-side prefix notation: a quoted body is
/// literal with no expansion; a raw body is condensed-decoded; regex mode
/// compiles the (raw or quoted) text as a pattern.
///
/// # Errors
///
/// Returns a [`ParseError`] if `regex_mode` is set and the pattern fails to
/// compile.
pub fn decode_prefix(body: &Body, regex_mode: bool, location: &Location) -> Result<Notation, ParseError> {
    if regex_mode {
        let pattern = body.text();
        return Regex::new(pattern).map(Notation::Regex).map_err(|e| {
            ParseError::new(
                ParseErrorKind::PatternCompile,
                format!("Could not compile regex pattern /{pattern}/: {e}"),
                location.clone(),
            )
        });
    }
    match body {
        Body::Quoted { value, .. } => Ok(Notation::Literal(value.clone())),
        Body::Raw(raw) => Ok(Notation::Literal(decode_raw_notation(raw))),
    }
}

/// Decode a raw or quoted notation used as an "extra" (inserted text, not a
/// match target) — same rules as [`decode_prefix`] but never compiled as a
/// regex; the string form is the caller's substitution template.
#[must_use]
pub fn decode_extra(body: &Body) -> String {
    match body {
        Body::Quoted { value, .. } => value.clone(),
        Body::Raw(raw) => decode_raw_notation(raw),
    }
}

/// Convert a `\1`..`\9` backreference template (the DSL's own notation) into
/// the `${1}`..`${9}` form the `regex` crate's replacement expects. A
/// doubled backslash is treated as an escaped literal backslash.
#[must_use]
pub fn convert_backreferences(template: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            let next = chars[i + 1];
            if next.is_ascii_digit() {
                out.push_str("${");
                out.push(next);
                out.push('}');
                i += 2;
                continue;
            } else if next == '\\' {
                out.push('\\');
                i += 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn condensed_digit_then_unit() {
        assert_eq!(expand_condensed("4s#1"), "    # ");
    }

    #[test]
    fn condensed_tab_unit_and_bare_tab() {
        assert_eq!(expand_condensed("2t#t"), "\t\t#\t");
    }

    #[test]
    fn condensed_trailing_digit_implies_space() {
        assert_eq!(expand_condensed("#1"), "# ");
    }

    #[test]
    fn decode_raw_notation_appends_implicit_space() {
        assert_eq!(decode_raw_notation("#"), "# ");
    }

    #[test]
    fn decode_raw_notation_pure_digit_repeats_space() {
        assert_eq!(decode_raw_notation("8"), "        ");
    }

    #[test]
    fn decode_raw_notation_no_duplicate_space_when_already_whitespace() {
        assert_eq!(decode_raw_notation("#1"), "# ");
    }

    #[test]
    fn quoted_body_is_literal_no_expansion() {
        let body = Body::Quoted {
            value: "4s#1".to_string(),
            star: false,
        };
        let loc = Location::new("f", 1, 1);
        let decoded = decode_prefix(&body, false, &loc).unwrap();
        assert_eq!(decoded.as_literal(), Some("4s#1"));
    }

    #[test]
    fn regex_mode_compiles_pattern() {
        let body = Body::Raw(r"\bth[a-z]+".to_string());
        let loc = Location::new("f", 1, 1);
        let decoded = decode_prefix(&body, true, &loc).unwrap();
        assert!(matches!(decoded, Notation::Regex(_)));
    }

    #[test]
    fn regex_mode_reports_compile_error() {
        let body = Body::Raw("(unclosed".to_string());
        let loc = Location::new("f", 1, 1);
        let err = decode_prefix(&body, true, &loc).unwrap_err();
        assert!(err.message.starts_with("Could not compile regex pattern"));
    }

    #[test]
    fn backreferences_convert_to_dollar_form() {
        assert_eq!(convert_backreferences(r"DA \1\1"), "DA ${1}${1}");
    }
}
