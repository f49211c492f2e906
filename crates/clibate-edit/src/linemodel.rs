//! The line model matcher (spec §4.3): given a target file line and a
//! [`LineSpec`], decides match and computes the rewritten line.
//!
//! A matched line is viewed as `I` (indent) + `P` (prefix) + `A` (body) +
//! `T` (tail). The prefix takes precedence over the indent: when the
//! decoded prefix itself starts with whitespace, that whitespace is
//! credited to `P`, not `I` — so the search below tries the smallest
//! indent split first and keeps the first one whose prefix text lines up.

use clibate_common::{Location, ParseError, ParseErrorKind};

use crate::ops::{LineSpec, StarMode};
use crate::prefix::Notation;

/// The indent, prefix, and tail actually consumed by a successful match.
/// The body itself isn't carried here since callers already know it (it's
/// the match spec's own body, confirmed equal).
#[derive(Debug, Clone, Default)]
pub struct Matched {
    pub indent: String,
    pub prefix: String,
    pub tail: String,
}

fn leading_ws_len(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b' ' || b == b'\t').count()
}

fn match_body<'a>(remaining: &'a str, spec: &LineSpec) -> Option<&'a str> {
    if spec.quoted {
        if spec.strict_tail {
            (remaining == spec.body).then_some("")
        } else {
            remaining.strip_prefix(spec.body.as_str())
        }
    } else {
        let trimmed = remaining.trim_end();
        if trimmed == spec.body {
            Some(&remaining[trimmed.len()..])
        } else {
            None
        }
    }
}

/// Attempt to match `file_line` against `spec`. Returns `None` (not an
/// error) when there simply is no match at this line.
#[must_use]
pub fn match_line(file_line: &str, spec: &LineSpec) -> Option<Matched> {
    let total_ws = leading_ws_len(file_line);

    if spec.no_indent_no_prefix {
        if total_ws != 0 {
            return None;
        }
        let tail = match_body(file_line, spec)?;
        return Some(Matched {
            indent: String::new(),
            prefix: String::new(),
            tail: tail.to_string(),
        });
    }

    match &spec.prefix {
        None => {
            let k = if spec.star.is_some() {
                if total_ws != 0 {
                    return None;
                }
                0
            } else {
                total_ws
            };
            let remaining = &file_line[k..];
            let tail = match_body(remaining, spec)?;
            Some(Matched {
                indent: file_line[..k].to_string(),
                prefix: String::new(),
                tail: tail.to_string(),
            })
        }
        Some(Notation::Literal(p)) => {
            let max_k = if spec.star.is_some() { 0 } else { total_ws };
            (0..=max_k).find_map(|k| {
                let after_k = file_line.get(k..)?;
                let remaining = after_k.strip_prefix(p.as_str())?;
                let tail = match_body(remaining, spec)?;
                Some(Matched {
                    indent: file_line[..k].to_string(),
                    prefix: p.clone(),
                    tail: tail.to_string(),
                })
            })
        }
        Some(Notation::Regex(re)) => {
            let k = total_ws;
            let remaining_all = &file_line[k..];
            let m0 = re.find(remaining_all)?;
            if m0.start() != 0 {
                return None;
            }
            let prefix_text = m0.as_str().to_string();
            let remaining = &remaining_all[prefix_text.len()..];
            let tail = match_body(remaining, spec)?;
            Some(Matched {
                indent: file_line[..k].to_string(),
                prefix: prefix_text,
                tail: tail.to_string(),
            })
        }
    }
}

/// Render the output line for a replace/insert spec given the indent and
/// prefix a paired match produced. `match_has_prefix` tells a lone `*`
/// whether to drop `I` or `P`; both are dropped by `**`.
#[must_use]
pub fn render_replace(matched: &Matched, replace: &LineSpec, match_has_prefix: bool) -> String {
    let (drop_indent, drop_prefix) = match replace.star {
        StarMode::None => (false, false),
        StarMode::Star => {
            if match_has_prefix {
                (false, true)
            } else {
                (true, false)
            }
        }
        StarMode::DoubleStar => (true, true),
    };
    let indent = if drop_indent { "" } else { matched.indent.as_str() };
    let prefix = if drop_prefix { "" } else { matched.prefix.as_str() };
    let extra = replace.extra.as_deref().unwrap_or("");
    format!("{indent}{prefix}{extra}{}", replace.body)
}

/// Validate that a replace/insert line's star-mode is legal given whether
/// its paired match spec carries a prefix, and whether that match spec is
/// the "no indent, no prefix" (`()`) case.
///
/// # Errors
///
/// Returns the exact parse-error text for the two illegal combinations
/// named by the line model: a redundant `*` with neither indent nor prefix
/// present, and a meaningless `**` without both.
pub fn validate_star_legality(
    star: StarMode,
    has_prefix: bool,
    forced_empty_indent_and_prefix: bool,
    location: &Location,
) -> Result<(), ParseError> {
    match star {
        StarMode::None => Ok(()),
        StarMode::Star => {
            if forced_empty_indent_and_prefix && !has_prefix {
                Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    "Replace star mark '*' is redundant when neither indent nor prefix are present.",
                    location.clone(),
                ))
            } else {
                Ok(())
            }
        }
        StarMode::DoubleStar => {
            if has_prefix {
                Ok(())
            } else {
                Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    "Double replace star mark '**' is meaningless unless both indent and prefix were matched.",
                    location.clone(),
                ))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clibate_common::Location;

    fn raw_spec(body: &str) -> LineSpec {
        LineSpec {
            prefix: None,
            extra: None,
            body: body.to_string(),
            quoted: false,
            strict_tail: false,
            star: StarMode::None,
            no_indent_no_prefix: false,
            location: Location::new("f", 1, 1),
        }
    }

    #[test]
    fn raw_body_matches_trimmed_with_free_indent() {
        let spec = raw_spec("chain = chain \"-\" $1");
        let m = match_line("      chain = chain \"-\" $1", &spec).unwrap();
        assert_eq!(m.indent, "      ");
        assert_eq!(m.prefix, "");
    }

    #[test]
    fn prefix_consumes_whitespace_before_indent() {
        let mut spec = raw_spec("END {");
        spec.prefix = Some(Notation::Literal("        ".to_string()));
        let m = match_line("        END {", &spec).unwrap();
        assert_eq!(m.indent, "");
        assert_eq!(m.prefix, "        ");
    }

    #[test]
    fn star_forces_empty_indent() {
        let mut spec = raw_spec("a = b + c");
        spec.prefix = Some(Notation::Literal("# ".to_string()));
        spec.star = StarMode::Star;
        assert!(match_line("# a = b + c", &spec).is_some());
        assert!(match_line("\t# a = b + c", &spec).is_none());
    }

    #[test]
    fn quoted_strict_tail_rejects_trailing_text() {
        let mut spec = raw_spec("hello");
        spec.quoted = true;
        spec.strict_tail = true;
        assert!(match_line("hello", &spec).is_some());
        assert!(match_line("hello  ", &spec).is_none());
    }

    #[test]
    fn render_replace_keeps_indent_and_prefix_by_default() {
        let matched = Matched {
            indent: "  ".to_string(),
            prefix: "# ".to_string(),
            tail: String::new(),
        };
        let replace = raw_spec("new body");
        assert_eq!(render_replace(&matched, &replace, true), "  # new body");
    }

    #[test]
    fn render_replace_star_drops_prefix_when_present() {
        let matched = Matched {
            indent: "  ".to_string(),
            prefix: "# ".to_string(),
            tail: String::new(),
        };
        let mut replace = raw_spec("new body");
        replace.star = StarMode::Star;
        assert_eq!(render_replace(&matched, &replace, true), "  new body");
    }

    #[test]
    fn render_replace_double_star_drops_both() {
        let matched = Matched {
            indent: "  ".to_string(),
            prefix: "# ".to_string(),
            tail: String::new(),
        };
        let mut replace = raw_spec("new body");
        replace.star = StarMode::DoubleStar;
        assert_eq!(render_replace(&matched, &replace, true), "new body");
    }

    #[test]
    fn double_star_illegal_without_prefix() {
        let loc = Location::new("f", 1, 1);
        assert!(validate_star_legality(StarMode::DoubleStar, false, false, &loc).is_err());
        assert!(validate_star_legality(StarMode::DoubleStar, true, false, &loc).is_ok());
    }
}
