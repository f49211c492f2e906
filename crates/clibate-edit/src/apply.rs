//! The edit applicator: executes an ordered list of [`EditOp`]s against an
//! in-memory line buffer. Each op sees the buffer state left by the ones
//! before it; a batch is applied atomically — failure leaves the caller's
//! own snapshot untouched, since this module never mutates in place.

use clibate_common::RunError;

use crate::linemodel::{match_line, render_replace, Matched};
use crate::ops::{EditOp, Header, LineSpec};

fn no_match_err(spec: &LineSpec) -> RunError {
    RunError::no_match(&spec.body, spec.location.clone())
}

fn apply_diff(buffer: &[String], header: &Header, match_spec: &LineSpec, replace_spec: &LineSpec) -> Result<Vec<String>, RunError> {
    let mut out = Vec::with_capacity(buffer.len());
    let mut matched = 0usize;
    for line in buffer {
        if !header.all && matched >= 1 {
            out.push(line.clone());
            continue;
        }
        if let Some(m) = match_line(line, match_spec) {
            matched += 1;
            out.push(render_replace(&m, replace_spec, match_spec.has_prefix()));
        } else {
            out.push(line.clone());
        }
    }
    if matched == 0 {
        return Err(no_match_err(match_spec));
    }
    Ok(out)
}

fn apply_remove(buffer: &[String], header: &Header, match_spec: &LineSpec) -> Result<Vec<String>, RunError> {
    let mut out = Vec::with_capacity(buffer.len());
    let mut matched = 0usize;
    for line in buffer {
        let should_try = header.all || matched == 0;
        if should_try && match_line(line, match_spec).is_some() {
            matched += 1;
            continue;
        }
        out.push(line.clone());
    }
    if matched == 0 {
        return Err(no_match_err(match_spec));
    }
    Ok(out)
}

fn apply_prefix(buffer: &[String], header: &Header, match_spec: &LineSpec) -> Result<Vec<String>, RunError> {
    let mut out = Vec::with_capacity(buffer.len());
    let mut matched = 0usize;
    for line in buffer {
        let should_try = header.all || matched == 0;
        if should_try {
            if let Some(m) = match_line(line, match_spec) {
                matched += 1;
                let extra = match_spec.extra.as_deref().unwrap_or("");
                out.push(format!("{}{}{extra}{}{}", m.indent, m.prefix, match_spec.body, m.tail));
                continue;
            }
        }
        out.push(line.clone());
    }
    if matched == 0 {
        return Err(no_match_err(match_spec));
    }
    Ok(out)
}

fn apply_unpref(buffer: &[String], header: &Header, match_spec: &LineSpec) -> Result<Vec<String>, RunError> {
    let mut out = Vec::with_capacity(buffer.len());
    let mut matched = 0usize;
    for line in buffer {
        let should_try = header.all || matched == 0;
        if should_try {
            if let Some(m) = match_line(line, match_spec) {
                matched += 1;
                out.push(format!("{}{}{}", m.indent, match_spec.body, m.tail));
                continue;
            }
        }
        out.push(line.clone());
    }
    if matched == 0 {
        return Err(no_match_err(match_spec));
    }
    Ok(out)
}

/// Anti-loop: scan `buffer` against `match_spec` once, freezing the
/// (index, match) pairs an INSERT will act on before any line is inserted —
/// this is what keeps newly inserted lines from being eligible for the same
/// scan.
fn scan_matches(buffer: &[String], header: &Header, match_spec: &LineSpec) -> Vec<(usize, Matched)> {
    let mut found = Vec::new();
    for (i, line) in buffer.iter().enumerate() {
        if let Some(m) = match_line(line, match_spec) {
            found.push((i, m));
            if !header.all {
                break;
            }
        }
    }
    found
}

fn apply_insert_below(
    buffer: &[String],
    header: &Header,
    match_spec: &LineSpec,
    new_lines: &[LineSpec],
) -> Result<Vec<String>, RunError> {
    let matches = scan_matches(buffer, header, match_spec);
    if matches.is_empty() {
        return if header.all {
            Ok(buffer.to_vec())
        } else {
            Err(no_match_err(match_spec))
        };
    }
    let mut matches = matches.into_iter().peekable();
    let mut out = Vec::with_capacity(buffer.len() + new_lines.len());
    for (i, line) in buffer.iter().enumerate() {
        out.push(line.clone());
        while let Some((_, m)) = matches.next_if(|(idx, _)| *idx == i) {
            for spec in new_lines {
                out.push(render_replace(&m, spec, match_spec.has_prefix()));
            }
        }
    }
    Ok(out)
}

fn apply_insert_above(
    buffer: &[String],
    header: &Header,
    new_lines: &[LineSpec],
    match_spec: &LineSpec,
) -> Result<Vec<String>, RunError> {
    let matches = scan_matches(buffer, header, match_spec);
    if matches.is_empty() {
        return if header.all {
            Ok(buffer.to_vec())
        } else {
            Err(no_match_err(match_spec))
        };
    }
    let mut matches = matches.into_iter().peekable();
    let mut out = Vec::with_capacity(buffer.len() + new_lines.len());
    for (i, line) in buffer.iter().enumerate() {
        while let Some((_, m)) = matches.next_if(|(idx, _)| *idx == i) {
            for spec in new_lines {
                out.push(render_replace(&m, spec, match_spec.has_prefix()));
            }
        }
        out.push(line.clone());
    }
    Ok(out)
}

fn apply_replace(buffer: &[String], header: &Header, pattern: &regex::Regex, replacement: &str) -> Vec<String> {
    let joined = buffer.join("\n");
    let replaced = if header.all {
        pattern.replace_all(&joined, replacement).into_owned()
    } else {
        pattern.replace(&joined, replacement).into_owned()
    };
    replaced.split('\n').map(str::to_string).collect()
}

fn apply_one(buffer: Vec<String>, op: &EditOp) -> Result<Vec<String>, RunError> {
    match op {
        EditOp::Diff { header, match_spec, replace_spec } => apply_diff(&buffer, header, match_spec, replace_spec),
        EditOp::Remove { header, match_spec } => apply_remove(&buffer, header, match_spec),
        EditOp::Prefix { header, match_spec } => apply_prefix(&buffer, header, match_spec),
        EditOp::Unpref { header, match_spec } => apply_unpref(&buffer, header, match_spec),
        EditOp::InsertBelow { header, match_spec, new_lines } => {
            apply_insert_below(&buffer, header, match_spec, new_lines)
        }
        EditOp::InsertAbove { header, new_lines, match_spec } => {
            apply_insert_above(&buffer, header, new_lines, match_spec)
        }
        EditOp::Replace { header, pattern, replacement } => Ok(apply_replace(&buffer, header, pattern, replacement)),
    }
}

/// Apply an ordered list of edit operations to `buffer`, in order, each
/// seeing the result of the ones before it.
///
/// # Errors
///
/// Returns the first [`RunError`] any operation reports; the caller's own
/// buffer is untouched since this function only ever works on owned clones.
pub fn apply_edits(buffer: &[String], ops: &[EditOp]) -> Result<Vec<String>, RunError> {
    let mut current = buffer.to_vec();
    for op in ops {
        current = apply_one(current, op)?;
    }
    Ok(current)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ops::StarMode;
    use clibate_common::Location;

    fn quoted_spec(body: &str, star: StarMode) -> LineSpec {
        LineSpec {
            prefix: None,
            extra: None,
            body: body.to_string(),
            quoted: true,
            strict_tail: false,
            star,
            no_indent_no_prefix: false,
            location: Location::new("f", 1, 1),
        }
    }

    fn header(all: bool) -> Header {
        Header {
            location: Location::new("f", 1, 1),
            all,
            regex_mode: false,
        }
    }

    #[test]
    fn diff_replaces_first_match_only() {
        let buffer = vec![
            "      chain = chain \"-\" $1".to_string(),
            "  chain = chain \"-\" $1".to_string(),
        ];
        let match_spec = quoted_spec("chain = chain \"-\" $1", StarMode::None);
        let replace_spec = quoted_spec("chain = chain \"+\" $1", StarMode::None);
        let out = apply_diff(&buffer, &header(false), &match_spec, &replace_spec).unwrap();
        assert_eq!(out[0], "      chain = chain \"+\" $1");
        assert_eq!(out[1], "  chain = chain \"-\" $1");
    }

    #[test]
    fn diff_zero_matches_is_an_error() {
        let buffer = vec!["nothing here".to_string()];
        let match_spec = quoted_spec("missing", StarMode::None);
        let replace_spec = quoted_spec("replacement", StarMode::None);
        assert!(apply_diff(&buffer, &header(false), &match_spec, &replace_spec).is_err());
    }

    #[test]
    fn insert_above_at_top_of_file() {
        let buffer = vec![":a".to_string(), " :b".to_string()];
        let match_spec = quoted_spec(":a", StarMode::None);
        let new_line = quoted_spec("X", StarMode::None);
        let out = apply_insert_above(&buffer, &header(false), &[new_line], &match_spec).unwrap();
        assert_eq!(out, vec!["X".to_string(), ":a".to_string(), " :b".to_string()]);
    }

    #[test]
    fn insert_below_all_does_not_rescan_new_lines() {
        let buffer = vec!["M".to_string(), "M".to_string()];
        let match_spec = quoted_spec("M", StarMode::None);
        let new_line = quoted_spec("M", StarMode::None);
        let out = apply_insert_below(&buffer, &header(true), &match_spec, &[new_line]).unwrap();
        assert_eq!(out, vec!["M".to_string(), "M".to_string(), "M".to_string(), "M".to_string()]);
    }

    #[test]
    fn insert_below_all_with_zero_matches_is_noop() {
        let buffer = vec!["nope".to_string()];
        let match_spec = quoted_spec("M", StarMode::None);
        let new_line = quoted_spec("X", StarMode::None);
        let out = apply_insert_below(&buffer, &header(true), &match_spec, &[new_line]).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn remove_all_drops_every_match() {
        let buffer = vec!["keep".to_string(), "drop".to_string(), "drop".to_string()];
        let match_spec = quoted_spec("drop", StarMode::None);
        let out = apply_remove(&buffer, &header(true), &match_spec).unwrap();
        assert_eq!(out, vec!["keep".to_string()]);
    }

    #[test]
    fn prefix_inserts_extra_after_matched_indent() {
        let buffer = vec!["        END {".to_string()];
        let mut match_spec = quoted_spec("END {", StarMode::None);
        match_spec.prefix = Some(crate::prefix::Notation::Literal("        ".to_string()));
        match_spec.extra = Some("# ".to_string());
        let out = apply_prefix(&buffer, &header(false), &match_spec).unwrap();
        assert_eq!(out, vec!["        # END {".to_string()]);
    }

    #[test]
    fn unpref_star_strips_prefix_exact_indent_only() {
        let mut match_spec = quoted_spec("a = b + c", StarMode::Star);
        match_spec.prefix = Some(crate::prefix::Notation::Literal("# ".to_string()));
        let hit = vec!["# a = b + c".to_string()];
        let out = apply_unpref(&hit, &header(false), &match_spec).unwrap();
        assert_eq!(out, vec!["a = b + c".to_string()]);

        let miss = vec!["\t# a = b + c".to_string()];
        assert!(apply_unpref(&miss, &header(false), &match_spec).is_err());
    }

    #[test]
    fn replace_all_applies_regex_substitution_across_buffer() {
        let buffer = vec![
            "Find interesting things".to_string(),
            "Like the thing in the doc".to_string(),
        ];
        let pattern = regex::Regex::new(r"\bth[a-z]+ ([a-z]+)").unwrap();
        let out = apply_replace(&buffer, &header(true), &pattern, "DA ${1}${1}");
        assert_eq!(
            out,
            vec![
                "Find interesting things".to_string(),
                "Like DA thingthing in DA docdoc".to_string(),
            ]
        );
    }
}
