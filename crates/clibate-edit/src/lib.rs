//! The clibate edit engine: a small, line-structured DSL (DIFF, INSERT
//! BELOW/ABOVE, REMOVE, PREFIX, UNPREF, REPLACE) for patching text files
//! between black-box integration test runs.
//!
//! The engine is pure text→text and single-threaded: [`parse_edits`] turns
//! source text into an ordered list of [`EditOp`]s tagged with precise
//! [`clibate_common::Location`]s, and [`apply_edits`] executes them against
//! an owned line buffer. Neither function touches the filesystem; sandboxing
//! and file I/O are the host application's job (see the `clibate-cli` crate
//! for a narrow implementation of that collaborator).

pub mod apply;
pub mod cursor;
pub mod instr;
pub mod linemodel;
pub mod ops;
pub mod prefix;

pub use apply::apply_edits;
pub use cursor::{Body, Cursor};
pub use ops::{EditOp, Header, LineSpec, StarMode};

use clibate_common::{Location, ParseError};

/// Parse a batch of edit instructions from `source_text`, with `base_location`
/// as the starting coordinate (file identifier + line/col at which
/// `source_text` begins — e.g. just after an `edit: <file>` section header).
///
/// Returns the ops in textual order, ready for [`apply_edits`].
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; parsing never partially
/// succeeds; a bad instruction anywhere in `source_text` fails the whole
/// batch.
pub fn parse_edits(source_text: &str, base_location: &Location) -> Result<Vec<EditOp>, ParseError> {
    let mut cursor = Cursor::new(source_text, base_location);
    let mut ops = Vec::new();
    loop {
        cursor.skip_blank_and_comment_lines();
        if cursor.at_eof() {
            break;
        }
        ops.push(instr::parse_instruction(&mut cursor)?);
    }
    Ok(ops)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("spec", 1, 1)
    }

    #[test]
    fn parses_and_applies_diff_first_match_only() {
        let src = "DIFF 'chain = chain \"-\" $1'\n~ 'chain = chain \"+\" $1'\n";
        let ops = parse_edits(src, &loc()).unwrap();
        let buffer = vec![
            "      chain = chain \"-\" $1".to_string(),
            "  chain = chain \"-\" $1".to_string(),
        ];
        let out = apply_edits(&buffer, &ops).unwrap();
        assert_eq!(out[0], "      chain = chain \"+\" $1");
        assert_eq!(out[1], "  chain = chain \"-\" $1");
    }

    #[test]
    fn parses_prefix_instruction_with_exact_indent() {
        let src = "PREFIX (8, #) END {\n";
        let ops = parse_edits(src, &loc()).unwrap();
        let buffer = vec!["        END {".to_string()];
        let out = apply_edits(&buffer, &ops).unwrap();
        assert_eq!(out, vec!["        # END {".to_string()]);
    }

    #[test]
    fn parses_unpref_star_exact_match() {
        let src = "UNPREF* (#1) a = b + c\n";
        let ops = parse_edits(src, &loc()).unwrap();
        let buffer = vec!["# a = b + c".to_string()];
        let out = apply_edits(&buffer, &ops).unwrap();
        assert_eq!(out, vec!["a = b + c".to_string()]);
    }

    #[test]
    fn parses_insert_above_at_top_of_file() {
        let src = "INSERT ABOVE + X\n :a\n";
        let ops = parse_edits(src, &loc()).unwrap();
        let buffer = vec![":a".to_string(), " :b".to_string()];
        let out = apply_edits(&buffer, &ops).unwrap();
        assert_eq!(out, vec!["X".to_string(), ":a".to_string(), " :b".to_string()]);
    }

    #[test]
    fn parses_replace_all_multiline_with_backreference() {
        let src = "REPLACE ALL \\bth[a-z]+\n        / ' ([a-z]+)'\n        BY  DA \\1\\1\n";
        let ops = parse_edits(src, &loc()).unwrap();
        let buffer = vec![
            "Find interesting things".to_string(),
            "Like the thing in the doc".to_string(),
        ];
        let out = apply_edits(&buffer, &ops).unwrap();
        assert_eq!(
            out,
            vec![
                "Find interesting things".to_string(),
                "Like DA thingthing in DA docdoc".to_string(),
            ]
        );
    }

    #[test]
    fn replace_ambiguous_by_reports_location() {
        let src = "REPLACE thing BY song BY more\n";
        let err = parse_edits(src, &Location::new("edit_REPLACE", 23, 13)).unwrap_err();
        assert!(err.message.starts_with("Ambiguous raw REPLACE"));
        assert_eq!(err.location.to_string(), "edit_REPLACE:23:13");
    }

    #[test]
    fn diff_missing_tilde_reports_structure_error() {
        let src = "DIFF 'a'\n'b'\n";
        let err = parse_edits(src, &loc()).unwrap_err();
        assert!(err.message.contains("Missing introducing tilde"));
    }

    #[test]
    fn insert_below_requires_at_least_one_plus_line() {
        let src = "INSERT BELOW 'a'\n";
        let err = parse_edits(src, &loc()).unwrap_err();
        assert!(err.message.contains("Found no lines to INSERT BELOW"));
    }

    #[test]
    fn no_match_is_a_run_error_not_a_parse_error() {
        let src = "DIFF 'missing'\n~ 'replacement'\n";
        let ops = parse_edits(src, &loc()).unwrap();
        let buffer = vec!["nothing here".to_string()];
        let err = apply_edits(&buffer, &ops).unwrap_err();
        assert!(err.message.starts_with("Could not match line"));
    }
}
