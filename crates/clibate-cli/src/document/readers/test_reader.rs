//! `test: [name]` — opens a test block: per-file edit batches introduced by
//! `edit: <file>`, an optional `command:` override, and `success:`/
//! `failure:` expectation bodies. Expectation lines are lexed with the same
//! primitives the edit engine uses for quoting (SPEC_FULL §4.7).

use clibate_common::{Expectation, Location, ParseError, ParseErrorKind, StreamExpectation};
use clibate_edit::Cursor as EditCursor;

use super::{strip_keyword, unquote, SectionOutcome, SectionReader};
use crate::document::line_cursor::{rejoin_raw, DocLine, LineCursor};
use crate::document::{EditBatch, ParseState, TestBlock};

pub(crate) struct TestReader;

impl SectionReader for TestReader {
    fn try_read(&self, cursor: &mut LineCursor, state: &mut ParseState) -> Result<SectionOutcome, ParseError> {
        let Some(header) = cursor.peek() else {
            return Ok(SectionOutcome::NoMatch);
        };
        let Some(rest) = strip_keyword(&header.trimmed, "test") else {
            return Ok(SectionOutcome::NoMatch);
        };
        let name = if rest.is_empty() { None } else { Some(unquote(rest)) };
        cursor.advance();

        let body = cursor.take_indented_block(header.indent);
        let mut inner = LineCursor::from_lines(body);

        let mut command = None;
        let mut edits = Vec::new();
        let mut success = None;
        let mut failure = None;

        loop {
            inner.skip_blank_and_comment_lines();
            let Some(line) = inner.peek() else { break };

            if let Some(rest) = strip_keyword(&line.trimmed, "command") {
                command = Some(unquote(rest));
                inner.advance();
                continue;
            }
            if let Some(target) = strip_keyword(&line.trimmed, "edit") {
                let target_file = unquote(target);
                inner.advance();
                let edit_body = inner.take_indented_block(line.indent);
                edits.push(parse_edit_batch(target_file, &edit_body, &line.location)?);
                continue;
            }
            if strip_keyword(&line.trimmed, "success").is_some() {
                inner.advance();
                let expect_body = inner.take_indented_block(line.indent);
                success = Some(parse_expectations(&expect_body)?);
                continue;
            }
            if strip_keyword(&line.trimmed, "failure").is_some() {
                inner.advance();
                let expect_body = inner.take_indented_block(line.indent);
                failure = Some(parse_expectations(&expect_body)?);
                continue;
            }
            return Err(ParseError::new(
                ParseErrorKind::Structure,
                format!("Unrecognized line inside 'test:' block: '{}'", line.trimmed),
                line.location,
            ));
        }

        state.spec.tests.push(TestBlock {
            name,
            location: header.location,
            command,
            edits,
            success,
            failure,
        });
        Ok(SectionOutcome::Matched)
    }
}

fn parse_edit_batch(target_file: String, body: &[DocLine], location: &Location) -> Result<EditBatch, ParseError> {
    if body.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            format!("'edit: {target_file}' has no edit instructions."),
            location.clone(),
        ));
    }
    let text = rejoin_raw(body);
    let base = body[0].location.clone();
    let ops = clibate_edit::parse_edits(&text, &base)?;
    Ok(EditBatch {
        target_file,
        ops,
        location: location.clone(),
    })
}

/// One assertion per non-blank line: an optional leading `stdout`/`stderr`
/// stream selector (defaulting to `stdout` when elided, since that's the
/// stream most assertions care about), then `contains "..."`,
/// `not_contains "..."`, `equals "..."`, `starts_with "..."`,
/// `ends_with "..."`, `matches /re/`, `not_matches /re/`, or `exit_code N`
/// (which ignores any stream selector, since it's not stream-scoped).
fn parse_expectations(body: &[DocLine]) -> Result<Expectation, ParseError> {
    let mut expectations = Expectation::default();
    for line in body {
        if line.trimmed.is_empty() {
            continue;
        }
        let base = Location::new(line.location.file.clone(), line.location.line, 1)
            .with_abs_path(line.location.abs_path.clone());
        let mut cursor = EditCursor::new(&line.raw, &base);
        let Some((mut keyword, _)) = cursor.read_raw_word() else {
            return Err(ParseError::new(
                ParseErrorKind::Structure,
                format!("Expected an expectation keyword, found '{}'.", line.trimmed),
                line.location.clone(),
            ));
        };
        let mut stream = Stream::Stdout;
        if keyword == "stdout" || keyword == "stderr" {
            stream = if keyword == "stderr" { Stream::Stderr } else { Stream::Stdout };
            let Some((next, _)) = cursor.read_raw_word() else {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    format!("Missing assertion keyword after '{keyword}'."),
                    line.location.clone(),
                ));
            };
            keyword = next;
        }
        match keyword.as_str() {
            "exit_code" => {
                let Some((word, word_loc)) = cursor.read_raw_word() else {
                    return Err(ParseError::new(
                        ParseErrorKind::Structure,
                        "Missing expected data: integer exit code.",
                        line.location.clone(),
                    ));
                };
                let code: i32 = word.parse().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::Semantic,
                        format!("Expected an integer exit code, found '{word}'."),
                        word_loc,
                    )
                })?;
                expectations.exit_code = Some(code);
            }
            "contains" => push(&mut expectations, stream, read_string_expectation(&mut cursor, ExKind::Contains)?),
            "not_contains" => push(&mut expectations, stream, read_string_expectation(&mut cursor, ExKind::NotContains)?),
            "equals" => push(&mut expectations, stream, read_string_expectation(&mut cursor, ExKind::Equals)?),
            "starts_with" => push(&mut expectations, stream, read_string_expectation(&mut cursor, ExKind::StartsWith)?),
            "ends_with" => push(&mut expectations, stream, read_string_expectation(&mut cursor, ExKind::EndsWith)?),
            "matches" => push(&mut expectations, stream, read_regex_expectation(&mut cursor, ExKind::Matches)?),
            "not_matches" => push(&mut expectations, stream, read_regex_expectation(&mut cursor, ExKind::NotMatches)?),
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    format!("Unrecognized expectation keyword '{other}'."),
                    line.location.clone(),
                ));
            }
        }
    }
    Ok(expectations)
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn push(expectations: &mut Expectation, stream: Stream, assertion: StreamExpectation) {
    match stream {
        Stream::Stdout => expectations.stdout.push(assertion),
        Stream::Stderr => expectations.stderr.push(assertion),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::line_cursor::LineCursor;

    fn doc_lines(text: &str) -> Vec<DocLine> {
        let mut cursor = LineCursor::from_text(text, "f", "f");
        let mut out = Vec::new();
        while let Some(line) = cursor.advance() {
            out.push(line);
        }
        out
    }

    #[test]
    fn bare_assertion_defaults_to_stdout() {
        let body = doc_lines("contains \"ok\"\n");
        let expect = parse_expectations(&body).unwrap();
        assert_eq!(expect.stdout.len(), 1);
        assert!(expect.stderr.is_empty());
    }

    #[test]
    fn stderr_prefix_targets_stderr_stream() {
        let body = doc_lines("stderr contains \"boom\"\nstdout contains \"ok\"\n");
        let expect = parse_expectations(&body).unwrap();
        assert_eq!(expect.stderr.len(), 1);
        assert_eq!(expect.stderr[0].contains.as_deref(), Some("boom"));
        assert_eq!(expect.stdout.len(), 1);
    }

    #[test]
    fn exit_code_and_regex_assertions_parse() {
        let body = doc_lines("exit_code 2\nmatches /\\d+ errors?/\n");
        let expect = parse_expectations(&body).unwrap();
        assert_eq!(expect.exit_code, Some(2));
        assert_eq!(expect.stdout[0].matches.as_deref(), Some(r"\d+ errors?"));
    }

    #[test]
    fn unrecognized_keyword_is_a_parse_error() {
        let body = doc_lines("nonsense\n");
        assert!(parse_expectations(&body).is_err());
    }
}

enum ExKind {
    Contains,
    NotContains,
    Equals,
    StartsWith,
    EndsWith,
    Matches,
    NotMatches,
}

fn read_string_expectation(cursor: &mut EditCursor, kind: ExKind) -> Result<StreamExpectation, ParseError> {
    let (body, _) = cursor.read_body()?;
    let mut expect = StreamExpectation::default();
    let text = body.text().to_string();
    match kind {
        ExKind::Contains => expect.contains = Some(text),
        ExKind::NotContains => expect.not_contains = Some(text),
        ExKind::Equals => expect.equals = Some(text),
        ExKind::StartsWith => expect.starts_with = Some(text),
        ExKind::EndsWith => expect.ends_with = Some(text),
        ExKind::Matches | ExKind::NotMatches => unreachable!("regex kinds use read_regex_expectation"),
    }
    Ok(expect)
}

/// Read a `/regex/`-delimited pattern: the slash is not one of the edit
/// engine's own lexer primitives (regex mode there is a mode mark, not a
/// value delimiter), so expectation lines parse it directly.
fn read_regex_expectation(cursor: &mut EditCursor, kind: ExKind) -> Result<StreamExpectation, ParseError> {
    cursor.skip_inline_ws();
    let loc = cursor.location();
    let rest = cursor.read_rest_of_line_trimmed();
    let Some(pattern) = rest.strip_prefix('/').and_then(|r| r.strip_suffix('/')) else {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Expected a '/regex/'-delimited pattern.",
            loc,
        ));
    };
    regex::Regex::new(pattern).map_err(|e| {
        ParseError::new(
            ParseErrorKind::PatternCompile,
            format!("Could not compile regex pattern /{pattern}/: {e}"),
            loc.clone(),
        )
    })?;
    let mut expect = StreamExpectation::default();
    match kind {
        ExKind::Matches => expect.matches = Some(pattern.to_string()),
        ExKind::NotMatches => expect.not_matches = Some(pattern.to_string()),
        _ => unreachable!("string kinds use read_string_expectation"),
    }
    Ok(expect)
}
