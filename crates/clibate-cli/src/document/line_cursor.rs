//! A line-based cursor over one spec document's source text. Top-level
//! sectioning is indentation-driven rather than character-level like the
//! edit engine's own [`clibate_edit::Cursor`]: a header line at some indent
//! owns every following line indented further than it (blank lines
//! included), until a line at or below its own indent appears. The same
//! cursor type walks both the whole document and the indented sub-blocks a
//! section reader carves out of it (e.g. a `test:` block's own
//! `edit:`/`success:`/`failure:` sections), by owning its lines instead of
//! borrowing a byte range.

use clibate_common::Location;

/// One physical line with its indent width (leading space/tab count — spec
/// documents are expected to use consistent indentation, same as the base
/// files they describe), its trimmed content, and the untrimmed source line
/// (needed by callers that preserve exact internal spacing, e.g. `file:`
/// body content once dedented).
#[derive(Debug, Clone)]
pub struct DocLine {
    pub indent: usize,
    pub trimmed: String,
    pub raw: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct LineCursor {
    lines: Vec<DocLine>,
    idx: usize,
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_blank_or_comment(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with('#')
}

impl LineCursor {
    #[must_use]
    pub fn from_text(text: &str, file: impl Into<String>, abs_path: impl Into<String>) -> Self {
        let file = file.into();
        let abs_path = abs_path.into();
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, raw)| DocLine {
                indent: indent_of(raw),
                trimmed: raw.trim().to_string(),
                raw: raw.to_string(),
                location: Location {
                    file: file.clone(),
                    abs_path: abs_path.clone(),
                    line: i + 1,
                    col: 1,
                    include_chain: Vec::new(),
                },
            })
            .collect();
        Self { lines, idx: 0 }
    }

    /// Build a cursor over an already-carved-out block of lines (e.g. the
    /// body [`take_indented_block`] returned for a `test:` section),
    /// preserving their original locations.
    #[must_use]
    pub fn from_lines(lines: Vec<DocLine>) -> Self {
        Self { lines, idx: 0 }
    }

    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.idx >= self.lines.len()
    }

    /// Skip blank and `#`-comment-only lines.
    pub fn skip_blank_and_comment_lines(&mut self) {
        while !self.at_eof() && is_blank_or_comment(&self.lines[self.idx].trimmed) {
            self.idx += 1;
        }
    }

    /// The current line, without consuming it. `None` at EOF.
    #[must_use]
    pub fn peek(&self) -> Option<DocLine> {
        self.lines.get(self.idx).cloned()
    }

    /// Consume and return the current line.
    pub fn advance(&mut self) -> Option<DocLine> {
        let line = self.peek()?;
        self.idx += 1;
        Some(line)
    }

    /// Consume every following line that is blank/comment-only or indented
    /// strictly more than `header_indent`; stop (without consuming) at the
    /// first line indented at or below `header_indent`, or at EOF.
    ///
    /// Blank lines inside the block are kept (with empty `trimmed`/`raw`
    /// text) so callers that care about exact file content can preserve
    /// them; callers that don't (expectation/edit bodies, which skip blanks
    /// themselves) simply ignore empty entries.
    pub fn take_indented_block(&mut self, header_indent: usize) -> Vec<DocLine> {
        let mut out = Vec::new();
        while let Some(line) = self.lines.get(self.idx) {
            if is_blank_or_comment(&line.trimmed) {
                out.push(DocLine {
                    indent: line.indent,
                    trimmed: String::new(),
                    raw: String::new(),
                    location: line.location.clone(),
                });
                self.idx += 1;
                continue;
            }
            if line.indent <= header_indent {
                break;
            }
            out.push(line.clone());
            self.idx += 1;
        }
        // Trailing blank lines belong to whatever follows, not this block.
        while out.last().is_some_and(|l| l.trimmed.is_empty()) {
            out.pop();
        }
        out
    }
}

/// Reassemble a block of raw source lines into verbatim file content,
/// stripping the block's common leading indentation (the minimum indent
/// among its non-blank lines).
#[must_use]
pub fn dedent_block(lines: &[&str]) -> Vec<String> {
    let min_indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            if l.len() >= min_indent {
                l[min_indent..].to_string()
            } else {
                String::new()
            }
        })
        .collect()
}

/// Join a block's raw lines back into a single text blob, suitable as input
/// to [`clibate_edit::parse_edits`]. The block's own first line's location
/// is the caller's responsibility to pass in separately as the base
/// location, since `parse_edits` tracks line/col itself from there.
#[must_use]
pub fn rejoin_raw(lines: &[DocLine]) -> String {
    lines.iter().map(|l| l.raw.as_str()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn take_indented_block_stops_at_dedent() {
        let text = "test: first\n    edit: a.txt\n        DIFF 'x'\ncommand: run\n";
        let mut c = LineCursor::from_text(text, "f", "f");
        let header = c.advance().unwrap();
        assert_eq!(header.trimmed, "test: first");
        let block = c.take_indented_block(header.indent);
        assert_eq!(block.len(), 2);
        assert_eq!(block[0].trimmed, "edit: a.txt");
        let next = c.peek().unwrap();
        assert_eq!(next.trimmed, "command: run");
    }

    #[test]
    fn take_indented_block_keeps_blank_lines_inside() {
        let text = "file: a.txt\n    line one\n\n    line two\ncommand: run\n";
        let mut c = LineCursor::from_text(text, "f", "f");
        let header = c.advance().unwrap();
        let block = c.take_indented_block(header.indent);
        assert_eq!(block.len(), 3);
        assert!(block[1].trimmed.is_empty());
    }

    #[test]
    fn dedent_block_strips_common_indent() {
        let lines = vec!["    a", "        b", "    c"];
        let out = dedent_block(&lines);
        assert_eq!(out, vec!["a".to_string(), "    b".to_string(), "c".to_string()]);
    }

    #[test]
    fn nested_block_cursor_preserves_locations() {
        let text = "test: first\n    edit: a.txt\n        DIFF 'x'\n        ~ 'y'\n";
        let mut c = LineCursor::from_text(text, "f", "f");
        let header = c.advance().unwrap();
        let body = c.take_indented_block(header.indent);
        let mut inner = LineCursor::from_lines(body);
        let edit_header = inner.advance().unwrap();
        assert_eq!(edit_header.location.line, 2);
        let edit_body = inner.take_indented_block(edit_header.indent);
        assert_eq!(edit_body[0].location.line, 3);
    }
}
