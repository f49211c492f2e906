//! Lexer primitives shared by every instruction parser: whitespace/comment
//! skipping, raw words, quoted strings (single/double/triple, optional raw
//! `r` prefix), and parenthesized tuples. Every primitive returns values
//! tagged with the [`Location`] they started at, and nothing is silently
//! discarded — unexpected trailing data is always reported.

use clibate_common::{Location, ParseError, ParseErrorKind};

/// A cursor over one parsed document's source text.
///
/// Tracks byte offset plus 1-based line/column so every token carries a
/// precise [`Location`]. Cheap to clone (used for lookahead / backtracking
/// in a couple of instruction parsers that need to peek a whole line).
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    col: usize,
    file: String,
    abs_path: String,
}

/// A raw or quoted string body read by the lexer, with the literalness the
/// caller needs to decide how it participates in the line model (raw reads
/// are trimmed-equal matches; quoted reads are literal, tail-strict).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Raw(String),
    Quoted { value: String, star: bool },
}

impl Body {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Raw(s) | Self::Quoted { value: s, .. } => s,
        }
    }

    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        matches!(self, Self::Quoted { .. })
    }
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(text: &'a str, base: &Location) -> Self {
        Self {
            text,
            pos: 0,
            line: base.line,
            col: base.col,
            file: base.file.clone(),
            abs_path: base.abs_path.clone(),
        }
    }

    #[must_use]
    pub fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            abs_path: self.abs_path.clone(),
            line: self.line,
            col: self.col,
            include_chain: Vec::new(),
        }
    }

    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    #[must_use]
    pub fn at_eol(&self) -> bool {
        self.at_eof() || self.peek() == Some('\n')
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Skip spaces and tabs (not newlines).
    pub fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    /// Skip a trailing `# comment` to end of line, if present.
    pub fn skip_comment(&mut self) {
        if self.peek() == Some('#') {
            while !self.at_eol() {
                self.bump();
            }
        }
    }

    /// Skip inline whitespace and a trailing comment.
    pub fn skip_ws_and_comment(&mut self) {
        self.skip_inline_ws();
        self.skip_comment();
    }

    /// Advance past the end of the current line (consuming the newline).
    pub fn skip_to_next_line(&mut self) {
        while !self.at_eof() && self.peek() != Some('\n') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
    }

    /// Consume the newline the cursor sits on, if any. No-op at EOF or
    /// mid-line.
    pub fn consume_newline(&mut self) {
        if self.peek() == Some('\n') {
            self.bump();
        }
    }

    /// Skip any number of blank or comment-only lines, leaving the cursor
    /// at the start of the next substantive line (or at EOF).
    pub fn skip_blank_and_comment_lines(&mut self) {
        loop {
            let mut probe = self.clone();
            probe.skip_inline_ws();
            probe.skip_comment();
            if probe.at_eol() {
                *self = probe;
                if self.at_eof() {
                    return;
                }
                self.consume_newline();
            } else {
                return;
            }
        }
    }

    /// If the remaining text (from the current position) starts with `s`,
    /// consume it and return `true`; otherwise leave the cursor untouched.
    pub fn consume_if_starts_with(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            for _ in 0..s.chars().count() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Peek the first non-whitespace character on the current line without
    /// consuming anything.
    #[must_use]
    pub fn peek_significant(&self) -> Option<char> {
        let mut probe = self.clone();
        probe.skip_inline_ws();
        probe.peek()
    }

    /// Read everything remaining on the current line, trimmed of trailing
    /// whitespace and any trailing `# comment`.
    #[must_use]
    pub fn read_rest_of_line_trimmed(&mut self) -> String {
        let start = self.pos;
        while !self.at_eol() {
            self.bump();
        }
        let raw = &self.text[start..self.pos];
        strip_trailing_comment(raw).trim_end().to_string()
    }

    /// Read a single non-whitespace "word" token: a run of characters up to
    /// the next whitespace, comment mark, or end of input. Returns `None`
    /// (without consuming) if the cursor is at whitespace, a comment, or
    /// end of line.
    pub fn read_raw_word(&mut self) -> Option<(String, Location)> {
        self.skip_inline_ws();
        if self.at_eol() || self.peek() == Some('#') {
            return None;
        }
        let loc = self.location();
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '#' {
                break;
            }
            self.bump();
        }
        Some((self.text[start..self.pos].to_string(), loc))
    }

    /// Peek whether the cursor (after inline whitespace) sits at the start
    /// of a quoted string, accounting for an optional leading raw-string
    /// `r` marker.
    fn quote_lookahead(&self) -> Option<(bool, char, usize)> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        if first == 'r' {
            let (_, second) = chars.next()?;
            if matches!(second, '\'' | '"') {
                return Some((true, second, 1));
            }
            return None;
        }
        if matches!(first, '\'' | '"') {
            return Some((false, first, 0));
        }
        None
    }

    /// Read a quoted string if one starts here (single, double, or triple
    /// quoted, with an optional raw `r` prefix). Returns `None` without
    /// consuming anything if the cursor isn't at a quote.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the string is left unterminated.
    pub fn read_quoted(&mut self) -> Result<Option<(String, bool, Location)>, ParseError> {
        self.skip_inline_ws();
        let Some((raw, quote_char, skip)) = self.quote_lookahead() else {
            return Ok(None);
        };
        let loc = self.location();
        for _ in 0..skip {
            self.bump();
        }
        let triple = self.peek_at(1) == Some(quote_char) && self.peek_at(2) == Some(quote_char);
        if triple {
            self.bump();
            self.bump();
            self.bump();
        } else {
            self.bump();
        }

        let start = self.pos;
        let value = loop {
            if self.at_eof() {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    "Unterminated quoted string.",
                    loc,
                ));
            }
            if triple {
                if self.peek() == Some(quote_char)
                    && self.peek_at(1) == Some(quote_char)
                    && self.peek_at(2) == Some(quote_char)
                {
                    let value = self.text[start..self.pos].to_string();
                    self.bump();
                    self.bump();
                    self.bump();
                    break value;
                }
            } else if self.peek() == Some(quote_char) {
                let value = self.text[start..self.pos].to_string();
                self.bump();
                break value;
            } else if self.peek() == Some('\n') && !triple {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    "Unterminated quoted string.",
                    loc,
                ));
            }
            self.bump();
        };

        let value = if raw { value } else { unescape(&value) };
        Ok(Some((value, raw, loc)))
    }

    /// Read a line body: either a quoted string (literal, tail carried
    /// separately by the caller) or a raw read trimmed of trailing
    /// whitespace. An optional trailing `*` after a quoted body is reported
    /// via the returned `star` flag (spec §3 invariant 3).
    ///
    /// # Errors
    ///
    /// Propagates quoting errors, and reports unexpected data before/after
    /// a quoted string on the same line.
    pub fn read_body(&mut self) -> Result<(Body, Location), ParseError> {
        if let Some((value, _raw, loc)) = self.read_quoted()? {
            self.skip_inline_ws();
            let star = self.peek() == Some('*');
            if star {
                self.bump();
            }
            self.skip_comment();
            if !self.at_eol() {
                return Err(ParseError::new(
                    ParseErrorKind::Structure,
                    "Unexpected data found after string",
                    self.location(),
                ));
            }
            Ok((Body::Quoted { value, star }, loc))
        } else {
            let loc = self.location();
            let text = self.read_rest_of_line_trimmed();
            Ok((Body::Raw(text), loc))
        }
    }

    /// Read a parenthesized tuple `(a, b, ...)` of raw or quoted values.
    /// Returns the values (tagged [`Body::Raw`]/[`Body::Quoted`] so callers
    /// can tell whether a value was quoted, per the prefix notation
    /// decoder's literal-vs-condensed rule) with their locations; arity is
    /// validated by the caller (the required arity differs per
    /// instruction).
    ///
    /// # Errors
    ///
    /// Reports missing `(`/`)`, missing commas, and malformed values.
    pub fn read_tuple(&mut self) -> Result<Option<(Vec<(Body, Location)>, Location)>, ParseError> {
        self.skip_inline_ws();
        if self.peek() != Some('(') {
            return Ok(None);
        }
        let open_loc = self.location();
        self.bump();
        self.skip_inline_ws();

        let mut values = Vec::new();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Some((values, open_loc)));
        }

        loop {
            self.skip_inline_ws();
            if let Some((value, _raw, loc)) = self.read_quoted()? {
                values.push((Body::Quoted { value, star: false }, loc));
            } else {
                let loc = self.location();
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if ch == ',' || ch == ')' || ch.is_whitespace() {
                        break;
                    }
                    self.bump();
                }
                if self.pos == start {
                    return Err(ParseError::new(
                        ParseErrorKind::Structure,
                        "Expected a value inside tuple.",
                        loc,
                    ));
                }
                values.push((Body::Raw(self.text[start..self.pos].to_string()), loc));
            }
            self.skip_inline_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {
                    self.bump();
                    break;
                }
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::Structure,
                        "Missing closing ')' for tuple.",
                        self.location(),
                    ));
                }
            }
        }

        Ok(Some((values, open_loc)))
    }
}

/// Strip a trailing `# comment` that starts outside of quotes. Since this
/// is only used on an already-unquoted raw read, a `#` anywhere ends the
/// line.
fn strip_trailing_comment(raw: &str) -> &str {
    raw.find('#').map_or(raw, |idx| &raw[..idx])
}

/// Unescape the contents of a (non-raw) quoted string: `\n`, `\t`, `\\`,
/// and `\` followed by the string's own quote character.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
