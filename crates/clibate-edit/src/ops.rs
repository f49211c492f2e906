//! Typed edit operations: the output of the instruction parsers and the
//! input to the applicator. A tagged sum over the six instruction families,
//! with shared fields (location, `ALL`, regex-mode) factored into a common
//! [`Header`].

use clibate_common::Location;

use crate::prefix::Notation;

/// Which of the indent/prefix regions a star mark drops from output, or —
/// on a keyword-attached star (`UNPREF*`, `PREFIX*`) — forces to be empty
/// on the match side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarMode {
    None,
    Star,
    DoubleStar,
}

impl StarMode {
    #[must_use]
    pub const fn is_some(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One match or replace line: an optional prefix pattern, an optional
/// "extra" to splice in on the output side, the line's meaningful body, and
/// the star-mode that governs it.
#[derive(Debug, Clone)]
pub struct LineSpec {
    pub prefix: Option<Notation>,
    pub extra: Option<String>,
    pub body: String,
    pub quoted: bool,
    /// Demands empty tail when the body was quoted with a trailing `*`.
    pub strict_tail: bool,
    pub star: StarMode,
    /// Set only by REMOVE's `()` empty-prefix marker: require zero indent
    /// and zero prefix on the match side.
    pub no_indent_no_prefix: bool,
    pub location: Location,
}

impl LineSpec {
    #[must_use]
    pub fn has_prefix(&self) -> bool {
        self.prefix.is_some()
    }

    /// Build a line spec from a lexed body plus the decoded prefix/extra.
    #[must_use]
    pub fn from_body(
        prefix: Option<Notation>,
        extra: Option<String>,
        body: crate::cursor::Body,
        star: StarMode,
        no_indent_no_prefix: bool,
        location: Location,
    ) -> Self {
        match body {
            crate::cursor::Body::Raw(text) => Self {
                prefix,
                extra,
                body: text,
                quoted: false,
                strict_tail: false,
                star,
                no_indent_no_prefix,
                location,
            },
            crate::cursor::Body::Quoted { value, star: tail_star } => Self {
                prefix,
                extra,
                body: value,
                quoted: true,
                strict_tail: tail_star,
                star,
                no_indent_no_prefix,
                location,
            },
        }
    }
}

/// Fields shared by every instruction.
#[derive(Debug, Clone)]
pub struct Header {
    pub location: Location,
    pub all: bool,
    pub regex_mode: bool,
}

/// A fully parsed edit instruction, ready for the applicator.
#[derive(Debug, Clone)]
pub enum EditOp {
    Diff {
        header: Header,
        match_spec: LineSpec,
        replace_spec: LineSpec,
    },
    InsertBelow {
        header: Header,
        match_spec: LineSpec,
        new_lines: Vec<LineSpec>,
    },
    InsertAbove {
        header: Header,
        new_lines: Vec<LineSpec>,
        match_spec: LineSpec,
    },
    Remove {
        header: Header,
        match_spec: LineSpec,
    },
    Prefix {
        header: Header,
        match_spec: LineSpec,
    },
    Unpref {
        header: Header,
        match_spec: LineSpec,
    },
    Replace {
        header: Header,
        pattern: regex::Regex,
        replacement: String,
    },
}

impl EditOp {
    #[must_use]
    pub const fn header(&self) -> &Header {
        match self {
            Self::Diff { header, .. }
            | Self::InsertBelow { header, .. }
            | Self::InsertAbove { header, .. }
            | Self::Remove { header, .. }
            | Self::Prefix { header, .. }
            | Self::Unpref { header, .. }
            | Self::Replace { header, .. } => header,
        }
    }
}
