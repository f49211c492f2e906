use crate::location::Location;

/// The two top-level error classes clibate ever reports, matching the
/// bit-stable label text in the diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Parse,
    Run,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "Clibate parsing error"),
            Self::Run => write!(f, "Error during clibate tests run"),
        }
    }
}

/// A fully rendered clibate diagnostic: class, message, primary span, and
/// include chain. `Display` produces the exact bit-stable shape consumers
/// (including clibate's own test suite) depend on:
///
/// ```text
/// <error-class>:
/// <message> <file:line:col>
/// <absolute source path>
/// included from <parent path>:<line>:<col>
/// …
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub class: ErrorClass,
    pub message: String,
    pub location: Location,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.class)?;
        writeln!(f, "{} <{}>", self.message, self.location)?;
        writeln!(f, "{}", self.location.abs_path)?;
        for site in &self.location.include_chain {
            writeln!(f, "included from {}:{}:{}", site.file, site.line, site.col)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// The family of error detected at parse time (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Missing keyword, bracket, colon, comma, continuation, or tilde.
    Structure,
    /// Arity mismatches, meaningless star combinations, missing
    /// parenthesized sides on regex-mode instructions.
    Semantic,
    /// Invalid regex or substitution template.
    PatternCompile,
}

/// A parse-time diagnostic. Fatal for the batch it occurs in; parsing never
/// partially applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub location: Location,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    #[must_use]
    pub fn as_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            class: ErrorClass::Parse,
            message: self.message.clone(),
            location: self.location.clone(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_diagnostic().fmt(f)
    }
}

impl std::error::Error for ParseError {}

/// The family of error detected while applying edits (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    /// A required match line could not be located in the target buffer.
    NoMatch,
}

/// An apply-time diagnostic. Fatal for the batch it occurs in; the runner
/// keeps the pre-batch snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
    pub location: Location,
}

impl RunError {
    #[must_use]
    pub fn new(kind: RunErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    #[must_use]
    pub fn as_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            class: ErrorClass::Run,
            message: self.message.clone(),
            location: self.location.clone(),
        }
    }

    #[must_use]
    pub fn no_match(body: &str, location: Location) -> Self {
        Self::new(
            RunErrorKind::NoMatch,
            format!("Could not match line '{body}'."),
            location,
        )
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_diagnostic().fmt(f)
    }
}

impl std::error::Error for RunError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_matches_bit_stable_shape() {
        let loc = Location::new("edit_REPLACE", 23, 13);
        let err = ParseError::new(
            ParseErrorKind::Semantic,
            "Ambiguous raw REPLACE line with more than 1 occurrence of the 'BY' keyword. Consider quoting match and/or replace pattern(s).",
            loc,
        );
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "Clibate parsing error:\nAmbiguous raw REPLACE line with more than 1 occurrence of the 'BY' keyword. Consider quoting match and/or replace pattern(s). <edit_REPLACE:23:13>\nedit_REPLACE\n"
        );
    }

    #[test]
    fn run_error_no_match_message() {
        let loc = Location::new("main.clib", 5, 1);
        let err = RunError::no_match("chain = chain \"-\" $1", loc);
        assert!(err.message.starts_with("Could not match line"));
        assert!(err.to_string().starts_with("Error during clibate tests run:\n"));
    }

    #[test]
    fn include_chain_renders_each_site() {
        let mut loc = Location::new("child.clib", 4, 1);
        loc.include_chain.push(crate::IncludeSite {
            file: "parent.clib".to_string(),
            line: 9,
            col: 3,
        });
        let err = RunError::no_match("x", loc);
        let rendered = err.to_string();
        assert!(rendered.contains("included from parent.clib:9:3"));
    }
}
