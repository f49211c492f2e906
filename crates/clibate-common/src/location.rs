/// One entry in an include chain: the site that pulled in a nested document.
///
/// Carried by value (never via a global stack) so that independent parses —
/// potentially running on different threads in a host that parallelizes test
/// suites — never contaminate each other's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSite {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

/// A 1-based source coordinate plus the chain of `include:` sites that led
/// to the file it points into.
///
/// `file` is the short identifier used inline in messages (`<file:line:col>`);
/// `abs_path` is the absolute path printed on its own diagnostic line. For
/// top-level documents the two typically agree up to path normalization; for
/// included documents `file` names the included document itself, not its
/// includer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub abs_path: String,
    pub line: usize,
    pub col: usize,
    /// Nearest includer first, root document last.
    pub include_chain: Vec<IncludeSite>,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, col: usize) -> Self {
        let file = file.into();
        Self {
            abs_path: file.clone(),
            file,
            line,
            col,
            include_chain: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_abs_path(mut self, abs_path: impl Into<String>) -> Self {
        self.abs_path = abs_path.into();
        self
    }

    /// Returns a new `Location` with `site` pushed as the nearest includer,
    /// as if this location had been reached by first parsing `site`'s file
    /// and finding an `include:` directive there.
    #[must_use]
    pub fn included_from(&self, site: IncludeSite) -> Self {
        let mut chain = vec![site];
        chain.extend(self.include_chain.iter().cloned());
        Self {
            file: self.file.clone(),
            abs_path: self.abs_path.clone(),
            line: self.line,
            col: self.col,
            include_chain: chain,
        }
    }

    /// Advance this location by `cols` columns on the same line.
    #[must_use]
    pub fn advanced(&self, cols: usize) -> Self {
        Self {
            file: self.file.clone(),
            abs_path: self.abs_path.clone(),
            line: self.line,
            col: self.col + cols,
            include_chain: self.include_chain.clone(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_file_line_col() {
        let loc = Location::new("edit_REPLACE", 23, 13);
        assert_eq!(loc.to_string(), "edit_REPLACE:23:13");
    }

    #[test]
    fn included_from_prepends_nearest_first() {
        let loc = Location::new("child.clib", 4, 1);
        let loc = loc.included_from(IncludeSite {
            file: "parent.clib".to_string(),
            line: 9,
            col: 3,
        });
        assert_eq!(loc.include_chain.len(), 1);
        assert_eq!(loc.include_chain[0].file, "parent.clib");

        let loc = loc.included_from(IncludeSite {
            file: "root.clib".to_string(),
            line: 1,
            col: 1,
        });
        assert_eq!(loc.include_chain[0].file, "root.clib");
        assert_eq!(loc.include_chain[1].file, "parent.clib");
    }
}
