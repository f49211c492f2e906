//! Spec document model and parser — the narrow "external collaborator"
//! named in spec.md §6: top-level sectioning (`file:`, `copy:`, `include:`,
//! `command:`, `test:`) via a pluggable [`readers::SectionReader`] registry,
//! producing a [`ClibateSpec`] the sandbox/runner can execute.

pub mod line_cursor;
pub mod readers;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clibate_common::{Expectation, IncludeSite, Location, ParseError, ParseErrorKind};
use clibate_edit::EditOp;

use line_cursor::LineCursor;
use readers::ReaderRegistry;

/// A file declared by `file:` (verbatim initial content) or `copy:` (copied
/// from a previously declared file under a new name).
#[derive(Debug, Clone)]
pub struct DeclaredFile {
    pub name: String,
    pub initial_content: Vec<String>,
    pub location: Location,
}

/// One `edit: <file>` section inside a `test:` block: the target file and
/// the parsed edit operations to run against it. Test-block edits are
/// always transient — the sandbox rolls them back once the block's command
/// has run (spec.md §3, "Lifecycle").
#[derive(Debug, Clone)]
pub struct EditBatch {
    pub target_file: String,
    pub ops: Vec<EditOp>,
    pub location: Location,
}

/// One `test:` block: its edits, the command override it may carry, and its
/// expectations.
#[derive(Debug, Clone)]
pub struct TestBlock {
    pub name: Option<String>,
    pub location: Location,
    pub command: Option<String>,
    pub edits: Vec<EditBatch>,
    pub success: Option<Expectation>,
    pub failure: Option<Expectation>,
}

/// The fully parsed top-level spec document.
#[derive(Debug, Clone, Default)]
pub struct ClibateSpec {
    pub files: Vec<DeclaredFile>,
    pub command: Option<String>,
    pub tests: Vec<TestBlock>,
}

/// Mutable state threaded through section readers as they walk one
/// document: the spec under construction, plus enough include-chain
/// bookkeeping to resolve relative `include:` paths and reject cycles.
pub struct ParseState<'s> {
    pub spec: &'s mut ClibateSpec,
    pub base_dir: PathBuf,
    pub include_chain: Vec<IncludeSite>,
    pub visiting: HashSet<PathBuf>,
}

impl ParseState<'_> {
    /// Look up a previously declared file by name (used by `copy:`).
    #[must_use]
    pub fn find_file(&self, name: &str) -> Option<&DeclaredFile> {
        self.spec.files.iter().find(|f| f.name == name)
    }
}

/// Parse a spec document from `path`, following every `include:` directive
/// it contains.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered anywhere in the document or
/// any file it includes, with the include chain attached.
pub fn parse_spec_file(path: &Path) -> Result<ClibateSpec, ParseError> {
    let mut spec = ClibateSpec::default();
    let mut visiting = HashSet::new();
    parse_into(
        &mut spec,
        path,
        Vec::new(),
        &mut visiting,
    )?;
    Ok(spec)
}

/// Parse `path` into `spec`, extending `include_chain` for every diagnostic
/// raised while inside it. `visiting` guards against include cycles across
/// the whole recursive descent.
pub(crate) fn parse_into(
    spec: &mut ClibateSpec,
    path: &Path,
    include_chain: Vec<IncludeSite>,
    visiting: &mut HashSet<PathBuf>,
) -> Result<(), ParseError> {
    let abs_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visiting.insert(abs_path.clone()) {
        return Err(ParseError::new(
            ParseErrorKind::Structure,
            "Include cycle detected",
            Location::new(path.display().to_string(), 1, 1).with_abs_path(abs_path.display().to_string()),
        ));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        ParseError::new(
            ParseErrorKind::Structure,
            format!("Could not read spec file: {e}"),
            Location::new(path.display().to_string(), 1, 1),
        )
    })?;

    let file_id = path.display().to_string();
    let mut cursor = LineCursor::from_text(&text, file_id.clone(), abs_path.display().to_string());
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let registry = ReaderRegistry::builtin();
    let mut state = ParseState {
        spec,
        base_dir,
        include_chain: include_chain.clone(),
        visiting: std::mem::take(visiting),
    };

    let result = run(&registry, &mut cursor, &mut state);
    *visiting = state.visiting;
    visiting.remove(&abs_path);
    result.map_err(|e| e.with_include_chain(&include_chain))
}

fn run(registry: &ReaderRegistry, cursor: &mut LineCursor, state: &mut ParseState) -> Result<(), ParseError> {
    loop {
        cursor.skip_blank_and_comment_lines();
        let Some(line) = cursor.peek() else {
            return Ok(());
        };
        if !registry.dispatch(cursor, state)? {
            return Err(ParseError::new(
                ParseErrorKind::Structure,
                format!("Unrecognized top-level section: '{}'", line.trimmed),
                line.location,
            ));
        }
    }
}

/// Small helper so section readers — which work with a local (chain-free)
/// `Location` — can attach the current include chain to an error once it
/// escapes the document it occurred in.
trait WithIncludeChain {
    #[must_use]
    fn with_include_chain(self, chain: &[IncludeSite]) -> Self;
}

impl WithIncludeChain for ParseError {
    fn with_include_chain(mut self, chain: &[IncludeSite]) -> Self {
        if self.location.include_chain.is_empty() {
            self.location.include_chain = chain.to_vec();
        }
        self
    }
}
