//! Materializes a parsed spec's declared files into a temporary directory,
//! and applies/rolls back each `test:` block's edits against that tree
//! (SPEC_FULL §4.8). This is the narrow collaborator between the document
//! parser and the runner: it owns the on-disk state a `test:` block's
//! command actually sees.

use std::collections::HashMap;
use std::path::Path;

use clibate_edit::apply_edits;

use crate::document::ClibateSpec;

/// A materialized copy of a spec's declared files, backed by a temporary
/// directory that is removed when the sandbox is dropped.
pub struct Sandbox {
    dir: tempfile::TempDir,
    buffers: HashMap<String, Vec<String>>,
}

impl Sandbox {
    /// Write every declared file to a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or any declared file
    /// cannot be created.
    pub fn materialize(spec: &ClibateSpec) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let mut buffers = HashMap::new();
        for file in &spec.files {
            let path = dir.path().join(&file.name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_buffer(&path, &file.initial_content)?;
            buffers.insert(file.name.clone(), file.initial_content.clone());
        }
        Ok(Self { dir, buffers })
    }

    /// The sandbox's root directory, to run commands in.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Snapshot the current buffer content of every file named in `targets`,
    /// so it can be restored with [`Sandbox::restore`] after a `test:`
    /// block's command has run.
    #[must_use]
    pub fn snapshot(&self, targets: &[String]) -> HashMap<String, Vec<String>> {
        targets
            .iter()
            .filter_map(|name| self.buffers.get(name).map(|buf| (name.clone(), buf.clone())))
            .collect()
    }

    /// Apply one edit batch's operations against `target_file`'s in-memory
    /// buffer and write the result back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if `target_file` was never declared, or if applying
    /// the edits fails (`RunError::NoMatch`).
    pub fn apply(&mut self, target_file: &str, ops: &[clibate_edit::EditOp]) -> anyhow::Result<()> {
        let buffer = self
            .buffers
            .get(target_file)
            .ok_or_else(|| anyhow::anyhow!("edit target '{target_file}' was never declared"))?;
        let new_buffer = apply_edits(buffer, ops)?;
        write_buffer(&self.dir.path().join(target_file), &new_buffer)?;
        self.buffers.insert(target_file.to_string(), new_buffer);
        Ok(())
    }

    /// Restore buffers to a previously taken [`Sandbox::snapshot`], rewriting
    /// the corresponding files on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshotted file cannot be rewritten.
    pub fn restore(&mut self, snapshot: HashMap<String, Vec<String>>) -> anyhow::Result<()> {
        for (name, content) in snapshot {
            write_buffer(&self.dir.path().join(&name), &content)?;
            self.buffers.insert(name, content);
        }
        Ok(())
    }
}

fn write_buffer(path: &Path, lines: &[String]) -> anyhow::Result<()> {
    let mut text = lines.join("\n");
    if !lines.is_empty() {
        text.push('\n');
    }
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::DeclaredFile;
    use clibate_common::Location;

    fn loc() -> Location {
        Location::new("spec.clib", 1, 1)
    }

    fn spec_with(name: &str, lines: &[&str]) -> ClibateSpec {
        ClibateSpec {
            files: vec![DeclaredFile {
                name: name.to_string(),
                initial_content: lines.iter().map(ToString::to_string).collect(),
                location: loc(),
            }],
            command: None,
            tests: Vec::new(),
        }
    }

    #[test]
    fn materialize_writes_declared_files() {
        let spec = spec_with("main.tok", &["hello", "world"]);
        let sandbox = Sandbox::materialize(&spec).unwrap();
        let content = std::fs::read_to_string(sandbox.root().join("main.tok")).unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[test]
    fn snapshot_and_restore_round_trips() {
        let spec = spec_with("main.tok", &["original"]);
        let mut sandbox = Sandbox::materialize(&spec).unwrap();
        let snap = sandbox.snapshot(&["main.tok".to_string()]);

        let ops = clibate_edit::parse_edits("DIFF 'original'\n~ 'patched'\n", &loc()).unwrap();
        sandbox.apply("main.tok", &ops).unwrap();
        let patched = std::fs::read_to_string(sandbox.root().join("main.tok")).unwrap();
        assert_eq!(patched, "patched\n");

        sandbox.restore(snap).unwrap();
        let restored = std::fs::read_to_string(sandbox.root().join("main.tok")).unwrap();
        assert_eq!(restored, "original\n");
    }

    #[test]
    fn apply_to_undeclared_file_is_an_error() {
        let spec = spec_with("main.tok", &["x"]);
        let mut sandbox = Sandbox::materialize(&spec).unwrap();
        let ops = clibate_edit::parse_edits("DIFF 'x'\n~ 'y'\n", &loc()).unwrap();
        assert!(sandbox.apply("other.tok", &ops).is_err());
    }
}
