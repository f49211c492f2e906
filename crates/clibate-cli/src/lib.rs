//! Library surface backing the `clibate` binary: the spec document parser
//! (`document`), sandbox materialization (`sandbox`), command runner
//! (`runner`), and `clap` front end (`cli`).

pub mod cli;
pub mod document;
pub mod runner;
pub mod sandbox;
