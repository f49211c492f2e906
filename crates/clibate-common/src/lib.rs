//! Shared types threaded through the clibate edit engine and its CLI:
//! source [`Location`]s with include chains, bit-stable [`Diagnostic`]
//! rendering, and the stream assertion vocabulary used by `success:`/
//! `failure:` blocks.

pub mod diagnostics;
pub mod expect;
pub mod location;

pub use diagnostics::{Diagnostic, ErrorClass, ParseError, ParseErrorKind, RunError, RunErrorKind};
pub use expect::{evaluate, Expectation, StreamExpectation};
pub use location::{IncludeSite, Location};
