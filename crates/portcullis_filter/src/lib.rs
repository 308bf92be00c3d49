//! PORTCULLIS Filter Compilation
//!
//! Compiles canonical residual conditions into a boolean search-engine
//! query: `must` / `must_not` / `should` clause sets assembled into a
//! `{"bool": {...}}` object. The top-level [`FilterCompiler`] never raises
//! past its boundary in the default fail-open mode; dropped conditions are
//! surfaced on the [`Compilation`] result instead. The fail-closed mode
//! turns any drop into a hard [`CompileError`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod clause;
pub mod compile;
pub mod compiler;
pub mod error;

pub use assemble::{BoolFilter, assemble};
pub use clause::{Clause, ClauseSet};
pub use compile::compile_condition;
pub use compiler::{Compilation, CompilerConfig, EnforcementMode, FilterCompiler};
pub use error::CompileError;

// The input side of the pipeline, re-exported for callers that only depend
// on this crate.
pub use portcullis_residual::{DropReason, DroppedCondition, Residual};
