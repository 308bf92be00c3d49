//! The top-level residual-to-filter compiler.

use crate::assemble::{BoolFilter, assemble};
use crate::clause::ClauseSet;
use crate::compile::compile_condition;
use crate::error::CompileError;
use portcullis_core::{FieldMap, default_fields};
use portcullis_residual::{DroppedCondition, Residual, ingest};

/// What to do when part of a residual cannot be honored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementMode {
    /// Drop the fragment and proceed with a (possibly emptier, more
    /// permissive) filter. The behavior of the system this replaces.
    FailOpen,
    /// Reject the whole compilation on the first dropped fragment.
    FailClosed,
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// Enforcement mode for dropped conditions
    pub mode: EnforcementMode,
    /// Logical-attribute-to-physical-field mapping
    pub fields: FieldMap,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            mode: EnforcementMode::FailOpen,
            fields: default_fields().clone(),
        }
    }
}

/// The result of compiling one residual. `dropped` is the caller's view of
/// how much of the residual the clause set actually enforces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    /// Clauses recovered from the residual
    pub clauses: ClauseSet,
    /// Fragments that were not honored
    pub dropped: Vec<DroppedCondition>,
}

impl Compilation {
    /// Whether every fragment of the residual was honored
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Residual-to-filter compiler
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    config: CompilerConfig,
}

impl FilterCompiler {
    /// Create a compiler with the given configuration
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one residual into a clause set. Never fails: malformed input
    /// degrades to drop records on the returned [`Compilation`].
    #[must_use]
    pub fn compile(&self, residual: &Residual) -> Compilation {
        let ingested = ingest(residual);
        let mut clauses = ClauseSet::default();
        let mut dropped = ingested.dropped;
        for condition in &ingested.conditions {
            compile_condition(condition, &self.config.fields, &mut clauses, &mut dropped);
        }
        if !dropped.is_empty() {
            tracing::warn!(
                dropped = dropped.len(),
                clauses = clauses.len(),
                "residual compiled with dropped conditions"
            );
        }
        Compilation { clauses, dropped }
    }

    /// Compile several residuals (e.g. multiple residual policies) and
    /// assemble them into one filter.
    ///
    /// # Errors
    ///
    /// In [`EnforcementMode::FailClosed`], the first dropped fragment aborts
    /// the compilation with the corresponding [`CompileError`]. Fail-open
    /// always succeeds.
    pub fn filter(&self, residuals: &[Residual]) -> Result<BoolFilter, CompileError> {
        let mut sets = Vec::with_capacity(residuals.len());
        for residual in residuals {
            let compilation = self.compile(residual);
            if self.config.mode == EnforcementMode::FailClosed {
                if let Some(dropped) = compilation.dropped.first() {
                    return Err(dropped.into());
                }
            }
            sets.push(compilation.clauses);
        }
        Ok(assemble(sets))
    }
}
