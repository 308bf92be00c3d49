//! PORTCULLIS Residual Ingestion
//!
//! A policy residual arrives in one of several shapes: raw text emitted by a
//! partial-evaluation tool, a structured expression object, an array of
//! either, or a loosely-keyed object. This crate normalizes all of them into
//! one canonical [`Condition`] AST so the filter compiler stays
//! shape-agnostic. Ingestion never fails: whatever cannot be understood is
//! dropped, logged, and surfaced as a [`DroppedCondition`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod condition;
pub mod dropped;
pub mod expr;
pub mod ingest;
pub mod text;

pub use condition::Condition;
pub use dropped::{DropReason, DroppedCondition};
pub use ingest::{Ingested, Residual, ingest};
pub use text::parse_text;
