//! PORTCULLIS Core Types
//!
//! This crate contains pure types and logic with no I/O: attribute paths,
//! entity references, scalar values, and the logical-attribute-to-physical-
//! field mapping table. Everything here is immutable after construction and
//! safe for unlimited concurrent readers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attr;
pub mod error;
pub mod mapping;
pub mod value;

// Re-exports
pub use attr::{AttributeBase, AttributePath};
pub use error::{CoreError, CoreResult};
pub use mapping::{FieldMap, default_fields};
pub use value::{EntityRef, ScalarValue};
