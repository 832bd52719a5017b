//! Utilities shared by the front end:
//! - Error types and diagnostics
//! - Source location tracking
//! - Indentation-aware output

pub mod errors;
pub mod location;
pub mod pretty;

// Re-exports
pub use errors::*;
pub use location::{SourceLocation, SourceMap, Span};
pub use pretty::CodeFormatter;
