//! Tolerant syntax trees for tag/attribute markup.
//!
//! Pipeline: parse → tree queries → completion (in the `ide` crate).
//! All spans are UTF-8 byte offsets into the original source, using `[start, end)`.
//! The tree stores no text; callers keep the source and slice it by span.

mod node;
mod parser;
mod pretty;
mod span;
mod tests;

pub use node::{NodeId, NodeKind, NodeRef, Tree};
pub use parser::{Diagnostic, ParseOutput, parse};
pub use span::Span;
