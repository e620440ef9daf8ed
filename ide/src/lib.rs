//! Schema-driven completion for markup documents.
//!
//! A [`Schema`] is compiled once from element and attribute declarations
//! and then queried per keystroke: given a parsed document, its text, and
//! a byte cursor, [`Schema::complete`] classifies the cursor position and
//! proposes the element names, closing tags, attribute names, or
//! attribute values that are legal there. Coordinates are UTF-8 byte
//! offsets (`[start, end)`), matching `syntax`.
//!
//! The engine never validates the document. Malformed input narrows what
//! can be offered, it never produces an error.

mod completion;
mod context;
mod schema;

use syntax::Tree;
use tracing::trace;

pub use completion::{CompletionItem, CompletionKind, CompletionResult, ItemOverride, MatchPattern};
pub use context::{Location, LocationKind, locate};
pub use schema::{AttrRef, AttrSpec, ElementSpec, Schema, ValueSpec};

/// One completion query.
///
/// `explicit` distinguishes user-invoked requests from automatic ones
/// fired while typing. Insertion points between tags only complete on
/// explicit requests, so plain typing in text does not pop suggestions.
/// The tree and text are borrowed for the duration of the call only.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub tree: &'a Tree,
    pub text: &'a str,
    pub pos: u32,
    pub explicit: bool,
}

impl Schema {
    /// Completion options for `request`, or `None` where the position
    /// offers nothing. `None` is a normal outcome and distinct from a
    /// result with an empty option list.
    pub fn complete(&self, request: &CompletionRequest<'_>) -> Option<CompletionResult> {
        let location = locate(request.tree, request.pos)?;
        if location.kind == LocationKind::InsertionPoint && !request.explicit {
            return None;
        }
        trace!(kind = ?location.kind, from = location.from, "completing");
        completion::completion_at(self, request.text, request.pos, location)
    }
}
