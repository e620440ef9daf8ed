//! Cursor classification.
//!
//! [`locate`] maps a byte offset in a parsed document to the syntactic
//! slot it sits in. The slot decides which completion strategy applies
//! and where its replacement span starts. All coordinates are UTF-8 byte
//! offsets into the original source text.

use syntax::{NodeKind, NodeRef, Tree};

/// The kind of completion a cursor position calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Inside an open tag, completing the element name after `<`.
    OpenTag,
    /// Inside a close tag, completing the name after `</`.
    CloseTag,
    /// Inside an open tag, at an attribute name slot.
    AttrName,
    /// Inside an open tag, at an attribute value slot.
    AttrValue,
    /// Between tags, where a new element could start.
    InsertionPoint,
}

/// A classified cursor position.
///
/// `from` is where the replacement span starts. `context` is the
/// structurally relevant node: the scope element for tag name positions,
/// the tag node for attribute positions, `None` at the document top
/// level. A `Location` borrows the tree it was resolved against and is
/// only meaningful for the request that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Location<'t> {
    pub kind: LocationKind,
    pub from: u32,
    pub context: Option<NodeRef<'t>>,
}

impl<'t> Location<'t> {
    fn new(kind: LocationKind, from: u32, context: Option<NodeRef<'t>>) -> Self {
        Self { kind, from, context }
    }
}

/// Classifies the cursor position `pos`, or returns `None` where no
/// completion applies, for instance inside a comment.
pub fn locate(tree: &Tree, pos: u32) -> Option<Location<'_>> {
    let at = tree.resolve_inner(pos);
    if let Some(tag) = at.ancestors().find(|node| node.kind().is_tag())
        && (pos < tag.span().end || !tag.tag_is_complete())
    {
        return locate_in_tag(tag, at, pos);
    }

    // Between tags. Step up past everything that ends exactly at the
    // cursor so the classification reflects the container the cursor
    // really sits in, but stay inside an element that is still waiting
    // for its close tag: after `<a>x` the cursor belongs to `a`, not to
    // its parent.
    let mut cur = at;
    while cur.span().end == pos
        && (cur.kind() != NodeKind::Element || cur.element_is_closed())
        && let Some(parent) = cur.parent()
    {
        cur = parent;
    }
    match cur.kind() {
        NodeKind::Element => Some(Location::new(LocationKind::InsertionPoint, pos, Some(cur))),
        NodeKind::Document => Some(Location::new(LocationKind::InsertionPoint, pos, None)),
        NodeKind::Text => Some(Location::new(
            LocationKind::InsertionPoint,
            pos,
            enclosing_element(cur),
        )),
        _ => None,
    }
}

fn locate_in_tag<'t>(tag: NodeRef<'t>, at: NodeRef<'t>, pos: u32) -> Option<Location<'t>> {
    match at.kind() {
        NodeKind::TagName => {
            if matches!(tag.kind(), NodeKind::CloseTag | NodeKind::MismatchedCloseTag) {
                Some(Location::new(
                    LocationKind::CloseTag,
                    at.span().start,
                    closed_element(tag),
                ))
            } else {
                Some(Location::new(
                    LocationKind::OpenTag,
                    at.span().start,
                    scope_element(tag),
                ))
            }
        }
        NodeKind::AttributeName => Some(Location::new(
            LocationKind::AttrName,
            at.span().start,
            Some(tag),
        )),
        NodeKind::AttributeValue => Some(Location::new(
            LocationKind::AttrValue,
            at.span().start,
            Some(tag),
        )),
        _ => {
            // The cursor is not on a token that names its own slot, so
            // decide from the token just before it.
            let before = if at == tag || at.kind() == NodeKind::Attribute {
                at.child_before(pos)?
            } else {
                at
            };
            match before.kind() {
                NodeKind::StartTag => {
                    Some(Location::new(LocationKind::OpenTag, pos, scope_element(tag)))
                }
                NodeKind::StartCloseTag if before.span().end <= pos => Some(Location::new(
                    LocationKind::CloseTag,
                    pos,
                    closed_element(tag),
                )),
                NodeKind::Is => Some(Location::new(LocationKind::AttrValue, pos, Some(tag))),
                _ => Some(Location::new(LocationKind::AttrName, pos, Some(tag))),
            }
        }
    }
}

/// The element whose child list governs a tag name being typed: the
/// nearest element ancestor above the tag's own element node.
fn scope_element(tag: NodeRef<'_>) -> Option<NodeRef<'_>> {
    tag.ancestors()
        .filter(|node| node.kind() == NodeKind::Element)
        .nth(1)
}

/// The element a close tag at this position would close: the owner for a
/// matched close tag, the element it sits inside for a mismatched one.
fn closed_element(tag: NodeRef<'_>) -> Option<NodeRef<'_>> {
    tag.parent().filter(|node| node.kind() == NodeKind::Element)
}

fn enclosing_element(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.ancestors().find(|n| n.kind() == NodeKind::Element)
}
