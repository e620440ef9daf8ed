//! Syntax tree for markup documents.
//!
//! Nodes live in an index-addressed arena owned by [`Tree`]; the `Document`
//! node is always index 0 and spans the whole source. Every query hands out
//! lightweight [`NodeRef`] handles that borrow the arena.

use crate::span::Span;

pub type NodeId = u32;

/// Node kinds produced by the parser.
///
/// Container kinds (`Document`, `Element`, `OpenTag`, `CloseTag`,
/// `SelfClosingTag`, `MismatchedCloseTag`, `Attribute`) have children; the
/// rest are leaf tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Cdata,
    DoctypeDecl,
    ProcessingInst,
    /// `<name attr="v">`
    OpenTag,
    /// `</name>` matching an open element.
    CloseTag,
    /// `</name>` matching nothing on the open-element chain.
    MismatchedCloseTag,
    /// `<name/>`
    SelfClosingTag,
    /// The `<` token.
    StartTag,
    /// The `</` token.
    StartCloseTag,
    /// The `>` token.
    EndTag,
    /// The `/>` token.
    SelfCloseEndTag,
    TagName,
    Attribute,
    AttributeName,
    /// The `=` token.
    Is,
    AttributeValue,
}

impl NodeKind {
    /// Any of the tag container kinds.
    pub fn is_tag(self) -> bool {
        matches!(
            self,
            NodeKind::OpenTag
                | NodeKind::CloseTag
                | NodeKind::MismatchedCloseTag
                | NodeKind::SelfClosingTag
        )
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Concrete syntax tree over one markup document.
///
/// The tree stores no text. Callers keep the source string and slice it
/// with node spans when they need names or values.
#[derive(Debug)]
pub struct Tree {
    pub(crate) nodes: Vec<NodeData>,
}

impl Tree {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, id: 0 }
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Innermost node around `offset`, biased toward the node that ends
    /// exactly there. Descends as long as some child satisfies
    /// `child.start < offset <= child.end`; a cursor at a boundary between
    /// two nodes therefore lands in the earlier one.
    pub fn resolve_inner(&self, offset: u32) -> NodeRef<'_> {
        let mut cur = self.root();
        'descend: loop {
            for child in cur.children() {
                if child.span().touches_end(offset) {
                    cur = child;
                    continue 'descend;
                }
            }
            return cur;
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id as usize]
    }
}

/// Borrowed handle to one node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(self) -> NodeId {
        self.id
    }

    pub fn kind(self) -> NodeKind {
        self.tree.data(self.id).kind
    }

    pub fn span(self) -> Span {
        self.tree.data(self.id).span
    }

    pub fn parent(self) -> Option<NodeRef<'t>> {
        let parent = self.tree.data(self.id).parent?;
        Some(self.tree.node(parent))
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'t>> {
        let tree = self.tree;
        tree.data(self.id).children.iter().map(move |&id| tree.node(id))
    }

    /// This node, then each parent up to `Document`.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(Some(self), |node| node.parent())
    }

    pub fn first_child(self) -> Option<NodeRef<'t>> {
        self.children().next()
    }

    pub fn last_child(self) -> Option<NodeRef<'t>> {
        let id = *self.tree.data(self.id).children.last()?;
        Some(self.tree.node(id))
    }

    /// Last child starting strictly before `offset`.
    pub fn child_before(self, offset: u32) -> Option<NodeRef<'t>> {
        self.children().take_while(|c| c.span().start < offset).last()
    }

    pub fn child_of_kind(self, kind: NodeKind) -> Option<NodeRef<'t>> {
        self.children_of_kind(kind).next()
    }

    pub fn children_of_kind(self, kind: NodeKind) -> impl Iterator<Item = NodeRef<'t>> {
        self.children().filter(move |c| c.kind() == kind)
    }

    /// For tag nodes: the terminating `>` or `/>` token is present.
    pub fn tag_is_complete(self) -> bool {
        matches!(
            self.last_child().map(NodeRef::kind),
            Some(NodeKind::EndTag | NodeKind::SelfCloseEndTag)
        )
    }

    /// For `Element` nodes: the element was closed by its own close tag or
    /// is self-closing. Elements cut short by an outer close tag or by the
    /// end of input report `false`.
    pub fn element_is_closed(self) -> bool {
        matches!(
            self.last_child().map(NodeRef::kind),
            Some(NodeKind::CloseTag | NodeKind::SelfClosingTag)
        )
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f, "{:?}@{}..{}", self.kind(), span.start, span.end)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}
