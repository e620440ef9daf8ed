//! Indented tree dumps, mainly for tests and debugging.

use std::fmt::Write;

use crate::node::{NodeKind, NodeRef, Tree};

impl Tree {
    /// Render the tree one node per line with spans. Leaf tokens whose
    /// content matters (names, values, text) also show their source slice.
    pub fn pretty(&self, text: &str) -> String {
        let mut out = String::new();
        render(self.root(), text, 0, &mut out);
        out.pop();
        out
    }
}

fn render(node: NodeRef<'_>, text: &str, depth: usize, out: &mut String) {
    let span = node.span();
    for _ in 0..depth {
        out.push_str("  ");
    }
    let _ = write!(out, "{:?} {}..{}", node.kind(), span.start, span.end);
    if shows_text(node.kind()) {
        let slice = text
            .get(span.start as usize..span.end as usize)
            .unwrap_or("");
        let _ = write!(out, " {slice:?}");
    }
    out.push('\n');
    for child in node.children() {
        render(child, text, depth + 1, out);
    }
}

fn shows_text(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::TagName
            | NodeKind::AttributeName
            | NodeKind::AttributeValue
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::Cdata
            | NodeKind::DoctypeDecl
            | NodeKind::ProcessingInst
    )
}
