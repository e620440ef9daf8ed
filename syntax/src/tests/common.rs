use crate::{NodeKind, NodeRef, ParseOutput, Tree};

pub fn trim_indent(s: &str) -> String {
    let lines: Vec<&str> = s.lines().collect();
    let min_indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        // Skip the first line (which is the empty line)
        .skip(1)
        .map(|l| {
            if l.len() >= min_indent {
                &l[min_indent..]
            } else {
                *l
            }
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

#[test]
fn test_trim_indent() {
    let s = r#"
        Document 0..4
          Element 0..4"#;
    let expected = "Document 0..4\n  Element 0..4";
    assert_eq!(expected, trim_indent(s));
}

/// All nodes in document order, root first.
pub fn descendants<'t>(tree: &'t Tree) -> Vec<NodeRef<'t>> {
    fn walk<'t>(node: NodeRef<'t>, out: &mut Vec<NodeRef<'t>>) {
        out.push(node);
        for child in node.children() {
            walk(child, out);
        }
    }
    let mut out = Vec::new();
    walk(tree.root(), &mut out);
    out
}

pub fn node_of_kind<'t>(tree: &'t Tree, kind: NodeKind) -> NodeRef<'t> {
    descendants(tree)
        .into_iter()
        .find(|n| n.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind:?} node in tree"))
}

pub fn messages(out: &ParseOutput) -> Vec<&str> {
    out.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

pub fn render_diagnostics(out: &ParseOutput) -> String {
    out.diagnostics
        .iter()
        .map(|d| format!("{}..{}: {}", d.span.start, d.span.end, d.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Opt-in log output for debugging: `RUST_LOG=trace cargo test -- --nocapture`.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
