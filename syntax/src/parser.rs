//! Tolerant single-pass parser for markup documents.
//!
//! The parser never fails: any input produces a tree whose `Document` node
//! spans `[0, len)`, with structural problems reported as advisory
//! diagnostics. Recovery rules:
//!
//! - A `<` with no name becomes an inert one-character element.
//! - A tag interrupted by `<` or end of input keeps what it has; the
//!   element stays open.
//! - A close tag matching an outer open element closes every element in
//!   between at the close tag's start.
//! - A close tag matching nothing becomes a `MismatchedCloseTag` child of
//!   the innermost open element.
//! - Open elements left at end of input are closed there.

use tracing::trace;

use crate::node::{NodeData, NodeId, NodeKind, Tree};
use crate::span::Span;

/// Advisory parse problem. The tree is usable regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

pub struct ParseOutput {
    pub tree: Tree,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn parse(text: &str) -> ParseOutput {
    Parser {
        text,
        pos: 0,
        nodes: Vec::new(),
        diagnostics: Vec::new(),
        open: Vec::new(),
    }
    .run()
}

/// One entry of the open-element chain, innermost last.
struct OpenElement {
    element: NodeId,
    tag: NodeId,
    name_span: Span,
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    nodes: Vec<NodeData>,
    diagnostics: Vec<Diagnostic>,
    open: Vec<OpenElement>,
}

impl<'a> Parser<'a> {
    fn run(mut self) -> ParseOutput {
        self.nodes.push(NodeData {
            kind: NodeKind::Document,
            span: Span::new(0, self.text.len() as u32),
            parent: None,
            children: Vec::new(),
        });
        while self.pos < self.text.len() {
            if self.at("<!--") {
                self.raw_region(NodeKind::Comment, 4, "-->", "comment");
            } else if self.at("<![CDATA[") {
                self.raw_region(NodeKind::Cdata, 9, "]]>", "CDATA section");
            } else if self.at("<!") {
                self.raw_region(NodeKind::DoctypeDecl, 2, ">", "doctype declaration");
            } else if self.at("<?") {
                self.raw_region(NodeKind::ProcessingInst, 2, "?>", "processing instruction");
            } else if self.at("</") {
                self.close_tag();
            } else if self.at("<") {
                self.open_tag();
            } else {
                self.text_run();
            }
        }
        self.finish()
    }

    fn finish(mut self) -> ParseOutput {
        let text = self.text;
        let end = text.len() as u32;
        while let Some(entry) = self.open.pop() {
            self.set_end(entry.element, end);
            let tag_span = self.nodes[entry.tag as usize].span;
            let name = &text[entry.name_span.start as usize..entry.name_span.end as usize];
            self.error(tag_span, format!("missing close tag for '<{name}>'"));
        }
        ParseOutput {
            tree: Tree { nodes: self.nodes },
            diagnostics: self.diagnostics,
        }
    }

    // Scanning primitives.

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn at(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.at(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    /// Consume a name token if one starts here.
    fn scan_name(&mut self) -> Option<Span> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_name_start(c) => self.bump(),
            _ => return None,
        }
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        Some(self.span_from(start))
    }

    // Tree building.

    fn add(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(NodeData {
            kind,
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent as usize].children.push(id);
        id
    }

    fn set_end(&mut self, id: NodeId, end: u32) {
        self.nodes[id as usize].span.end = end;
    }

    fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id as usize].kind = kind;
    }

    /// Innermost open element, or the document.
    fn parent_node(&self) -> NodeId {
        self.open.last().map(|entry| entry.element).unwrap_or(0)
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            message: message.into(),
            span,
        });
    }

    // Productions.

    fn text_run(&mut self) {
        let start = self.pos;
        match self.rest().find('<') {
            Some(i) => self.pos += i,
            None => self.pos = self.text.len(),
        }
        let parent = self.parent_node();
        let span = self.span_from(start);
        self.add(parent, NodeKind::Text, span);
    }

    /// Comment, CDATA, doctype, or processing instruction: an opaque leaf
    /// running from `open_len` already-matched bytes to `close` or EOF.
    fn raw_region(&mut self, kind: NodeKind, open_len: usize, close: &str, what: &str) {
        let start = self.pos;
        self.pos += open_len;
        match self.rest().find(close) {
            Some(i) => self.pos += i + close.len(),
            None => {
                self.pos = self.text.len();
                let span = self.span_from(start);
                self.error(span, format!("unterminated {what}"));
            }
        }
        let parent = self.parent_node();
        let span = self.span_from(start);
        self.add(parent, kind, span);
    }

    fn open_tag(&mut self) {
        let start = self.pos;
        self.pos += 1; // `<`
        let Some(name_span) = self.scan_name() else {
            // Lone `<`: wrap it in an inert element so cursor queries still
            // see a start token, then resume normal scanning after it.
            let parent = self.parent_node();
            let span = self.span_from(start);
            let element = self.add(parent, NodeKind::Element, span);
            let tag = self.add(element, NodeKind::OpenTag, span);
            self.add(tag, NodeKind::StartTag, span);
            trace!(offset = start, "tag name missing after '<'");
            self.error(span, "missing tag name");
            return;
        };

        let parent = self.parent_node();
        let head = Span::new(start as u32, name_span.end);
        let element = self.add(parent, NodeKind::Element, head);
        let tag = self.add(element, NodeKind::OpenTag, head);
        self.add(tag, NodeKind::StartTag, Span::new(start as u32, start as u32 + 1));
        self.add(tag, NodeKind::TagName, name_span);

        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                let end = self.pos as u32;
                self.add(tag, NodeKind::SelfCloseEndTag, Span::new(end - 2, end));
                self.set_kind(tag, NodeKind::SelfClosingTag);
                self.set_end(tag, end);
                self.set_end(element, end);
                return;
            }
            if self.eat(">") {
                let end = self.pos as u32;
                self.add(tag, NodeKind::EndTag, Span::new(end - 1, end));
                self.set_end(tag, end);
                self.set_end(element, end);
                self.open.push(OpenElement { element, tag, name_span });
                return;
            }
            match self.peek() {
                Some('<') | None => {
                    let end = self.pos as u32;
                    self.set_end(tag, end);
                    self.set_end(element, end);
                    let tag_span = self.nodes[tag as usize].span;
                    self.error(tag_span, "unterminated open tag");
                    self.open.push(OpenElement { element, tag, name_span });
                    return;
                }
                Some('=') => {
                    // Stray `=` with no attribute name keeps its token so
                    // cursor classification still sees a value slot.
                    self.add(tag, NodeKind::Is, Span::new(self.pos as u32, self.pos as u32 + 1));
                    self.pos += 1;
                    self.skip_whitespace();
                    if let Some(quote @ ('"' | '\'')) = self.peek() {
                        let span = self.quoted_value(quote);
                        self.add(tag, NodeKind::AttributeValue, span);
                    }
                }
                Some(c) if is_name_start(c) => self.attribute(tag),
                Some(_) => self.bump(),
            }
        }
    }

    fn attribute(&mut self, tag: NodeId) {
        let Some(name_span) = self.scan_name() else {
            return;
        };
        let attr = self.add(tag, NodeKind::Attribute, name_span);
        self.add(attr, NodeKind::AttributeName, name_span);
        self.skip_whitespace();
        if !self.at("=") {
            return;
        }
        self.add(attr, NodeKind::Is, Span::new(self.pos as u32, self.pos as u32 + 1));
        self.pos += 1;
        self.set_end(attr, self.pos as u32);
        self.skip_whitespace();
        if let Some(quote @ ('"' | '\'')) = self.peek() {
            let span = self.quoted_value(quote);
            self.add(attr, NodeKind::AttributeValue, span);
            self.set_end(attr, span.end);
        } else if self.at_value_char() {
            let span = self.unquoted_value();
            self.add(attr, NodeKind::AttributeValue, span);
            self.set_end(attr, span.end);
        }
    }

    /// Quoted value starting at the opening quote. The quotes are part of
    /// the span; an unterminated value runs to end of input.
    fn quoted_value(&mut self, quote: char) -> Span {
        let start = self.pos;
        self.bump();
        match self.rest().find(quote) {
            Some(i) => self.pos += i + quote.len_utf8(),
            None => {
                self.pos = self.text.len();
                let span = self.span_from(start);
                self.error(span, "unterminated attribute value");
            }
        }
        self.span_from(start)
    }

    fn at_value_char(&self) -> bool {
        match self.peek() {
            Some(c) => {
                !c.is_whitespace() && !matches!(c, '<' | '>' | '=' | '"' | '\'') && !self.at("/>")
            }
            None => false,
        }
    }

    fn unquoted_value(&mut self) -> Span {
        let start = self.pos;
        while self.at_value_char() {
            self.bump();
        }
        self.span_from(start)
    }

    fn close_tag(&mut self) {
        let start = self.pos;
        self.pos += 2; // `</`
        let start_close_span = self.span_from(start);
        let name_span = self.scan_name();
        self.skip_whitespace();
        let end_span = if self.eat(">") {
            Some(Span::new((self.pos - 1) as u32, self.pos as u32))
        } else {
            None
        };
        let tag_span = self.span_from(start);
        if end_span.is_none() {
            self.error(tag_span, "unterminated close tag");
        }

        let text = self.text;
        let name = match name_span {
            Some(span) => &text[span.start as usize..span.end as usize],
            None => "",
        };
        let matched = if name.is_empty() {
            None
        } else {
            self.open.iter().rposition(|entry| {
                &text[entry.name_span.start as usize..entry.name_span.end as usize] == name
            })
        };

        let (kind, parent) = match matched {
            Some(index) => {
                // Elements opened after the matched one end here, unclosed.
                while self.open.len() > index + 1 {
                    let Some(entry) = self.open.pop() else { break };
                    self.set_end(entry.element, tag_span.start);
                    let open_span = self.nodes[entry.tag as usize].span;
                    let unclosed =
                        &text[entry.name_span.start as usize..entry.name_span.end as usize];
                    self.error(open_span, format!("missing close tag for '<{unclosed}>'"));
                }
                let Some(owner) = self.open.pop() else { return };
                self.set_end(owner.element, tag_span.end);
                (NodeKind::CloseTag, owner.element)
            }
            None => {
                trace!(offset = start, name, "unmatched close tag");
                self.error(tag_span, format!("unmatched close tag '</{name}>'"));
                (NodeKind::MismatchedCloseTag, self.parent_node())
            }
        };

        let tag = self.add(parent, kind, tag_span);
        self.add(tag, NodeKind::StartCloseTag, start_close_span);
        if let Some(span) = name_span {
            self.add(tag, NodeKind::TagName, span);
        }
        if let Some(span) = end_span {
            self.add(tag, NodeKind::EndTag, span);
        }
    }
}

/// Name characters follow the usual markup rules: ASCII letters, `_`, `:`,
/// or any non-ASCII codepoint start a name; digits, `-`, and `.` may
/// continue one.
fn is_name_start(c: char) -> bool {
    c == '_' || c == ':' || c.is_ascii_alphabetic() || c.len_utf8() > 1
}

fn is_name_char(c: char) -> bool {
    c == '-' || c == '.' || c.is_ascii_digit() || is_name_start(c)
}
