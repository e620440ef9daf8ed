//! One completion strategy per [`LocationKind`], each combining the
//! classified cursor position with the compiled schema.

use syntax::{NodeKind, NodeRef, Span};

use crate::completion::{CompletionItem, CompletionKind, CompletionResult, MatchPattern};
use crate::context::{Location, LocationKind};
use crate::schema::{ElementSet, Schema};

pub(crate) fn completion_at(
    schema: &Schema,
    text: &str,
    pos: u32,
    location: Location<'_>,
) -> Option<CompletionResult> {
    match location.kind {
        LocationKind::OpenTag => open_tag_options(schema, text, location),
        LocationKind::CloseTag => close_tag_options(schema, text, pos, location),
        LocationKind::AttrName => attr_name_options(schema, text, location),
        LocationKind::AttrValue => attr_value_options(schema, text, pos, location),
        LocationKind::InsertionPoint => insertion_options(schema, text, location),
    }
}

/// Completing an element name where `<` is already typed: the bare-name
/// descriptors of whatever the scope allows.
fn open_tag_options(
    schema: &Schema,
    text: &str,
    location: Location<'_>,
) -> Option<CompletionResult> {
    let children = match location.context {
        None => schema.elements_in(&schema.top),
        Some(element) => match element_name(text, element).and_then(|name| schema.element(name)) {
            Some(parent) => schema.elements_in(&parent.children),
            None => schema.elements_in(&ElementSet::All),
        },
    };
    Some(CompletionResult {
        from: location.from,
        to: None,
        options: children
            .into_iter()
            .map(|child| child.completion.clone())
            .collect(),
        valid_for: MatchPattern::Name,
    })
}

/// Completing after `</`: exactly one candidate, the name of the element
/// being closed. A `>` already sitting after the cursor is swallowed so
/// accepting never duplicates it.
fn close_tag_options(
    schema: &Schema,
    text: &str,
    pos: u32,
    location: Location<'_>,
) -> Option<CompletionResult> {
    let element = location.context?;
    let name = element_name(text, element)?;
    let option = match schema.element(name) {
        Some(element) => element.close_name_completion.clone(),
        None => CompletionItem::new(format!("{name}>"), CompletionKind::Type),
    };
    Some(CompletionResult {
        from: location.from,
        to: swallow(text, pos, b'>'),
        options: vec![option],
        valid_for: MatchPattern::Name,
    })
}

fn attr_name_options(
    schema: &Schema,
    text: &str,
    location: Location<'_>,
) -> Option<CompletionResult> {
    let tag = location.context?;
    let element = tag_name(text, tag).and_then(|name| schema.element(name));
    Some(CompletionResult {
        from: location.from,
        to: None,
        options: schema.attrs_of(element).into_iter().cloned().collect(),
        valid_for: MatchPattern::Name,
    })
}

/// Completing inside an attribute value. Declines when the owning
/// attribute cannot be recovered or declares no values; a lone closing
/// quote after the cursor is swallowed, never more than one.
fn attr_value_options(
    schema: &Schema,
    text: &str,
    pos: u32,
    location: Location<'_>,
) -> Option<CompletionResult> {
    let tag = location.context?;
    let attr = owning_attr_name(text, tag, location.from)?;
    let element = tag_name(text, tag).and_then(|name| schema.element(name));
    let values = schema.values_for(element, attr)?;
    if values.is_empty() {
        return None;
    }
    Some(CompletionResult {
        from: location.from,
        to: swallow(text, pos, b'"'),
        options: values.to_vec(),
        valid_for: MatchPattern::Value,
    })
}

/// Completing between tags: a close completion for the enclosing element
/// first, then the `<name` forms of everything allowed here.
fn insertion_options(
    schema: &Schema,
    text: &str,
    location: Location<'_>,
) -> Option<CompletionResult> {
    let mut options = Vec::new();
    let children = match location.context {
        None => schema.elements_in(&schema.top),
        Some(element) => {
            let name = element_name(text, element);
            let parent = name.and_then(|name| schema.element(name));
            match (name, parent) {
                (Some(_), Some(parent)) => options.push(parent.close_completion.clone()),
                (Some(name), None) => options.push(
                    CompletionItem::new(format!("</{name}>"), CompletionKind::Type).with_boost(2),
                ),
                (None, _) => {}
            }
            match parent {
                Some(parent) => schema.elements_in(&parent.children),
                None => schema.elements_in(&ElementSet::All),
            }
        }
    };
    options.extend(
        children
            .into_iter()
            .map(|child| child.open_completion.clone()),
    );
    Some(CompletionResult {
        from: location.from,
        to: None,
        options,
        valid_for: MatchPattern::Tag,
    })
}

/// The name of the element owning `element`, read from its opening tag's
/// name token.
fn element_name<'a>(text: &'a str, element: NodeRef<'_>) -> Option<&'a str> {
    let tag = element.first_child().filter(|tag| tag.kind().is_tag())?;
    tag_name(text, tag)
}

fn tag_name<'a>(text: &'a str, tag: NodeRef<'_>) -> Option<&'a str> {
    let name = tag.child_of_kind(NodeKind::TagName)?;
    let name = slice(text, name.span());
    (!name.is_empty()).then_some(name)
}

/// The attribute name owning the value slot at `before`: the nearest
/// attribute name token earlier in the same tag.
fn owning_attr_name<'a>(text: &'a str, tag: NodeRef<'_>, before: u32) -> Option<&'a str> {
    let name = tag
        .children_of_kind(NodeKind::Attribute)
        .take_while(|attr| attr.span().start < before)
        .filter_map(|attr| attr.child_of_kind(NodeKind::AttributeName))
        .filter(|name| name.span().end <= before)
        .last()?;
    Some(slice(text, name.span()))
}

/// Extends the replaced range past the cursor over one `ch`, so accepting
/// a completion that re-inserts it does not duplicate it.
fn swallow(text: &str, pos: u32, ch: u8) -> Option<u32> {
    (text.as_bytes().get(pos as usize) == Some(&ch)).then_some(pos + 1)
}

fn slice(text: &str, span: Span) -> &str {
    text.get(span.start as usize..span.end as usize).unwrap_or("")
}
