//! Schema compilation.
//!
//! Caller-facing declarations ([`ElementSpec`], [`AttrSpec`]) are resolved
//! once into an indexed [`Schema`]: name references become ids, attribute
//! records are shared across the elements that list them, and the
//! completion descriptors every query needs are prebuilt. A compiled
//! schema is immutable afterwards, so it can back any number of
//! interleaved completion requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::completion::{CompletionItem, CompletionKind, ItemOverride};

/// Declares one element kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    pub name: String,
    /// Allowed child elements. `None` allows every known element, an
    /// empty list allows none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    /// Marks a valid document root. When no spec sets this, every
    /// element is a valid root.
    #[serde(default)]
    pub top: bool,
    #[serde(default)]
    pub attributes: Vec<AttrRef>,
    #[serde(default)]
    pub completion: ItemOverride,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(name.into());
        self
    }

    pub fn top(mut self) -> Self {
        self.top = true;
        self
    }

    pub fn attribute(mut self, attr: impl Into<AttrRef>) -> Self {
        self.attributes.push(attr.into());
        self
    }

    pub fn completion(mut self, over: ItemOverride) -> Self {
        self.completion = over;
        self
    }
}

/// An entry in an element's attribute list: a reference to a top-level
/// declaration by name, or an inline declaration. Inline declarations get
/// their own completion record, and their values apply to this element
/// only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrRef {
    Name(String),
    Inline(AttrSpec),
}

impl From<&str> for AttrRef {
    fn from(name: &str) -> Self {
        AttrRef::Name(name.to_owned())
    }
}

impl From<String> for AttrRef {
    fn from(name: String) -> Self {
        AttrRef::Name(name)
    }
}

impl From<AttrSpec> for AttrRef {
    fn from(spec: AttrSpec) -> Self {
        AttrRef::Inline(spec)
    }
}

/// Declares one attribute kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttrSpec {
    pub name: String,
    /// Known values, offered when completing inside this attribute's
    /// value. Empty means free-form, and no values are offered.
    #[serde(default)]
    pub values: Vec<ValueSpec>,
    /// Global attributes are offered on every element without being
    /// listed.
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub completion: ItemOverride,
}

impl AttrSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: impl Into<ValueSpec>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub fn completion(mut self, over: ItemOverride) -> Self {
        self.completion = over;
        self
    }
}

/// A declared attribute value: a plain literal, or a full completion item
/// for callers that want control over the display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    Literal(String),
    Item(CompletionItem),
}

impl From<&str> for ValueSpec {
    fn from(literal: &str) -> Self {
        ValueSpec::Literal(literal.to_owned())
    }
}

impl From<String> for ValueSpec {
    fn from(literal: String) -> Self {
        ValueSpec::Literal(literal)
    }
}

impl From<CompletionItem> for ValueSpec {
    fn from(item: CompletionItem) -> Self {
        ValueSpec::Item(item)
    }
}

pub(crate) type ElementId = usize;
pub(crate) type AttrId = usize;

/// A set of elements, as ids into the schema's element table.
///
/// Every element without a declared child list shares [`ElementSet::All`]
/// instead of listing all ids, which keeps the compiled schema linear in
/// the number of declarations even when most elements nest freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElementSet {
    All,
    Listed(Vec<ElementId>),
}

/// One compiled element with its prebuilt completion descriptors.
///
/// The element's name lives in the schema's `by_name` index and in the
/// descriptor labels; queries read names from the document text, never
/// from here.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    /// The bare name, offered inside an open tag where `<` is already
    /// typed.
    pub(crate) completion: CompletionItem,
    /// `<name`, offered at insertion points.
    pub(crate) open_completion: CompletionItem,
    /// `</name>`, offered at insertion points inside this element.
    /// Boosted so it outranks same-prefix open completions.
    pub(crate) close_completion: CompletionItem,
    /// `name>`, offered when the cursor already sits inside `</`.
    pub(crate) close_name_completion: CompletionItem,
    pub(crate) attrs: Vec<AttrId>,
    /// Value lists this element overrides, keyed by attribute name.
    /// Checked before the schema-wide table, never merged into it.
    pub(crate) attr_values: Option<HashMap<String, Vec<CompletionItem>>>,
    pub(crate) children: ElementSet,
}

/// The compiled schema graph. Build one with [`Schema::compile`], then
/// query it with [`Schema::complete`](crate::Schema::complete).
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) elements: Vec<Element>,
    by_name: HashMap<String, ElementId>,
    /// Completion records for every known attribute, shared by id across
    /// the elements that list them.
    attr_items: Vec<CompletionItem>,
    /// Ids of attributes declared global, offered on every element.
    global_attrs: Vec<AttrId>,
    /// Schema-wide value lists, keyed by attribute name.
    attr_values: HashMap<String, Vec<CompletionItem>>,
    /// Elements allowed at the document top level.
    pub(crate) top: ElementSet,
}

impl Schema {
    /// Resolves element and attribute declarations into a compiled
    /// schema.
    ///
    /// Compilation is tolerant: child references that match no element
    /// are dropped, attribute references that match no declaration are
    /// kept as literal value completions, and duplicate declarations of one
    /// name keep the last. Cross-references are resolved in a second
    /// pass over allocated records, so cyclic or self-referencing child
    /// lists are plain data here, never recursion.
    pub fn compile(element_specs: &[ElementSpec], attr_specs: &[AttrSpec]) -> Self {
        let mut attr_items = Vec::new();
        let mut attr_ids: HashMap<String, AttrId> = HashMap::new();
        let mut global_attrs = Vec::new();
        let mut attr_values = HashMap::new();
        for spec in attr_specs {
            let item =
                CompletionItem::new(&spec.name, CompletionKind::Property).overridden(&spec.completion);
            let id = match attr_ids.get(spec.name.as_str()) {
                Some(&id) => {
                    attr_items[id] = item;
                    global_attrs.retain(|&g| g != id);
                    attr_values.remove(&spec.name);
                    id
                }
                None => {
                    let id = attr_items.len();
                    attr_ids.insert(spec.name.clone(), id);
                    attr_items.push(item);
                    id
                }
            };
            if spec.global {
                global_attrs.push(id);
            }
            if !spec.values.is_empty() {
                attr_values.insert(spec.name.clone(), compile_values(&spec.values));
            }
        }

        let mut elements: Vec<Element> = Vec::new();
        let mut by_name: HashMap<String, ElementId> = HashMap::new();
        let mut tops: Vec<bool> = Vec::new();
        for spec in element_specs {
            let element =
                compile_element(spec, &mut attr_items, &mut attr_ids, &global_attrs);
            match by_name.get(spec.name.as_str()) {
                Some(&id) => {
                    elements[id] = element;
                    tops[id] = spec.top;
                }
                None => {
                    by_name.insert(spec.name.clone(), elements.len());
                    elements.push(element);
                    tops.push(spec.top);
                }
            }
        }

        // Child references can only be resolved once every element has
        // an id, including forward and cyclic ones.
        for spec in element_specs {
            if let Some(&id) = by_name.get(spec.name.as_str()) {
                elements[id].children = resolve_children(spec, &by_name);
            }
        }

        let flagged: Vec<ElementId> = tops
            .iter()
            .enumerate()
            .filter(|&(_, &top)| top)
            .map(|(id, _)| id)
            .collect();
        let top = if flagged.is_empty() {
            ElementSet::All
        } else {
            ElementSet::Listed(flagged)
        };

        trace!(
            elements = elements.len(),
            attributes = attr_items.len(),
            "compiled schema"
        );
        Schema {
            elements,
            by_name,
            attr_items,
            global_attrs,
            attr_values,
            top,
        }
    }

    pub(crate) fn element(&self, name: &str) -> Option<&Element> {
        self.by_name.get(name).map(|&id| &self.elements[id])
    }

    pub(crate) fn elements_in(&self, set: &ElementSet) -> Vec<&Element> {
        match set {
            ElementSet::All => self.elements.iter().collect(),
            ElementSet::Listed(ids) => ids.iter().map(|&id| &self.elements[id]).collect(),
        }
    }

    /// The attribute completions applicable inside `element`'s open tag,
    /// or the global set when the element is not part of the schema.
    pub(crate) fn attrs_of(&self, element: Option<&Element>) -> Vec<&CompletionItem> {
        let ids = match element {
            Some(element) => &element.attrs,
            None => &self.global_attrs,
        };
        ids.iter().map(|&id| &self.attr_items[id]).collect()
    }

    /// The value completions for `attr_name` on `element`, with the
    /// element's private overrides checked before the schema-wide table.
    /// The element borrows from this schema, so one lifetime covers both
    /// sources.
    pub(crate) fn values_for<'s>(
        &'s self,
        element: Option<&'s Element>,
        attr_name: &str,
    ) -> Option<&'s [CompletionItem]> {
        if let Some(element) = element
            && let Some(over) = &element.attr_values
            && let Some(values) = over.get(attr_name)
        {
            return Some(values);
        }
        self.attr_values.get(attr_name).map(Vec::as_slice)
    }
}

fn compile_element(
    spec: &ElementSpec,
    attr_items: &mut Vec<CompletionItem>,
    attr_ids: &mut HashMap<String, AttrId>,
    global_attrs: &[AttrId],
) -> Element {
    let mut attrs = global_attrs.to_vec();
    let mut attr_values: Option<HashMap<String, Vec<CompletionItem>>> = None;
    for attr in &spec.attributes {
        let id = match attr {
            AttrRef::Name(name) => match attr_ids.get(name.as_str()) {
                Some(&id) => id,
                None => {
                    // Undeclared names still complete, as ad-hoc literal
                    // value entries without values of their own.
                    let id = attr_items.len();
                    attr_ids.insert(name.clone(), id);
                    attr_items.push(CompletionItem::new(name, CompletionKind::Constant));
                    id
                }
            },
            AttrRef::Inline(attr_spec) => {
                if !attr_spec.values.is_empty() {
                    attr_values
                        .get_or_insert_with(HashMap::new)
                        .insert(attr_spec.name.clone(), compile_values(&attr_spec.values));
                }
                let id = attr_items.len();
                attr_items.push(
                    CompletionItem::new(&attr_spec.name, CompletionKind::Property)
                        .overridden(&attr_spec.completion),
                );
                id
            }
        };
        if !attrs.contains(&id) {
            attrs.push(id);
        }
    }

    let completion = CompletionItem::new(&spec.name, CompletionKind::Type).overridden(&spec.completion);
    let relabel = |label: String| {
        let mut item = completion.clone();
        item.label = label;
        item
    };
    let open_completion = relabel(format!("<{}", spec.name));
    let mut close_completion = relabel(format!("</{}>", spec.name));
    close_completion.boost += 2;
    let close_name_completion = relabel(format!("{}>", spec.name));

    Element {
        completion,
        open_completion,
        close_completion,
        close_name_completion,
        attrs,
        attr_values,
        // Placeholder until every element has an id.
        children: ElementSet::All,
    }
}

fn resolve_children(spec: &ElementSpec, by_name: &HashMap<String, ElementId>) -> ElementSet {
    let Some(names) = &spec.children else {
        return ElementSet::All;
    };
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        match by_name.get(name.as_str()) {
            Some(&id) => ids.push(id),
            None => trace!(element = %spec.name, child = %name, "dropping unresolved child"),
        }
    }
    ElementSet::Listed(ids)
}

fn compile_values(values: &[ValueSpec]) -> Vec<CompletionItem> {
    values
        .iter()
        .map(|value| match value {
            ValueSpec::Literal(text) => {
                CompletionItem::new(quoted(text), CompletionKind::Constant)
            }
            ValueSpec::Item(item) => {
                let mut item = item.clone();
                item.label = quoted(&item.label);
                item
            }
        })
        .collect()
}

/// Values are offered pre-quoted. Labels that already start with a quote
/// are taken as-is, so callers can hand-craft the quoting.
fn quoted(text: &str) -> String {
    if text.starts_with('"') {
        text.to_owned()
    } else {
        format!("\"{text}\"")
    }
}
