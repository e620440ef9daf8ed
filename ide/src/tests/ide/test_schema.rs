//! Resolution properties of the compiled schema graph.

use syntax::parse;

use super::completion_dsl::demo_schema;
use crate::schema::ElementSet;
use crate::{
    AttrSpec, CompletionItem, CompletionKind, CompletionRequest, ElementSpec, ItemOverride, Schema,
};

#[test]
fn undeclared_child_list_shares_the_full_set() {
    let schema = demo_schema();
    assert_eq!(schema.element("body").unwrap().children, ElementSet::All);
}

#[test]
fn empty_child_list_allows_nothing() {
    let schema = demo_schema();
    assert_eq!(
        schema.element("title").unwrap().children,
        ElementSet::Listed(Vec::new())
    );
}

#[test]
fn child_references_resolve_in_declaration_order() {
    let schema = demo_schema();
    // doc allows head then body, declared second and fourth.
    assert_eq!(
        schema.element("doc").unwrap().children,
        ElementSet::Listed(vec![1, 3])
    );
}

#[test]
fn unresolved_child_names_are_dropped() {
    let schema = Schema::compile(
        &[
            ElementSpec::new("a").child("ghost").child("b"),
            ElementSpec::new("b"),
        ],
        &[],
    );
    assert_eq!(
        schema.element("a").unwrap().children,
        ElementSet::Listed(vec![1])
    );
}

#[test]
fn forward_and_self_references_resolve() {
    let schema = Schema::compile(
        &[
            ElementSpec::new("a").child("b").child("a"),
            ElementSpec::new("b").child("a"),
        ],
        &[],
    );
    assert_eq!(
        schema.element("a").unwrap().children,
        ElementSet::Listed(vec![1, 0])
    );
    assert_eq!(
        schema.element("b").unwrap().children,
        ElementSet::Listed(vec![0])
    );
}

#[test]
fn top_set_defaults_to_every_element() {
    let schema = Schema::compile(&[ElementSpec::new("a"), ElementSpec::new("b")], &[]);
    assert_eq!(schema.top, ElementSet::All);
}

#[test]
fn top_set_narrows_to_flagged_elements() {
    assert_eq!(demo_schema().top, ElementSet::Listed(vec![0]));
}

#[test]
fn later_duplicate_declaration_replaces_the_earlier() {
    let schema = Schema::compile(
        &[
            ElementSpec::new("a").child("a"),
            ElementSpec::new("b"),
            ElementSpec::new("a"),
        ],
        &[],
    );
    assert_eq!(schema.elements.len(), 2);
    assert_eq!(schema.element("a").unwrap().children, ElementSet::All);
}

#[test]
fn listing_a_global_attr_does_not_duplicate_it() {
    let schema = Schema::compile(
        &[ElementSpec::new("a").attribute("id")],
        &[AttrSpec::new("id").global()],
    );
    let attrs = schema.attrs_of(schema.element("a"));
    let labels: Vec<&str> = attrs.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, ["id"]);
}

#[test]
fn unknown_attr_reference_falls_back_to_a_literal_value_entry() {
    let schema = Schema::compile(&[ElementSpec::new("a").attribute("custom")], &[]);
    let attrs = schema.attrs_of(schema.element("a"));
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs[0].label, "custom");
    assert_eq!(attrs[0].kind, CompletionKind::Constant);
}

#[test]
fn values_are_prequoted_unless_already_quoted() {
    let schema = Schema::compile(
        &[],
        &[AttrSpec::new("q").value("plain").value("\"handmade\"")],
    );
    let values = schema.values_for(None, "q").unwrap();
    let labels: Vec<&str> = values.iter().map(|v| v.label.as_str()).collect();
    assert_eq!(labels, ["\"plain\"", "\"handmade\""]);
}

#[test]
fn element_value_overrides_never_leak_into_the_base() {
    fn labels<'a>(values: &'a [CompletionItem]) -> Vec<&'a str> {
        values.iter().map(|v| v.label.as_str()).collect()
    }
    let schema = demo_schema();
    let note = schema.element("note");
    let para = schema.element("para");
    assert_eq!(
        labels(schema.values_for(note, "align").unwrap()),
        ["\"justify\""]
    );
    assert_eq!(
        labels(schema.values_for(para, "align").unwrap()),
        ["\"left\"", "\"right\"", "\"center\""]
    );
    assert_eq!(
        labels(schema.values_for(None, "align").unwrap()),
        ["\"left\"", "\"right\"", "\"center\""]
    );
}

#[test]
fn caller_overrides_flow_into_every_descriptor() {
    let specs = [ElementSpec::new("a")
        .completion(ItemOverride::new().detail("container").boost(1))];
    let schema = Schema::compile(&specs, &[]);
    let a = schema.element("a").unwrap();
    assert_eq!(a.completion.label, "a");
    assert_eq!(a.completion.detail.as_deref(), Some("container"));
    assert_eq!(a.completion.boost, 1);
    assert_eq!(a.open_completion.label, "<a");
    assert_eq!(a.open_completion.detail.as_deref(), Some("container"));
    assert_eq!(a.close_completion.label, "</a>");
    assert_eq!(a.close_completion.boost, 3);
    assert_eq!(a.close_name_completion.label, "a>");
}

#[test]
fn completion_is_idempotent_on_an_unchanged_document() {
    let schema = demo_schema();
    let text = "<doc><";
    let out = parse(text);
    let request = CompletionRequest {
        tree: &out.tree,
        text,
        pos: 6,
        explicit: true,
    };
    assert_eq!(schema.complete(&request), schema.complete(&request));
}

#[test]
fn schema_is_shareable_across_requests() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema>();
}
