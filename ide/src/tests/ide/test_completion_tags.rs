//! Open-tag, close-tag, and insertion-point scenarios.

use super::completion_dsl::t;
use crate::{CompletionKind, ElementSpec, MatchPattern, Schema};

#[test]
fn open_tag_offers_declared_children_in_order() {
    t("<doc><$0")
        .expect_labels(&["head", "body"])
        .expect_from(6)
        .expect_valid_for(MatchPattern::Name);
}

#[test]
fn open_tag_at_top_level_offers_root_elements() {
    t("<$0").expect_labels(&["doc"]).expect_from(1);
}

#[test]
fn open_tag_without_child_list_offers_every_element() {
    t("<doc><body><$0").expect_labels(&["doc", "head", "title", "body", "para", "note"]);
}

#[test]
fn open_tag_with_empty_child_list_offers_an_empty_list() {
    // An empty option list is a real answer here, distinct from declining.
    t("<doc><head><title><$0").expect_labels(&[]);
}

#[test]
fn open_tag_options_are_element_typed() {
    t("<doc><$0").expect_kind("head", CompletionKind::Type);
}

#[test]
fn partial_tag_name_anchors_at_the_name_start() {
    t("<doc><he$0").expect_labels(&["head", "body"]).expect_from(6);
}

#[test]
fn open_tag_inside_unknown_parent_offers_every_element() {
    t("<mystery><$0").expect_contains(&["doc", "note"]);
}

#[test]
fn self_referencing_element_offers_itself() {
    let schema = Schema::compile(&[ElementSpec::new("x").child("x")], &[]);
    t("<x><$0").schema(schema).expect_labels(&["x"]);
}

#[test]
fn cyclic_child_lists_offer_the_cycle_members() {
    let schema = Schema::compile(
        &[
            ElementSpec::new("a").child("b"),
            ElementSpec::new("b").child("a"),
        ],
        &[],
    );
    t("<a><b><$0").schema(schema).expect_labels(&["a"]);
}

#[test]
fn close_tag_offers_exactly_the_open_element() {
    t("<doc>x</$0")
        .expect_labels(&["doc>"])
        .expect_from(8)
        .expect_to(None)
        .expect_valid_for(MatchPattern::Name);
}

#[test]
fn close_tag_swallows_a_trailing_closer() {
    t("<doc></$0>")
        .expect_labels(&["doc>"])
        .expect_to(Some(8))
        .expect_applies_to("doc>", "<doc></doc>");
}

#[test]
fn close_tag_inside_partial_name_replaces_the_whole_name() {
    t("<doc>x</do$0").expect_labels(&["doc>"]).expect_from(8);
}

#[test]
fn close_tag_for_unknown_element_synthesizes_its_name() {
    t("<mystery></$0")
        .expect_labels(&["mystery>"])
        .expect_kind("mystery>", CompletionKind::Type);
}

#[test]
fn close_tag_at_top_level_declines() {
    t("</$0").expect_none();
}

#[test]
fn insertion_point_offers_close_then_children() {
    t("<doc>$0</doc>")
        .expect_labels(&["</doc>", "<head", "<body"])
        .expect_valid_for(MatchPattern::Tag)
        .expect_boost("</doc>", 2);
}

#[test]
fn insertion_point_declines_implicit_requests() {
    t("<doc>$0</doc>").implicit().expect_none();
}

#[test]
fn insertion_at_top_level_offers_roots_without_a_close() {
    t("$0").expect_labels(&["<doc"]);
}

#[test]
fn insertion_inside_text_of_an_open_element() {
    t("<doc><head>x$0").expect_labels(&["</head>", "<title"]);
}

#[test]
fn insertion_inside_unknown_element_offers_its_close_and_everything() {
    t("<mystery>$0")
        .expect_contains(&["</mystery>", "<doc", "<note"])
        .expect_boost("</mystery>", 2);
}

#[test]
fn insertion_after_closed_sibling_uses_the_outer_scope() {
    t("<doc><head></head>$0</doc>").expect_labels(&["</doc>", "<head", "<body"]);
}
