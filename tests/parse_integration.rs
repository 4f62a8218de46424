//! Integration tests for end-to-end parse, navigation, and serialization
//!
//! These tests cover the core scenarios a binding layer relies on:
//! - Single atoms and flat lists
//! - Nested lists and multiple top-level forms
//! - Canonical whitespace collapsing
//! - Error handling for malformed input

use sexp::{intern, parse, NodeKind, ParseError, NULL_INDEX};

fn text(tree: &sexp::Sexp) -> String {
    tree.to_string()
}

// ============================================================================
// Atom Tests
// ============================================================================

#[test]
fn test_single_atom_end_to_end() {
    let tree = parse(b"foo").expect("Should parse a bare atom");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.kind(0), NodeKind::Atom);
    assert_eq!(intern::lookup(tree.atom(0)).as_deref(), Some(&b"foo"[..]));
    assert_eq!(text(&tree), "foo");
}

#[test]
fn test_atoms_are_opaque() {
    // Quotes, dots, signs: all just atom bytes.
    let tree = parse(b"(\"str\" -42 3.14 #t)").unwrap();
    assert_eq!(text(&tree), "(\"str\" -42 3.14 #t)");
}

// ============================================================================
// List Tests
// ============================================================================

#[test]
fn test_flat_list_end_to_end() {
    let tree = parse(b"(a b c)").expect("Should parse a flat list");
    assert_eq!(tree.len(), 4);

    let first = tree.first_child(0);
    let mut walked = Vec::new();
    let mut child = first;
    while child != NULL_INDEX {
        walked.push(tree.value(child).unwrap());
        child = tree.next_sibling(child);
    }
    assert_eq!(walked, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    assert_eq!(text(&tree), "(a b c)");
}

#[test]
fn test_nested_list_end_to_end() {
    let tree = parse(b"(a (b c) d)").expect("Should parse nesting");
    assert_eq!(tree.len(), 6);

    let second = tree.child_at(0, 1);
    assert_eq!(tree.kind(second), NodeKind::List);
    assert_eq!(tree.child_count(second), 2);
    assert_eq!(tree.value(tree.child_at(second, 0)).as_deref(), Some(&b"b"[..]));
    assert_eq!(tree.value(tree.child_at(second, 1)).as_deref(), Some(&b"c"[..]));
    assert_eq!(text(&tree), "(a (b c) d)");
}

#[test]
fn test_multiple_top_level_forms() {
    let tree = parse(b"(a) b (c d)").unwrap();
    assert_eq!(text(&tree), "(a) b (c d)");
}

#[test]
fn test_keyed_structure_roundtrip_is_bit_identical() {
    let input = b"(player (pos 1 2) (vel 3 4))";
    let tree = parse(input).unwrap();
    assert_eq!(tree.serialize().as_deref(), Some(&input[..]));

    let vel = tree.child_by_key(0, b"vel");
    assert_ne!(vel, NULL_INDEX);
    assert_eq!(tree.value(tree.child_at(vel, -1)).as_deref(), Some(&b"4"[..]));
}

// ============================================================================
// Whitespace Tests
// ============================================================================

#[test]
fn test_whitespace_runs_collapse() {
    let tree = parse(b" \t( a\r\n  ( b   c )\nd ) ").unwrap();
    assert_eq!(text(&tree), "(a (b c) d)");
}

#[test]
fn test_serialize_then_parse_is_stable() {
    let tree = parse(b"(deeply ( nested (  forms   x)) y)").unwrap();
    let canonical = tree.serialize().unwrap();
    let reparsed = parse(&canonical).unwrap();
    assert_eq!(reparsed.serialize().as_deref(), Some(&canonical[..]));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_unclosed_paren_fails() {
    assert_eq!(parse(b"(a b").unwrap_err(), ParseError::UnclosedList);
    assert_eq!(parse(b"((a)").unwrap_err(), ParseError::UnclosedList);
}

#[test]
fn test_stray_close_fails() {
    assert_eq!(parse(b")").unwrap_err(), ParseError::UnbalancedClose);
    assert_eq!(parse(b"a) b").unwrap_err(), ParseError::UnbalancedClose);
}

#[test]
fn test_error_messages_are_descriptive() {
    let message = parse(b"(").unwrap_err().to_string();
    assert!(message.contains("unclosed"));
    let message = parse(b")").unwrap_err().to_string();
    assert!(message.contains("')'"));
}

#[test]
fn test_empty_input_is_a_valid_empty_tree() {
    let tree = parse(b"").unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.serialize(), None);
    assert_eq!(text(&tree), "");
}
