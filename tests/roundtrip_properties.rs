//! Property-based tests using proptest
//!
//! These tests verify the round-trip laws over generated trees: parsing a
//! rendering recovers the canonical text, serialization is idempotent, and
//! clone/extract preserve subtree content.

use proptest::prelude::*;
use sexp::parse;

/// A generated S-expression form. Rendering it twice - once canonically,
/// once with deterministic whitespace noise - gives each law a malformed
/// and a normal-form view of the same tree.
#[derive(Debug, Clone)]
enum Form {
    Atom(String),
    List(Vec<Form>),
}

fn form_strategy() -> impl Strategy<Value = Form> {
    // Atom bytes: anything that is not whitespace or a parenthesis.
    let leaf = "[a-zA-Z0-9_+*/=.!?<>-]{1,8}".prop_map(Form::Atom);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Form::List)
    })
}

fn render_canonical(form: &Form, out: &mut String) {
    match form {
        Form::Atom(content) => out.push_str(content),
        Form::List(children) => {
            out.push('(');
            for (position, child) in children.iter().enumerate() {
                if position > 0 {
                    out.push(' ');
                }
                render_canonical(child, out);
            }
            out.push(')');
        }
    }
}

/// Same tree, but every separator is a gratuitous whitespace run.
fn render_noisy(form: &Form, out: &mut String) {
    match form {
        Form::Atom(content) => out.push_str(content),
        Form::List(children) => {
            out.push_str("( \t");
            for child in children {
                render_noisy(child, out);
                out.push_str(" \r\n ");
            }
            out.push(')');
        }
    }
}

fn canonical(forms: &[Form]) -> String {
    let mut out = String::new();
    for (position, form) in forms.iter().enumerate() {
        if position > 0 {
            out.push(' ');
        }
        render_canonical(form, &mut out);
    }
    out
}

fn noisy(forms: &[Form]) -> String {
    let mut out = String::new();
    for form in forms {
        out.push_str("  ");
        render_noisy(form, &mut out);
        out.push('\n');
    }
    out
}

proptest! {
    /// Parsing any rendering and serializing recovers the canonical text
    /// (whitespace runs collapse to single spaces, nothing else changes).
    #[test]
    fn prop_parse_serialize_canonicalizes(forms in prop::collection::vec(form_strategy(), 0..4)) {
        let tree = parse(noisy(&forms).as_bytes()).expect("generated input must parse");
        let expected = canonical(&forms);
        let serialized = tree.serialize().map(|bytes| String::from_utf8(bytes).unwrap());
        prop_assert_eq!(serialized.unwrap_or_default(), expected);
    }

    /// serialize . parse is the identity on canonical text.
    #[test]
    fn prop_serialize_is_idempotent(forms in prop::collection::vec(form_strategy(), 1..4)) {
        let canonical_text = canonical(&forms);
        let once = parse(canonical_text.as_bytes()).unwrap().serialize().unwrap();
        let twice = parse(&once).unwrap().serialize().unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once, canonical_text.into_bytes());
    }

    /// A clone of any node serializes exactly like the subtree it copied.
    #[test]
    fn prop_clone_preserves_subtrees(form in form_strategy()) {
        let mut text = String::new();
        render_canonical(&form, &mut text);
        let tree = parse(text.as_bytes()).unwrap();

        for index in 0..tree.len() as u32 {
            let cloned = tree.clone_subtree(index).unwrap();
            prop_assert_eq!(cloned.serialize(), tree.serialize_subtree(index));
        }
    }

    /// Extraction is clone + remove: the pulled tree matches the pre-state
    /// clone and the source matches the pre-state with a plain remove.
    #[test]
    fn prop_extract_is_clone_then_remove(form in form_strategy(), selector in any::<prop::sample::Index>()) {
        let mut text = String::new();
        render_canonical(&form, &mut text);

        let reference = parse(text.as_bytes()).unwrap();
        let mut extracted_from = parse(text.as_bytes()).unwrap();
        let mut removed_from = parse(text.as_bytes()).unwrap();

        let target = selector.index(reference.len()) as u32;
        let pulled = extracted_from.extract(target).unwrap();
        removed_from.remove(target);

        prop_assert_eq!(pulled.serialize(), reference.clone_subtree(target).unwrap().serialize());
        prop_assert_eq!(extracted_from.serialize(), removed_from.serialize());
    }

    /// Interned ids agree with content equality across a whole tree.
    #[test]
    fn prop_atom_ids_match_content(forms in prop::collection::vec(form_strategy(), 1..3)) {
        let tree = parse(canonical(&forms).as_bytes()).unwrap();

        let atoms: Vec<(u32, Vec<u8>)> = (0..tree.len() as u32)
            .filter(|&index| tree.kind(index) == sexp::NodeKind::Atom)
            .map(|index| (index, tree.value(index).unwrap()))
            .collect();

        for (left, left_value) in &atoms {
            for (right, right_value) in &atoms {
                let ids_equal = tree.atom(*left) == tree.atom(*right);
                prop_assert_eq!(ids_equal, left_value == right_value);
            }
        }
    }
}
