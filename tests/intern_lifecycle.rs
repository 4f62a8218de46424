//! Intern pool lifecycle test
//!
//! The pool is process-wide, so this test runs alone in its own integration
//! binary: nothing else in this process touches the pool, which makes the
//! full release-to-zero and re-initialisation sequence deterministic.

use sexp::{intern, parse, AtomId};

#[test]
fn test_pool_tears_down_and_reinitializes() {
    // --- First generation ---
    intern::init();
    intern::retain();

    let alpha = intern::intern(b"alpha");
    assert!(!alpha.is_null());
    assert_eq!(intern::lookup(alpha).as_deref(), Some(&b"alpha"[..]));

    // A tree holds its own reference; dropping it must not tear the pool
    // down while our explicit retain is outstanding.
    let tree = parse(b"(alpha beta)").unwrap();
    let beta = tree.atom(tree.child_at(0, 1));
    drop(tree);
    assert_eq!(intern::lookup(alpha).as_deref(), Some(&b"alpha"[..]));
    assert_eq!(intern::lookup(beta).as_deref(), Some(&b"beta"[..]));

    // --- Full release ---
    intern::release();

    // Every id from the dead generation now misses, and interning without
    // re-initialisation yields the null id.
    assert_eq!(intern::lookup(alpha), None);
    assert_eq!(intern::lookup(beta), None);
    assert!(intern::intern(b"orphan").is_null());

    // --- Second generation ---
    intern::init();
    intern::retain();

    let gamma = intern::intern(b"gamma");
    assert!(!gamma.is_null());
    assert_eq!(intern::lookup(gamma).as_deref(), Some(&b"gamma"[..]));

    // Ids are assigned densely from 1 in a fresh pool.
    assert_eq!(gamma, AtomId::from_raw(1));
    assert_eq!(intern::intern(b"delta"), AtomId::from_raw(2));

    // Parsing works against the re-initialised pool.
    let tree = parse(b"(gamma)").unwrap();
    assert_eq!(tree.atom(tree.child_at(0, 0)), gamma);
    drop(tree);

    intern::release();
    assert_eq!(intern::lookup(gamma), None);
}
