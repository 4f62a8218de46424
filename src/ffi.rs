//! C ABI for the S-expression library.
//!
//! This module is the handle surface a language binding consumes: opaque
//! tree handles, index-based navigation, structural mutation, and the
//! intern pool lifecycle, all exposed as plain C functions.
//!
//! # Overview
//!
//! Trees are opaque `Sexp` pointers created by [`sexp_parse`],
//! [`sexp_clone_node`], or [`sexp_extract_node`] and destroyed by
//! [`sexp_free`]. Nodes are addressed by 32-bit indices; the absent node is
//! `SEXP_NULL_INDEX`. Every query on a null handle or an out-of-bounds
//! index answers its documented sentinel instead of failing, and every
//! mutator is a silent no-op on invalid arguments, so the binding layer
//! never has to pre-validate.
//!
//! # Example (C)
//!
//! ```c
//! size_t length = 0;
//! SexpTree *tree = sexp_parse("(a b c)", 7);
//! char *text = sexp_serialize(tree, &length);
//! /* text == "(a b c)", length == 7 */
//! sexp_string_free(text, length);
//! sexp_free(tree);
//! ```
//!
//! # Thread Safety
//!
//! The intern pool is internally synchronised; a single tree must not be
//! used from two threads at once, but distinct trees may be.
//!
//! # Memory Management
//!
//! The caller frees everything it is given: trees with [`sexp_free`],
//! serialized buffers with [`sexp_string_free`]. Buffers are
//! NUL-terminated for convenience, but the length written through the out
//! parameter is authoritative (atoms may legally contain NUL bytes).

use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::intern::{self, AtomId};
use crate::node::{NodeKind, NULL_INDEX};
use crate::parser::parse;
use crate::tree::Sexp;

/// The absent-node sentinel, `2^32 - 1`.
pub const SEXP_NULL_INDEX: u32 = NULL_INDEX;

/// Kind code for atom nodes.
pub const SEXP_NODE_ATOM: c_int = 0;
/// Kind code for list nodes.
pub const SEXP_NODE_LIST: c_int = 1;
/// Kind code answered for out-of-bounds indices and null handles.
pub const SEXP_NODE_INVALID: c_int = 2;

/// Reassembles the caller's (pointer, length) pair into a byte slice. A
/// null pointer is only acceptable for an empty buffer.
unsafe fn input_slice<'a>(pointer: *const c_char, length: usize) -> Option<&'a [u8]> {
    if length == 0 {
        return Some(&[]);
    }
    if pointer.is_null() {
        return None;
    }
    Some(slice::from_raw_parts(pointer as *const u8, length))
}

/// Hands a serialized buffer to the caller: NUL-terminated, exact-size heap
/// allocation, length reported without the terminator.
unsafe fn export_buffer(mut bytes: Vec<u8>, output_length: *mut usize) -> *mut c_char {
    let length = bytes.len();
    bytes.push(0);
    let raw = Box::into_raw(bytes.into_boxed_slice()) as *mut c_char;
    if !output_length.is_null() {
        *output_length = length;
    }
    raw
}

// ============================================================================
// Parse / free
// ============================================================================

/// Parses S-expression text into a new tree.
///
/// Returns a null handle on malformed input (stray `)` or unclosed `(`).
/// Empty input yields a valid empty tree.
///
/// # Safety
///
/// - `input` must point to at least `length` readable bytes (or be null
///   with `length == 0`)
/// - The returned handle must be freed with [`sexp_free`]
#[no_mangle]
pub unsafe extern "C" fn sexp_parse(input: *const c_char, length: usize) -> *mut Sexp {
    let Some(bytes) = input_slice(input, length) else {
        return ptr::null_mut();
    };
    match parse(bytes) {
        Ok(tree) => Box::into_raw(Box::new(tree)),
        Err(_) => ptr::null_mut(),
    }
}

/// Frees a tree and releases its intern pool reference.
///
/// # Safety
///
/// - `tree` must be a handle returned by this API, or null (a no-op)
/// - The handle must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn sexp_free(tree: *mut Sexp) {
    if !tree.is_null() {
        drop(Box::from_raw(tree));
    }
}

// ============================================================================
// Navigation and queries
// ============================================================================

/// Number of nodes in the tree. Zero for a null handle.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_node_count(tree: *const Sexp) -> u32 {
    if tree.is_null() {
        return 0;
    }
    (*tree).len() as u32
}

/// Index of the first child of `index`, or `SEXP_NULL_INDEX`.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_first_child(tree: *const Sexp, index: u32) -> u32 {
    if tree.is_null() {
        return SEXP_NULL_INDEX;
    }
    (*tree).first_child(index)
}

/// Index of the next sibling of `index`, or `SEXP_NULL_INDEX`.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_next_sibling(tree: *const Sexp, index: u32) -> u32 {
    if tree.is_null() {
        return SEXP_NULL_INDEX;
    }
    (*tree).next_sibling(index)
}

/// Index of the parent of `index`, or `SEXP_NULL_INDEX`.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_parent(tree: *const Sexp, index: u32) -> u32 {
    if tree.is_null() {
        return SEXP_NULL_INDEX;
    }
    (*tree).parent(index)
}

/// Kind code of the node at `index`: `SEXP_NODE_ATOM`, `SEXP_NODE_LIST`,
/// or `SEXP_NODE_INVALID` when out of bounds.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_kind(tree: *const Sexp, index: u32) -> c_int {
    if tree.is_null() {
        return SEXP_NODE_INVALID;
    }
    match (*tree).kind(index) {
        NodeKind::Atom => SEXP_NODE_ATOM,
        NodeKind::List => SEXP_NODE_LIST,
        NodeKind::Invalid => SEXP_NODE_INVALID,
    }
}

/// Interned atom id of the node at `index`, or 0 for lists and
/// out-of-bounds indices.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_atom(tree: *const Sexp, index: u32) -> u32 {
    if tree.is_null() {
        return 0;
    }
    (*tree).atom(index).to_raw()
}

/// Replaces the content of the atom at `index`. Silent no-op on lists,
/// out-of-bounds indices, or intern failure.
///
/// # Safety
///
/// - `tree` must be a valid handle or null
/// - `string` must point to at least `length` readable bytes (or be null
///   with `length == 0`)
#[no_mangle]
pub unsafe extern "C" fn sexp_set_atom(
    tree: *mut Sexp,
    index: u32,
    string: *const c_char,
    length: usize,
) {
    if tree.is_null() {
        return;
    }
    if let Some(bytes) = input_slice(string, length) {
        (*tree).set_atom(index, bytes);
    }
}

// ============================================================================
// Structural mutation
// ============================================================================

/// Allocates a new detached node of the given kind code and returns its
/// index, or `SEXP_NULL_INDEX` for an unknown kind or null handle.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_allocate_node(tree: *mut Sexp, kind: c_int) -> u32 {
    if tree.is_null() {
        return SEXP_NULL_INDEX;
    }
    let kind = match kind {
        SEXP_NODE_ATOM => NodeKind::Atom,
        SEXP_NODE_LIST => NodeKind::List,
        _ => return SEXP_NULL_INDEX,
    };
    (*tree).allocate_node(kind)
}

/// Moves `child` under `parent`, first (`after == SEXP_NULL_INDEX`) or
/// immediately following the direct child `after`. Silent no-op on any
/// violated precondition.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_insert(tree: *mut Sexp, parent: u32, after: u32, child: u32) {
    if tree.is_null() {
        return;
    }
    (*tree).insert(parent, after, child);
}

/// Removes the node at `index` and its whole subtree, compacting the
/// survivors. All previously obtained indices into this tree are invalid
/// afterwards.
///
/// # Safety
///
/// `tree` must be a valid handle or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_remove(tree: *mut Sexp, index: u32) {
    if tree.is_null() {
        return;
    }
    (*tree).remove(index);
}

/// Deep-copies the subtree at `index` into a new independent tree. Null on
/// an invalid index or null handle.
///
/// # Safety
///
/// - `tree` must be a valid handle or null
/// - The returned handle must be freed with [`sexp_free`]
#[no_mangle]
pub unsafe extern "C" fn sexp_clone_node(tree: *const Sexp, index: u32) -> *mut Sexp {
    if tree.is_null() {
        return ptr::null_mut();
    }
    match (*tree).clone_subtree(index) {
        Some(cloned) => Box::into_raw(Box::new(cloned)),
        None => ptr::null_mut(),
    }
}

/// Moves the subtree at `index` out into a new tree, removing it from the
/// source. Null on an invalid index, with the source unchanged.
///
/// # Safety
///
/// - `tree` must be a valid handle or null
/// - The returned handle must be freed with [`sexp_free`]
#[no_mangle]
pub unsafe extern "C" fn sexp_extract_node(tree: *mut Sexp, index: u32) -> *mut Sexp {
    if tree.is_null() {
        return ptr::null_mut();
    }
    match (*tree).extract(index) {
        Some(extracted) => Box::into_raw(Box::new(extracted)),
        None => ptr::null_mut(),
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Serializes the whole tree: every top-level form in array order,
/// separated by single spaces. Returns a NUL-terminated heap buffer and
/// writes its length (without the terminator) through `output_length`, or
/// returns null with length 0 for an empty tree.
///
/// # Safety
///
/// - `tree` must be a valid handle or null
/// - `output_length` must be a valid pointer or null
/// - The returned buffer must be freed with [`sexp_string_free`], passing
///   the reported length
#[no_mangle]
pub unsafe extern "C" fn sexp_serialize(tree: *const Sexp, output_length: *mut usize) -> *mut c_char {
    if !output_length.is_null() {
        *output_length = 0;
    }
    if tree.is_null() {
        return ptr::null_mut();
    }
    match (*tree).serialize() {
        Some(bytes) => export_buffer(bytes, output_length),
        None => ptr::null_mut(),
    }
}

/// Serializes only the subtree rooted at `index`. Null on an invalid index
/// or an unmeasurable subtree.
///
/// # Safety
///
/// Same contract as [`sexp_serialize`].
#[no_mangle]
pub unsafe extern "C" fn sexp_serialize_node(
    tree: *const Sexp,
    index: u32,
    output_length: *mut usize,
) -> *mut c_char {
    if !output_length.is_null() {
        *output_length = 0;
    }
    if tree.is_null() {
        return ptr::null_mut();
    }
    match (*tree).serialize_subtree(index) {
        Some(bytes) => export_buffer(bytes, output_length),
        None => ptr::null_mut(),
    }
}

/// Frees a buffer returned by [`sexp_serialize`] or
/// [`sexp_serialize_node`].
///
/// # Safety
///
/// - `string` must be a buffer returned by this API, or null (a no-op)
/// - `length` must be the length reported when the buffer was returned
/// - The buffer must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn sexp_string_free(string: *mut c_char, length: usize) {
    if string.is_null() {
        return;
    }
    // Reconstruct the original allocation: length bytes plus the
    // terminator.
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
        string as *mut u8,
        length + 1,
    )));
}

// ============================================================================
// Intern pool
// ============================================================================

/// Initialises the process-wide intern pool. No-op while the pool is
/// already live. Returns 0.
#[no_mangle]
pub extern "C" fn sexp_intern_init() -> c_int {
    intern::init();
    0
}

/// Interns a byte string, returning its stable non-zero id, or 0 when the
/// pool is not initialised.
///
/// # Safety
///
/// `string` must point to at least `length` readable bytes (or be null
/// with `length == 0`).
#[no_mangle]
pub unsafe extern "C" fn sexp_intern_string(string: *const c_char, length: usize) -> u32 {
    match input_slice(string, length) {
        Some(bytes) => intern::intern(bytes).to_raw(),
        None => 0,
    }
}

/// Looks up interned content by id. Returns a pointer to NUL-terminated
/// bytes inside the pool and writes the authoritative length through
/// `output_length`, or returns null for unknown ids.
///
/// The pointer stays valid until the pool's reference count reaches zero.
///
/// # Safety
///
/// `output_length` must be a valid pointer or null.
#[no_mangle]
pub unsafe extern "C" fn sexp_intern_lookup(atom_id: u32, output_length: *mut usize) -> *const c_char {
    match intern::lookup_raw(AtomId::from_raw(atom_id)) {
        Some((pointer, length)) => {
            if !output_length.is_null() {
                *output_length = length;
            }
            pointer as *const c_char
        }
        None => {
            if !output_length.is_null() {
                *output_length = 0;
            }
            ptr::null()
        }
    }
}

/// Retains a reference to the intern pool.
#[no_mangle]
pub extern "C" fn sexp_intern_retain() {
    intern::retain();
}

/// Releases a reference to the intern pool; the last release frees it.
#[no_mangle]
pub extern "C" fn sexp_intern_release() {
    intern::release();
}

// ============================================================================
// Tests
// ============================================================================
