//! Stack-driven parser emitting nodes into a flat tree.
//!
//! The parser never recurses: list nesting is tracked by an explicit stack
//! of frames, each holding a list node and its last appended child so that
//! appends are O(1). The stack stores its common case inline and spills to
//! the heap only past [`PARSE_STACK_INLINE_CAPACITY`] levels of nesting,
//! so arbitrarily deep inputs cost heap, never call stack.

use std::fmt;

use smallvec::SmallVec;

use crate::intern;
use crate::node::{NodeKind, NODE_ARRAY_INITIAL_CAPACITY, NULL_INDEX};
use crate::tokenizer::{Token, Tokenizer};
use crate::tree::Sexp;

/// Logging macro - no-op when the logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macro - uses the log crate when the logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

/// Frames kept inline in the parse stack before spilling to the heap.
pub(crate) const PARSE_STACK_INLINE_CAPACITY: usize = 32;

/// Why a parse failed. All failures are structural; atoms themselves cannot
/// be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A `)` appeared with no list open.
    UnbalancedClose,
    /// The input ended with one or more lists still open.
    UnclosedList,
    /// The intern pool refused an atom.
    PoolExhausted,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnbalancedClose => write!(f, "unexpected ')' with no open list"),
            ParseError::UnclosedList => write!(f, "input ended with unclosed '('"),
            ParseError::PoolExhausted => write!(f, "intern pool rejected atom content"),
        }
    }
}

impl std::error::Error for ParseError {}

/// One open list during parsing: the list node plus its last appended
/// child, cached so sibling chains never need re-walking.
struct Frame {
    node: u32,
    last_child: u32,
}

/// Splices `child` onto the end of the frame's child list and records it as
/// the new last child.
fn append_child(tree: &mut Sexp, frame: &mut Frame, child: u32) {
    tree.nodes[child as usize].parent = frame.node;
    if frame.last_child == NULL_INDEX {
        tree.nodes[frame.node as usize].first_child = child;
    } else {
        tree.nodes[frame.last_child as usize].next_sibling = child;
    }
    frame.last_child = child;
}

/// Parses S-expression text into a tree.
///
/// The grammar accepts whitespace-separated `(`, `)`, and atom tokens,
/// where an atom is any maximal run of bytes that are neither ASCII
/// whitespace nor a parenthesis. Multiple top-level forms are allowed;
/// empty input yields a valid empty tree.
///
/// On error nothing is retained: the partial tree is discarded and the
/// intern pool reference taken at entry is released. Interned atoms from
/// the failed parse stay in the pool (deduplication makes them free to
/// re-intern).
///
/// # Example
///
/// ```
/// let tree = sexp::parse(b"(a (b c) d)").unwrap();
/// assert_eq!(tree.len(), 6);
/// assert_eq!(tree.to_string(), "(a (b c) d)");
/// ```
pub fn parse(input: &[u8]) -> Result<Sexp, ParseError> {
    intern::init();
    let mut tree = Sexp::with_node_capacity(NODE_ARRAY_INITIAL_CAPACITY.min(input.len()));
    let mut stack: SmallVec<[Frame; PARSE_STACK_INLINE_CAPACITY]> = SmallVec::new();
    let mut tokenizer = Tokenizer::new(input);

    loop {
        match tokenizer.next_token() {
            Token::End => break,
            Token::LeftParen => {
                let index = tree.alloc_node();
                if index == NULL_INDEX {
                    return Err(ParseError::PoolExhausted);
                }
                tree.nodes[index as usize].kind = NodeKind::List;
                if let Some(frame) = stack.last_mut() {
                    append_child(&mut tree, frame, index);
                }
                stack.push(Frame {
                    node: index,
                    last_child: NULL_INDEX,
                });
            }
            Token::RightParen => {
                if stack.pop().is_none() {
                    return Err(ParseError::UnbalancedClose);
                }
            }
            Token::Atom(bytes) => {
                let atom_id = intern::intern(bytes);
                if atom_id.is_null() {
                    return Err(ParseError::PoolExhausted);
                }
                let index = tree.alloc_node();
                if index == NULL_INDEX {
                    return Err(ParseError::PoolExhausted);
                }
                tree.nodes[index as usize].atom_id = atom_id;
                if let Some(frame) = stack.last_mut() {
                    append_child(&mut tree, frame, index);
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::UnclosedList);
    }

    log_debug!("parsed {} nodes from {} input bytes", tree.len(), input.len());
    Ok(tree)
}
