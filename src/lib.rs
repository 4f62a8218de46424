//! sexp - Arena-Backed S-Expression Library
//!
//! A small S-expression engine built for language bindings:
//! - Parsing of the minimal Lispish grammar (parens and opaque atoms)
//! - A flat, index-addressed node store in left-child/right-sibling form
//! - A process-wide, reference-counted intern pool for atom content
//! - Structural mutation: move, remove-with-compaction, clone, extract
//! - An iterative measure-then-write serializer with exact buffer sizing
//! - A C handle API mirroring the safe surface, for embedding
//!
//! ## Quick Start
//!
//! ```rust
//! let tree = sexp::parse(b"(player (pos 1 2) (vel 3 4))").unwrap();
//!
//! let player = tree.root().unwrap();
//! let pos = player.child_by_key(b"pos").unwrap();
//! assert_eq!(pos.child_at(1).unwrap().value().unwrap(), b"1");
//!
//! // Round-trips bit-identically on canonical text.
//! assert_eq!(tree.to_string(), "(player (pos 1 2) (vel 3 4))");
//! ```
//!
//! ## Mutation
//!
//! ```rust
//! let mut tree = sexp::parse(b"(a b c)").unwrap();
//! let a = tree.first_child(0);
//! let b = tree.next_sibling(a);
//! tree.remove(b); // drops `b`, compacts, invalidates old indices
//! assert_eq!(tree.to_string(), "(a c)");
//! ```
//!
//! Atoms are opaque byte runs: no quoting, no escapes, no numeric typing.
//! Equal atom content shares one [`AtomId`] process-wide for as long as any
//! tree is alive.
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug tracing using the `log` crate

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]

pub mod ffi;
pub mod intern;

mod clone;
mod mutate;
mod node;
mod parser;
mod serialize;
mod tokenizer;
mod tree;
mod view;

/// Re-export commonly used types for convenience
pub use intern::AtomId;
pub use node::{NodeKind, NULL_INDEX};
pub use parser::{parse, ParseError};
pub use tree::Sexp;
pub use view::{Children, NodeView};
