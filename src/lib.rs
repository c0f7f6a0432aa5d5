//! Generic intrusive red-black tree.
//!
//! An ordered associative container built on a parent/child pointer graph,
//! parameterized by a caller-supplied total-order comparator and an
//! optional payload disposer. Supports insertion, removal, membership
//! lookup, and in-order traversal with cooperative early stop.
//!
//! The tree is not internally synchronized; a single owner must serialize
//! all access. Mutation takes `&mut self`, so the type system already
//! rules out unsynchronized concurrent writers.

use thiserror::Error;

mod node;
mod tree;

pub use tree::RbTree;

/// Failure reported by a tree mutation. The tree is left valid and
/// unchanged whenever one of these is returned.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A comparator-equal payload is already in the tree.
    #[error("value already present in the tree")]
    Duplicate,
    /// No payload in the tree compares equal to the one given.
    #[error("value not found in the tree")]
    NotFound,
}
