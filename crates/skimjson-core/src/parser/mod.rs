//! Zero-copy value scanner
//!
//! The scanner never builds a tree. [`parse`] locates the root value, and
//! every navigation step re-scans only the span of the value it starts from.
//! Malformed input degrades to an invalid [`Node`]; nothing here panics or
//! returns an error.

mod from_node;
mod node;
pub mod number;
mod scan;
mod unescape;

pub use from_node::FromNode;
pub use node::{Elements, Members, Node, NodeKind, parse};
pub use unescape::unescape;
