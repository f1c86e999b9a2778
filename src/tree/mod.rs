//! The mutable document tree: arena storage, XML I/O, and persistence.

pub mod arena;
pub mod store;
pub mod xml;

pub use arena::{Node, NodeId, NodeKind, Tree};
pub use store::DocumentStore;
