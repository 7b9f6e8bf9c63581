//! Directory tree synthesized from key prefixes
//!
//! - [`lazy::KeyTree`] - node arena, populated one level per expand
//! - [`directory`] - folder creation through marker objects

pub mod directory;
pub mod lazy;
pub mod node;

pub use lazy::{KeyTree, ROOT};
pub use node::{KeyTreeNode, NodeId, NodeKind};
