//! Hierarchical filter criteria.
//!
//! A tree of selectable nodes with parent/child enablement and
//! minimum-one-selected section groups, plus the default tree for the
//! five source types.

mod defaults;
mod tree;

pub use defaults::{default_tree, ids, source_for_root};
pub use tree::{FilterError, FilterNode, FilterTree};
