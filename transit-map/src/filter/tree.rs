//! Filter criteria tree.
//!
//! Nodes form a tree with parent back-references; a node is *enabled*
//! when it and every ancestor are selected, computed by walking the
//! ancestor chain rather than coupling enablement to any rendered state.
//! Deselecting a parent therefore disables its subtree logically without
//! touching the children's own selection bits, so re-selecting the parent
//! restores the prior child selections.
//!
//! Sibling leaves may share a *section group* that must keep at least one
//! member selected at all times; a toggle that would empty such a section
//! is refused without mutating state.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::storage::{self, KeyValueStore, keys};

/// Errors from tree construction and toggling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter node: {0}")]
    UnknownNode(String),

    #[error("duplicate filter node: {0}")]
    DuplicateNode(String),

    #[error("section {section} must keep at least one member selected")]
    MinimumSelection { section: String, node: String },
}

/// A single selectable criterion.
#[derive(Debug, Clone)]
pub struct FilterNode {
    id: String,
    display_name: String,
    parent: Option<String>,
    children: Vec<String>,
    section: Option<String>,
    selected: bool,
}

impl FilterNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Child ids, in insertion order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// The minimum-one-selected group this node belongs to, if any.
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// The filter criteria tree and its selection state.
#[derive(Debug, Clone, Default)]
pub struct FilterTree {
    nodes: HashMap<String, FilterNode>,
    roots: Vec<String>,
}

impl FilterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    ///
    /// `parent` must already exist; `section` marks membership of a
    /// minimum-one-selected group. Optional modifier toggles simply carry
    /// no section.
    pub fn add_node(
        &mut self,
        id: &str,
        display_name: &str,
        parent: Option<&str>,
        section: Option<&str>,
        selected: bool,
    ) -> Result<(), FilterError> {
        if self.nodes.contains_key(id) {
            return Err(FilterError::DuplicateNode(id.to_string()));
        }

        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or_else(|| FilterError::UnknownNode(parent_id.to_string()))?;
                parent_node.children.push(id.to_string());
            }
            None => self.roots.push(id.to_string()),
        }

        self.nodes.insert(
            id.to_string(),
            FilterNode {
                id: id.to_string(),
                display_name: display_name.to_string(),
                parent: parent.map(str::to_string),
                children: Vec::new(),
                section: section.map(str::to_string),
                selected,
            },
        );
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&FilterNode> {
        self.nodes.get(id)
    }

    /// Top-level node ids, in insertion order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Whether a node's own selection bit is set. Unknown ids are false.
    pub fn is_selected(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.selected)
    }

    /// Flip a node's selection.
    ///
    /// Refused when the node is the only selected member of a section
    /// group of size greater than one; the caller surfaces the warning.
    /// Returns the new selection state.
    pub fn toggle(&mut self, id: &str) -> Result<bool, FilterError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| FilterError::UnknownNode(id.to_string()))?;

        if node.selected {
            if let Some(section) = node.section.clone() {
                let members: Vec<&FilterNode> = self
                    .nodes
                    .values()
                    .filter(|n| n.section.as_deref() == Some(section.as_str()))
                    .collect();
                let selected_members = members.iter().filter(|n| n.selected).count();
                if members.len() > 1 && selected_members == 1 {
                    return Err(FilterError::MinimumSelection {
                        section,
                        node: id.to_string(),
                    });
                }
            }
        }

        // Lookup can no longer fail.
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| FilterError::UnknownNode(id.to_string()))?;
        node.selected = !node.selected;
        Ok(node.selected)
    }

    /// Force a node's selection bit (used when restoring snapshots).
    pub fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), FilterError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| FilterError::UnknownNode(id.to_string()))?;
        node.selected = selected;
        Ok(())
    }

    /// A node is enabled when it and every ancestor are selected.
    pub fn is_enabled(&self, id: &str) -> bool {
        let mut current = self.nodes.get(id);
        loop {
            match current {
                None => return false,
                Some(node) if !node.selected => return false,
                Some(node) => match &node.parent {
                    None => return true,
                    Some(parent) => current = self.nodes.get(parent),
                },
            }
        }
    }

    /// The flattened filter state: ids of all enabled leaves.
    pub fn enabled_leaves(&self) -> HashSet<String> {
        self.nodes
            .values()
            .filter(|n| n.is_leaf() && self.is_enabled(&n.id))
            .map(|n| n.id.clone())
            .collect()
    }

    /// Selected node ids, sorted for stable persistence.
    pub fn snapshot(&self) -> Vec<String> {
        let mut selected: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.selected)
            .map(|n| n.id.clone())
            .collect();
        selected.sort();
        selected
    }

    /// Restore a selection snapshot; ids not listed become deselected and
    /// unknown ids are ignored.
    pub fn restore(&mut self, snapshot: &[String]) {
        let selected: HashSet<&str> = snapshot.iter().map(String::as_str).collect();
        for node in self.nodes.values_mut() {
            node.selected = selected.contains(node.id.as_str());
        }
    }

    /// Persist the selection snapshot. Failures are logged, not returned;
    /// persistence never blocks interaction.
    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(&self.snapshot()) {
            Ok(json) => {
                if let Err(e) = store.put(keys::SELECTED_SOURCES, json, Some(storage::default_ttl()))
                {
                    warn!(error = %e, "failed to persist filter selections");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize filter selections"),
        }
    }

    /// Restore the selection snapshot persisted by [`save`], if present.
    pub fn load(&mut self, store: &dyn KeyValueStore) {
        match store.get(keys::SELECTED_SOURCES) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<String>>(&json) {
                Ok(snapshot) => self.restore(&snapshot),
                Err(e) => warn!(error = %e, "ignoring malformed filter selection snapshot"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read filter selections"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    /// A little tree shaped like the real one: a parent with a three-leaf
    /// section plus an optional modifier, and a standalone root.
    fn tree() -> FilterTree {
        let mut t = FilterTree::new();
        t.add_node("trains", "Trains", None, None, true).unwrap();
        t.add_node("mainline", "Mainline", Some("trains"), Some("type"), true)
            .unwrap();
        t.add_node("suburban", "Suburban", Some("trains"), Some("type"), true)
            .unwrap();
        t.add_node("dart", "DART", Some("trains"), Some("type"), true)
            .unwrap();
        t.add_node("parkAndRide", "Must be park-and-ride", Some("trains"), None, false)
            .unwrap();
        t.add_node("stations", "Stations", None, None, true).unwrap();
        t
    }

    #[test]
    fn toggle_flips_selection() {
        let mut t = tree();
        assert!(t.is_selected("mainline"));
        assert_eq!(t.toggle("mainline").unwrap(), false);
        assert!(!t.is_selected("mainline"));
        assert_eq!(t.toggle("mainline").unwrap(), true);
    }

    #[test]
    fn toggle_unknown_node_errors() {
        let mut t = tree();
        assert_eq!(
            t.toggle("nope"),
            Err(FilterError::UnknownNode("nope".into()))
        );
    }

    #[test]
    fn last_selected_section_member_cannot_be_deselected() {
        let mut t = tree();
        t.toggle("mainline").unwrap();
        t.toggle("suburban").unwrap();

        // Only "dart" remains selected in the section.
        let err = t.toggle("dart").unwrap_err();
        assert_eq!(
            err,
            FilterError::MinimumSelection {
                section: "type".into(),
                node: "dart".into(),
            }
        );
        // State is untouched.
        assert!(t.is_selected("dart"));
    }

    #[test]
    fn optional_modifier_is_exempt_from_minimum_rule() {
        let mut t = tree();
        t.toggle("parkAndRide").unwrap();
        assert!(t.is_selected("parkAndRide"));
        // Toggling back off always succeeds: no section.
        t.toggle("parkAndRide").unwrap();
        assert!(!t.is_selected("parkAndRide"));
    }

    #[test]
    fn deselecting_parent_disables_but_preserves_children() {
        let mut t = tree();
        t.toggle("suburban").unwrap();
        t.toggle("trains").unwrap();

        // Children keep their own bits but are no longer enabled.
        assert!(t.is_selected("mainline"));
        assert!(!t.is_enabled("mainline"));
        assert!(!t.is_selected("suburban"));

        // Re-selecting the parent restores the prior child selections.
        t.toggle("trains").unwrap();
        assert!(t.is_enabled("mainline"));
        assert!(!t.is_enabled("suburban"));
        assert!(t.is_enabled("dart"));
    }

    #[test]
    fn enabled_leaves_is_the_flattened_state() {
        let mut t = tree();
        t.toggle("mainline").unwrap();

        let leaves = t.enabled_leaves();
        assert!(!leaves.contains("mainline"));
        assert!(leaves.contains("suburban"));
        assert!(leaves.contains("dart"));
        assert!(leaves.contains("stations"));
        // Parents are not leaves.
        assert!(!leaves.contains("trains"));
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let mut t = tree();
        assert_eq!(
            t.add_node("dart", "DART", None, None, true),
            Err(FilterError::DuplicateNode("dart".into()))
        );
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut t = tree();
        t.toggle("mainline").unwrap();
        t.toggle("parkAndRide").unwrap();
        let snapshot = t.snapshot();

        let mut fresh = tree();
        fresh.restore(&snapshot);
        assert!(!fresh.is_selected("mainline"));
        assert!(fresh.is_selected("parkAndRide"));
        assert!(fresh.is_selected("dart"));
    }

    #[test]
    fn restore_ignores_unknown_ids() {
        let mut t = tree();
        t.restore(&["dart".to_string(), "ghost".to_string()]);
        assert!(t.is_selected("dart"));
        assert!(!t.is_selected("mainline"));
    }

    #[test]
    fn save_load_round_trip_through_store() {
        let store = MemoryStore::new();
        let mut t = tree();
        t.toggle("suburban").unwrap();
        t.save(&store);

        let mut fresh = tree();
        fresh.load(&store);
        assert!(!fresh.is_selected("suburban"));
        assert!(fresh.is_selected("mainline"));
    }

    #[test]
    fn load_with_empty_store_keeps_defaults() {
        let store = MemoryStore::new();
        let mut t = tree();
        t.load(&store);
        assert!(t.is_selected("mainline"));
    }
}
