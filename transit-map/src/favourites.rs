//! Favourited objects, persisted across sessions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::warn;

use crate::domain::{FavouriteKey, ObjectType};
use crate::storage::{self, KeyValueStore, keys};

/// Mapping of object type to favourited natural ids.
///
/// Mutated only via [`Favourites::toggle`], which persists the full
/// mapping immediately. Persistence failures are logged and never block
/// the next toggle.
pub struct Favourites {
    map: BTreeMap<ObjectType, BTreeSet<String>>,
    store: Arc<dyn KeyValueStore>,
}

impl Favourites {
    /// Load the persisted mapping, or start empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let map = match store.get(keys::FAVOURITES) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(map) => map,
                Err(e) => {
                    warn!(error = %e, "ignoring malformed favourites; starting empty");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, "failed to read favourites; starting empty");
                BTreeMap::new()
            }
        };

        Self { map, store }
    }

    /// Flip favourite status for a key; returns the new state.
    pub fn toggle(&mut self, key: &FavouriteKey) -> bool {
        let set = self.map.entry(key.object_type).or_default();
        let now_favourite = if set.contains(&key.natural_id) {
            set.remove(&key.natural_id);
            false
        } else {
            set.insert(key.natural_id.clone());
            true
        };

        let emptied = set.is_empty();
        if emptied {
            self.map.remove(&key.object_type);
        }

        self.persist();
        now_favourite
    }

    /// Pure lookup.
    pub fn is_favourite(&self, key: &FavouriteKey) -> bool {
        self.map
            .get(&key.object_type)
            .is_some_and(|set| set.contains(&key.natural_id))
    }

    /// Favourited ids for one object type.
    pub fn ids_for(&self, object_type: ObjectType) -> impl Iterator<Item = &str> {
        self.map
            .get(&object_type)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.map.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.values().all(BTreeSet::is_empty)
    }

    fn persist(&self) {
        match serde_json::to_string(&self.map) {
            Ok(json) => {
                if let Err(e) = self
                    .store
                    .put(keys::FAVOURITES, json, Some(storage::default_ttl()))
                {
                    warn!(error = %e, "failed to persist favourites");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize favourites"),
        }
    }
}
