//! Default criteria tree for the five source types.

use crate::domain::ObjectType;

use super::tree::FilterTree;

/// Stable node ids, shared between the tree and the display predicate.
pub mod ids {
    pub const IRISH_RAIL_TRAINS: &str = "irishRailTrains";
    pub const MAINLINE: &str = "mainline";
    pub const SUBURBAN: &str = "suburban";
    pub const DART: &str = "dart";
    pub const RUNNING: &str = "running";
    pub const NOT_YET_RUNNING: &str = "notYetRunning";
    pub const TERMINATED: &str = "terminated";
    pub const EARLY: &str = "early";
    pub const ON_TIME: &str = "onTime";
    pub const LATE: &str = "late";

    pub const IRISH_RAIL_STATIONS: &str = "irishRailStations";

    pub const LUAS_STOPS: &str = "luasStops";
    pub const LUAS_RED: &str = "luasRed";
    pub const LUAS_GREEN: &str = "luasGreen";
    pub const LUAS_ENABLED: &str = "luasEnabledStops";
    pub const LUAS_DISABLED: &str = "luasDisabledStops";
    pub const LUAS_PARK_AND_RIDE: &str = "luasParkAndRide";
    pub const LUAS_CYCLE_AND_RIDE: &str = "luasCycleAndRide";

    pub const BUS_STOPS: &str = "busStops";
    pub const BUSES: &str = "buses";
}

mod sections {
    pub const TRAIN_TYPE: &str = "trainType";
    pub const TRAIN_STATUS: &str = "trainStatus";
    pub const PUNCTUALITY: &str = "punctuality";
    pub const LUAS_LINE: &str = "luasLine";
    pub const LUAS_ENABLED: &str = "luasEnabled";
}

/// The object type fetched for a top-level source node, if any.
pub fn source_for_root(root_id: &str) -> Option<ObjectType> {
    match root_id {
        ids::IRISH_RAIL_TRAINS => Some(ObjectType::IrishRailTrain),
        ids::IRISH_RAIL_STATIONS => Some(ObjectType::IrishRailStation),
        ids::LUAS_STOPS => Some(ObjectType::LuasStop),
        ids::BUS_STOPS => Some(ObjectType::BusStop),
        ids::BUSES => Some(ObjectType::Bus),
        _ => None,
    }
}

/// Build the default tree: every source selected, every section fully
/// selected, optional Luas modifiers off.
pub fn default_tree() -> FilterTree {
    let mut tree = FilterTree::new();

    // The default tree is statically well-formed; construction cannot fail.
    let mut add = |id: &str, name: &str, parent: Option<&str>, section: Option<&str>, on: bool| {
        tree.add_node(id, name, parent, section, on)
            .expect("default tree is well-formed");
    };

    add(ids::IRISH_RAIL_TRAINS, "Irish Rail Trains", None, None, true);
    add(
        ids::MAINLINE,
        "Mainline",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::TRAIN_TYPE),
        true,
    );
    add(
        ids::SUBURBAN,
        "Suburban",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::TRAIN_TYPE),
        true,
    );
    add(
        ids::DART,
        "DART",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::TRAIN_TYPE),
        true,
    );
    add(
        ids::RUNNING,
        "Running",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::TRAIN_STATUS),
        true,
    );
    add(
        ids::NOT_YET_RUNNING,
        "Not yet running",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::TRAIN_STATUS),
        true,
    );
    add(
        ids::TERMINATED,
        "Terminated",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::TRAIN_STATUS),
        true,
    );
    add(
        ids::EARLY,
        "Early",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::PUNCTUALITY),
        true,
    );
    add(
        ids::ON_TIME,
        "On time",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::PUNCTUALITY),
        true,
    );
    add(
        ids::LATE,
        "Late",
        Some(ids::IRISH_RAIL_TRAINS),
        Some(sections::PUNCTUALITY),
        true,
    );

    add(
        ids::IRISH_RAIL_STATIONS,
        "Irish Rail Stations",
        None,
        None,
        true,
    );

    add(ids::LUAS_STOPS, "Luas Stops", None, None, true);
    add(
        ids::LUAS_RED,
        "Red Line",
        Some(ids::LUAS_STOPS),
        Some(sections::LUAS_LINE),
        true,
    );
    add(
        ids::LUAS_GREEN,
        "Green Line",
        Some(ids::LUAS_STOPS),
        Some(sections::LUAS_LINE),
        true,
    );
    add(
        ids::LUAS_ENABLED,
        "Enabled stops",
        Some(ids::LUAS_STOPS),
        Some(sections::LUAS_ENABLED),
        true,
    );
    add(
        ids::LUAS_DISABLED,
        "Disabled stops",
        Some(ids::LUAS_STOPS),
        Some(sections::LUAS_ENABLED),
        true,
    );
    add(
        ids::LUAS_PARK_AND_RIDE,
        "Must be park-and-ride",
        Some(ids::LUAS_STOPS),
        None,
        false,
    );
    add(
        ids::LUAS_CYCLE_AND_RIDE,
        "Must be cycle-and-ride",
        Some(ids::LUAS_STOPS),
        None,
        false,
    );

    add(ids::BUS_STOPS, "Bus Stops", None, None, true);
    add(ids::BUSES, "Buses", None, None, true);

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_roots_in_order() {
        let tree = default_tree();
        assert_eq!(
            tree.roots(),
            &[
                ids::IRISH_RAIL_TRAINS.to_string(),
                ids::IRISH_RAIL_STATIONS.to_string(),
                ids::LUAS_STOPS.to_string(),
                ids::BUS_STOPS.to_string(),
                ids::BUSES.to_string(),
            ]
        );
    }

    #[test]
    fn everything_enabled_by_default_except_modifiers() {
        let tree = default_tree();
        let leaves = tree.enabled_leaves();

        assert!(leaves.contains(ids::DART));
        assert!(leaves.contains(ids::RUNNING));
        assert!(leaves.contains(ids::LATE));
        assert!(leaves.contains(ids::LUAS_GREEN));
        assert!(leaves.contains(ids::BUSES));
        assert!(!leaves.contains(ids::LUAS_PARK_AND_RIDE));
        assert!(!leaves.contains(ids::LUAS_CYCLE_AND_RIDE));
    }

    #[test]
    fn spec_sections_hold_the_minimum_rule() {
        let mut tree = default_tree();
        tree.toggle(ids::MAINLINE).unwrap();
        tree.toggle(ids::SUBURBAN).unwrap();
        assert!(tree.toggle(ids::DART).is_err());

        tree.toggle(ids::LUAS_RED).unwrap();
        assert!(tree.toggle(ids::LUAS_GREEN).is_err());
    }

    #[test]
    fn top_level_sources_are_all_deselectable() {
        let mut tree = default_tree();
        for root in [
            ids::IRISH_RAIL_TRAINS,
            ids::IRISH_RAIL_STATIONS,
            ids::LUAS_STOPS,
            ids::BUS_STOPS,
            ids::BUSES,
        ] {
            tree.toggle(root).unwrap();
        }
        assert!(tree.enabled_leaves().is_empty());
    }

    #[test]
    fn source_mapping_covers_all_roots() {
        let tree = default_tree();
        for root in tree.roots() {
            assert!(source_for_root(root).is_some(), "no source for {root}");
        }
        assert_eq!(source_for_root("nope"), None);
    }
}
