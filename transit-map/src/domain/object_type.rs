//! Feed object types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five record types served by the feeds.
///
/// Serializes to the exact tag the feeds use in `objectType`, which is
/// also the key under which favourites are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    IrishRailTrain,
    IrishRailStation,
    Bus,
    BusStop,
    LuasStop,
}

impl ObjectType {
    /// All object types, in feed order.
    pub const ALL: [ObjectType; 5] = [
        ObjectType::IrishRailTrain,
        ObjectType::IrishRailStation,
        ObjectType::Bus,
        ObjectType::BusStop,
        ObjectType::LuasStop,
    ];

    /// The feed's `objectType` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::IrishRailTrain => "IrishRailTrain",
            ObjectType::IrishRailStation => "IrishRailStation",
            ObjectType::Bus => "Bus",
            ObjectType::BusStop => "BusStop",
            ObjectType::LuasStop => "LuasStop",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
