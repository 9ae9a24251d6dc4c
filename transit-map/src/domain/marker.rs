//! Normalized, display-ready markers.

use crate::geo::Coordinates;

use super::icon::IconCategory;
use super::luas::LuasLine;
use super::object_type::ObjectType;
use super::train::{Punctuality, TrainStatus, TrainType};

/// Key identifying a record for favourites purposes.
///
/// The natural id is type-specific: train code, station code, bus route,
/// bus stop id, or Luas stop id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavouriteKey {
    pub object_type: ObjectType,
    pub natural_id: String,
}

impl FavouriteKey {
    pub fn new(object_type: ObjectType, natural_id: impl Into<String>) -> Self {
        Self {
            object_type,
            natural_id: natural_id.into(),
        }
    }
}

/// Per-type derived fields the display predicate consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    Train {
        train_type: TrainType,
        status: TrainStatus,
        punctuality: Punctuality,
    },
    Station,
    Bus,
    BusStop,
    Luas {
        line: LuasLine,
        is_enabled: bool,
        park_and_ride: bool,
        cycle_and_ride: bool,
    },
    Unknown,
}

/// A classified, display-ready record.
///
/// Rebuilt wholesale on every fetch cycle; cheap to discard.
#[derive(Debug, Clone)]
pub struct Marker {
    pub coordinates: Coordinates,

    /// Raw coordinate strings as received. The literal string `"0"` is the
    /// upstream no-location sentinel and must be compared as a string.
    pub raw_latitude: String,
    pub raw_longitude: String,

    pub category: IconCategory,

    pub title: String,

    /// Ordered key/value pairs for presentation.
    pub detail_fields: Vec<(String, String)>,

    /// Lowercase, ASCII-alphanumeric-only text the search filter matches
    /// against. Deterministically derived from the record.
    pub search_text: String,

    /// `None` for records that cannot be favourited (unknown types).
    pub favourite_key: Option<FavouriteKey>,

    pub kind: MarkerKind,

    /// Data-quality flag; a non-displayable marker is never visible,
    /// regardless of filter state.
    pub displayable: bool,

    /// Output of the display predicate. Recomputed every evaluation pass,
    /// never persisted.
    pub visible: bool,
}

impl Marker {
    /// Both coordinate strings differ from the `"0"` sentinel.
    pub fn has_valid_location(&self) -> bool {
        self.raw_latitude != "0" && self.raw_longitude != "0"
    }
}
