//! Display predicate evaluation.
//!
//! Combines the criteria tree's enabled leaves, the geo filter and the
//! favourites store into a per-marker visibility decision:
//! `hasValidLocation AND typeFilterMatch AND geoFilterMatch AND
//! favouritesFilterMatch`. The evaluator reads classified fields and
//! writes only the `visible` output bit.

use std::collections::HashSet;

use crate::domain::{LuasLine, Marker, MarkerKind, Punctuality, TrainStatus, TrainType};
use crate::favourites::Favourites;
use crate::filter::ids;
use crate::geo::{Coordinates, haversine_km};

/// Optional origin + radius restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoFilter {
    /// User location; `None` when unavailable (denied or timed out), which
    /// disables radius filtering entirely.
    pub origin: Option<Coordinates>,

    /// Radius in kilometres; `None` or a non-positive value means no
    /// radius filter.
    pub radius_km: Option<f64>,
}

impl GeoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the filter actually restricts anything.
    pub fn is_active(&self) -> bool {
        self.origin.is_some() && self.radius_km.is_some_and(|r| r > 0.0)
    }

    /// True when `coordinates` passes the filter.
    pub fn matches(&self, coordinates: Coordinates) -> bool {
        match (self.origin, self.radius_km) {
            (Some(origin), Some(radius)) if radius > 0.0 => {
                haversine_km(origin, coordinates) < radius
            }
            _ => true,
        }
    }
}

/// One evaluation pass's inputs, borrowed from the pipeline state.
pub struct DisplayFilter<'a> {
    /// Flattened filter state from the criteria tree.
    pub enabled_leaves: &'a HashSet<String>,
    pub geo: &'a GeoFilter,
    pub favourites: &'a Favourites,
    /// When set, only favourited markers are visible.
    pub favourites_only: bool,
}

impl DisplayFilter<'_> {
    fn leaf(&self, id: &str) -> bool {
        self.enabled_leaves.contains(id)
    }

    /// Evaluate the full predicate for one marker.
    pub fn is_visible(&self, marker: &Marker) -> bool {
        if !marker.displayable || !marker.has_valid_location() {
            return false;
        }
        if !self.type_filter(marker) {
            return false;
        }
        if !self.geo.matches(marker.coordinates) {
            return false;
        }
        if self.favourites_only {
            return marker
                .favourite_key
                .as_ref()
                .is_some_and(|key| self.favourites.is_favourite(key));
        }
        true
    }

    fn type_filter(&self, marker: &Marker) -> bool {
        match &marker.kind {
            MarkerKind::Train {
                train_type,
                status,
                punctuality,
            } => self.train_filter(*train_type, *status, *punctuality),
            MarkerKind::Station => self.leaf(ids::IRISH_RAIL_STATIONS),
            MarkerKind::Bus => self.leaf(ids::BUSES),
            MarkerKind::BusStop => self.leaf(ids::BUS_STOPS),
            MarkerKind::Luas {
                line,
                is_enabled,
                park_and_ride,
                cycle_and_ride,
            } => self.luas_filter(*line, *is_enabled, *park_and_ride, *cycle_and_ride),
            MarkerKind::Unknown => false,
        }
    }

    fn train_filter(
        &self,
        train_type: TrainType,
        status: TrainStatus,
        punctuality: Punctuality,
    ) -> bool {
        let type_ok = match train_type {
            TrainType::Mainline => self.leaf(ids::MAINLINE),
            TrainType::Suburban => self.leaf(ids::SUBURBAN),
            TrainType::Dart => self.leaf(ids::DART),
            TrainType::Unknown => false,
        };

        let status_ok = match status {
            TrainStatus::Running => self.leaf(ids::RUNNING),
            TrainStatus::NotYetRunning => self.leaf(ids::NOT_YET_RUNNING),
            TrainStatus::Terminated => self.leaf(ids::TERMINATED),
            TrainStatus::Unknown => false,
        };

        // Punctuality leaves only gate running trains; for the other
        // statuses the status leaf itself satisfies the third conjunct.
        let punctuality_ok = match status {
            TrainStatus::Running => match punctuality {
                Punctuality::Early(_) => self.leaf(ids::EARLY),
                Punctuality::OnTime => self.leaf(ids::ON_TIME),
                Punctuality::Late(_) => self.leaf(ids::LATE),
                Punctuality::Unknown => false,
            },
            TrainStatus::NotYetRunning | TrainStatus::Terminated => status_ok,
            TrainStatus::Unknown => false,
        };

        type_ok && status_ok && punctuality_ok
    }

    fn luas_filter(
        &self,
        line: LuasLine,
        is_enabled: bool,
        park_and_ride: bool,
        cycle_and_ride: bool,
    ) -> bool {
        let line_ok = match line {
            LuasLine::Green => self.leaf(ids::LUAS_GREEN),
            LuasLine::Red => self.leaf(ids::LUAS_RED),
            LuasLine::Unknown => false,
        };

        let enabled_ok = if is_enabled {
            self.leaf(ids::LUAS_ENABLED)
        } else {
            self.leaf(ids::LUAS_DISABLED)
        };

        // The modifiers narrow rather than partition: both may be on, and
        // an unset modifier passes everything.
        let park_ok = !self.leaf(ids::LUAS_PARK_AND_RIDE) || park_and_ride;
        let cycle_ok = !self.leaf(ids::LUAS_CYCLE_AND_RIDE) || cycle_and_ride;

        line_ok && enabled_ok && park_ok && cycle_ok
    }

    /// Recompute `visible` for every marker; returns the visible count.
    pub fn apply(&self, markers: &mut [Marker]) -> usize {
        let mut visible = 0;
        for marker in markers.iter_mut() {
            marker.visible = self.is_visible(marker);
            if marker.visible {
                visible += 1;
            }
        }
        visible
    }
}
