//! Icon categories for map markers.
//!
//! A closed enum rather than ad hoc string concatenation, so every
//! combination the icon renderer must handle is enumerable and matching
//! on it is exhaustiveness-checked.

use std::fmt;

use super::luas::LuasLine;
use super::train::{PunctualityBucket, TrainType};

/// Which icon a marker gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconCategory {
    /// Trains refine by type and punctuality bucket, e.g. a DART running
    /// on time renders differently from a terminated one.
    Train(TrainType, PunctualityBucket),
    Station,
    Bus,
    BusStop,
    /// Luas stops refine by line colour.
    Luas(LuasLine),
    /// Unrecognised records never render, but stay representable.
    Unknown,
}

impl IconCategory {
    /// Stable tag consumed by the icon renderer, e.g. `dartOnTime`.
    pub fn tag(&self) -> String {
        match self {
            IconCategory::Train(train_type, bucket) => {
                format!("{}{}", train_type.icon_key(), bucket.icon_key())
            }
            IconCategory::Station => "trainStation".to_string(),
            IconCategory::Bus => "bus".to_string(),
            IconCategory::BusStop => "busStop".to_string(),
            IconCategory::Luas(LuasLine::Green) => "luasGreen".to_string(),
            IconCategory::Luas(LuasLine::Red) => "luasRed".to_string(),
            IconCategory::Luas(LuasLine::Unknown) => "luas".to_string(),
            IconCategory::Unknown => "unknown".to_string(),
        }
    }
}

impl fmt::Display for IconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_tags() {
        let tag = IconCategory::Train(TrainType::Dart, PunctualityBucket::OnTime).tag();
        assert_eq!(tag, "dartOnTime");

        let tag = IconCategory::Train(TrainType::Dart, PunctualityBucket::NotRunning).tag();
        assert_eq!(tag, "dartNotRunning");

        let tag = IconCategory::Train(TrainType::Mainline, PunctualityBucket::Late).tag();
        assert_eq!(tag, "mainlineLate");
    }

    #[test]
    fn luas_tags() {
        assert_eq!(IconCategory::Luas(LuasLine::Green).tag(), "luasGreen");
        assert_eq!(IconCategory::Luas(LuasLine::Red).tag(), "luasRed");
        assert_eq!(IconCategory::Luas(LuasLine::Unknown).tag(), "luas");
    }

    #[test]
    fn fixed_tags() {
        assert_eq!(IconCategory::Station.tag(), "trainStation");
        assert_eq!(IconCategory::Bus.tag(), "bus");
        assert_eq!(IconCategory::BusStop.tag(), "busStop");
    }

    #[test]
    fn display_matches_tag() {
        let icon = IconCategory::Train(TrainType::Suburban, PunctualityBucket::Late);
        assert_eq!(icon.to_string(), icon.tag());
    }
}
