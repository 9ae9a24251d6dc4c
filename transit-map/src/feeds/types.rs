//! Feed record DTOs.
//!
//! These map directly to the JSON the feeds serve. Every scalar arrives as
//! a string, coordinates included; the literal string `"0"` is the
//! documented no-location sentinel and must survive untouched to the
//! classifier, so latitude and longitude stay `String` here. Descriptive
//! fields default to empty rather than failing the record, since the
//! classifier downgrades incomplete records instead of erroring.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::ObjectType;

/// An Irish Rail train position record (transient feed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrain {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,

    #[serde(default)]
    pub train_code: String,
    /// Single-letter type code: M, S or D.
    #[serde(default)]
    pub train_type: String,
    /// Single-letter status code: R, T or N.
    #[serde(default)]
    pub train_status: String,
    #[serde(default)]
    pub train_date: String,
    /// Free-text message; carries the lateness fragment.
    #[serde(default)]
    pub train_public_message: String,
    #[serde(default)]
    pub train_direction: String,
}

/// An Irish Rail station record (permanent feed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStation {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,

    #[serde(rename = "trainStationID", default)]
    pub train_station_id: String,
    #[serde(default)]
    pub train_station_code: String,
    #[serde(default)]
    pub train_station_alias: String,
    #[serde(default)]
    pub train_station_desc: String,
}

/// A live bus position record (transient feed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBus {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,

    #[serde(rename = "busID", default)]
    pub bus_id: String,
    #[serde(rename = "busTripID", default)]
    pub bus_trip_id: String,
    #[serde(default)]
    pub bus_start_time: String,
    #[serde(default)]
    pub bus_start_date: String,
    #[serde(default)]
    pub bus_schedule_relationship: String,
    #[serde(default)]
    pub bus_route: String,
    #[serde(default)]
    pub bus_route_agency_name: String,
    #[serde(default)]
    pub bus_route_short_name: String,
    #[serde(default)]
    pub bus_route_long_name: String,
    #[serde(default)]
    pub bus_direction: String,
}

/// A bus stop record (permanent feed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBusStop {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,

    #[serde(rename = "busStopID", default)]
    pub bus_stop_id: String,
    #[serde(default)]
    pub bus_stop_code: String,
    #[serde(default)]
    pub bus_stop_name: String,
}

/// A Luas stop record (permanent feed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLuasStop {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,

    #[serde(default)]
    pub luas_stop_name: String,
    #[serde(default)]
    pub luas_stop_irish_name: String,
    #[serde(rename = "luasStopID", default)]
    pub luas_stop_id: String,
    #[serde(default)]
    pub luas_stop_code: String,
    /// Numeric line id: 1 for Green, 2 for Red.
    #[serde(rename = "luasStopLineID", default)]
    pub luas_stop_line_id: String,
    #[serde(default)]
    pub luas_stop_sort_order: String,
    /// "1" when the stop is operational.
    #[serde(default)]
    pub luas_stop_is_enabled: String,
    #[serde(default)]
    pub luas_stop_is_park_and_ride: String,
    #[serde(default)]
    pub luas_stop_is_cycle_and_ride: String,
    #[serde(default)]
    pub luas_stop_zone_count_a: String,
    #[serde(default)]
    pub luas_stop_zone_count_b: String,
}

/// A record from either feed, tagged by `objectType`.
#[derive(Debug, Clone)]
pub enum RawRecord {
    IrishRailTrain(RawTrain),
    IrishRailStation(RawStation),
    Bus(RawBus),
    BusStop(RawBusStop),
    LuasStop(RawLuasStop),
    /// Unrecognised `objectType`; kept so the classifier can flag it
    /// rather than dropping it silently.
    Unknown(Value),
}

impl RawRecord {
    /// Decode one feed element. Unknown or malformed elements become
    /// [`RawRecord::Unknown`] instead of failing the batch.
    pub fn from_value(value: Value) -> Self {
        let tag = value
            .get("objectType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parsed = match tag.as_str() {
            "IrishRailTrain" => {
                serde_json::from_value(value.clone()).map(RawRecord::IrishRailTrain)
            }
            "IrishRailStation" => {
                serde_json::from_value(value.clone()).map(RawRecord::IrishRailStation)
            }
            "Bus" => serde_json::from_value(value.clone()).map(RawRecord::Bus),
            "BusStop" => serde_json::from_value(value.clone()).map(RawRecord::BusStop),
            "LuasStop" => serde_json::from_value(value.clone()).map(RawRecord::LuasStop),
            _ => return RawRecord::Unknown(value),
        };

        parsed.unwrap_or(RawRecord::Unknown(value))
    }

    /// The record's object type, or `None` for unrecognised records.
    pub fn object_type(&self) -> Option<ObjectType> {
        match self {
            RawRecord::IrishRailTrain(_) => Some(ObjectType::IrishRailTrain),
            RawRecord::IrishRailStation(_) => Some(ObjectType::IrishRailStation),
            RawRecord::Bus(_) => Some(ObjectType::Bus),
            RawRecord::BusStop(_) => Some(ObjectType::BusStop),
            RawRecord::LuasStop(_) => Some(ObjectType::LuasStop),
            RawRecord::Unknown(_) => None,
        }
    }
}
