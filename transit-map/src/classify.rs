//! Classification of raw feed records into markers.
//!
//! This is the transformation from heterogeneous feed shapes into the
//! uniform [`Marker`] representation: derived status and punctuality,
//! icon category, presentation fields, search text and favourite key.
//! Classification never fails; data-quality problems downgrade a record
//! to non-displayable instead of erroring.

use serde_json::Value;

use crate::domain::{
    FavouriteKey, IconCategory, LuasLine, Marker, MarkerKind, ObjectType, Punctuality,
    PunctualityBucket, TrainStatus, TrainType,
};
use crate::feeds::types::{RawBus, RawBusStop, RawLuasStop, RawRecord, RawStation, RawTrain};
use crate::geo::Coordinates;
use crate::search;

/// Search text given to records with an unrecognised object type.
const UNKNOWN_SEARCH_TEXT: &str = "unknownobjecttype";

/// Classify one record.
pub fn classify(record: RawRecord) -> Marker {
    match record {
        RawRecord::IrishRailTrain(train) => classify_train(train),
        RawRecord::IrishRailStation(station) => classify_station(station),
        RawRecord::Bus(bus) => classify_bus(bus),
        RawRecord::BusStop(stop) => classify_bus_stop(stop),
        RawRecord::LuasStop(stop) => classify_luas_stop(stop),
        RawRecord::Unknown(value) => classify_unknown(value),
    }
}

fn parse_coordinates(latitude: &str, longitude: &str) -> Coordinates {
    Coordinates::new(
        latitude.trim().parse().unwrap_or(0.0),
        longitude.trim().parse().unwrap_or(0.0),
    )
}

fn yes_no(flag: &str) -> &'static str {
    if flag == "1" { "Yes" } else { "No" }
}

fn classify_train(raw: RawTrain) -> Marker {
    let train_type = TrainType::from_code(&raw.train_type);
    let status = TrainStatus::from_code(&raw.train_status);
    let punctuality = Punctuality::from_public_message(&raw.train_public_message);
    let bucket = PunctualityBucket::derive(status, punctuality);

    // The public message is segmented with literal "\n" sequences:
    // code, journey details, position update.
    let mut segments = raw.train_public_message.split("\\n");
    let _code_segment = segments.next();
    let details = segments.next().unwrap_or(&raw.train_public_message).trim();
    let update = segments.next().unwrap_or("").trim();

    let search_text = search::normalize(&format!(
        "{} {}",
        raw.train_public_message, raw.train_direction
    ));

    Marker {
        coordinates: parse_coordinates(&raw.latitude, &raw.longitude),
        raw_latitude: raw.latitude,
        raw_longitude: raw.longitude,
        category: IconCategory::Train(train_type, bucket),
        title: format!("Irish Rail Train: {}", raw.train_code),
        detail_fields: vec![
            ("Train Details".to_string(), details.to_string()),
            ("Train Type".to_string(), train_type.label().to_string()),
            ("Status".to_string(), status.label().to_string()),
            ("Direction".to_string(), raw.train_direction.clone()),
            ("Update".to_string(), update.to_string()),
            ("Punctuality".to_string(), punctuality.label()),
            ("Date".to_string(), raw.train_date),
        ],
        search_text,
        favourite_key: Some(FavouriteKey::new(ObjectType::IrishRailTrain, raw.train_code)),
        kind: MarkerKind::Train {
            train_type,
            status,
            punctuality,
        },
        displayable: true,
        visible: false,
    }
}

fn classify_station(raw: RawStation) -> Marker {
    let search_text = search::normalize(&format!(
        "{} {}",
        raw.train_station_code, raw.train_station_desc
    ));

    Marker {
        coordinates: parse_coordinates(&raw.latitude, &raw.longitude),
        raw_latitude: raw.latitude,
        raw_longitude: raw.longitude,
        category: IconCategory::Station,
        title: format!("Irish Rail Station: {}", raw.train_station_desc),
        detail_fields: vec![
            (
                "Train Station Name".to_string(),
                raw.train_station_desc.clone(),
            ),
            ("Train Station ID".to_string(), raw.train_station_id),
            (
                "Train Station Code".to_string(),
                raw.train_station_code.clone(),
            ),
        ],
        search_text,
        favourite_key: Some(FavouriteKey::new(
            ObjectType::IrishRailStation,
            raw.train_station_code,
        )),
        kind: MarkerKind::Station,
        displayable: true,
        visible: false,
    }
}

fn classify_bus(raw: RawBus) -> Marker {
    // Vehicles the route lookup couldn't name are useless on the map:
    // excluded as a data-quality matter, not a filter decision.
    let displayable = !raw.bus_route_agency_name.trim().is_empty()
        && !raw.bus_route_short_name.trim().is_empty()
        && !raw.bus_route_long_name.trim().is_empty();

    let search_text = search::normalize(&format!(
        "{} {} {}",
        raw.bus_route_agency_name, raw.bus_route_short_name, raw.bus_route_long_name
    ));

    Marker {
        coordinates: parse_coordinates(&raw.latitude, &raw.longitude),
        raw_latitude: raw.latitude,
        raw_longitude: raw.longitude,
        category: IconCategory::Bus,
        title: format!("Bus: {}", raw.bus_route_short_name),
        detail_fields: vec![
            ("Agency".to_string(), raw.bus_route_agency_name.clone()),
            ("Route".to_string(), raw.bus_route_short_name.clone()),
            ("Route Name".to_string(), raw.bus_route_long_name.clone()),
            ("Trip ID".to_string(), raw.bus_trip_id),
            ("Start Time".to_string(), raw.bus_start_time),
            ("Start Date".to_string(), raw.bus_start_date),
            (
                "Schedule Relationship".to_string(),
                raw.bus_schedule_relationship,
            ),
            ("Direction".to_string(), raw.bus_direction),
        ],
        search_text,
        favourite_key: Some(FavouriteKey::new(ObjectType::Bus, raw.bus_route)),
        kind: MarkerKind::Bus,
        displayable,
        visible: false,
    }
}

fn classify_bus_stop(raw: RawBusStop) -> Marker {
    let search_text = search::normalize(&raw.bus_stop_name);

    Marker {
        coordinates: parse_coordinates(&raw.latitude, &raw.longitude),
        raw_latitude: raw.latitude,
        raw_longitude: raw.longitude,
        category: IconCategory::BusStop,
        title: format!("Bus Stop: {}", raw.bus_stop_name),
        detail_fields: vec![
            ("Bus Stop Name".to_string(), raw.bus_stop_name.clone()),
            ("Bus Stop ID".to_string(), raw.bus_stop_id.clone()),
            ("Bus Stop Code".to_string(), raw.bus_stop_code),
        ],
        search_text,
        favourite_key: Some(FavouriteKey::new(ObjectType::BusStop, raw.bus_stop_id)),
        kind: MarkerKind::BusStop,
        displayable: true,
        visible: false,
    }
}

fn classify_luas_stop(raw: RawLuasStop) -> Marker {
    let line = LuasLine::from_line_id(&raw.luas_stop_line_id);
    let is_enabled = raw.luas_stop_is_enabled == "1";
    let park_and_ride = raw.luas_stop_is_park_and_ride == "1";
    let cycle_and_ride = raw.luas_stop_is_cycle_and_ride == "1";

    let search_text = search::normalize(&format!(
        "{} {} {}",
        raw.luas_stop_irish_name,
        raw.luas_stop_name,
        line.label()
    ));

    Marker {
        coordinates: parse_coordinates(&raw.latitude, &raw.longitude),
        raw_latitude: raw.latitude,
        raw_longitude: raw.longitude,
        category: IconCategory::Luas(line),
        title: format!("Luas Stop: {}", raw.luas_stop_name),
        detail_fields: vec![
            (
                "Luas Stop Name".to_string(),
                format!("{} / {}", raw.luas_stop_name, raw.luas_stop_irish_name),
            ),
            ("Line".to_string(), line.label().to_string()),
            ("Stop ID".to_string(), raw.luas_stop_id.clone()),
            (
                "Park & ride?".to_string(),
                yes_no(&raw.luas_stop_is_park_and_ride).to_string(),
            ),
            (
                "Cycle & ride?".to_string(),
                yes_no(&raw.luas_stop_is_cycle_and_ride).to_string(),
            ),
            (
                "Operational?".to_string(),
                yes_no(&raw.luas_stop_is_enabled).to_string(),
            ),
        ],
        search_text,
        favourite_key: Some(FavouriteKey::new(ObjectType::LuasStop, raw.luas_stop_id)),
        kind: MarkerKind::Luas {
            line,
            is_enabled,
            park_and_ride,
            cycle_and_ride,
        },
        displayable: true,
        visible: false,
    }
}

fn classify_unknown(value: Value) -> Marker {
    let raw_latitude = value
        .get("latitude")
        .and_then(Value::as_str)
        .unwrap_or("0")
        .to_string();
    let raw_longitude = value
        .get("longitude")
        .and_then(Value::as_str)
        .unwrap_or("0")
        .to_string();

    Marker {
        coordinates: parse_coordinates(&raw_latitude, &raw_longitude),
        raw_latitude,
        raw_longitude,
        category: IconCategory::Unknown,
        title: "Unknown object".to_string(),
        detail_fields: Vec::new(),
        search_text: UNKNOWN_SEARCH_TEXT.to_string(),
        favourite_key: None,
        kind: MarkerKind::Unknown,
        displayable: false,
        visible: false,
    }
}
