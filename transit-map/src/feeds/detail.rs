//! Per-record detail lookups.
//!
//! Popups load these on demand: incoming trains for a station, tram
//! forecasts for a Luas stop. The upstream endpoints are XML-to-JSON
//! conversions, so a single-element collection arrives as a bare object
//! instead of a one-element array; both shapes are normalized to a `Vec`
//! here. Responses are cached briefly. Failures stay per-call and never
//! reach the marker pipeline.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::Deserialize;

use super::error::FeedError;

const DEFAULT_STATION_URL: &str =
    "https://kkz92ft0ad.execute-api.us-east-1.amazonaws.com/return_station_data";
const DEFAULT_LUAS_URL: &str =
    "https://kkz92ft0ad.execute-api.us-east-1.amazonaws.com/return_luas_data";

/// How many incoming trains a station popup shows.
const STATION_ETA_LIMIT: usize = 3;

/// Accept either a bare object or an array of them.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[derive(Debug, Clone, Deserialize)]
struct StationDataResponse {
    #[serde(rename = "ArrayOfObjStationData")]
    array: ArrayOfObjStationData,
}

#[derive(Debug, Clone, Deserialize)]
struct ArrayOfObjStationData {
    #[serde(rename = "objStationData", deserialize_with = "one_or_many", default)]
    rows: Vec<StationDataRow>,
}

#[derive(Debug, Clone, Deserialize)]
struct StationDataRow {
    #[serde(rename = "Traincode", default)]
    train_code: String,
    #[serde(rename = "Origin", default)]
    origin: String,
    #[serde(rename = "Destination", default)]
    destination: String,
    #[serde(rename = "Duein", default)]
    due_in: String,
    #[serde(rename = "Late", default)]
    late: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Lastlocation", default)]
    last_location: Option<String>,
}

/// An incoming train at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationEta {
    pub train_code: String,
    pub origin: String,
    pub destination: String,
    pub due_in_mins: i64,
    /// Signed: negative means early.
    pub minutes_late: i64,
    pub status: String,
    pub last_location: Option<String>,
}

impl StationEta {
    /// Punctuality line for presentation, e.g. "2 minutes late".
    pub fn punctuality_label(&self) -> String {
        match self.minutes_late {
            n if n > 1 => format!("{n} minutes late"),
            1 => "1 minute late".to_string(),
            0 => "On time".to_string(),
            -1 => "1 minute early".to_string(),
            n => format!("{} minutes early", -n),
        }
    }
}

impl From<StationDataRow> for StationEta {
    fn from(row: StationDataRow) -> Self {
        Self {
            train_code: row.train_code,
            origin: row.origin,
            destination: row.destination,
            due_in_mins: row.due_in.trim().parse().unwrap_or(0),
            minutes_late: row.late.trim().parse().unwrap_or(0),
            status: row.status,
            last_location: row.last_location.filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LuasForecastResponse {
    #[serde(rename = "stopInfo")]
    stop_info: StopInfo,
}

#[derive(Debug, Clone, Deserialize)]
struct StopInfo {
    #[serde(default)]
    message: String,
    #[serde(rename = "direction", deserialize_with = "one_or_many", default)]
    directions: Vec<DirectionDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectionDto {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "tram", deserialize_with = "one_or_many", default)]
    trams: Vec<TramDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct TramDto {
    #[serde(rename = "@destination", default)]
    destination: String,
    #[serde(rename = "@dueMins", default)]
    due_mins: String,
}

/// Tram forecast for a Luas stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuasForecast {
    /// Operator message shown at the stop.
    pub message: String,
    pub directions: Vec<LuasDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuasDirection {
    pub name: String,
    pub trams: Vec<LuasTram>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuasTram {
    pub destination: String,
    /// Minutes until arrival, or the literal "DUE".
    pub due_mins: String,
}

impl From<LuasForecastResponse> for LuasForecast {
    fn from(response: LuasForecastResponse) -> Self {
        Self {
            message: response.stop_info.message,
            directions: response
                .stop_info
                .directions
                .into_iter()
                .map(|d| LuasDirection {
                    name: d.name,
                    trams: d
                        .trams
                        .into_iter()
                        .map(|t| LuasTram {
                            destination: t.destination,
                            due_mins: t.due_mins,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Configuration for the detail client.
#[derive(Debug, Clone)]
pub struct DetailConfig {
    pub station_url: String,
    pub luas_url: String,
    pub timeout_secs: u64,
    /// TTL for cached responses.
    pub cache_ttl: Duration,
    /// Maximum number of cached responses per endpoint.
    pub cache_capacity: u64,
}

impl DetailConfig {
    pub fn new() -> Self {
        Self {
            station_url: DEFAULT_STATION_URL.to_string(),
            luas_url: DEFAULT_LUAS_URL.to_string(),
            timeout_secs: 30,
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 1000,
        }
    }

    pub fn with_station_url(mut self, url: impl Into<String>) -> Self {
        self.station_url = url.into();
        self
    }

    pub fn with_luas_url(mut self, url: impl Into<String>) -> Self {
        self.luas_url = url.into();
        self
    }
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for per-record detail lookups, with short-lived caching.
pub struct DetailClient {
    http: reqwest::Client,
    station_url: String,
    luas_url: String,
    stations: MokaCache<String, Arc<Vec<StationEta>>>,
    luas: MokaCache<String, Arc<LuasForecast>>,
}

impl DetailClient {
    /// Create a new detail client with the given configuration.
    pub fn new(config: DetailConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let stations = MokaCache::builder()
            .time_to_live(config.cache_ttl)
            .max_capacity(config.cache_capacity)
            .build();
        let luas = MokaCache::builder()
            .time_to_live(config.cache_ttl)
            .max_capacity(config.cache_capacity)
            .build();

        Ok(Self {
            http,
            station_url: config.station_url,
            luas_url: config.luas_url,
            stations,
            luas,
        })
    }

    /// The next few incoming trains for a station, by station code.
    pub async fn station_times(
        &self,
        station_code: &str,
    ) -> Result<Arc<Vec<StationEta>>, FeedError> {
        if let Some(hit) = self.stations.get(station_code).await {
            return Ok(hit);
        }

        let body = self
            .get_body(&self.station_url, ("stationCode", station_code))
            .await?;
        let response: StationDataResponse =
            serde_json::from_str(&body).map_err(|e| FeedError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        let times: Vec<StationEta> = response
            .array
            .rows
            .into_iter()
            .take(STATION_ETA_LIMIT)
            .map(StationEta::from)
            .collect();
        let entry = Arc::new(times);

        self.stations
            .insert(station_code.to_string(), Arc::clone(&entry))
            .await;
        Ok(entry)
    }

    /// The tram forecast for a Luas stop, by stop code.
    pub async fn luas_forecast(&self, stop_code: &str) -> Result<Arc<LuasForecast>, FeedError> {
        if let Some(hit) = self.luas.get(stop_code).await {
            return Ok(hit);
        }

        let body = self
            .get_body(&self.luas_url, ("luasStopCode", stop_code))
            .await?;
        let response: LuasForecastResponse =
            serde_json::from_str(&body).map_err(|e| FeedError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        let entry = Arc::new(LuasForecast::from(response));
        self.luas
            .insert(stop_code.to_string(), Arc::clone(&entry))
            .await;
        Ok(entry)
    }

    async fn get_body(&self, url: &str, query: (&str, &str)) -> Result<String, FeedError> {
        let response = self.http.get(url).query(&[query]).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}
