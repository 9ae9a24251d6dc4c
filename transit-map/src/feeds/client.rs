//! Transit feed HTTP client.
//!
//! Each feed class is one base endpoint taking a comma-joined `objectType`
//! query parameter and returning a JSON array of records. A fetch cycle
//! issues at most one request per feed class and fails as a whole if any
//! request fails.

use std::time::Duration;

use futures::future::try_join_all;
use serde_json::Value;

use crate::domain::ObjectType;

use super::RecordSource;
use super::error::FeedError;
use super::types::RawRecord;

const DEFAULT_TRANSIENT_URL: &str =
    "https://kkz92ft0ad.execute-api.us-east-1.amazonaws.com/return_transient_data";
const DEFAULT_PERMANENT_URL: &str =
    "https://kkz92ft0ad.execute-api.us-east-1.amazonaws.com/return_permanent_data";

/// The two logical feed classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedClass {
    /// Live, frequently-changing records (trains, buses).
    Transient,
    /// Static infrastructure (stations, bus stops, Luas stops).
    Permanent,
}

impl FeedClass {
    /// Which feed class serves a given object type.
    pub fn of(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::IrishRailTrain | ObjectType::Bus => FeedClass::Transient,
            ObjectType::IrishRailStation | ObjectType::BusStop | ObjectType::LuasStop => {
                FeedClass::Permanent
            }
        }
    }
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the transient (live) feed.
    pub transient_url: String,
    /// Base URL of the permanent (static) feed.
    pub permanent_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FeedConfig {
    pub fn new() -> Self {
        Self {
            transient_url: DEFAULT_TRANSIENT_URL.to_string(),
            permanent_url: DEFAULT_PERMANENT_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom transient feed URL (for testing).
    pub fn with_transient_url(mut self, url: impl Into<String>) -> Self {
        self.transient_url = url.into();
        self
    }

    /// Set a custom permanent feed URL (for testing).
    pub fn with_permanent_url(mut self, url: impl Into<String>) -> Self {
        self.permanent_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the two record feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    transient_url: String,
    permanent_url: String,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            transient_url: config.transient_url,
            permanent_url: config.permanent_url,
        })
    }

    fn base_url(&self, class: FeedClass) -> &str {
        match class {
            FeedClass::Transient => &self.transient_url,
            FeedClass::Permanent => &self.permanent_url,
        }
    }

    /// Fetch one feed class for the given object types.
    pub async fn fetch(
        &self,
        class: FeedClass,
        types: &[ObjectType],
    ) -> Result<Vec<RawRecord>, FeedError> {
        let joined = types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .get(self.base_url(class))
            .query(&[("objectType", joined.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let values: Vec<Value> = serde_json::from_str(&body).map_err(|e| FeedError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        Ok(values.into_iter().map(RawRecord::from_value).collect())
    }
}

impl RecordSource for FeedClient {
    async fn fetch_cycle(&self, types: &[ObjectType]) -> Result<Vec<RawRecord>, FeedError> {
        let transient: Vec<ObjectType> = types
            .iter()
            .copied()
            .filter(|t| FeedClass::of(*t) == FeedClass::Transient)
            .collect();
        let permanent: Vec<ObjectType> = types
            .iter()
            .copied()
            .filter(|t| FeedClass::of(*t) == FeedClass::Permanent)
            .collect();

        let mut requests = Vec::new();
        if !transient.is_empty() {
            requests.push(self.fetch(FeedClass::Transient, &transient));
        }
        if !permanent.is_empty() {
            requests.push(self.fetch(FeedClass::Permanent, &permanent));
        }

        let batches = try_join_all(requests).await?;
        Ok(batches.into_iter().flatten().collect())
    }
}
