//! Mock feed client for testing without network access.
//!
//! Serves records from memory or from JSON files on disk as if they were
//! live feed responses, with an optional forced-failure mode for
//! exercising the all-or-nothing cycle behaviour.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::ObjectType;

use super::RecordSource;
use super::error::FeedError;
use super::types::RawRecord;

/// Mock record source backed by an in-memory record list.
#[derive(Clone, Default)]
pub struct MockFeedClient {
    records: Arc<RwLock<Vec<RawRecord>>>,
    fail: Arc<AtomicBool>,
}

impl MockFeedClient {
    /// Create a mock client serving the given records.
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock client by loading every `.json` file in a directory.
    ///
    /// Each file must contain a JSON array of feed records.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FeedError> {
        let data_dir = data_dir.as_ref();
        let mut records = Vec::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| FeedError::Api {
            status: 0,
            message: format!("failed to read mock data directory: {e}"),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| FeedError::Api {
                status: 0,
                message: format!("failed to read mock data entry: {e}"),
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let body = std::fs::read_to_string(&path).map_err(|e| FeedError::Api {
                status: 0,
                message: format!("failed to read {}: {e}", path.display()),
            })?;
            let values: Vec<Value> = serde_json::from_str(&body).map_err(|e| FeedError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;
            records.extend(values.into_iter().map(RawRecord::from_value));
        }

        Ok(Self::new(records))
    }

    /// Replace the served records.
    pub async fn set_records(&self, records: Vec<RawRecord>) {
        *self.records.write().await = records;
    }

    /// When set, every fetch cycle fails with a synthetic feed error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl RecordSource for MockFeedClient {
    async fn fetch_cycle(&self, types: &[ObjectType]) -> Result<Vec<RawRecord>, FeedError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FeedError::Api {
                status: 500,
                message: "mock feed failure".into(),
            });
        }

        let wanted: HashSet<ObjectType> = types.iter().copied().collect();
        let records = self.records.read().await;

        // Unknown records are served unconditionally; real feeds can return
        // shapes the client never asked for.
        Ok(records
            .iter()
            .filter(|r| r.object_type().is_none_or(|t| wanted.contains(&t)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn train_value(code: &str) -> Value {
        json!({
            "objectType": "IrishRailTrain",
            "latitude": "53.0",
            "longitude": "-6.0",
            "trainCode": code,
            "trainType": "D",
            "trainStatus": "R",
            "trainPublicMessage": "(0 mins late)",
            "trainDirection": "Northbound",
        })
    }

    fn stop_value(id: &str) -> Value {
        json!({
            "objectType": "BusStop",
            "latitude": "53.1",
            "longitude": "-6.1",
            "busStopID": id,
            "busStopName": "Some Stop",
        })
    }

    #[tokio::test]
    async fn serves_only_requested_types() {
        let client = MockFeedClient::new(vec![
            RawRecord::from_value(train_value("A1")),
            RawRecord::from_value(stop_value("100")),
        ]);

        let records = client
            .fetch_cycle(&[ObjectType::IrishRailTrain])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_type(), Some(ObjectType::IrishRailTrain));
    }

    #[tokio::test]
    async fn forced_failure_fails_the_cycle() {
        let client = MockFeedClient::new(vec![RawRecord::from_value(train_value("A1"))]);
        client.set_fail(true);

        let result = client.fetch_cycle(&[ObjectType::IrishRailTrain]).await;
        assert!(matches!(result, Err(FeedError::Api { status: 500, .. })));

        client.set_fail(false);
        assert!(client.fetch_cycle(&[ObjectType::IrishRailTrain]).await.is_ok());
    }

    #[tokio::test]
    async fn loads_records_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transient.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "{}",
            serde_json::to_string(&vec![train_value("A1"), train_value("B2")]).unwrap()
        )
        .unwrap();

        let client = MockFeedClient::from_dir(dir.path()).unwrap();
        let records = client
            .fetch_cycle(&[ObjectType::IrishRailTrain])
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let result = MockFeedClient::from_dir("/nonexistent/mock/data");
        assert!(result.is_err());
    }
}
