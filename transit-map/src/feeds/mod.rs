//! Feed client layer.
//!
//! Two logical feed classes serve the records: a transient feed with live
//! vehicle positions and a permanent feed with static infrastructure.
//! Detail lookups (station ETAs, tram forecasts) live here too, consumed
//! by popups outside the core pipeline.

mod client;
mod detail;
mod error;
mod mock;
pub mod types;

pub use client::{FeedClass, FeedClient, FeedConfig};
pub use detail::{DetailClient, DetailConfig, LuasDirection, LuasForecast, LuasTram, StationEta};
pub use error::FeedError;
pub use mock::MockFeedClient;
pub use types::RawRecord;

use crate::domain::ObjectType;

/// Source of raw records for a fetch cycle.
///
/// One request is issued per feed class, batched by comma-joined object
/// types; if any one request fails the whole cycle fails and no records
/// are produced. That all-or-nothing behaviour is preserved from the
/// upstream implementation.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    async fn fetch_cycle(&self, types: &[ObjectType]) -> Result<Vec<RawRecord>, FeedError>;
}
