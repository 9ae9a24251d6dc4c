//! Fetch-cycle orchestration.
//!
//! One cycle fetches every enabled source type (batched per feed class),
//! classifies the records into markers, evaluates the display predicate
//! and swaps the new marker set in wholesale. A loading flag goes up
//! before classification and comes down afterwards, lingering briefly for
//! large result sets so the overlay doesn't flicker.
//!
//! A failed cycle produces no markers: the previous set stays visible but
//! stale. That all-or-nothing behaviour matches the upstream system and
//! is a known sharp edge rather than a partial-failure design.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::domain::{FavouriteKey, Marker, ObjectType};
use crate::favourites::Favourites;
use crate::feeds::{FeedError, RecordSource};
use crate::filter::{FilterError, FilterTree, default_tree, source_for_root};
use crate::geo::Coordinates;
use crate::search::{self, SearchFilter};
use crate::storage::{self, KeyValueStore, keys};
use crate::visibility::{DisplayFilter, GeoFilter};

/// Tunables for a pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Marker count beyond which the loading-clear is delayed.
    pub large_result_threshold: usize,

    /// Minimum time the loading flag stays up for large result sets.
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            large_result_threshold: search::LARGE_RESULT_THRESHOLD,
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// The classification-and-filter pipeline.
///
/// Owns the marker set, the criteria tree, favourites and the geo filter;
/// the UI layer drives it from a single-threaded event loop and renders
/// whatever [`MarkerPipeline::visible_markers`] yields.
pub struct MarkerPipeline<S> {
    source: S,
    store: Arc<dyn KeyValueStore>,
    config: PipelineConfig,

    filters: FilterTree,
    favourites: Favourites,
    geo: GeoFilter,
    favourites_only: bool,

    markers: Vec<Marker>,
    /// Marker-set identity, bumped on every rebuild or re-evaluation.
    generation: u64,
    search: SearchFilter,

    loading: watch::Sender<bool>,
}

impl<S: RecordSource> MarkerPipeline<S> {
    /// Build a pipeline, restoring persisted filter selections, radius
    /// and favourites from the store.
    pub fn new(source: S, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(source, store, PipelineConfig::default())
    }

    pub fn with_config(source: S, store: Arc<dyn KeyValueStore>, config: PipelineConfig) -> Self {
        let mut filters = default_tree();
        filters.load(store.as_ref());

        let favourites = Favourites::load(Arc::clone(&store));

        let mut geo = GeoFilter::new();
        match store.get(keys::NUMBER_INPUT_VALUE) {
            Ok(Some(json)) => match serde_json::from_str::<Option<f64>>(&json) {
                Ok(radius) => geo.radius_km = radius,
                Err(e) => warn!(error = %e, "ignoring malformed persisted radius"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read persisted radius"),
        }

        let (loading, _) = watch::channel(false);

        Self {
            source,
            store,
            config,
            filters,
            favourites,
            geo,
            favourites_only: false,
            markers: Vec::new(),
            generation: 0,
            search: SearchFilter::new(),
            loading,
        }
    }

    pub fn filters(&self) -> &FilterTree {
        &self.filters
    }

    pub fn favourites(&self) -> &Favourites {
        &self.favourites
    }

    pub fn geo(&self) -> &GeoFilter {
        &self.geo
    }

    pub fn favourites_only(&self) -> bool {
        self.favourites_only
    }

    /// The full marker set of the last successful cycle.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Marker-set identity for memoization purposes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn visible_markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(|m| m.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_markers().count()
    }

    /// Watch the loading flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Toggle a filter node, persist the selection and re-evaluate.
    ///
    /// A refused toggle (it would empty a minimum-one section) is logged
    /// and returned as the error, with no state change.
    pub fn toggle_filter(&mut self, id: &str) -> Result<bool, FilterError> {
        match self.filters.toggle(id) {
            Ok(state) => {
                self.filters.save(self.store.as_ref());
                self.re_evaluate();
                Ok(state)
            }
            Err(e) => {
                warn!(node = id, error = %e, "filter toggle refused");
                Err(e)
            }
        }
    }

    /// Toggle a favourite; re-evaluates only in favourites-only mode.
    pub fn toggle_favourite(&mut self, key: &FavouriteKey) -> bool {
        let state = self.favourites.toggle(key);
        if self.favourites_only {
            self.re_evaluate();
        }
        state
    }

    pub fn set_favourites_only(&mut self, on: bool) {
        self.favourites_only = on;
        self.re_evaluate();
    }

    /// Set (or clear) the radius filter and persist it.
    pub fn set_radius_km(&mut self, radius: Option<f64>) {
        self.geo.radius_km = radius;
        match serde_json::to_string(&radius) {
            Ok(json) => {
                if let Err(e) =
                    self.store
                        .put(keys::NUMBER_INPUT_VALUE, json, Some(storage::default_ttl()))
                {
                    warn!(error = %e, "failed to persist radius");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize radius"),
        }
        self.re_evaluate();
    }

    /// Set the geo-filter origin (from [`crate::locate::resolve_origin`]).
    pub fn set_origin(&mut self, origin: Option<Coordinates>) {
        self.geo.origin = origin;
        self.re_evaluate();
    }

    /// Re-run the display predicate over the current marker set.
    pub fn re_evaluate(&mut self) -> usize {
        let enabled = self.filters.enabled_leaves();
        let filter = DisplayFilter {
            enabled_leaves: &enabled,
            geo: &self.geo,
            favourites: &self.favourites,
            favourites_only: self.favourites_only,
        };
        let visible = filter.apply(&mut self.markers);
        self.generation += 1;
        debug!(visible, total = self.markers.len(), "re-evaluated visibility");
        visible
    }

    /// Run one fetch cycle. Returns the visible marker count.
    pub async fn refresh(&mut self) -> Result<usize, FeedError> {
        let types = self.selected_source_types();
        self.set_loading(true);

        if types.is_empty() {
            self.markers.clear();
            self.generation += 1;
            self.set_loading(false);
            return Ok(0);
        }

        let records = match self.source.fetch_cycle(&types).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "fetch cycle failed; keeping previous markers");
                self.set_loading(false);
                return Err(e);
            }
        };

        let fetched = records.len();
        let mut markers: Vec<Marker> = records.into_iter().map(classify).collect();

        let enabled = self.filters.enabled_leaves();
        let filter = DisplayFilter {
            enabled_leaves: &enabled,
            geo: &self.geo,
            favourites: &self.favourites,
            favourites_only: self.favourites_only,
        };
        let visible = filter.apply(&mut markers);

        self.markers = markers;
        self.generation += 1;
        debug!(fetched, visible, "fetch cycle complete");

        if self.markers.len() > self.config.large_result_threshold {
            tokio::time::sleep(self.config.settle_delay).await;
        }
        self.set_loading(false);

        Ok(visible)
    }

    /// Search the visible set; memoized on (query, generation).
    pub fn search(&mut self, query: &str) -> Vec<&Marker> {
        let indices = self.search.apply(query, &self.markers, self.generation);
        indices
            .iter()
            .filter_map(|&i| self.markers.get(i))
            .collect()
    }

    /// Top-level sources that are enabled, as fetchable object types.
    fn selected_source_types(&self) -> Vec<ObjectType> {
        self.filters
            .roots()
            .iter()
            .filter(|id| self.filters.is_enabled(id))
            .filter_map(|id| source_for_root(id))
            .collect()
    }

    fn set_loading(&self, on: bool) {
        self.loading.send_replace(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::{MockFeedClient, RawRecord};
    use crate::filter::ids;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn records() -> Vec<RawRecord> {
        vec![
            RawRecord::from_value(json!({
                "objectType": "IrishRailTrain",
                "latitude": "53.2509",
                "longitude": "-6.1086",
                "trainCode": "E108",
                "trainType": "D",
                "trainStatus": "R",
                "trainPublicMessage": "E108\\n10:15 - Howth to Bray \\n(-2 mins late)\\nDeparted Dalkey",
                "trainDirection": "Southbound",
            })),
            RawRecord::from_value(json!({
                "objectType": "Bus",
                "latitude": "53.3342",
                "longitude": "-6.2488",
                "busID": "V2",
                "busRoute": "4538_63223",
                "busRouteAgencyName": "",
                "busRouteShortName": "145",
                "busRouteLongName": "Ballywaltrim - Heuston Station",
            })),
            RawRecord::from_value(json!({
                "objectType": "Bus",
                "latitude": "53.3342",
                "longitude": "-6.2488",
                "busID": "V3",
                "busRoute": "4538_64223",
                "busRouteAgencyName": "Dublin Bus",
                "busRouteShortName": "47A",
                "busRouteLongName": "Poolbeg Street - Belarmine",
            })),
            RawRecord::from_value(json!({
                "objectType": "BusStop",
                "latitude": "0",
                "longitude": "0",
                "busStopID": "1",
                "busStopName": "Nowhere",
            })),
        ]
    }

    fn pipeline() -> MarkerPipeline<MockFeedClient> {
        MarkerPipeline::new(
            MockFeedClient::new(records()),
            Arc::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn refresh_classifies_and_evaluates() {
        let mut pipeline = pipeline();
        let visible = pipeline.refresh().await.unwrap();

        // The blank-agency bus and the sentinel-location stop drop out.
        assert_eq!(pipeline.markers().len(), 4);
        assert_eq!(visible, 2);
        assert_eq!(pipeline.visible_count(), 2);
    }

    #[tokio::test]
    async fn failed_cycle_keeps_previous_markers() {
        let source = MockFeedClient::new(records());
        let mut pipeline =
            MarkerPipeline::new(source.clone(), Arc::new(MemoryStore::new()));

        pipeline.refresh().await.unwrap();
        let before = pipeline.visible_count();
        let generation = pipeline.generation();

        source.set_fail(true);
        assert!(pipeline.refresh().await.is_err());

        // Stale but intact.
        assert_eq!(pipeline.visible_count(), before);
        assert_eq!(pipeline.generation(), generation);
        assert!(!*pipeline.loading().borrow());
    }

    #[tokio::test]
    async fn no_enabled_sources_clears_markers_without_fetching() {
        let source = MockFeedClient::new(records());
        let mut pipeline =
            MarkerPipeline::new(source.clone(), Arc::new(MemoryStore::new()));
        pipeline.refresh().await.unwrap();
        assert!(!pipeline.markers().is_empty());

        for root in [
            ids::IRISH_RAIL_TRAINS,
            ids::IRISH_RAIL_STATIONS,
            ids::LUAS_STOPS,
            ids::BUS_STOPS,
            ids::BUSES,
        ] {
            pipeline.toggle_filter(root).unwrap();
        }

        // Even with the source failing, an empty selection succeeds.
        source.set_fail(true);
        assert_eq!(pipeline.refresh().await.unwrap(), 0);
        assert!(pipeline.markers().is_empty());
    }

    #[tokio::test]
    async fn toggle_filter_re_evaluates() {
        let mut pipeline = pipeline();
        pipeline.refresh().await.unwrap();
        assert_eq!(pipeline.visible_count(), 2);

        pipeline.toggle_filter(ids::BUSES).unwrap();
        assert_eq!(pipeline.visible_count(), 1);

        pipeline.toggle_filter(ids::BUSES).unwrap();
        assert_eq!(pipeline.visible_count(), 2);
    }

    #[tokio::test]
    async fn refused_toggle_leaves_state_alone() {
        let mut pipeline = pipeline();
        pipeline.refresh().await.unwrap();

        pipeline.toggle_filter(ids::MAINLINE).unwrap();
        pipeline.toggle_filter(ids::SUBURBAN).unwrap();
        let err = pipeline.toggle_filter(ids::DART).unwrap_err();
        assert!(matches!(err, FilterError::MinimumSelection { .. }));
        assert!(pipeline.filters().is_selected(ids::DART));
    }

    #[tokio::test]
    async fn favourites_only_narrows_to_favourited() {
        let mut pipeline = pipeline();
        pipeline.refresh().await.unwrap();

        let key = FavouriteKey::new(ObjectType::IrishRailTrain, "E108");
        pipeline.toggle_favourite(&key);
        pipeline.set_favourites_only(true);

        assert_eq!(pipeline.visible_count(), 1);
        let visible: Vec<_> = pipeline.visible_markers().collect();
        assert_eq!(visible[0].favourite_key.as_ref().unwrap().natural_id, "E108");

        pipeline.set_favourites_only(false);
        assert_eq!(pipeline.visible_count(), 2);
    }

    #[tokio::test]
    async fn search_filters_visible_set() {
        let mut pipeline = pipeline();
        pipeline.refresh().await.unwrap();

        // "47a" matches the 47A route, not the 145.
        let hits = pipeline.search("47a");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].search_text.contains("47a"));

        let hits = pipeline.search("gondola");
        assert!(hits.is_empty());

        let hits = pipeline.search("");
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn radius_setting_persists() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let mut pipeline = MarkerPipeline::new(
            MockFeedClient::new(records()),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        );

        pipeline.set_radius_km(Some(5.0));
        assert_eq!(pipeline.geo().radius_km, Some(5.0));

        let reloaded = MarkerPipeline::new(MockFeedClient::new(Vec::new()), store);
        assert_eq!(reloaded.geo().radius_km, Some(5.0));
    }

    #[tokio::test]
    async fn filter_selection_persists() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let mut pipeline = MarkerPipeline::new(
            MockFeedClient::new(Vec::new()),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        );
        pipeline.toggle_filter(ids::BUSES).unwrap();

        let reloaded = MarkerPipeline::new(MockFeedClient::new(Vec::new()), store);
        assert!(!reloaded.filters().is_selected(ids::BUSES));
    }

    #[tokio::test(start_paused = true)]
    async fn loading_settles_for_large_result_sets() {
        let many: Vec<RawRecord> = (0..20)
            .map(|i| {
                RawRecord::from_value(json!({
                    "objectType": "BusStop",
                    "latitude": "53.3",
                    "longitude": "-6.3",
                    "busStopID": format!("{i}"),
                    "busStopName": format!("Stop {i}"),
                }))
            })
            .collect();

        let config = PipelineConfig {
            large_result_threshold: 10,
            settle_delay: Duration::from_millis(500),
        };
        let mut pipeline = MarkerPipeline::with_config(
            MockFeedClient::new(many),
            Arc::new(MemoryStore::new()),
            config,
        );

        let mut loading = pipeline.loading();

        let start = tokio::time::Instant::now();
        pipeline.refresh().await.unwrap();
        // The settle delay held the loading flag up past the classify pass.
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(!*loading.borrow_and_update());
    }

    #[tokio::test]
    async fn generation_changes_on_rebuild_and_re_evaluation() {
        let mut pipeline = pipeline();
        let g0 = pipeline.generation();
        pipeline.refresh().await.unwrap();
        let g1 = pipeline.generation();
        assert_ne!(g0, g1);

        pipeline.re_evaluate();
        assert_ne!(pipeline.generation(), g1);
    }
}
