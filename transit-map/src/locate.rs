//! One-shot device location.
//!
//! The UI host supplies the actual position source; the pipeline only
//! needs a single fix to anchor the geo filter. Denial or timeout
//! disables radius filtering for the session rather than retrying.

use std::time::Duration;

use tracing::warn;

use crate::geo::Coordinates;

/// Map centre used when no device location was ever requested
/// (geographic centre of Ireland).
pub const FALLBACK_ORIGIN: Coordinates = Coordinates {
    latitude: 53.449_476_2,
    longitude: -7.502_978_6,
};

/// Options for a one-shot position request.
#[derive(Debug, Clone, Copy)]
pub struct LocateOptions {
    /// Overall deadline for the request.
    pub timeout: Duration,
    /// Accept a cached fix no older than this.
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
            high_accuracy: false,
        }
    }
}

/// Errors from a location provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocateError {
    #[error("location permission denied")]
    Denied,

    #[error("location request timed out")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// One-shot position source supplied by the UI host.
#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    async fn locate(&self, options: LocateOptions) -> Result<Coordinates, LocateError>;
}

/// Provider returning a fixed position (tests and headless use).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider(pub Coordinates);

impl LocationProvider for FixedLocationProvider {
    async fn locate(&self, _options: LocateOptions) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// Resolve the geo-filter origin once per session.
///
/// Applies `options.timeout` on top of whatever the provider does. On any
/// failure the origin is `None`, which disables radius filtering for the
/// session; the caller does not retry.
pub async fn resolve_origin<P: LocationProvider>(
    provider: &P,
    options: LocateOptions,
) -> Option<Coordinates> {
    match tokio::time::timeout(options.timeout, provider.locate(options)).await {
        Ok(Ok(coordinates)) => Some(coordinates),
        Ok(Err(e)) => {
            warn!(error = %e, "geolocation failed; radius filtering disabled");
            None
        }
        Err(_) => {
            warn!("geolocation timed out; radius filtering disabled");
            None
        }
    }
}
