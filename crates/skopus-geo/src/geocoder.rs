//! Address-to-coordinate lookup.

use std::collections::HashMap;
use std::future::Future;

use skopus_core::Coordinate;
use tokio::sync::Mutex;

use crate::error::GeoError;

/// A service that resolves free-text addresses to coordinates.
pub trait Geocoder: Send + Sync {
    /// Looks up `address`. `Ok(None)` means the service found nothing.
    fn lookup(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, GeoError>> + Send;

    /// Best-guess coordinate for `address`, or `None` when unresolved.
    ///
    /// Never fails: blank addresses, lookup errors and timeouts all degrade
    /// to `None`.
    fn resolve(&self, address: &str) -> impl Future<Output = Option<Coordinate>> + Send {
        async move {
            if address.trim().is_empty() {
                return None;
            }
            match self.lookup(address).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::debug!(address, error = %e, "geocode lookup failed");
                    None
                }
            }
        }
    }
}

/// Cache key for an address: trimmed, lower-cased, inner whitespace collapsed.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Memoizes successful lookups of an inner [`Geocoder`] by normalized address.
///
/// "Not found" answers are cached too; transport failures are not, so a later
/// call retries them.
#[derive(Debug)]
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Mutex<HashMap<String, Option<Coordinate>>>,
}

impl<G> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached addresses.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
        let key = normalize_address(address);
        if let Some(hit) = self.cache.lock().await.get(&key) {
            return Ok(*hit);
        }

        let found = self.inner.lookup(address).await?;
        self.cache.lock().await.insert(key, found);
        Ok(found)
    }
}
