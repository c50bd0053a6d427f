//! The lead search session state machine.
//!
//! ```text
//! Idle ──start_search──▶ Searching ──▶ Ready ⇄ LoadingMore
//!   ▲                                    │
//!   └──────────────── clear ─────────────┘
//! ```
//!
//! Every session start and every clear bumps an epoch counter. A request
//! remembers the epoch it was issued under, and its response (leads or
//! markers) is dropped if the epoch has moved on by the time it arrives.
//!
//! Locks are never held across a call to the search service or the
//! geocoder. When both are needed the session lock is taken before the map
//! lock.

use std::ops::RangeInclusive;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use skopus_core::leads::FIRST_PAGE;
use skopus_core::{Coordinate, Lead, LocationDescriptor, SearchQuery, ValidationError};
use skopus_geo::{Geocoder, MapSurface, MarkerLabel};
use tokio::sync::Mutex;

use crate::csv::{csv_file_name, leads_to_csv};
use crate::error::{SearchError, SearchField};
use crate::source::LeadSource;

/// Share of the marker bounding box added on each side when fitting the map.
pub const FIT_PADDING: f64 = 0.1;

/// Radius slider range.
pub const RADIUS_RANGE_KM: RangeInclusive<u32> = 1..=50;

/// Geocode lookups allowed in flight at once while placing a batch.
pub const DEFAULT_GEOCODE_CONCURRENCY: usize = 2;

const DEVICE_ZOOM: u8 = 14;
const FOCUS_ZOOM: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Searching,
    Ready,
    LoadingMore,
}

/// Result of one page that reached the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub page: u32,
    /// Leads in this batch.
    pub received: usize,
    /// Markers added for this batch.
    pub placed: usize,
    /// Leads in the session after the batch was merged.
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadMoreOutcome {
    Loaded(BatchReport),
    /// Another page is already being fetched.
    InFlight,
    /// The session holds the maximum number of leads.
    CapReached,
    /// There is no settled search to extend.
    NoActiveSearch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SearchState,
    pub query: Option<SearchQuery>,
    pub page: u32,
    pub leads: Vec<Lead>,
    pub lead_cap: usize,
    pub can_load_more: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug)]
struct Session {
    state: SearchState,
    query: Option<SearchQuery>,
    leads: Vec<Lead>,
    epoch: u64,
    last_error: Option<String>,
}

impl Session {
    fn page(&self) -> u32 {
        self.query.as_ref().map_or(FIRST_PAGE, |q| q.page)
    }
}

/// Drives paging, lead accumulation and marker placement for one view.
pub struct LeadSearchController<S, G, M> {
    source: S,
    geocoder: G,
    map: Mutex<M>,
    session: Mutex<Session>,
    lead_cap: usize,
    geocode_concurrency: usize,
}

impl<S, G, M> LeadSearchController<S, G, M>
where
    S: LeadSource,
    G: Geocoder,
    M: MapSurface,
{
    pub fn new(source: S, geocoder: G, map: M, lead_cap: usize) -> Self {
        Self {
            source,
            geocoder,
            map: Mutex::new(map),
            session: Mutex::new(Session {
                state: SearchState::Idle,
                query: None,
                leads: Vec::new(),
                epoch: 0,
                last_error: None,
            }),
            lead_cap,
            geocode_concurrency: DEFAULT_GEOCODE_CONCURRENCY,
        }
    }

    /// Caps concurrent geocode lookups per batch. Zero is treated as one.
    #[must_use]
    pub fn with_geocode_concurrency(mut self, limit: usize) -> Self {
        self.geocode_concurrency = limit.max(1);
        self
    }

    /// Starts a new session and fetches its first page.
    ///
    /// Prior leads and markers are discarded and the page counter returns to
    /// 1 before the request is issued.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] for a blank niche or unusable location;
    ///   the current session is left untouched.
    /// - [`SearchError::Upstream`] when the search fails; the session is
    ///   `Ready` with no leads.
    /// - [`SearchError::Superseded`] when the session was restarted or
    ///   cleared before the page arrived.
    pub async fn start_search(
        &self,
        niche: &str,
        location: LocationDescriptor,
    ) -> Result<BatchReport, SearchError> {
        validate(niche, &location)?;
        let query = SearchQuery::new(niche.trim(), location);

        let epoch = {
            let mut session = self.session.lock().await;
            session.epoch += 1;
            session.state = SearchState::Searching;
            session.leads.clear();
            session.query = Some(query.clone());
            session.last_error = None;
            self.map.lock().await.remove_all_markers();
            session.epoch
        };

        tracing::info!(niche = %query.niche, location = %query.location, epoch, "lead search started");
        let result = self
            .source
            .search(&query.niche, &query.location, FIRST_PAGE)
            .await;

        let batch = {
            let mut session = self.session.lock().await;
            if session.epoch != epoch {
                tracing::debug!(epoch, current = session.epoch, "discarding stale search page");
                return Err(SearchError::Superseded { epoch });
            }
            session.state = SearchState::Ready;
            match result {
                Ok(batch) => {
                    session.leads.clone_from(&batch);
                    batch
                }
                Err(e) => {
                    tracing::warn!(niche = %query.niche, error = %e, "lead search failed");
                    session.last_error = Some(e.to_string());
                    return Err(e.into());
                }
            }
        };

        let placed = self.place_markers(epoch, &batch).await;
        Ok(BatchReport {
            page: FIRST_PAGE,
            received: batch.len(),
            placed,
            total: batch.len(),
        })
    }

    /// Fetches the next page and appends it to the session.
    ///
    /// No-op while another page is loading, once the lead cap is reached, or
    /// when no search has settled with at least one lead. The page counter advances before the
    /// request and is not rolled back when it fails.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Upstream`] when the search fails; earlier leads are
    ///   kept and the session returns to `Ready`.
    /// - [`SearchError::Superseded`] when the session was restarted or
    ///   cleared before the page arrived.
    pub async fn load_more(&self) -> Result<LoadMoreOutcome, SearchError> {
        let (epoch, query) = {
            let mut session = self.session.lock().await;
            match session.state {
                SearchState::LoadingMore => return Ok(LoadMoreOutcome::InFlight),
                _ if session.leads.len() >= self.lead_cap => {
                    return Ok(LoadMoreOutcome::CapReached)
                }
                SearchState::Ready if !session.leads.is_empty() => {}
                SearchState::Idle | SearchState::Searching | SearchState::Ready => {
                    return Ok(LoadMoreOutcome::NoActiveSearch)
                }
            }
            let Some(query) = session.query.as_mut() else {
                return Ok(LoadMoreOutcome::NoActiveSearch);
            };
            query.page += 1;
            let query = query.clone();
            session.state = SearchState::LoadingMore;
            session.last_error = None;
            (session.epoch, query)
        };

        tracing::info!(niche = %query.niche, page = query.page, epoch, "loading more leads");
        let result = self
            .source
            .search(&query.niche, &query.location, query.page)
            .await;

        let (batch, total) = {
            let mut session = self.session.lock().await;
            if session.epoch != epoch {
                tracing::debug!(epoch, current = session.epoch, "discarding stale lead page");
                return Err(SearchError::Superseded { epoch });
            }
            session.state = SearchState::Ready;
            match result {
                Ok(batch) => {
                    session.leads.extend(batch.iter().cloned());
                    (batch, session.leads.len())
                }
                Err(e) => {
                    tracing::warn!(page = query.page, error = %e, "loading more leads failed");
                    session.last_error = Some(e.to_string());
                    return Err(e.into());
                }
            }
        };

        let placed = self.place_markers(epoch, &batch).await;
        Ok(LoadMoreOutcome::Loaded(BatchReport {
            page: query.page,
            received: batch.len(),
            placed,
            total,
        }))
    }

    /// Ends the session: no leads, no markers, page 1, `Idle`.
    pub async fn clear(&self) {
        let mut session = self.session.lock().await;
        session.epoch += 1;
        session.state = SearchState::Idle;
        session.query = None;
        session.leads.clear();
        session.last_error = None;
        self.map.lock().await.remove_all_markers();
        tracing::info!(epoch = session.epoch, "lead search cleared");
    }

    /// Current leads as a CSV file.
    pub async fn export_csv(&self) -> CsvExport {
        let session = self.session.lock().await;
        let niche = session.query.as_ref().map_or("", |q| q.niche.as_str());
        CsvExport {
            file_name: csv_file_name(niche),
            content: leads_to_csv(&session.leads),
        }
    }

    /// Redraws the radius circle, clamped to [`RADIUS_RANGE_KM`]. Returns the
    /// radius applied.
    pub async fn set_radius(&self, radius_km: u32) -> u32 {
        let radius_km = radius_km.clamp(*RADIUS_RANGE_KM.start(), *RADIUS_RANGE_KM.end());
        self.map.lock().await.set_radius(radius_km);
        radius_km
    }

    /// Pans to the device position and moves the radius circle there.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidCoordinate`] for out-of-range values.
    pub async fn show_device_location(&self, position: Coordinate) -> Result<(), SearchError> {
        if !position.is_valid() {
            return Err(SearchError::InvalidCoordinate(position));
        }
        let mut map = self.map.lock().await;
        map.pan_to(position, DEVICE_ZOOM);
        map.center_circle(position);
        Ok(())
    }

    /// Geocodes the lead at `index` and pans the map to it.
    ///
    /// Returns `None` when the index is out of range or the address does not
    /// resolve; the map is left as it was.
    pub async fn focus_lead(&self, index: usize) -> Option<Coordinate> {
        let address = {
            let session = self.session.lock().await;
            session.leads.get(index)?.address.clone()
        };
        let position = self.geocoder.resolve(&address).await?;
        self.map.lock().await.pan_to(position, FOCUS_ZOOM);
        Some(position)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            state: session.state,
            query: session.query.clone(),
            page: session.page(),
            leads: session.leads.clone(),
            lead_cap: self.lead_cap,
            can_load_more: session.state == SearchState::Ready
                && session.query.is_some()
                && !session.leads.is_empty()
                && session.leads.len() < self.lead_cap,
            last_error: session.last_error.clone(),
        }
    }

    pub async fn state(&self) -> SearchState {
        self.session.lock().await.state
    }

    pub async fn page(&self) -> u32 {
        self.session.lock().await.page()
    }

    pub async fn lead_count(&self) -> usize {
        self.session.lock().await.leads.len()
    }

    /// Runs `f` against the map surface.
    pub async fn with_map<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        let map = self.map.lock().await;
        f(&map)
    }

    /// Geocodes `batch` with at most `geocode_concurrency` lookups in flight,
    /// then adds the resolved markers in list order and refits the map.
    /// Returns the number of markers added.
    async fn place_markers(&self, epoch: u64, batch: &[Lead]) -> usize {
        let lookups: Vec<_> = batch
            .iter()
            .map(|lead| self.geocoder.resolve(&lead.address))
            .collect();
        let resolved: Vec<Option<Coordinate>> = stream::iter(lookups)
            .buffered(self.geocode_concurrency)
            .collect()
            .await;

        let session = self.session.lock().await;
        if session.epoch != epoch {
            tracing::debug!(epoch, current = session.epoch, "discarding stale markers");
            return 0;
        }

        let mut map = self.map.lock().await;
        let mut placed = 0;
        for (lead, position) in batch.iter().zip(resolved) {
            match position {
                Some(position) => {
                    map.add_marker(position, MarkerLabel::from_lead(lead));
                    placed += 1;
                }
                None => tracing::debug!(lead = %lead.name, address = %lead.address, "lead address unresolved"),
            }
        }
        if map.marker_count() > 0 {
            map.fit_to_markers(FIT_PADDING);
        }
        drop(map);
        drop(session);

        tracing::debug!(epoch, placed, batch = batch.len(), "markers placed");
        placed
    }
}

fn validate(niche: &str, location: &LocationDescriptor) -> Result<(), SearchError> {
    let mut missing = std::collections::BTreeSet::new();
    if niche.trim().is_empty() {
        missing.insert(SearchField::Niche);
    }
    if !location.is_usable() {
        missing.insert(SearchField::Location);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing }.into())
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
