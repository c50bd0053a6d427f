use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use skopus_geo::{GeoError, MarkerHandle, MarkerMap, Viewport};
use skopus_genai::GenAiError;
use tokio::sync::Notify;

use super::*;

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

type Reply = Result<Vec<Lead>, GenAiError>;

/// Scripted search service. Replies are consumed in call order; an empty
/// script answers with an empty page.
#[derive(Default)]
struct StubSource {
    replies: std::sync::Mutex<VecDeque<Reply>>,
    requests: std::sync::Mutex<Vec<(String, u32)>>,
    calls: AtomicU32,
    /// When set, each call signals `entered` and waits on `release`.
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl StubSource {
    fn scripted(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    fn gated(mut self, entered: &Arc<Notify>, release: &Arc<Notify>) -> Self {
        self.gate = Some((Arc::clone(entered), Arc::clone(release)));
        self
    }
}

impl LeadSource for StubSource {
    async fn search(
        &self,
        _niche: &str,
        location: &LocationDescriptor,
        page: u32,
    ) -> Result<Vec<Lead>, GenAiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((location.to_string(), page));
        let reply = self.replies.lock().unwrap().pop_front();
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        reply.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Deterministic address book, with optional per-address latency.
#[derive(Default)]
struct StubGeocoder {
    known: HashMap<String, Coordinate>,
    delays_ms: HashMap<String, u64>,
    calls: AtomicU32,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubGeocoder {
    fn with(entries: &[(&str, Coordinate)]) -> Self {
        Self {
            known: entries
                .iter()
                .map(|(a, c)| ((*a).to_owned(), *c))
                .collect(),
            ..Self::default()
        }
    }
}

impl Geocoder for StubGeocoder {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(ms) = self.delays_ms.get(address) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if address == "network down" {
            return Err(GeoError::UnexpectedStatus { status: 503 });
        }
        Ok(self.known.get(address).copied())
    }
}

/// Marker map that also records what the controller asked of it.
struct RecordingMap {
    inner: MarkerMap,
    added: Vec<Coordinate>,
    fit_calls: usize,
}

impl RecordingMap {
    fn new() -> Self {
        Self {
            inner: MarkerMap::new(sao_paulo(), 10),
            added: Vec::new(),
            fit_calls: 0,
        }
    }
}

impl MapSurface for RecordingMap {
    fn initialize(&mut self, center: Coordinate, radius_km: u32) {
        self.inner.initialize(center, radius_km);
    }
    fn set_radius(&mut self, radius_km: u32) {
        self.inner.set_radius(radius_km);
    }
    fn center_circle(&mut self, center: Coordinate) {
        self.inner.center_circle(center);
    }
    fn add_marker(&mut self, position: Coordinate, label: MarkerLabel) -> MarkerHandle {
        self.added.push(position);
        self.inner.add_marker(position, label)
    }
    fn remove_all_markers(&mut self) {
        self.inner.remove_all_markers();
    }
    fn fit_to_markers(&mut self, padding: f64) {
        self.fit_calls += 1;
        self.inner.fit_to_markers(padding);
    }
    fn pan_to(&mut self, center: Coordinate, zoom: u8) {
        self.inner.pan_to(center, zoom);
    }
    fn marker_count(&self) -> usize {
        self.inner.marker_count()
    }
}

type Controller = LeadSearchController<StubSource, StubGeocoder, RecordingMap>;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn sao_paulo() -> Coordinate {
    Coordinate::new(-23.5505, -46.6333)
}

fn aurora() -> Coordinate {
    Coordinate::new(-8.0631, -34.8711)
}

fn boa_viagem() -> Coordinate {
    Coordinate::new(-8.1193, -34.9050)
}

fn lead(name: &str, address: &str) -> Lead {
    Lead {
        id: name.to_lowercase(),
        name: name.to_owned(),
        description: String::new(),
        rating: Some(4.5),
        instagram_url: String::new(),
        instagram_handle: Some(format!("@{}", name.to_lowercase())),
        whatsapp_url: String::new(),
        whatsapp_number: None,
        address: address.to_owned(),
    }
}

fn page_of(n: usize, prefix: &str) -> Vec<Lead> {
    (0..n)
        .map(|i| lead(&format!("{prefix}{i}"), "sem endereço"))
        .collect()
}

fn recife() -> LocationDescriptor {
    LocationDescriptor::Place("Recife".to_owned())
}

fn upstream_failure() -> GenAiError {
    GenAiError::EmptyResponse {
        model: "stub".to_owned(),
    }
}

fn controller(source: StubSource, geocoder: StubGeocoder) -> Controller {
    LeadSearchController::new(source, geocoder, RecordingMap::new(), 100)
}

// ---------------------------------------------------------------------------
// start_search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_scenario_one_resolvable_address() {
    let source = StubSource::scripted([Ok(vec![
        lead("Aurora", "Rua da Aurora, 10"),
        lead("Fantasma", "Rua que não existe"),
    ])]);
    let geocoder = StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]);
    let ctl = controller(source, geocoder);

    let report = ctl.start_search("Barbearias", recife()).await.unwrap();

    assert_eq!(
        report,
        BatchReport {
            page: 1,
            received: 2,
            placed: 1,
            total: 2
        }
    );
    assert_eq!(ctl.lead_count().await, 2);
    assert_eq!(ctl.with_map(MapSurface::marker_count).await, 1);
    assert_eq!(ctl.state().await, SearchState::Ready);
    assert_eq!(ctl.export_csv().await.content.lines().count(), 3);
}

#[tokio::test]
async fn resolved_address_becomes_marker_at_that_coordinate() {
    let source = StubSource::scripted([Ok(vec![lead("Aurora", "Rua da Aurora, 10")])]);
    let ctl = controller(source, StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]));

    ctl.start_search("Barbearias", recife()).await.unwrap();

    assert_eq!(ctl.with_map(|m| m.added.clone()).await, vec![aurora()]);
    let label_name = ctl
        .with_map(|m| m.inner.markers()[0].label.name.clone())
        .await;
    assert_eq!(label_name, "Aurora");
}

#[tokio::test]
async fn search_keeps_service_order() {
    let source = StubSource::scripted([Ok(vec![
        lead("Zeta", "a"),
        lead("Alfa", "b"),
        lead("Meio", "c"),
    ])]);
    let ctl = controller(source, StubGeocoder::default());

    ctl.start_search("Barbearias", recife()).await.unwrap();

    let names: Vec<String> = ctl
        .snapshot()
        .await
        .leads
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Zeta", "Alfa", "Meio"]);
}

#[tokio::test]
async fn failed_search_resets_list_and_page() {
    let source = StubSource::scripted([
        Ok(page_of(5, "a")),
        Ok(page_of(5, "b")),
        Err(upstream_failure()),
    ]);
    let ctl = controller(source, StubGeocoder::default());

    ctl.start_search("Barbearias", recife()).await.unwrap();
    ctl.load_more().await.unwrap();
    assert_eq!(ctl.page().await, 2);

    let err = ctl.start_search("Padarias", recife()).await.unwrap_err();
    assert!(matches!(err, SearchError::Upstream(_)));

    let snap = ctl.snapshot().await;
    assert!(snap.leads.is_empty());
    assert_eq!(snap.page, 1);
    assert_eq!(snap.state, SearchState::Ready);
    assert!(snap.last_error.is_some());
    assert_eq!(ctl.with_map(MapSurface::marker_count).await, 0);
}

#[tokio::test]
async fn load_more_after_failed_search_issues_no_request() {
    let source = StubSource::scripted([Err(upstream_failure()), Ok(page_of(2, "b"))]);
    let ctl = controller(source, StubGeocoder::default());

    ctl.start_search("Barbearias", recife()).await.unwrap_err();
    assert!(!ctl.snapshot().await.can_load_more);

    assert_eq!(
        ctl.load_more().await.unwrap(),
        LoadMoreOutcome::NoActiveSearch
    );
    assert_eq!(ctl.page().await, 1);
    assert_eq!(ctl.state().await, SearchState::Ready);
    assert_eq!(*ctl.source.requests.lock().unwrap(), vec![("Recife".to_owned(), 1)]);
}

#[tokio::test]
async fn empty_first_page_cannot_be_extended() {
    let source = StubSource::scripted([Ok(Vec::new())]);
    let ctl = controller(source, StubGeocoder::default());

    let report = ctl.start_search("Barbearias", recife()).await.unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(
        ctl.load_more().await.unwrap(),
        LoadMoreOutcome::NoActiveSearch
    );
    assert_eq!(ctl.source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn new_search_clears_markers_before_request() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let geocoder = StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]);
    let source = StubSource::scripted([
        Ok(vec![lead("Aurora", "Rua da Aurora, 10")]),
        Ok(Vec::new()),
    ])
    .gated(&entered, &release);
    let ctl = Arc::new(controller(source, geocoder));

    let first = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Barbearias", recife()).await })
    };
    entered.notified().await;
    release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(ctl.with_map(MapSurface::marker_count).await, 1);

    let second = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Padarias", recife()).await })
    };
    entered.notified().await;
    assert_eq!(ctl.state().await, SearchState::Searching);
    assert_eq!(ctl.lead_count().await, 0);
    assert_eq!(ctl.page().await, 1);
    assert_eq!(ctl.with_map(MapSurface::marker_count).await, 0);
    release.notify_one();
    second.await.unwrap().unwrap();
}

#[tokio::test]
async fn blank_inputs_are_rejected_without_request() {
    let ctl = controller(StubSource::default(), StubGeocoder::default());

    let err = ctl
        .start_search("  ", LocationDescriptor::Place(String::new()))
        .await
        .unwrap_err();

    let SearchError::Validation(validation) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(validation.field_names(), vec!["niche", "location"]);
    assert_eq!(ctl.state().await, SearchState::Idle);
    assert_eq!(ctl.source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_search_leaves_current_session_alone() {
    let source = StubSource::scripted([Ok(page_of(3, "a"))]);
    let ctl = controller(source, StubGeocoder::default());
    ctl.start_search("Barbearias", recife()).await.unwrap();

    let err = ctl.start_search("", recife()).await.unwrap_err();

    assert!(matches!(err, SearchError::Validation(_)));
    assert_eq!(ctl.lead_count().await, 3);
}

#[tokio::test]
async fn device_location_is_sent_as_coordinates() {
    let ctl = controller(StubSource::default(), StubGeocoder::default());

    ctl.start_search(
        "Barbearias",
        LocationDescriptor::Device(Coordinate::new(-8.05, -34.9)),
    )
    .await
    .unwrap();

    let requests = ctl.source.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![("Coord: -8.05, -34.9".to_owned(), 1)]);
}

// ---------------------------------------------------------------------------
// load_more
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_more_appends_and_geocodes_only_new_batch() {
    let source = StubSource::scripted([
        Ok(vec![lead("Aurora", "Rua da Aurora, 10")]),
        Ok(vec![lead("Praia", "Av. Boa Viagem, 1"), lead("Nada", "?")]),
    ]);
    let geocoder = StubGeocoder::with(&[
        ("Rua da Aurora, 10", aurora()),
        ("Av. Boa Viagem, 1", boa_viagem()),
    ]);
    let ctl = controller(source, geocoder);

    ctl.start_search("Barbearias", recife()).await.unwrap();
    let outcome = ctl.load_more().await.unwrap();

    assert_eq!(
        outcome,
        LoadMoreOutcome::Loaded(BatchReport {
            page: 2,
            received: 2,
            placed: 1,
            total: 3
        })
    );
    assert_eq!(ctl.geocoder.calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        ctl.with_map(|m| m.added.clone()).await,
        vec![aurora(), boa_viagem()]
    );
    let names: Vec<String> = ctl
        .snapshot()
        .await
        .leads
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Aurora", "Praia", "Nada"]);
    assert_eq!(
        ctl.source.requests.lock().unwrap().last().map(|r| r.1),
        Some(2)
    );
}

#[tokio::test]
async fn failed_load_more_keeps_leads_and_advances_page() {
    let source = StubSource::scripted([
        Ok(page_of(4, "a")),
        Err(upstream_failure()),
        Ok(page_of(2, "c")),
    ]);
    let ctl = controller(source, StubGeocoder::default());

    ctl.start_search("Barbearias", recife()).await.unwrap();
    let err = ctl.load_more().await.unwrap_err();
    assert!(matches!(err, SearchError::Upstream(_)));
    assert_eq!(ctl.lead_count().await, 4);
    assert_eq!(ctl.page().await, 2);
    assert_eq!(ctl.state().await, SearchState::Ready);

    ctl.load_more().await.unwrap();
    assert_eq!(ctl.page().await, 3);
    assert_eq!(ctl.lead_count().await, 6);

    let pages: Vec<u32> = ctl
        .source
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.1)
        .collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test]
async fn second_load_more_while_in_flight_is_a_no_op() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source = StubSource::scripted([Ok(page_of(3, "a")), Ok(page_of(3, "b"))])
        .gated(&entered, &release);
    let ctl = Arc::new(controller(source, StubGeocoder::default()));

    let search = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Barbearias", recife()).await })
    };
    entered.notified().await;
    release.notify_one();
    search.await.unwrap().unwrap();

    let first = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.load_more().await })
    };
    entered.notified().await;

    assert_eq!(ctl.load_more().await.unwrap(), LoadMoreOutcome::InFlight);
    assert_eq!(ctl.state().await, SearchState::LoadingMore);
    assert_eq!(ctl.source.calls.load(Ordering::SeqCst), 2);

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, LoadMoreOutcome::Loaded(r) if r.total == 6));
    assert_eq!(ctl.page().await, 2);
    assert_eq!(ctl.state().await, SearchState::Ready);
}

#[tokio::test]
async fn load_more_stops_at_lead_cap() {
    let source = StubSource::scripted([Ok(page_of(3, "a"))]);
    let ctl = LeadSearchController::new(source, StubGeocoder::default(), RecordingMap::new(), 3);

    ctl.start_search("Barbearias", recife()).await.unwrap();

    assert_eq!(ctl.load_more().await.unwrap(), LoadMoreOutcome::CapReached);
    assert_eq!(ctl.source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctl.page().await, 1);
    assert!(!ctl.snapshot().await.can_load_more);
}

#[tokio::test]
async fn load_more_without_search_does_nothing() {
    let ctl = controller(StubSource::default(), StubGeocoder::default());
    assert_eq!(
        ctl.load_more().await.unwrap(),
        LoadMoreOutcome::NoActiveSearch
    );
    assert_eq!(ctl.source.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Marker placement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unresolvable_batch_refits_only_when_markers_exist() {
    let source = StubSource::scripted([
        Ok(vec![lead("Nada", "?")]),
        Ok(vec![lead("Aurora", "Rua da Aurora, 10")]),
        Ok(vec![lead("Outro", "??"), lead("Falha", "network down")]),
    ]);
    let geocoder = StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]);
    let ctl = controller(source, geocoder);

    let first = ctl.start_search("Barbearias", recife()).await.unwrap();
    assert_eq!(first.placed, 0);
    assert_eq!(ctl.with_map(|m| m.fit_calls).await, 0);

    ctl.load_more().await.unwrap();
    assert_eq!(ctl.with_map(|m| m.fit_calls).await, 1);

    let third = ctl.load_more().await.unwrap();
    assert!(matches!(third, LoadMoreOutcome::Loaded(r) if r.placed == 0));
    assert_eq!(ctl.with_map(|m| m.fit_calls).await, 2);
    assert_eq!(ctl.with_map(MapSurface::marker_count).await, 1);
    assert_eq!(ctl.lead_count().await, 4);
}

#[tokio::test]
async fn markers_follow_list_order_despite_completion_order() {
    let source = StubSource::scripted([Ok(vec![
        lead("Lento", "Rua da Aurora, 10"),
        lead("Rapido", "Av. Boa Viagem, 1"),
    ])]);
    let mut geocoder = StubGeocoder::with(&[
        ("Rua da Aurora, 10", aurora()),
        ("Av. Boa Viagem, 1", boa_viagem()),
    ]);
    geocoder.delays_ms.insert("Rua da Aurora, 10".to_owned(), 50);
    let ctl = controller(source, geocoder);

    ctl.start_search("Barbearias", recife()).await.unwrap();

    assert_eq!(
        ctl.with_map(|m| m.added.clone()).await,
        vec![aurora(), boa_viagem()]
    );
    let viewport = ctl.with_map(|m| m.inner.viewport()).await;
    let Viewport::Fitted { bounds } = viewport else {
        panic!("expected fitted viewport, got {viewport:?}");
    };
    assert!(bounds.contains(aurora()) && bounds.contains(boa_viagem()));
}

#[tokio::test]
async fn geocode_lookups_respect_concurrency_limit() {
    let batch: Vec<Lead> = (0..30)
        .map(|i| lead(&format!("Loja{i}"), &format!("Rua {i}")))
        .collect();
    let mut geocoder = StubGeocoder::with(&[("Rua 0", aurora()), ("Rua 29", boa_viagem())]);
    for i in 0..30 {
        geocoder.delays_ms.insert(format!("Rua {i}"), 5);
    }
    let ctl = LeadSearchController::new(
        StubSource::scripted([Ok(batch)]),
        geocoder,
        RecordingMap::new(),
        100,
    )
    .with_geocode_concurrency(3);

    let report = ctl.start_search("Barbearias", recife()).await.unwrap();

    assert_eq!(ctl.geocoder.calls.load(Ordering::SeqCst), 30);
    let peak = ctl.geocoder.peak_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrent lookups {peak}");
    assert!(peak > 1, "lookups never overlapped");
    assert_eq!(report.placed, 2);
    assert_eq!(
        ctl.with_map(|m| m.added.clone()).await,
        vec![aurora(), boa_viagem()]
    );
}

#[tokio::test]
async fn zero_concurrency_still_geocodes() {
    let source = StubSource::scripted([Ok(vec![lead("Aurora", "Rua da Aurora, 10")])]);
    let geocoder = StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]);
    let ctl = LeadSearchController::new(source, geocoder, RecordingMap::new(), 100)
        .with_geocode_concurrency(0);

    let report = ctl.start_search("Barbearias", recife()).await.unwrap();
    assert_eq!(report.placed, 1);
    assert_eq!(ctl.geocoder.peak_in_flight.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Stale responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clear_during_search_discards_late_page() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source =
        StubSource::scripted([Ok(page_of(5, "a"))]).gated(&entered, &release);
    let ctl = Arc::new(controller(source, StubGeocoder::default()));

    let search = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Barbearias", recife()).await })
    };
    entered.notified().await;
    ctl.clear().await;
    release.notify_one();

    let err = search.await.unwrap().unwrap_err();
    assert!(matches!(err, SearchError::Superseded { .. }));
    assert_eq!(ctl.state().await, SearchState::Idle);
    assert_eq!(ctl.lead_count().await, 0);
}

#[tokio::test]
async fn newer_search_wins_over_older_late_response() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source = StubSource::scripted([Ok(page_of(5, "old")), Ok(page_of(2, "new"))])
        .gated(&entered, &release);
    let ctl = Arc::new(controller(source, StubGeocoder::default()));

    let old = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Barbearias", recife()).await })
    };
    entered.notified().await;

    let new = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Padarias", recife()).await })
    };
    entered.notified().await;

    // Both requests are parked; the finishing order does not matter.
    release.notify_one();
    release.notify_one();
    let new = new.await.unwrap();
    let old = old.await.unwrap();

    let leads = ctl.snapshot().await.leads;
    assert_eq!(leads.len(), 2);
    assert!(leads.iter().all(|l| l.name.starts_with("new")));
    assert!(new.is_ok());
    assert!(matches!(old, Err(SearchError::Superseded { .. })));
}

#[tokio::test]
async fn clear_during_load_more_keeps_session_cleared() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source = StubSource::scripted([Ok(page_of(2, "a")), Ok(page_of(2, "b"))])
        .gated(&entered, &release);
    let ctl = Arc::new(controller(source, StubGeocoder::default()));

    let search = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.start_search("Barbearias", recife()).await })
    };
    entered.notified().await;
    release.notify_one();
    search.await.unwrap().unwrap();

    let more = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.load_more().await })
    };
    entered.notified().await;
    ctl.clear().await;
    release.notify_one();

    assert!(matches!(
        more.await.unwrap(),
        Err(SearchError::Superseded { .. })
    ));
    let snap = ctl.snapshot().await;
    assert_eq!(snap.state, SearchState::Idle);
    assert_eq!(snap.page, 1);
    assert!(snap.leads.is_empty());
}

// ---------------------------------------------------------------------------
// clear / export / map extras
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clear_resets_session_and_markers() {
    let source = StubSource::scripted([
        Ok(vec![lead("Aurora", "Rua da Aurora, 10")]),
        Ok(page_of(1, "b")),
    ]);
    let ctl = controller(source, StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]));
    ctl.start_search("Barbearias", recife()).await.unwrap();
    ctl.load_more().await.unwrap();

    ctl.clear().await;

    let snap = ctl.snapshot().await;
    assert_eq!(snap.state, SearchState::Idle);
    assert_eq!(snap.page, 1);
    assert!(snap.leads.is_empty());
    assert!(snap.query.is_none());
    assert_eq!(ctl.with_map(MapSurface::marker_count).await, 0);
}

#[tokio::test]
async fn export_on_empty_session_is_header_only() {
    let ctl = controller(StubSource::default(), StubGeocoder::default());
    let export = ctl.export_csv().await;
    assert_eq!(export.file_name, "leads_skopu.csv");
    assert_eq!(export.content.lines().count(), 1);
}

#[tokio::test]
async fn export_uses_session_niche() {
    let source = StubSource::scripted([Ok(page_of(2, "a"))]);
    let ctl = controller(source, StubGeocoder::default());
    ctl.start_search(" Barbearias ", recife()).await.unwrap();
    assert_eq!(ctl.export_csv().await.file_name, "leads_Barbearias.csv");
}

#[tokio::test]
async fn radius_is_clamped_to_slider_range() {
    let ctl = controller(StubSource::default(), StubGeocoder::default());
    assert_eq!(ctl.set_radius(0).await, 1);
    assert_eq!(ctl.set_radius(75).await, 50);
    assert_eq!(ctl.set_radius(25).await, 25);
    assert_eq!(ctl.with_map(|m| m.inner.circle().radius_km).await, 25);
}

#[tokio::test]
async fn focus_lead_pans_to_resolved_address() {
    let source = StubSource::scripted([Ok(vec![
        lead("Aurora", "Rua da Aurora, 10"),
        lead("Nada", "?"),
    ])]);
    let ctl = controller(source, StubGeocoder::with(&[("Rua da Aurora, 10", aurora())]));
    ctl.start_search("Barbearias", recife()).await.unwrap();

    assert_eq!(ctl.focus_lead(0).await, Some(aurora()));
    assert_eq!(
        ctl.with_map(|m| m.inner.viewport()).await,
        Viewport::Centered {
            center: aurora(),
            zoom: 16
        }
    );

    assert_eq!(ctl.focus_lead(1).await, None);
    assert_eq!(ctl.focus_lead(9).await, None);
}

#[tokio::test]
async fn device_location_pans_and_moves_circle() {
    let ctl = controller(StubSource::default(), StubGeocoder::default());
    let here = Coordinate::new(-8.05, -34.9);

    ctl.show_device_location(here).await.unwrap();

    let (viewport, circle) = ctl
        .with_map(|m| (m.inner.viewport(), m.inner.circle()))
        .await;
    assert_eq!(
        viewport,
        Viewport::Centered {
            center: here,
            zoom: 14
        }
    );
    assert_eq!(circle.center, here);

    let err = ctl
        .show_device_location(Coordinate::new(123.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidCoordinate(_)));
}

#[tokio::test]
async fn snapshot_serializes_state_names() {
    let source = StubSource::scripted([Ok(page_of(1, "a"))]);
    let ctl = controller(source, StubGeocoder::default());
    ctl.start_search("Barbearias", recife()).await.unwrap();

    let json = serde_json::to_value(ctl.snapshot().await).unwrap();
    assert_eq!(json["state"], "ready");
    assert_eq!(json["page"], 1);
    assert_eq!(json["can_load_more"], true);
    assert_eq!(json["query"]["location"]["kind"], "place");
}
