//! Session controller tests
//!
//! Drive the controller against a scripted catalog whose calls can be held
//! open with a gate, so completions can be forced to arrive in any order.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use cinegraph::api::{ApiError, ApiResult, CatalogApi, ErrorKind};
use cinegraph::models::{
    AvailabilityOffer, Region, StreamingAvailability, Title, TitleSummary,
};
use cinegraph::session::{
    AvailabilityView, DetailView, GeoOutcome, MemoryRegionStorage, RegionStore,
    SessionController, Status,
};

// =============================================================================
// Scripted catalog
// =============================================================================

#[derive(Default)]
struct ScriptedCatalog {
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    failures: Mutex<HashSet<String>>,
    geo_code: Mutex<String>,
}

impl ScriptedCatalog {
    fn new() -> Arc<Self> {
        let catalog = Self::default();
        *catalog.geo_code.lock().unwrap() = "IN".to_string();
        Arc::new(catalog)
    }

    /// Hold the next call for `key` until the returned sender fires
    fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    fn fail(&self, key: &str) {
        self.failures.lock().unwrap().insert(key.to_string());
    }

    fn set_geo_code(&self, code: &str) {
        *self.geo_code.lock().unwrap() = code.to_string();
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, key: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(key.clone());
        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failures.lock().unwrap().contains(&key) {
            return Err(if key.starts_with("movie:") {
                ApiError::NotFound
            } else {
                ApiError::Status(503)
            });
        }
        Ok(())
    }
}

fn summary(id: u64, title: &str) -> TitleSummary {
    TitleSummary {
        id,
        title: title.to_string(),
        release_date: None,
        poster_path: None,
        vote_average: None,
        overview: None,
    }
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn search(&self, query: &str) -> ApiResult<Vec<TitleSummary>> {
        self.enter(format!("search:{}", query)).await?;
        Ok(vec![summary(query.len() as u64, query)])
    }

    async fn trending(&self) -> ApiResult<Vec<TitleSummary>> {
        self.enter("trending".to_string()).await?;
        Ok((1..=3).map(|i| summary(i, &format!("Trending {}", i))).collect())
    }

    async fn movie(&self, id: u64) -> ApiResult<Title> {
        self.enter(format!("movie:{}", id)).await?;
        Ok(Title {
            id,
            title: format!("Movie {}", id),
            overview: None,
            release_date: Some("2001-01-01".into()),
            vote_average: Some(7.0),
            runtime: Some(100),
            poster_path: None,
            backdrop_path: None,
            genres: vec![],
            tagline: None,
        })
    }

    async fn streaming(&self, id: u64, region: Region) -> ApiResult<StreamingAvailability> {
        self.enter(format!("streaming:{}:{}", id, region)).await?;
        let mut availability = StreamingAvailability::empty(id, region);
        availability.subscription.push(AvailabilityOffer {
            provider_id: 8,
            provider_name: format!("Netflix {}", region),
            logo_path: None,
            link: None,
        });
        Ok(availability)
    }

    async fn recommendations(&self, id: u64) -> ApiResult<Vec<TitleSummary>> {
        self.enter(format!("recommendations:{}", id)).await?;
        Ok(vec![summary(id + 1, "Next"), summary(id + 2, "After")])
    }

    async fn geolocate(&self) -> ApiResult<String> {
        self.enter("geo".to_string()).await?;
        Ok(self.geo_code.lock().unwrap().clone())
    }
}

fn controller(catalog: &Arc<ScriptedCatalog>) -> SessionController {
    SessionController::new(catalog.clone(), RegionStore::in_memory())
}

fn controller_with_region(catalog: &Arc<ScriptedCatalog>, region: Region) -> SessionController {
    let store = RegionStore::new(Box::new(MemoryRegionStorage::new(Some(region))));
    SessionController::new(catalog.clone(), store)
}

/// Receive and apply one completion, returning whether it changed state
async fn step(session: &mut SessionController) -> bool {
    let event = session.next_event().await.expect("event channel closed");
    session.apply(event)
}

fn search_titles(session: &SessionController) -> Vec<String> {
    session
        .search()
        .data
        .as_ref()
        .map(|r| r.iter().map(|t| t.title.clone()).collect())
        .unwrap_or_default()
}

// =============================================================================
// Search debouncing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_burst_of_keystrokes_dispatches_last_query_only() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    for text in ["b", "bl", "bla", "blad", "blade"] {
        session.submit_query(text);
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    session.settle().await;

    assert_eq!(catalog.calls(), vec!["search:blade"]);
    assert_eq!(session.query(), "blade");
    assert_eq!(session.search().status, Status::Success);
    assert_eq!(search_titles(&session), vec!["blade"]);
}

#[tokio::test(start_paused = true)]
async fn test_pause_between_keystrokes_dispatches_each_query() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    session.submit_query("heat");
    session.settle().await;
    session.submit_query("heath");
    session.settle().await;

    assert_eq!(catalog.calls(), vec!["search:heat", "search:heath"]);
    assert_eq!(search_titles(&session), vec!["heath"]);
}

#[tokio::test(start_paused = true)]
async fn test_short_query_clears_results_without_request() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    session.submit_query("alien");
    session.settle().await;
    assert_eq!(session.search().status, Status::Success);

    session.submit_query("a");
    assert_eq!(session.search().status, Status::Idle);
    assert!(session.search().data.is_none());
    assert!(!session.is_busy());

    session.clear_query();
    assert_eq!(session.query(), "");
    assert_eq!(catalog.calls(), vec!["search:alien"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_search_response_is_discarded() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release_alpha = catalog.gate("search:alpha");

    // Window elapses, "alpha" goes out and hangs
    session.submit_query("alpha");
    assert!(step(&mut session).await);

    // "beta" settles and answers first
    session.submit_query("beta");
    assert!(step(&mut session).await);
    assert!(step(&mut session).await);
    assert_eq!(search_titles(&session), vec!["beta"]);

    // "alpha" finally answers and must not replace "beta"
    release_alpha.send(()).unwrap();
    assert!(!step(&mut session).await);
    assert_eq!(search_titles(&session), vec!["beta"]);
    assert_eq!(session.search().status, Status::Success);
}

#[tokio::test(start_paused = true)]
async fn test_response_arriving_during_next_window_is_dropped() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release_alpha = catalog.gate("search:alpha");

    session.submit_query("alpha");
    assert!(step(&mut session).await);

    // "alphab" is still waiting out its window when "alpha" answers
    session.submit_query("alphab");
    release_alpha.send(()).unwrap();
    assert!(!step(&mut session).await);
    assert!(search_titles(&session).is_empty());
    assert_eq!(session.search().status, Status::Idle);

    session.settle().await;
    assert_eq!(search_titles(&session), vec!["alphab"]);
    assert_eq!(catalog.calls(), vec!["search:alpha", "search:alphab"]);
}

#[tokio::test(start_paused = true)]
async fn test_failures_stay_on_their_channel() {
    let catalog = ScriptedCatalog::new();
    catalog.fail("search:oops");
    let mut session = controller(&catalog);

    session.open_home();
    session.settle().await;
    session.submit_query("oops");
    session.settle().await;

    assert_eq!(session.search().status, Status::Error);
    assert_eq!(session.trending().status, Status::Success);
    assert_eq!(session.trending().data.as_ref().map(|t| t.len()), Some(3));

    session.submit_query("heat");
    session.settle().await;
    catalog.fail("trending");
    session.refresh_trending();
    session.settle().await;

    assert_eq!(session.trending().status, Status::Error);
    assert!(session.trending().data.is_none());
    assert_eq!(session.search().status, Status::Success);
    assert_eq!(search_titles(&session), vec!["heat"]);
}

#[tokio::test(start_paused = true)]
async fn test_search_failure_is_reported() {
    let catalog = ScriptedCatalog::new();
    catalog.fail("search:oops");
    let mut session = controller(&catalog);

    session.submit_query("oops");
    session.settle().await;

    let state = session.search();
    assert_eq!(state.status, Status::Error);
    assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::Network);
}

// =============================================================================
// Trending
// =============================================================================

#[tokio::test]
async fn test_home_fetches_trending_once() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    session.open_home();
    session.open_home();
    session.settle().await;
    session.open_home();

    assert_eq!(catalog.calls(), vec!["trending"]);
    assert_eq!(session.trending().data.as_ref().unwrap().len(), 3);

    session.refresh_trending();
    session.settle().await;
    assert_eq!(catalog.calls(), vec!["trending", "trending"]);
}

// =============================================================================
// Detail aggregation
// =============================================================================

#[tokio::test]
async fn test_detail_ready_only_after_both_halves() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release_title = catalog.gate("movie:7");

    session.open_detail(7);
    assert_eq!(session.detail(), DetailView::Loading);

    // Availability lands first
    assert!(step(&mut session).await);
    assert_eq!(session.detail(), DetailView::Loading);

    release_title.send(()).unwrap();
    assert!(step(&mut session).await);

    match session.detail() {
        DetailView::Ready {
            title,
            availability: AvailabilityView::Available(availability),
        } => {
            assert_eq!(title.id, 7);
            assert_eq!(availability.region, Region::US);
            assert_eq!(availability.subscription[0].provider_name, "Netflix US");
        }
        other => panic!("expected ready view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_title_failure_fails_the_view() {
    let catalog = ScriptedCatalog::new();
    catalog.fail("movie:7");
    let mut session = controller(&catalog);

    session.open_detail(7);
    session.settle().await;

    match session.detail() {
        DetailView::Failed(Some(error)) => assert_eq!(error.kind, ErrorKind::NotFound),
        other => panic!("expected failed view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_availability_failure_degrades() {
    let catalog = ScriptedCatalog::new();
    catalog.fail("streaming:7:US");
    let mut session = controller(&catalog);

    session.open_detail(7);
    session.settle().await;

    match session.detail() {
        DetailView::Ready {
            title,
            availability: AvailabilityView::Unavailable { region, reason },
        } => {
            assert_eq!(title.title, "Movie 7");
            assert_eq!(region, Region::US);
            assert!(reason.is_some());
        }
        other => panic!("expected degraded view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_region_change_refetches_availability_only() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    session.open_detail(7);
    session.settle().await;
    catalog.clear_calls();

    session.set_region("gb").unwrap();
    assert_eq!(session.region(), Region::GB);
    assert_eq!(session.detail(), DetailView::Loading);
    session.settle().await;

    assert_eq!(catalog.calls(), vec!["streaming:7:GB"]);
    match session.detail() {
        DetailView::Ready {
            availability: AvailabilityView::Available(availability),
            ..
        } => assert_eq!(availability.region, Region::GB),
        other => panic!("expected ready view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_last_region_wins() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    session.open_detail(7);
    session.settle().await;

    let release_gb = catalog.gate("streaming:7:GB");
    session.set_region("GB").unwrap();
    session.set_region("IN").unwrap();

    // India answers while the GB request is still held
    assert!(step(&mut session).await);
    release_gb.send(()).unwrap();
    assert!(!step(&mut session).await);

    match session.detail() {
        DetailView::Ready {
            availability: AvailabilityView::Available(availability),
            ..
        } => {
            assert_eq!(availability.region, Region::IN);
            assert_eq!(availability.subscription[0].provider_name, "Netflix IN");
        }
        other => panic!("expected ready view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_region_is_rejected() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    assert!(session.set_region("XX").is_err());
    assert_eq!(session.region(), Region::US);
    assert!(!session.regions().has_persisted());
}

#[tokio::test]
async fn test_close_discards_late_responses() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release_title = catalog.gate("movie:7");

    session.open_detail(7);
    assert!(step(&mut session).await);
    session.close_detail();
    assert!(!session.is_busy());

    release_title.send(()).unwrap();
    assert!(!step(&mut session).await);
    assert_eq!(session.detail(), DetailView::Closed);
    assert!(session.detail_title().data.is_none());
}

#[tokio::test]
async fn test_switching_titles_drops_previous_title() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release_first = catalog.gate("movie:1");

    session.open_detail(1);
    session.open_detail(2);
    session.settle().await;

    release_first.send(()).unwrap();
    // Late title for movie 1
    assert!(!step(&mut session).await);

    match session.detail() {
        DetailView::Ready { title, .. } => assert_eq!(title.id, 2),
        other => panic!("expected ready view, got {:?}", other),
    }
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_recommendations_include_source() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    session.open_recommendations(7);
    session.settle().await;

    let recs = session.recommendations().data.as_ref().unwrap();
    assert_eq!(recs.source.id, 7);
    assert_eq!(recs.titles.iter().map(|t| t.id).collect::<Vec<_>>(), vec![8, 9]);

    // Reopening the same title reuses the result
    session.open_recommendations(7);
    assert!(!session.is_busy());
    assert_eq!(
        catalog.calls().iter().filter(|c| c.starts_with("recommendations:")).count(),
        1
    );
}

#[tokio::test]
async fn test_recommendations_fail_when_source_missing() {
    let catalog = ScriptedCatalog::new();
    catalog.fail("movie:7");
    let mut session = controller(&catalog);

    session.open_recommendations(7);
    session.settle().await;

    let state = session.recommendations();
    assert_eq!(state.status, Status::Error);
    assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_closed_recommendations_ignore_late_results() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release = catalog.gate("recommendations:7");

    session.open_recommendations(7);
    session.close_recommendations();
    release.send(()).unwrap();

    assert!(!step(&mut session).await);
    assert!(session.recommendations().data.is_none());
}

// =============================================================================
// Region detection
// =============================================================================

#[tokio::test]
async fn test_geo_applies_detected_region() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);

    assert!(session.start());
    session.settle().await;

    assert_eq!(session.region(), Region::IN);
    assert_eq!(session.geo_outcome(), Some(&GeoOutcome::Applied(Region::IN)));
    assert!(session.regions().has_persisted());

    // Only once per session
    assert!(!session.start());
}

#[tokio::test]
async fn test_geo_skipped_when_region_saved() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller_with_region(&catalog, Region::GB);

    assert!(!session.start());
    assert!(!session.is_busy());
    assert!(catalog.calls().is_empty());
    assert_eq!(session.region(), Region::GB);
}

#[tokio::test]
async fn test_manual_choice_beats_pending_geo() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release = catalog.gate("geo");

    assert!(session.start());
    session.set_region("GB").unwrap();
    release.send(()).unwrap();
    session.settle().await;

    assert_eq!(session.region(), Region::GB);
    assert_eq!(session.geo_outcome(), Some(&GeoOutcome::Superseded));
}

#[tokio::test]
async fn test_geo_unsupported_code_keeps_default() {
    let catalog = ScriptedCatalog::new();
    catalog.set_geo_code("ZZ");
    let mut session = controller(&catalog);

    session.start();
    session.settle().await;

    assert_eq!(session.region(), Region::US);
    assert_eq!(
        session.geo_outcome(),
        Some(&GeoOutcome::Unsupported("ZZ".to_string()))
    );
    assert!(!session.regions().has_persisted());
}

#[tokio::test]
async fn test_geo_failure_keeps_default() {
    let catalog = ScriptedCatalog::new();
    catalog.fail("geo");
    let mut session = controller(&catalog);

    session.start();
    session.settle().await;

    assert_eq!(session.region(), Region::US);
    assert!(matches!(session.geo_outcome(), Some(GeoOutcome::Failed(_))));
}

#[tokio::test]
async fn test_geo_result_refetches_open_detail() {
    let catalog = ScriptedCatalog::new();
    let mut session = controller(&catalog);
    let release = catalog.gate("geo");

    assert!(session.start());
    session.open_detail(7);

    // Title and US availability land while the lookup is held
    assert!(step(&mut session).await);
    assert!(step(&mut session).await);

    release.send(()).unwrap();
    assert!(step(&mut session).await);
    assert_eq!(session.region(), Region::IN);
    session.settle().await;

    let calls = catalog.calls();
    assert_eq!(calls.iter().filter(|c| *c == "movie:7").count(), 1);
    assert!(calls.contains(&"streaming:7:IN".to_string()));
    match session.detail() {
        DetailView::Ready {
            availability: AvailabilityView::Available(availability),
            ..
        } => assert_eq!(availability.region, Region::IN),
        other => panic!("expected ready view, got {:?}", other),
    }
}
