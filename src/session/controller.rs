//! Session controller
//!
//! Owns every channel and turns user intents (keystrokes, navigation,
//! region changes) into spawned catalog calls. Calls report back as
//! `SessionEvent`s over an mpsc channel; the controller applies them one at
//! a time on the task that owns it, so state is only ever touched from one
//! place and staleness is decided purely by token comparison.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;

use crate::api::{ApiError, ApiResult, CatalogApi};
use crate::models::{Recommendations, Region, RegionError, StreamingAvailability, Title, TitleSummary};

use super::debounce::{DebounceTicket, QueryDebouncer, Submission};
use super::detail::{DetailAggregator, DetailPlan, DetailView};
use super::geo::{GeoLookup, GeoOutcome, GeoResolver};
use super::region::RegionStore;
use super::request::{Channel, ChannelState, Completion, RequestSession, RequestToken, Status};

/// Completion of a spawned task, tagged so the controller can reject stale ones
#[derive(Debug)]
pub enum SessionEvent {
    SearchSettled(DebounceTicket),
    Search(RequestToken, ApiResult<Vec<TitleSummary>>),
    Trending(RequestToken, ApiResult<Vec<TitleSummary>>),
    Title(RequestToken, ApiResult<Title>),
    Streaming(RequestToken, ApiResult<StreamingAvailability>),
    Recommendations(RequestToken, ApiResult<Recommendations>),
    Geo(GeoLookup, ApiResult<String>),
}

pub struct SessionController {
    catalog: Arc<dyn CatalogApi>,
    regions: RegionStore,
    geo: GeoResolver,
    geo_pending: bool,
    geo_outcome: Option<GeoOutcome>,
    debouncer: QueryDebouncer,
    debounce_timer: Option<AbortHandle>,
    query: String,
    search: RequestSession<Vec<TitleSummary>>,
    trending: RequestSession<Vec<TitleSummary>>,
    detail: DetailAggregator,
    recommendations: RequestSession<Recommendations>,
    recommendations_for: Option<u64>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    pub fn new(catalog: Arc<dyn CatalogApi>, regions: RegionStore) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            regions,
            geo: GeoResolver::new(),
            geo_pending: false,
            geo_outcome: None,
            debouncer: QueryDebouncer::default(),
            debounce_timer: None,
            query: String::new(),
            search: RequestSession::new(Channel::Search),
            trending: RequestSession::new(Channel::Trending),
            detail: DetailAggregator::new(),
            recommendations: RequestSession::new(Channel::Recommendations),
            recommendations_for: None,
            events_tx,
            events_rx,
        }
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debouncer = QueryDebouncer::new(window);
        self
    }

    // -------------------------------------------------------------------------
    // Read-only state
    // -------------------------------------------------------------------------

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search(&self) -> &ChannelState<Vec<TitleSummary>> {
        self.search.state()
    }

    pub fn trending(&self) -> &ChannelState<Vec<TitleSummary>> {
        self.trending.state()
    }

    pub fn detail(&self) -> DetailView<'_> {
        self.detail.view()
    }

    pub fn detail_title(&self) -> &ChannelState<Title> {
        self.detail.title_state()
    }

    pub fn detail_streaming(&self) -> &ChannelState<StreamingAvailability> {
        self.detail.streaming_state()
    }

    pub fn recommendations(&self) -> &ChannelState<Recommendations> {
        self.recommendations.state()
    }

    pub fn region(&self) -> Region {
        self.regions.get()
    }

    pub fn regions(&self) -> &RegionStore {
        &self.regions
    }

    /// How the last region lookup ended, if one has finished
    pub fn geo_outcome(&self) -> Option<&GeoOutcome> {
        self.geo_outcome.as_ref()
    }

    /// Anything still outstanding whose result would be applied?
    pub fn is_busy(&self) -> bool {
        self.debouncer.is_pending()
            || self.geo_pending
            || self.search.in_flight()
            || self.trending.in_flight()
            || self.detail.in_flight()
            || self.recommendations.in_flight()
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    /// Session start: detect a default region if none was ever chosen.
    /// Returns whether a lookup was dispatched.
    pub fn start(&mut self) -> bool {
        let Some(lookup) = self.geo.start(&self.regions) else {
            return false;
        };
        self.geo_pending = true;
        let catalog = Arc::clone(&self.catalog);
        self.spawn(async move { catalog.geolocate().await }, move |result| {
            SessionEvent::Geo(lookup, result)
        });
        true
    }

    /// Home screen: trending list, fetched unless already loaded or loading
    pub fn open_home(&mut self) {
        if matches!(self.trending.state().status, Status::Idle | Status::Error) {
            self.refresh_trending();
        }
    }

    pub fn refresh_trending(&mut self) {
        let token = self.trending.begin();
        let catalog = Arc::clone(&self.catalog);
        self.spawn(async move { catalog.trending().await }, move |result| {
            SessionEvent::Trending(token, result)
        });
    }

    /// Called on every edit of the search box
    pub fn submit_query(&mut self, text: &str) {
        self.query = text.to_string();
        if let Some(timer) = self.debounce_timer.take() {
            timer.abort();
        }
        match self.debouncer.submit(text) {
            Submission::Clear => self.search.reset(),
            Submission::Schedule(ticket) => {
                // Whatever is in flight answers an older query now
                self.search.abandon();
                let window = self.debouncer.window();
                let tx = self.events_tx.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(window).await;
                    let _ = tx.send(SessionEvent::SearchSettled(ticket));
                });
                self.debounce_timer = Some(handle.abort_handle());
            }
        }
    }

    pub fn clear_query(&mut self) {
        self.submit_query("");
    }

    pub fn open_detail(&mut self, title_id: u64) {
        let plan = self.detail.open(title_id, self.regions.get());
        self.dispatch_detail(plan);
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    /// Switch region. Takes effect for reads immediately; an open detail view
    /// refetches availability for the new region.
    pub fn set_region(&mut self, code: &str) -> Result<Region, RegionError> {
        let region = self.regions.set(code)?;
        let plan = self.detail.set_region(region);
        self.dispatch_detail(plan);
        Ok(region)
    }

    pub fn open_recommendations(&mut self, title_id: u64) {
        let same = self.recommendations_for == Some(title_id);
        if same && matches!(self.recommendations.state().status, Status::Loading | Status::Success) {
            return;
        }
        if !same {
            self.recommendations.reset();
        }
        self.recommendations_for = Some(title_id);
        let token = self.recommendations.begin();
        let catalog = Arc::clone(&self.catalog);
        self.spawn(
            async move {
                let (source, titles) =
                    tokio::try_join!(catalog.movie(title_id), catalog.recommendations(title_id))?;
                Ok::<_, ApiError>(Recommendations { source, titles })
            },
            move |result| SessionEvent::Recommendations(token, result),
        );
    }

    pub fn close_recommendations(&mut self) {
        self.recommendations_for = None;
        self.recommendations.abandon();
    }

    // -------------------------------------------------------------------------
    // Event pump
    // -------------------------------------------------------------------------

    /// Apply one completion. Returns whether visible state changed.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::SearchSettled(ticket) => match self.debouncer.settle(ticket) {
                Some(text) => {
                    self.debounce_timer = None;
                    self.dispatch_search(text);
                    true
                }
                None => false,
            },
            SessionEvent::Search(token, result) => applied(self.search.complete(token, result)),
            SessionEvent::Trending(token, result) => applied(self.trending.complete(token, result)),
            SessionEvent::Title(token, result) => applied(self.detail.complete_title(token, result)),
            SessionEvent::Streaming(token, result) => {
                applied(self.detail.complete_streaming(token, result))
            }
            SessionEvent::Recommendations(token, result) => {
                applied(self.recommendations.complete(token, result))
            }
            SessionEvent::Geo(lookup, result) => {
                self.geo_pending = false;
                let outcome = self.geo.resolve(lookup, result, &mut self.regions);
                let changed = match &outcome {
                    GeoOutcome::Applied(region) => {
                        let plan = self.detail.set_region(*region);
                        self.dispatch_detail(plan);
                        true
                    }
                    _ => false,
                };
                self.geo_outcome = Some(outcome);
                changed
            }
        }
    }

    /// Wait for the next completion without applying it
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply every completion that has already arrived
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return applied,
            }
        }
    }

    /// Pump events until nothing is outstanding
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.events_rx.recv().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    fn dispatch_search(&mut self, text: String) {
        let token = self.search.begin();
        let catalog = Arc::clone(&self.catalog);
        tracing::debug!(query = %text, "dispatching search");
        self.spawn(async move { catalog.search(&text).await }, move |result| {
            SessionEvent::Search(token, result)
        });
    }

    fn dispatch_detail(&mut self, plan: DetailPlan) {
        let Some(key) = self.detail.key() else {
            return;
        };
        if let Some(token) = plan.title {
            let catalog = Arc::clone(&self.catalog);
            self.spawn(async move { catalog.movie(key.title_id).await }, move |result| {
                SessionEvent::Title(token, result)
            });
        }
        if let Some(token) = plan.streaming {
            let catalog = Arc::clone(&self.catalog);
            self.spawn(
                async move { catalog.streaming(key.title_id, key.region).await },
                move |result| SessionEvent::Streaming(token, result),
            );
        }
    }

    /// Run `call` on the runtime and post its tagged result back. A send into
    /// a dropped controller is ignored.
    fn spawn<F, T, W>(&self, call: F, wrap: W)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        W: FnOnce(T) -> SessionEvent + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = call.await;
            let _ = tx.send(wrap(result));
        });
    }
}

fn applied(completion: Completion) -> bool {
    completion == Completion::Applied
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(timer) = self.debounce_timer.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("query", &self.query)
            .field("region", &self.regions.get())
            .field("busy", &self.is_busy())
            .finish()
    }
}
