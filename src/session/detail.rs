//! Title detail + availability aggregation
//!
//! Keyed by (title id, region). Metadata and availability run on separate
//! channels and may finish in either order; the combined view is only
//! `Ready` once both have settled for the current key. Metadata failure is
//! fatal to the view, availability failure degrades to "no data".

use crate::api::{ApiError, ErrorInfo};
use crate::models::{Region, StreamingAvailability, Title};

use super::request::{Channel, ChannelState, Completion, RequestSession, RequestToken, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailKey {
    pub title_id: u64,
    pub region: Region,
}

/// Fetches the caller must dispatch after a key change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailPlan {
    pub title: Option<RequestToken>,
    pub streaming: Option<RequestToken>,
}

impl DetailPlan {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.streaming.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityView<'a> {
    Available(&'a StreamingAvailability),
    /// Availability fetch failed; render the title without offers
    Unavailable { region: Region, reason: Option<&'a ErrorInfo> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView<'a> {
    Closed,
    Loading,
    Failed(Option<&'a ErrorInfo>),
    Ready {
        title: &'a Title,
        availability: AvailabilityView<'a>,
    },
}

#[derive(Debug)]
pub struct DetailAggregator {
    key: Option<DetailKey>,
    title: RequestSession<Title>,
    streaming: RequestSession<StreamingAvailability>,
}

impl Default for DetailAggregator {
    fn default() -> Self {
        Self {
            key: None,
            title: RequestSession::new(Channel::Detail),
            streaming: RequestSession::new(Channel::Streaming),
        }
    }
}

impl DetailAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<DetailKey> {
        self.key
    }

    pub fn title_state(&self) -> &ChannelState<Title> {
        self.title.state()
    }

    pub fn streaming_state(&self) -> &ChannelState<StreamingAvailability> {
        self.streaming.state()
    }

    pub fn in_flight(&self) -> bool {
        self.title.in_flight() || self.streaming.in_flight()
    }

    /// Show `title_id` for `region`.
    ///
    /// A new title refetches both halves. The same title in a new region
    /// refetches availability only. The same key again only retries halves
    /// that are idle or failed.
    pub fn open(&mut self, title_id: u64, region: Region) -> DetailPlan {
        let next = DetailKey { title_id, region };
        let previous = self.key.replace(next);
        let mut plan = DetailPlan::default();

        match previous {
            Some(prev) if prev.title_id == title_id => {
                if needs_fetch(self.title.state().status) {
                    plan.title = Some(self.title.begin());
                }
                if prev.region != region {
                    self.streaming.reset();
                    plan.streaming = Some(self.streaming.begin());
                } else if needs_fetch(self.streaming.state().status) {
                    plan.streaming = Some(self.streaming.begin());
                }
            }
            _ => {
                self.title.reset();
                self.streaming.reset();
                plan.title = Some(self.title.begin());
                plan.streaming = Some(self.streaming.begin());
            }
        }
        plan
    }

    /// Region changed while a title may be open
    pub fn set_region(&mut self, region: Region) -> DetailPlan {
        match self.key {
            Some(key) if key.region != region => self.open(key.title_id, region),
            _ => DetailPlan::default(),
        }
    }

    /// Navigated away; late responses are discarded
    pub fn close(&mut self) {
        self.key = None;
        self.title.abandon();
        self.streaming.abandon();
    }

    pub fn complete_title(&mut self, token: RequestToken, result: Result<Title, ApiError>) -> Completion {
        self.title.complete(token, result)
    }

    pub fn complete_streaming(
        &mut self,
        token: RequestToken,
        result: Result<StreamingAvailability, ApiError>,
    ) -> Completion {
        let expected = self.key.map(|k| k.region);
        let result = result.and_then(|availability| match expected {
            Some(region) if availability.region != region => Err(ApiError::InvalidResponse(
                format!("availability for {} while showing {}", availability.region, region),
            )),
            _ => Ok(availability),
        });
        self.streaming.complete(token, result)
    }

    pub fn view(&self) -> DetailView<'_> {
        let Some(key) = self.key else {
            return DetailView::Closed;
        };
        let title = self.title.state();
        if title.status == Status::Error {
            return DetailView::Failed(title.error.as_ref());
        }
        let streaming = self.streaming.state();
        match (&title.data, streaming.status) {
            (Some(title), Status::Success) => match &streaming.data {
                Some(availability) => DetailView::Ready {
                    title,
                    availability: AvailabilityView::Available(availability),
                },
                None => DetailView::Loading,
            },
            (Some(title), Status::Error) => DetailView::Ready {
                title,
                availability: AvailabilityView::Unavailable {
                    region: key.region,
                    reason: streaming.error.as_ref(),
                },
            },
            _ => DetailView::Loading,
        }
    }
}

fn needs_fetch(status: Status) -> bool {
    matches!(status, Status::Idle | Status::Error)
}
