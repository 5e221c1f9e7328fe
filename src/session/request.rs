//! Per-channel request sessions
//!
//! Every logical request stream (search, trending, detail, streaming,
//! recommendations) owns a `RequestSession`. Dispatch mints a fresh
//! `RequestToken`; a completion is applied only when its token is still the
//! channel's current one. That single comparison is what keeps a slow,
//! superseded response from overwriting a newer one.

use std::fmt;

use crate::api::{ApiError, ErrorInfo};

/// Logical request stream with its own staleness token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Search,
    Trending,
    Detail,
    Streaming,
    Recommendations,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Search => "search",
            Channel::Trending => "trending",
            Channel::Detail => "detail",
            Channel::Streaming => "streaming",
            Channel::Recommendations => "recommendations",
        };
        f.write_str(name)
    }
}

/// Sequence number minted per dispatched request. Only meaningful within the
/// channel that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Lifecycle of a channel as seen by presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Read-only view of a channel: status, last applied data, last error.
///
/// `data` survives a new dispatch so the previous result stays on screen
/// until its replacement arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState<T> {
    pub status: Status,
    pub data: Option<T>,
    pub error: Option<ErrorInfo>,
}

impl<T> Default for ChannelState<T> {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T> ChannelState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

/// Whether a completion changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Token bookkeeping plus state for one channel
#[derive(Debug)]
pub struct RequestSession<T> {
    channel: Channel,
    next_token: u64,
    current: Option<RequestToken>,
    state: ChannelState<T>,
}

impl<T> RequestSession<T> {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            next_token: 0,
            current: None,
            state: ChannelState::default(),
        }
    }

    pub fn state(&self) -> &ChannelState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    /// Is a request outstanding whose result would still be applied?
    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    /// Mint a token for a new request, superseding any previous one
    pub fn begin(&mut self) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.current = Some(token);
        self.state.status = Status::Loading;
        self.state.error = None;
        tracing::debug!(channel = %self.channel, token = token.0, "request dispatched");
        token
    }

    /// Apply a finished request if `token` is still current
    pub fn complete(&mut self, token: RequestToken, result: Result<T, ApiError>) -> Completion {
        if self.current != Some(token) {
            tracing::debug!(channel = %self.channel, token = token.0, "discarding stale response");
            return Completion::Stale;
        }
        self.current = None;
        match result {
            Ok(data) => {
                self.state.status = Status::Success;
                self.state.data = Some(data);
                self.state.error = None;
            }
            Err(e) => {
                tracing::warn!(channel = %self.channel, error = %e, "request failed");
                self.state.status = Status::Error;
                self.state.data = None;
                self.state.error = Some(ErrorInfo::from(&e));
            }
        }
        Completion::Applied
    }

    /// Stop waiting for the current request. Its response, if it ever
    /// arrives, is discarded by the token check.
    pub fn abandon(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!(channel = %self.channel, "request abandoned");
        }
        if self.state.status == Status::Loading {
            self.state.status = if self.state.data.is_some() {
                Status::Success
            } else {
                Status::Idle
            };
        }
    }

    /// Abandon and drop all data, back to idle
    pub fn reset(&mut self) {
        self.current = None;
        self.state = ChannelState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_marks_loading() {
        let mut session: RequestSession<u32> = RequestSession::new(Channel::Search);
        assert_eq!(session.state().status, Status::Idle);

        session.begin();
        assert!(session.state().is_loading());
        assert!(session.in_flight());
    }

    #[test]
    fn test_tokens_are_monotonic() {
        let mut session: RequestSession<u32> = RequestSession::new(Channel::Detail);
        let a = session.begin();
        let b = session.begin();
        assert!(b > a);
    }

    #[test]
    fn test_matching_completion_applies() {
        let mut session = RequestSession::new(Channel::Search);
        let token = session.begin();

        assert_eq!(session.complete(token, Ok(7)), Completion::Applied);
        assert_eq!(session.state().status, Status::Success);
        assert_eq!(session.data(), Some(&7));
        assert!(!session.in_flight());
    }

    #[test]
    fn test_late_first_response_is_discarded() {
        let mut session = RequestSession::new(Channel::Search);
        let first = session.begin();
        let second = session.begin();

        assert_eq!(session.complete(second, Ok("second")), Completion::Applied);
        assert_eq!(session.complete(first, Ok("first")), Completion::Stale);
        assert_eq!(session.data(), Some(&"second"));
    }

    #[test]
    fn test_superseded_response_before_current_is_discarded() {
        let mut session = RequestSession::new(Channel::Search);
        let first = session.begin();
        let _second = session.begin();

        assert_eq!(session.complete(first, Ok(1)), Completion::Stale);
        assert!(session.state().is_loading());
        assert_eq!(session.data(), None);
    }

    #[test]
    fn test_error_sets_error_state() {
        let mut session: RequestSession<u32> = RequestSession::new(Channel::Trending);
        let token = session.begin();

        session.complete(token, Err(ApiError::Status(500)));
        assert!(session.state().is_error());
        let error = session.state().error.as_ref().unwrap();
        assert!(error.message.contains("500"));
        assert_eq!(error.kind, crate::api::ErrorKind::Network);
        assert_eq!(session.data(), None);
    }

    #[test]
    fn test_stale_error_is_silent() {
        let mut session = RequestSession::new(Channel::Search);
        let first = session.begin();
        let second = session.begin();
        session.complete(second, Ok(2));

        assert_eq!(
            session.complete(first, Err(ApiError::NotFound)),
            Completion::Stale
        );
        assert_eq!(session.state().status, Status::Success);
        assert!(session.state().error.is_none());
    }

    #[test]
    fn test_abandon_discards_later_response() {
        let mut session = RequestSession::new(Channel::Recommendations);
        let token = session.begin();
        session.abandon();

        assert_eq!(session.state().status, Status::Idle);
        assert_eq!(session.complete(token, Ok(3)), Completion::Stale);
        assert_eq!(session.data(), None);
    }

    #[test]
    fn test_abandon_keeps_previous_data() {
        let mut session = RequestSession::new(Channel::Search);
        let token = session.begin();
        session.complete(token, Ok(1));
        session.begin();
        session.abandon();

        assert_eq!(session.state().status, Status::Success);
        assert_eq!(session.data(), Some(&1));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = RequestSession::new(Channel::Search);
        let token = session.begin();
        session.complete(token, Ok(1));
        let pending = session.begin();
        session.reset();

        assert_eq!(session.state(), &ChannelState::default());
        assert_eq!(session.complete(pending, Ok(2)), Completion::Stale);
    }
}
