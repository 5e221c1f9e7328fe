//! Search input debouncing
//!
//! A small state machine: `Idle -> Pending(ticket) -> Idle` on settle.
//! Every submission either clears (input too short) or restarts the pending
//! window with a fresh ticket. Only the ticket issued last can settle, so
//! earlier texts are dropped rather than queued.

use std::time::Duration;

/// Quiescence window before a search is dispatched
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// Queries shorter than this (after trimming) never reach the network
pub const MIN_QUERY_LEN: usize = 2;

/// Identifies one pending window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// What the caller should do after `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Input too short: clear results, no request
    Clear,
    /// Start (or restart) the timer; settle with this ticket when it fires
    Schedule(DebounceTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Pending { ticket: DebounceTicket, text: String },
}

#[derive(Debug)]
pub struct QueryDebouncer {
    window: Duration,
    generation: u64,
    state: DebounceState,
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl QueryDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            state: DebounceState::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// Record an edit. Any earlier pending text is discarded.
    pub fn submit(&mut self, text: &str) -> Submission {
        self.generation += 1;
        if text.trim().chars().count() < MIN_QUERY_LEN {
            self.state = DebounceState::Idle;
            return Submission::Clear;
        }
        let ticket = DebounceTicket(self.generation);
        self.state = DebounceState::Pending {
            ticket,
            text: text.trim().to_string(),
        };
        Submission::Schedule(ticket)
    }

    /// Timer fired. Returns the text to search for if `ticket` is still the
    /// latest window.
    pub fn settle(&mut self, ticket: DebounceTicket) -> Option<String> {
        match &self.state {
            DebounceState::Pending { ticket: current, .. } if *current == ticket => {
                match std::mem::replace(&mut self.state, DebounceState::Idle) {
                    DebounceState::Pending { text, .. } => Some(text),
                    DebounceState::Idle => None,
                }
            }
            _ => None,
        }
    }

    /// Drop any pending window
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = DebounceState::Idle;
    }
}
