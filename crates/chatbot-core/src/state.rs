//! UI-agnostic transcript types
//!
//! This module contains the data structures a front end renders. They don't
//! depend on any specific UI framework.

use serde::{Deserialize, Serialize};

/// Response text shown while an exchange is waiting on the backend.
pub const PLACEHOLDER: &str = "...";

/// Response text written into an exchange when the backend call fails for any reason.
pub const ERROR_SENTINEL: &str = "Error fetching data.";

/// Where an exchange is in its lifecycle. `Answered` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    Pending,
    Answered,
    Failed,
}

/// One question and its answer in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    query: String,
    response: String,
    state: ExchangeState,
}

impl Exchange {
    pub(crate) fn pending(query: &str) -> Self {
        Self {
            query: query.to_string(),
            response: PLACEHOLDER.to_string(),
            state: ExchangeState::Pending,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ExchangeState::Pending
    }

    /// Move a pending exchange to `Answered`. Returns false if it was already settled.
    pub(crate) fn answer(&mut self, response: String) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.response = response;
        self.state = ExchangeState::Answered;
        true
    }

    /// Move a pending exchange to `Failed`. Returns false if it was already settled.
    pub(crate) fn fail(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.response = ERROR_SENTINEL.to_string();
        self.state = ExchangeState::Failed;
        true
    }
}
