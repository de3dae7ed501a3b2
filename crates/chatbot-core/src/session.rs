//! Chat session controller
//!
//! `ChatSession` owns the transcript, the input buffer, and the submission
//! guard. At most one exchange is pending at a time, so a reply always belongs
//! to the last entry in the transcript and no request id is needed.
//!
//! Submitting is split in two so a front end can keep drawing while the
//! request runs: [`ChatSession::begin`] records the pending exchange and hands
//! back a [`Submission`], and [`ChatSession::resolve`] settles it.
//! [`ChatSession::submit`] does both in one call.

use crate::backend::ChatBackend;
use crate::error::BackendError;
use crate::state::Exchange;

/// Keys the session reacts to. Front ends map their own key events onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Enter,
    Other,
}

/// Why a submission was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyQuery,
    InFlight,
}

/// An accepted query that still has to be sent to the backend.
#[derive(Debug)]
#[must_use = "a submission keeps the session busy until it is resolved"]
pub struct Submission {
    query: String,
}

impl Submission {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub async fn send(self, backend: &dyn ChatBackend) -> Result<String, BackendError> {
        backend.ask(&self.query).await
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Vec<Exchange>,
    submitting: bool,
    input: String,
    revision: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[Exchange] {
        &self.transcript
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Bumped every time the transcript grows or an entry settles.
    /// Views compare it against the last value they drew to decide when to
    /// jump to the newest entry.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Accept `query` and append a pending exchange for it.
    ///
    /// Blank queries and queries made while another one is in flight are
    /// rejected without touching the transcript.
    ///
    /// The session stays busy until the returned [`Submission`] is sent and
    /// its outcome handed to [`ChatSession::resolve`]. Dropping it unsent
    /// leaves the guard held; use [`ChatSession::submit`] when the caller can
    /// simply wait.
    pub fn begin(&mut self, query: &str) -> Result<Submission, Rejection> {
        if query.trim().is_empty() {
            tracing::debug!("rejected blank query");
            return Err(Rejection::EmptyQuery);
        }
        if self.submitting {
            tracing::debug!("rejected query while another is in flight");
            return Err(Rejection::InFlight);
        }

        self.submitting = true;
        self.transcript.push(Exchange::pending(query));
        self.revision += 1;
        tracing::info!(
            query_len = query.chars().count(),
            exchanges = self.transcript.len(),
            "submitting query"
        );

        Ok(Submission {
            query: query.to_string(),
        })
    }

    /// Settle the pending exchange with the backend outcome and release the guard.
    pub fn resolve(&mut self, outcome: Result<String, BackendError>) {
        if !self.submitting {
            tracing::warn!("backend outcome arrived with nothing in flight; ignoring");
            return;
        }

        if let Some(last) = self.transcript.last_mut() {
            let settled = match outcome {
                Ok(answer) => {
                    tracing::debug!(answer_len = answer.chars().count(), "backend answered");
                    last.answer(answer)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "backend call failed");
                    last.fail()
                }
            };
            if settled {
                self.revision += 1;
            }
        }

        self.submitting = false;
    }

    /// Submit `query` and wait for the backend. Returns false if the query was rejected.
    pub async fn submit(&mut self, backend: &dyn ChatBackend, query: &str) -> bool {
        let Ok(submission) = self.begin(query) else {
            return false;
        };
        let outcome = submission.send(backend).await;
        self.resolve(outcome);
        true
    }

    /// Begin submitting the current input buffer if `key` is the commit key.
    ///
    /// Same contract as [`ChatSession::begin`]: the returned submission must
    /// be sent and resolved, or the session stays busy.
    /// [`ChatSession::commit_input`] does the whole round trip.
    pub fn on_key_commit(&mut self, key: InputKey) -> Option<Submission> {
        if key != InputKey::Enter {
            return None;
        }
        let query = self.input.clone();
        self.begin(&query).ok()
    }

    /// Submit the current input buffer if `key` is the commit key and wait
    /// for the backend. Returns false if nothing was submitted.
    pub async fn commit_input(&mut self, backend: &dyn ChatBackend, key: InputKey) -> bool {
        let Some(submission) = self.on_key_commit(key) else {
            return false;
        };
        let outcome = submission.send(backend).await;
        self.resolve(outcome);
        true
    }
}
