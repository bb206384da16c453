//! controller.rs — one analysis session and its request lifecycle.
//!
//! ```text
//!   Idle ──submit──▶ Validating ──ok──▶ InFlight ──▶ Succeeded | Failed
//!     ▲                  │                              │
//!     └──── clear ───────┴── invalid ──▶ Failed ◀───────┘
//! ```
//!
//! The controller is the only writer of its state. Readers subscribe to a
//! `watch` channel; the busy check and the move into `Validating` happen inside
//! one `send_if_modified` call, so two racing submits cannot both get through.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::analyze::{self, DynAnalysisClient, Presentation};
use crate::assessment::AnalysisResult;
use crate::error::AnalysisError;
use crate::metrics;
use crate::validate::{validate, word_count};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Validating,
    InFlight,
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

impl RequestState {
    pub fn phase(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Validating => "validating",
            RequestState::InFlight => "in_flight",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }

    /// A request is running; submit and clear are refused.
    pub fn is_busy(&self) -> bool {
        matches!(self, RequestState::Validating | RequestState::InFlight)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            RequestState::Succeeded(r) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            RequestState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Everything the presentation layer observes about a session.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: RequestState,
    /// Words in the most recently submitted text.
    pub word_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
            word_count: 0,
            updated_at: Utc::now(),
        }
    }
}

impl Session {
    fn set(&mut self, state: RequestState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state.phase(),
            result: self.state.result().cloned(),
            presentation: self.state.result().map(Presentation::of),
            error_message: self.state.error().map(AnalysisError::user_message),
            error_kind: self.state.error().map(AnalysisError::kind),
            word_count: self.word_count,
            updated_at: self.updated_at,
        }
    }
}

/// Serializable snapshot for the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: &'static str,
    pub result: Option<AnalysisResult>,
    pub presentation: Option<Presentation>,
    pub error_message: Option<String>,
    pub error_kind: Option<&'static str>,
    pub word_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request ran to the given terminal state.
    Finished(RequestState),
    /// Another request was already running; nothing happened.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Rejected,
}

pub struct AnalysisController {
    client: DynAnalysisClient,
    tx: watch::Sender<Session>,
}

impl AnalysisController {
    pub fn new(client: DynAnalysisClient) -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { client, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.tx.borrow().state.is_busy()
    }

    /// Validate `text` and, if it passes, analyze it.
    ///
    /// Runs to completion once accepted. If the returned future is dropped
    /// mid-flight the session ends in `Failed(Transport)` instead of staying busy.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let words = word_count(text);
        let accepted = self.tx.send_if_modified(|s| {
            if s.state.is_busy() {
                return false;
            }
            s.word_count = words;
            s.set(RequestState::Validating);
            true
        });
        if !accepted {
            metrics::record_rejected("submit");
            info!(target: "analysis", "submit ignored: a request is already running");
            return SubmitOutcome::Rejected;
        }

        let id = analyze::fingerprint(text);
        if let Err(e) = validate(text) {
            info!(target: "analysis", %id, words, reason = %e, "submission rejected by validator");
            return self.finish(Err(e.into()));
        }

        info!(target: "analysis", %id, words, provider = self.client.provider_name(), "analysis started");
        let mut guard = InFlightGuard {
            tx: &self.tx,
            armed: true,
        };
        self.tx.send_modify(|s| s.set(RequestState::InFlight));
        let outcome = analyze::run_analysis(self.client.as_ref(), text).await;
        guard.armed = false;
        self.finish(outcome)
    }

    /// Back to `Idle`, dropping any result or error. Refused while busy.
    pub fn clear(&self) -> ClearOutcome {
        let cleared = self.tx.send_if_modified(|s| {
            if s.state.is_busy() {
                return false;
            }
            *s = Session::default();
            true
        });
        if cleared {
            ClearOutcome::Cleared
        } else {
            metrics::record_rejected("clear");
            ClearOutcome::Rejected
        }
    }

    fn finish(&self, outcome: Result<AnalysisResult, AnalysisError>) -> SubmitOutcome {
        let state = match outcome {
            Ok(result) => {
                metrics::record_outcome("succeeded");
                info!(target: "analysis", bias_score = result.bias_score, "analysis succeeded");
                RequestState::Succeeded(result)
            }
            Err(e) => {
                metrics::record_outcome(e.kind());
                info!(target: "analysis", kind = e.kind(), "analysis failed");
                RequestState::Failed(e)
            }
        };
        self.tx.send_modify(|s| s.set(state.clone()));
        SubmitOutcome::Finished(state)
    }
}

/// Releases the busy state if a submit future is dropped before finishing.
struct InFlightGuard<'a> {
    tx: &'a watch::Sender<Session>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            metrics::record_outcome("transport");
            self.tx.send_modify(|s| {
                s.set(RequestState::Failed(AnalysisError::Transport(
                    "analysis was abandoned before completion".to_string(),
                )))
            });
        }
    }
}
