//! Debounced, version-tagged analysis for interactive editors.
//!
//! ```text
//! schedule(v1) ─┐
//! schedule(v2) ─┼─ debounce window ──▶ only the latest version runs ──▶ smol::unblock(Pipeline::run)
//! schedule(v3) ─┘                                                          │
//!                                               version still latest? ◀────┘
//!                                                 yes ──▶ Delivered(report) + subscribers
//!                                                 no  ──▶ Superseded
//! ```
//!
//! Every scheduled document resolves to exactly one [`ScheduleOutcome`].
//! Subscribers see reports in non-decreasing version order and never see a
//! report for a version older than one already scheduled.

use std::sync::Arc;
use std::time::Duration;

use futures::channel::mpsc;
use parking_lot::Mutex;

use crate::api::Pipeline;
use crate::{DiagnosticReport, Document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Delivered(DiagnosticReport),
    /// A newer version was scheduled before this one could be delivered.
    Superseded { version: u64, latest: u64 },
}

impl ScheduleOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ScheduleOutcome::Delivered(_))
    }

    pub fn into_report(self) -> Option<DiagnosticReport> {
        match self {
            ScheduleOutcome::Delivered(report) => Some(report),
            ScheduleOutcome::Superseded { .. } => None,
        }
    }
}

#[derive(Default)]
struct State {
    /// Highest version ever scheduled.
    latest: u64,
    last_delivered: Option<u64>,
    subscribers: Vec<mpsc::UnboundedSender<DiagnosticReport>>,
}

struct Inner {
    pipeline: Arc<Pipeline>,
    debounce: Duration,
    state: Mutex<State>,
}

/// Runs a [`Pipeline`] off the caller's thread on behalf of an editor.
///
/// Cloning is cheap; clones share versions and subscribers.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Scheduler")
            .field("debounce", &self.inner.debounce)
            .field("latest", &state.latest)
            .field("last_delivered", &state.last_delivered)
            .finish()
    }
}

impl Scheduler {
    /// Scheduler using the pipeline's configured debounce window.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let debounce = pipeline.config().debounce_window();
        Self::with_debounce(pipeline, debounce)
    }

    pub fn with_debounce(pipeline: Arc<Pipeline>, debounce: Duration) -> Self {
        Scheduler { inner: Arc::new(Inner { pipeline, debounce, state: Mutex::new(State::default()) }) }
    }

    /// Queue `document` for analysis.
    ///
    /// The version is recorded immediately, so any earlier version that has
    /// not been delivered yet is superseded from this point on. The returned
    /// task runs on the smol executor and can be awaited or detached.
    pub fn schedule(&self, document: Document) -> smol::Task<ScheduleOutcome> {
        {
            let mut state = self.inner.state.lock();
            state.latest = state.latest.max(document.version);
        }
        let inner = Arc::clone(&self.inner);
        smol::spawn(async move { inner.process(document).await })
    }

    /// Receive every delivered report from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<DiagnosticReport> {
        let (tx, rx) = mpsc::unbounded();
        self.inner.state.lock().subscribers.push(tx);
        rx
    }

    pub fn latest_version(&self) -> u64 {
        self.inner.state.lock().latest
    }

    pub fn last_delivered_version(&self) -> Option<u64> {
        self.inner.state.lock().last_delivered
    }
}

impl Inner {
    async fn process(self: Arc<Self>, document: Document) -> ScheduleOutcome {
        let version = document.version;
        if !self.debounce.is_zero() {
            smol::Timer::after(self.debounce).await;
        }
        if let Some(outcome) = self.superseded(version) {
            return outcome;
        }

        let pipeline = Arc::clone(&self.pipeline);
        let report = smol::unblock(move || pipeline.run(&document)).await;
        self.deliver(report)
    }

    fn superseded(&self, version: u64) -> Option<ScheduleOutcome> {
        let latest = self.state.lock().latest;
        if version < latest {
            log::debug!("v{version} superseded by v{latest}");
            Some(ScheduleOutcome::Superseded { version, latest })
        } else {
            None
        }
    }

    fn deliver(&self, report: DiagnosticReport) -> ScheduleOutcome {
        let version = report.document_version;
        let mut state = self.state.lock();
        let stale = version < state.latest || state.last_delivered.is_some_and(|delivered| delivered > version);
        if stale {
            log::debug!("v{version} finished after v{} was scheduled; discarded", state.latest);
            return ScheduleOutcome::Superseded { version, latest: state.latest };
        }

        state.last_delivered = Some(version);
        state.subscribers.retain(|tx| tx.unbounded_send(report.clone()).is_ok());
        log::debug!("v{version} delivered with {} diagnostics", report.diagnostics.len());
        ScheduleOutcome::Delivered(report)
    }
}
