//! Periodic refresh of the market model on a background worker.
//!
//! The scheduler owns the fetch→normalize cycle: one fetch immediately on
//! activation, then one per interval (an hour by default). Consumers only
//! ever see immutable [`Snapshot`] values; a failed refresh keeps the last
//! successful model and attaches an error message instead of blanking the
//! view. Results carry a sequence number assigned at fetch initiation and
//! are applied in that order, so a slow old response can never overwrite a
//! newer one. Dropping (or stopping) the scheduler wakes and joins the
//! worker; nothing mutates the shared state afterwards.

use crate::api::{ApiError, Client};
use crate::models::{MarketChartModel, RawMarketPayload, normalize};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Refresh period used by [`RefreshScheduler::start`].
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

/// Where the model comes from. [`Client`] implements this against the live
/// service; tests inject scripted sources.
pub trait TrendsSource: Send + 'static {
    fn fetch_trends(&self) -> Result<RawMarketPayload, ApiError>;
}

impl TrendsSource for Client {
    fn fetch_trends(&self) -> Result<RawMarketPayload, ApiError> {
        self.fetch_market_trends()
    }
}

/// Read-only view of the scheduler state handed to consumers.
///
/// `model` and `error` can both be present at once: that is the
/// stale-with-error state, where the last good model is still shown under a
/// non-blocking warning.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub model: Option<MarketChartModel>,
    pub loading: bool,
    pub error: Option<String>,
    /// When the current `model` was fetched.
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct SchedulerState {
    snapshot: Snapshot,
    /// Sequence number of the most recently applied result.
    last_applied_seq: u64,
    /// Sequence number handed to the next fetch.
    next_seq: u64,
    refresh_requested: bool,
}

struct Inner {
    state: Mutex<SchedulerState>,
    wake: Condvar,
    stopped: AtomicBool,
}

impl Inner {
    /// Mark a fetch as started and hand out its sequence number.
    fn begin_fetch(&self) -> u64 {
        let mut state = self.state.lock().expect("scheduler state poisoned");
        state.next_seq += 1;
        state.snapshot.loading = true;
        state.next_seq
    }

    /// Apply a finished fetch. Results from before the last applied sequence
    /// are discarded silently, and nothing is applied once the scheduler has
    /// stopped (guards a late worker against mutating state after
    /// deactivation).
    fn apply(&self, seq: u64, result: Result<RawMarketPayload, ApiError>) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock().expect("scheduler state poisoned");
        if seq <= state.last_applied_seq {
            log::debug!("discarding out-of-order refresh result (seq {seq})");
            return;
        }
        state.last_applied_seq = seq;
        state.snapshot.loading = false;
        match result {
            Ok(raw) => {
                state.snapshot.model = Some(normalize(&raw));
                state.snapshot.error = None;
                state.snapshot.fetched_at = Some(Utc::now());
            }
            Err(err) => {
                // Keep the previous model: stale data plus a warning beats a
                // blank dashboard.
                log::warn!("market-trends refresh failed: {err}");
                state.snapshot.error = Some(err.to_string());
            }
        }
    }
}

/// Background refresh loop with a stop/join lifecycle.
pub struct RefreshScheduler {
    inner: Arc<Inner>,
    worker: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Start refreshing from `source` at [`DEFAULT_REFRESH_INTERVAL`]. The
    /// first fetch begins immediately.
    pub fn start<S: TrendsSource>(source: S) -> Self {
        Self::with_interval(source, DEFAULT_REFRESH_INTERVAL)
    }

    /// Start with an explicit refresh interval.
    pub fn with_interval<S: TrendsSource>(source: S, interval: Duration) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(SchedulerState::default()),
            wake: Condvar::new(),
            stopped: AtomicBool::new(false),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = std::thread::Builder::new()
            .name("cvtrends-refresh".into())
            .spawn(move || run_worker(worker_inner, source, interval))
            .expect("spawn refresh worker");

        Self {
            inner,
            worker: Some(worker),
        }
    }

    /// Current state, as an owned copy.
    pub fn snapshot(&self) -> Snapshot {
        self.inner
            .state
            .lock()
            .expect("scheduler state poisoned")
            .snapshot
            .clone()
    }

    /// Skip the remaining wait and refresh now. A no-op after `stop`.
    pub fn refresh_now(&self) {
        let mut state = self.inner.state.lock().expect("scheduler state poisoned");
        state.refresh_requested = true;
        drop(state);
        self.inner.wake.notify_all();
    }

    /// Deactivate: cancel the periodic timer and join the worker. The state
    /// visible through [`snapshot`](Self::snapshot) no longer changes once
    /// this returns.
    pub fn stop(&mut self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: TrendsSource>(inner: Arc<Inner>, source: S, interval: Duration) {
    loop {
        if inner.stopped.load(Ordering::SeqCst) {
            return;
        }

        let seq = inner.begin_fetch();
        let result = source.fetch_trends();
        inner.apply(seq, result);

        // Sleep until the next tick, a manual refresh, or stop.
        let mut state = inner.state.lock().expect("scheduler state poisoned");
        let deadline = std::time::Instant::now() + interval;
        while !state.refresh_requested && !inner.stopped.load(Ordering::SeqCst) {
            let now = std::time::Instant::now();
            if now >= deadline {
                break;
            }
            let (next, _) = inner
                .wake
                .wait_timeout(state, deadline - now)
                .expect("scheduler state poisoned");
            state = next;
        }
        state.refresh_requested = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inner() -> Inner {
        Inner {
            state: Mutex::new(SchedulerState::default()),
            wake: Condvar::new(),
            stopped: AtomicBool::new(false),
        }
    }

    fn payload(skill: &str) -> RawMarketPayload {
        RawMarketPayload {
            skills: json!([[skill, 1, 10]]),
            levels: json!([]),
            total_jobs: json!(1),
        }
    }

    #[test]
    fn later_initiated_fetch_wins_regardless_of_arrival_order() {
        let inner = inner();
        let first = inner.begin_fetch();
        let second = inner.begin_fetch();

        // Second request returns first, then the slow first one arrives.
        inner.apply(second, Ok(payload("Rust")));
        inner.apply(first, Ok(payload("Cobol")));

        let state = inner.state.lock().unwrap();
        let model = state.snapshot.model.as_ref().unwrap();
        assert_eq!(model.skills[0].name, "Rust");
        assert_eq!(state.last_applied_seq, second);
    }

    #[test]
    fn failed_refresh_keeps_last_good_model() {
        let inner = inner();
        let seq = inner.begin_fetch();
        inner.apply(seq, Ok(payload("Python")));

        let seq = inner.begin_fetch();
        inner.apply(seq, Err(ApiError::Server("server error: 500".into())));

        let state = inner.state.lock().unwrap();
        assert!(state.snapshot.model.is_some());
        assert_eq!(state.snapshot.error.as_deref(), Some("server error: 500"));
        assert!(!state.snapshot.loading);
    }

    #[test]
    fn nothing_is_applied_after_stop() {
        let inner = inner();
        let seq = inner.begin_fetch();
        inner.stopped.store(true, Ordering::SeqCst);
        inner.apply(seq, Ok(payload("Go")));

        let state = inner.state.lock().unwrap();
        assert!(state.snapshot.model.is_none());
    }
}
