//! Request metrics: monotonic counters plus a bounded window of recent
//! durations.
//!
//! Recording goes through [`RequestTimer`], a drop guard, so a handler that
//! panics or is cancelled still counts (as a failure).

use axum::response::Response;
use gemini_balance_types::MetricsSummary;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

/// Durations kept for the rolling average.
pub const DURATION_WINDOW: usize = 1000;

#[derive(Debug, Default)]
struct MetricsState {
    total_requests: u64,
    success_count: u64,
    error_count: u64,
    durations: VecDeque<u64>,
}

/// Shared recorder, one per process, owned by `AppState`.
#[derive(Debug)]
pub struct MetricsRecorder {
    state: Mutex<MetricsState>,
    max_durations: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::with_window(DURATION_WINDOW)
    }

    pub fn with_window(max_durations: usize) -> Self {
        Self {
            state: Mutex::new(MetricsState {
                durations: VecDeque::with_capacity(max_durations),
                ..MetricsState::default()
            }),
            max_durations,
        }
    }

    pub fn record(&self, success: bool, duration_ms: u64) {
        let mut state = self.state.lock();
        state.total_requests += 1;
        if success {
            state.success_count += 1;
        } else {
            state.error_count += 1;
        }
        if state.durations.len() >= self.max_durations {
            state.durations.pop_front();
        }
        state.durations.push_back(duration_ms);
    }

    pub fn summarize(&self) -> MetricsSummary {
        let state = self.state.lock();
        let success_rate = if state.total_requests == 0 {
            0.0
        } else {
            state.success_count as f64 / state.total_requests as f64
        };
        let average_response_time = if state.durations.is_empty() {
            0.0
        } else {
            state.durations.iter().sum::<u64>() as f64 / state.durations.len() as f64
        };

        MetricsSummary {
            total_requests: state.total_requests,
            successful_requests: state.success_count,
            error_requests: state.error_count,
            success_rate,
            average_response_time,
            recent_durations: state.durations.iter().copied().collect(),
        }
    }

    /// Start timing one request. Dropping the timer without
    /// [`RequestTimer::complete`] records a failure.
    pub fn start(self: &Arc<Self>) -> RequestTimer {
        RequestTimer { recorder: Arc::clone(self), started: Instant::now(), armed: true }
    }

    /// Time `handler`, classifying its response as success when status < 400.
    /// The response is returned untouched.
    pub async fn time<F>(self: &Arc<Self>, handler: F) -> Response
    where
        F: Future<Output = Response>,
    {
        let timer = self.start();
        let response = handler.await;
        timer.complete(response.status().as_u16());
        response
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Records exactly once: on `complete`, or as a failure on drop.
#[must_use = "dropping the timer immediately records a failure"]
pub struct RequestTimer {
    recorder: Arc<MetricsRecorder>,
    started: Instant,
    armed: bool,
}

impl RequestTimer {
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Record with the final status. Returns the recorded duration.
    pub fn complete(mut self, status: u16) -> u64 {
        let duration_ms = self.elapsed_ms();
        self.armed = false;
        self.recorder.record(status < 400, duration_ms);
        duration_ms
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        if self.armed {
            let duration_ms = self.elapsed_ms();
            tracing::warn!(duration_ms, "Request ended without a response");
            self.recorder.record(false, duration_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use std::time::Duration;

    fn response_with(status: StatusCode) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = status;
        response
    }

    #[test]
    fn test_empty_summary() {
        let summary = MetricsRecorder::new().summarize();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.average_response_time, 0.0);
        assert!(summary.recent_durations.is_empty());
    }

    #[test]
    fn test_success_rate_and_average() {
        let recorder = MetricsRecorder::new();
        recorder.record(true, 100);
        recorder.record(true, 200);
        recorder.record(true, 300);
        recorder.record(false, 400);

        let summary = recorder.summarize();
        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.successful_requests, 3);
        assert_eq!(summary.error_requests, 1);
        assert_eq!(summary.success_rate, 0.75);
        assert_eq!(summary.average_response_time, 250.0);
        assert_eq!(summary.recent_durations, vec![100, 200, 300, 400]);
    }

    #[test]
    fn test_window_evicts_oldest_first() {
        let recorder = MetricsRecorder::new();
        for ms in 0..=1000_u64 {
            recorder.record(true, ms);
        }

        let summary = recorder.summarize();
        assert_eq!(summary.total_requests, 1001);
        assert_eq!(summary.recent_durations.len(), DURATION_WINDOW);
        assert!(!summary.recent_durations.contains(&0));
        assert_eq!(summary.recent_durations.first(), Some(&1));
        assert_eq!(summary.recent_durations.last(), Some(&1000));
        assert!(summary.recent_durations.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_classifies_by_status() {
        let recorder = Arc::new(MetricsRecorder::new());

        let ok = recorder
            .time(async {
                tokio::time::sleep(Duration::from_millis(120)).await;
                response_with(StatusCode::OK)
            })
            .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let redirect = recorder.time(async { response_with(StatusCode::FOUND) }).await;
        assert_eq!(redirect.status(), StatusCode::FOUND);

        let denied = recorder.time(async { response_with(StatusCode::BAD_REQUEST) }).await;
        assert_eq!(denied.status(), StatusCode::BAD_REQUEST);

        let summary = recorder.summarize();
        assert_eq!(summary.successful_requests, 2);
        assert_eq!(summary.error_requests, 1);
        assert_eq!(summary.recent_durations, vec![120, 0, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_request_records_failure() {
        let recorder = Arc::new(MetricsRecorder::new());
        let pending = recorder.time(std::future::pending::<Response>());

        let outcome = tokio::time::timeout(Duration::from_millis(50), pending).await;
        assert!(outcome.is_err());

        let summary = recorder.summarize();
        assert_eq!(summary.total_requests, 1);
        assert_eq!(summary.error_requests, 1);
        assert_eq!(summary.recent_durations, vec![50]);
    }

    #[tokio::test]
    async fn test_panicking_handler_records_failure() {
        let recorder = Arc::new(MetricsRecorder::new());
        let task_recorder = Arc::clone(&recorder);

        let explode = true;
        let joined = tokio::spawn(async move {
            task_recorder
                .time(async move {
                    if explode {
                        panic!("handler blew up");
                    }
                    response_with(StatusCode::OK)
                })
                .await
        })
        .await;
        assert!(joined.is_err());

        let summary = recorder.summarize();
        assert_eq!(summary.total_requests, 1);
        assert_eq!(summary.error_requests, 1);
    }

    #[test]
    fn test_timer_complete_records_once() {
        let recorder = Arc::new(MetricsRecorder::new());
        let timer = recorder.start();
        timer.complete(204);
        assert_eq!(recorder.summarize().total_requests, 1);
        assert_eq!(recorder.summarize().successful_requests, 1);
    }

    #[test]
    fn test_concurrent_records_keep_totals_consistent() {
        let recorder = Arc::new(MetricsRecorder::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    for i in 0..500_u64 {
                        recorder.record(i % 3 != 0, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = recorder.summarize();
        assert_eq!(summary.total_requests, 4000);
        assert_eq!(summary.successful_requests + summary.error_requests, summary.total_requests);
        assert_eq!(summary.error_requests, 8 * 167);
        assert_eq!(summary.recent_durations.len(), DURATION_WINDOW);
    }
}
