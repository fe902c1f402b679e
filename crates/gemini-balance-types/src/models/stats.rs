//! Statistics and monitoring models.

use serde::{Deserialize, Serialize};

/// Snapshot of request metrics served on `/metrics`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    /// Completed requests since start
    pub total_requests: u64,
    /// Requests answered with status < 400
    pub successful_requests: u64,
    /// Requests answered with status >= 400 (or never answered)
    pub error_requests: u64,
    /// `successful_requests / total_requests`, 0 when nothing was recorded
    pub success_rate: f64,
    /// Mean of `recent_durations` in milliseconds, 0 when empty
    pub average_response_time: f64,
    /// Most recent request durations in milliseconds, oldest first
    pub recent_durations: Vec<u64>,
}
