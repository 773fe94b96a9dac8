use serde::Serialize;

use super::state::EngineState;

/// Network health as graded by the engine, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkHealth {
    Bad,
    Poor,
    Medium,
    Good,
    Excellent,
}

/// Output quality relative to the configured bitrate range, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastQuality {
    NearMinimum,
    Low,
    Medium,
    High,
    NearMaximum,
}

/// Periodic transmission statistics for an active connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionStatistics {
    /// Round trip time in milliseconds.
    pub rtt: f64,
    pub measured_bitrate: f64,
    pub recommended_bitrate: f64,
    pub network_health: NetworkHealth,
    pub broadcast_quality: BroadcastQuality,
}

/// Microphone level metering, in dBFS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioStats {
    pub peak: f64,
    pub rms: f64,
}

/// A connection state change as forwarded to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub state: EngineState,
    /// Present only on the transition into `Connected`.
    pub session_id: Option<String>,
}

/// An engine error as forwarded to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastErrorEvent {
    pub code: i64,
    pub error_type: String,
    pub detail: String,
    pub source: Option<String>,
    pub is_fatal: bool,
    pub session_id: String,
}
