use std::sync::Arc;

use serde::Serialize;

use crate::models::state::EngineState;
use crate::models::stats::{AudioStats, BroadcastErrorEvent, StateChange, TransmissionStatistics};
use crate::traits::broadcast_delegate::BroadcastDelegate;

pub const ON_ERROR: &str = "onError";
pub const ON_BROADCAST_ERROR: &str = "onBroadcastError";
pub const ON_IS_BROADCAST_READY: &str = "onIsBroadcastReady";
pub const ON_BROADCAST_STATE_CHANGED: &str = "onBroadcastStateChanged";
pub const ON_BROADCAST_AUDIO_STATS: &str = "onBroadcastAudioStats";
pub const ON_TRANSMISSION_STATISTICS_CHANGED: &str = "onTransmissionStatisticsChanged";
pub const ON_BROADCAST_QUALITY_CHANGED: &str = "onBroadcastQualityChanged";
pub const ON_NETWORK_HEALTH_CHANGED: &str = "onNetworkHealthChanged";
pub const ON_MEDIA_SERVICES_WERE_LOST: &str = "onMediaServicesWereLost";
pub const ON_MEDIA_SERVICES_WERE_RESET: &str = "onMediaServicesWereReset";
pub const ON_AUDIO_SESSION_INTERRUPTED: &str = "onAudioSessionInterrupted";
pub const ON_AUDIO_SESSION_RESUMED: &str = "onAudioSessionResumed";

/// The host framework's event transport.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, payload: serde_json::Value);
}

/// `BroadcastDelegate` that serializes every event into the host's JSON shape.
pub struct JsonEventDelegate {
    emitter: Arc<dyn EventEmitter>,
}

impl JsonEventDelegate {
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Arc<Self> {
        Arc::new(Self { emitter })
    }

    fn emit<T: Serialize>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.emitter.emit(event, value),
            Err(e) => log::error!("Failed to serialize {} payload: {}", event, e),
        }
    }
}

// -- Event payloads --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateChangedPayload<'a> {
    state_status: EngineState,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<SessionMetadata<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionMetadata<'a> {
    session_id: &'a str,
}

#[derive(Serialize)]
struct BroadcastErrorPayload<'a> {
    exception: ExceptionPayload<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExceptionPayload<'a> {
    code: i64,
    #[serde(rename = "type")]
    error_type: &'a str,
    detail: &'a str,
    source: Option<&'a str>,
    is_fatal: bool,
    session_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioStatsPayload<'a> {
    audio_stats: &'a AudioStats,
}

#[derive(Serialize)]
struct StatisticsPayload<'a> {
    statistics: &'a TransmissionStatistics,
}

#[derive(Serialize)]
struct QualityPayload {
    quality: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkHealthPayload {
    network_health: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadyPayload {
    is_ready: bool,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct EmptyPayload {}

impl BroadcastDelegate for JsonEventDelegate {
    fn on_error(&self, message: &str) {
        self.emit(ON_ERROR, &ErrorPayload { message });
    }

    fn on_broadcast_error(&self, error: &BroadcastErrorEvent) {
        self.emit(
            ON_BROADCAST_ERROR,
            &BroadcastErrorPayload {
                exception: ExceptionPayload {
                    code: error.code,
                    error_type: &error.error_type,
                    detail: &error.detail,
                    source: error.source.as_deref(),
                    is_fatal: error.is_fatal,
                    session_id: &error.session_id,
                },
            },
        );
    }

    fn on_is_broadcast_ready(&self, is_ready: bool) {
        self.emit(ON_IS_BROADCAST_READY, &ReadyPayload { is_ready });
    }

    fn on_broadcast_state_changed(&self, change: &StateChange) {
        self.emit(
            ON_BROADCAST_STATE_CHANGED,
            &StateChangedPayload {
                state_status: change.state,
                metadata: change
                    .session_id
                    .as_deref()
                    .map(|session_id| SessionMetadata { session_id }),
            },
        );
    }

    fn on_broadcast_audio_stats(&self, stats: &AudioStats) {
        self.emit(ON_BROADCAST_AUDIO_STATS, &AudioStatsPayload { audio_stats: stats });
    }

    fn on_transmission_statistics_changed(&self, statistics: &TransmissionStatistics) {
        self.emit(ON_TRANSMISSION_STATISTICS_CHANGED, &StatisticsPayload { statistics });
    }

    fn on_broadcast_quality_changed(&self, quality: f64) {
        self.emit(ON_BROADCAST_QUALITY_CHANGED, &QualityPayload { quality });
    }

    fn on_network_health_changed(&self, network_health: f64) {
        self.emit(ON_NETWORK_HEALTH_CHANGED, &NetworkHealthPayload { network_health });
    }

    fn on_media_services_were_lost(&self) {
        self.emit(ON_MEDIA_SERVICES_WERE_LOST, &EmptyPayload {});
    }

    fn on_media_services_were_reset(&self) {
        self.emit(ON_MEDIA_SERVICES_WERE_RESET, &EmptyPayload {});
    }

    fn on_audio_session_interrupted(&self) {
        self.emit(ON_AUDIO_SESSION_INTERRUPTED, &EmptyPayload {});
    }

    fn on_audio_session_resumed(&self) {
        self.emit(ON_AUDIO_SESSION_RESUMED, &EmptyPayload {});
    }
}
