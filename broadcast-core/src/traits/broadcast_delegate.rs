use crate::models::stats::{AudioStats, BroadcastErrorEvent, StateChange, TransmissionStatistics};

/// Event sink for broadcast session notifications bound for the host.
///
/// Injected into the `SessionController` at construction. Methods are called
/// from the engine's callback threads as well as from the caller's thread;
/// implementations should marshal to the UI thread if needed.
pub trait BroadcastDelegate: Send + Sync {
    /// Called when the controller hits a non-fatal internal error.
    fn on_error(&self, message: &str);

    /// Called when the engine reports an error.
    fn on_broadcast_error(&self, error: &BroadcastErrorEvent);

    /// Called once per `initiate()` with whether the session came up.
    fn on_is_broadcast_ready(&self, is_ready: bool);

    /// Called for every engine connection state change, in engine order.
    fn on_broadcast_state_changed(&self, change: &StateChange);

    fn on_broadcast_audio_stats(&self, stats: &AudioStats);

    fn on_transmission_statistics_changed(&self, statistics: &TransmissionStatistics);

    /// Superseded by `on_transmission_statistics_changed`.
    fn on_broadcast_quality_changed(&self, _quality: f64) {}

    /// Superseded by `on_transmission_statistics_changed`.
    fn on_network_health_changed(&self, _network_health: f64) {}

    fn on_media_services_were_lost(&self) {}

    fn on_media_services_were_reset(&self) {}

    fn on_audio_session_interrupted(&self) {}

    fn on_audio_session_resumed(&self) {}
}
