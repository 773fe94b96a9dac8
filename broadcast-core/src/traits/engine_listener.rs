use crate::models::error::EngineError;
use crate::models::state::EngineState;
use crate::models::stats::TransmissionStatistics;

/// Callbacks from a broadcast engine session, one method per event kind.
///
/// Handed to [`BroadcastEngine::create_session`] and invoked on the engine's
/// own threads, concurrently with calls issued by the session owner.
///
/// [`BroadcastEngine::create_session`]: super::broadcast_engine::BroadcastEngine::create_session
pub trait EngineListener: Send + Sync {
    fn on_state_changed(&self, state: EngineState, session_id: &str);

    fn on_error(&self, error: &EngineError, session_id: &str);

    /// Microphone peak and RMS levels.
    fn on_audio_stats(&self, peak: f64, rms: f64);

    fn on_transmission_statistics(&self, statistics: &TransmissionStatistics);

    /// Legacy network health signal, 0.0 to 1.0.
    fn on_network_health_changed(&self, health: f64);

    /// Legacy broadcast quality signal, 0.0 to 1.0.
    fn on_broadcast_quality_changed(&self, quality: f64);

    fn on_media_services_lost(&self);

    fn on_media_services_reset(&self);

    fn on_audio_session_interrupted(&self);

    fn on_audio_session_resumed(&self);
}
