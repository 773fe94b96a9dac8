use std::sync::Arc;

use parking_lot::Mutex;

use broadcast_core::models::state::EngineState;
use broadcast_core::models::stats::{AudioStats, BroadcastErrorEvent, StateChange, TransmissionStatistics};
use broadcast_core::traits::broadcast_delegate::BroadcastDelegate;

/// One delegate callback, as received.
#[derive(Debug, Clone, PartialEq)]
pub enum DelegateEvent {
    Error(String),
    BroadcastError(BroadcastErrorEvent),
    Ready(bool),
    State(StateChange),
    AudioStats(AudioStats),
    Statistics(TransmissionStatistics),
    QualityChanged(f64),
    NetworkHealthChanged(f64),
    MediaServicesLost,
    MediaServicesReset,
    AudioSessionInterrupted,
    AudioSessionResumed,
}

/// `BroadcastDelegate` that records every callback in arrival order.
#[derive(Default)]
pub struct RecordingDelegate {
    events: Mutex<Vec<DelegateEvent>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DelegateEvent> {
        self.events.lock().clone()
    }

    pub fn states(&self) -> Vec<EngineState> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::State(change) => Some(change.state),
                _ => None,
            })
            .collect()
    }

    pub fn state_changes(&self) -> Vec<StateChange> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::State(change) => Some(change.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn readiness(&self) -> Vec<bool> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::Ready(ready) => Some(*ready),
                _ => None,
            })
            .collect()
    }

    pub fn broadcast_errors(&self) -> Vec<BroadcastErrorEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::BroadcastError(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: DelegateEvent) {
        self.events.lock().push(event);
    }
}

impl BroadcastDelegate for RecordingDelegate {
    fn on_error(&self, message: &str) {
        self.push(DelegateEvent::Error(message.to_string()));
    }

    fn on_broadcast_error(&self, error: &BroadcastErrorEvent) {
        self.push(DelegateEvent::BroadcastError(error.clone()));
    }

    fn on_is_broadcast_ready(&self, is_ready: bool) {
        self.push(DelegateEvent::Ready(is_ready));
    }

    fn on_broadcast_state_changed(&self, change: &StateChange) {
        self.push(DelegateEvent::State(change.clone()));
    }

    fn on_broadcast_audio_stats(&self, stats: &AudioStats) {
        self.push(DelegateEvent::AudioStats(*stats));
    }

    fn on_transmission_statistics_changed(&self, statistics: &TransmissionStatistics) {
        self.push(DelegateEvent::Statistics(*statistics));
    }

    fn on_broadcast_quality_changed(&self, quality: f64) {
        self.push(DelegateEvent::QualityChanged(quality));
    }

    fn on_network_health_changed(&self, network_health: f64) {
        self.push(DelegateEvent::NetworkHealthChanged(network_health));
    }

    fn on_media_services_were_lost(&self) {
        self.push(DelegateEvent::MediaServicesLost);
    }

    fn on_media_services_were_reset(&self) {
        self.push(DelegateEvent::MediaServicesReset);
    }

    fn on_audio_session_interrupted(&self) {
        self.push(DelegateEvent::AudioSessionInterrupted);
    }

    fn on_audio_session_resumed(&self) {
        self.push(DelegateEvent::AudioSessionResumed);
    }
}
