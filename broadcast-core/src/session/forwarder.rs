use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::EngineError;
use crate::models::state::{EngineState, SessionLifecycleState};
use crate::models::stats::{AudioStats, BroadcastErrorEvent, StateChange, TransmissionStatistics};
use crate::traits::broadcast_delegate::BroadcastDelegate;
use crate::traits::engine_listener::EngineListener;

/// Engine listener that tracks connection lifecycle and forwards every
/// callback to the host delegate.
///
/// No lock is held while the delegate runs, so a host may call back into the
/// controller from any handler. Events reach the delegate in the order the
/// engine delivers them. Once deactivated, every new callback is a no-op.
pub struct EventForwarder {
    delegate: Arc<dyn BroadcastDelegate>,
    lifecycle: Arc<Mutex<SessionLifecycleState>>,
    active: AtomicBool,
}

impl EventForwarder {
    pub fn new(
        delegate: Arc<dyn BroadcastDelegate>,
        lifecycle: Arc<Mutex<SessionLifecycleState>>,
    ) -> Self {
        Self {
            delegate,
            lifecycle,
            active: AtomicBool::new(true),
        }
    }

    /// Stop forwarding without waiting on other threads.
    ///
    /// A delivery already past its check on another thread still lands, but it
    /// cannot move a torn-down lifecycle.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn deliver(&self, forward: impl FnOnce(&dyn BroadcastDelegate)) {
        if !self.is_active() {
            return;
        }
        forward(self.delegate.as_ref());
    }
}

impl EngineListener for EventForwarder {
    fn on_state_changed(&self, state: EngineState, session_id: &str) {
        self.deliver(|delegate| {
            {
                let mut lifecycle = self.lifecycle.lock();
                if let Some(next) = SessionLifecycleState::from_engine(state) {
                    if lifecycle.has_session() {
                        log::debug!("Lifecycle {:?} -> {:?}", *lifecycle, next);
                        *lifecycle = next;
                    }
                }
            }

            let change = StateChange {
                state,
                session_id: (state == EngineState::Connected).then(|| session_id.to_string()),
            };
            delegate.on_broadcast_state_changed(&change);
        });
    }

    fn on_error(&self, error: &EngineError, session_id: &str) {
        self.deliver(|delegate| {
            log::error!(
                "Broadcast engine error{}: {}",
                if error.is_fatal { " (fatal)" } else { "" },
                error
            );
            delegate.on_broadcast_error(&BroadcastErrorEvent {
                code: error.code,
                error_type: error.domain.clone(),
                detail: error.detail.clone(),
                source: error.source.clone(),
                is_fatal: error.is_fatal,
                session_id: session_id.to_string(),
            });
        });
    }

    fn on_audio_stats(&self, peak: f64, rms: f64) {
        self.deliver(|delegate| delegate.on_broadcast_audio_stats(&AudioStats { peak, rms }));
    }

    fn on_transmission_statistics(&self, statistics: &TransmissionStatistics) {
        self.deliver(|delegate| delegate.on_transmission_statistics_changed(statistics));
    }

    fn on_network_health_changed(&self, health: f64) {
        self.deliver(|delegate| delegate.on_network_health_changed(health));
    }

    fn on_broadcast_quality_changed(&self, quality: f64) {
        self.deliver(|delegate| delegate.on_broadcast_quality_changed(quality));
    }

    fn on_media_services_lost(&self) {
        self.deliver(|delegate| delegate.on_media_services_were_lost());
    }

    fn on_media_services_reset(&self) {
        self.deliver(|delegate| delegate.on_media_services_were_reset());
    }

    fn on_audio_session_interrupted(&self) {
        self.deliver(|delegate| delegate.on_audio_session_interrupted());
    }

    fn on_audio_session_resumed(&self) {
        self.deliver(|delegate| delegate.on_audio_session_resumed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::{BroadcastQuality, NetworkHealth};

    #[derive(Default)]
    struct Recorder {
        states: Mutex<Vec<StateChange>>,
        errors: Mutex<Vec<BroadcastErrorEvent>>,
        statistics: Mutex<Vec<TransmissionStatistics>>,
        passthrough: Mutex<Vec<&'static str>>,
    }

    impl BroadcastDelegate for Recorder {
        fn on_error(&self, _message: &str) {}

        fn on_broadcast_error(&self, error: &BroadcastErrorEvent) {
            self.errors.lock().push(error.clone());
        }

        fn on_is_broadcast_ready(&self, _is_ready: bool) {}

        fn on_broadcast_state_changed(&self, change: &StateChange) {
            self.states.lock().push(change.clone());
        }

        fn on_broadcast_audio_stats(&self, _stats: &AudioStats) {}

        fn on_transmission_statistics_changed(&self, statistics: &TransmissionStatistics) {
            self.statistics.lock().push(*statistics);
        }

        fn on_media_services_were_lost(&self) {
            self.passthrough.lock().push("lost");
        }

        fn on_audio_session_resumed(&self) {
            self.passthrough.lock().push("resumed");
        }
    }

    fn forwarder(state: SessionLifecycleState) -> (EventForwarder, Arc<Recorder>, Arc<Mutex<SessionLifecycleState>>) {
        let recorder = Arc::new(Recorder::default());
        let lifecycle = Arc::new(Mutex::new(state));
        let forwarder = EventForwarder::new(recorder.clone(), Arc::clone(&lifecycle));
        (forwarder, recorder, lifecycle)
    }

    #[test]
    fn session_id_only_on_connected() {
        let (forwarder, recorder, lifecycle) = forwarder(SessionLifecycleState::Ready);

        forwarder.on_state_changed(EngineState::Connecting, "session-1");
        forwarder.on_state_changed(EngineState::Connected, "session-1");

        let states = recorder.states.lock();
        assert_eq!(states[0].session_id, None);
        assert_eq!(states[1].session_id.as_deref(), Some("session-1"));
        assert_eq!(*lifecycle.lock(), SessionLifecycleState::Connected);
    }

    #[test]
    fn error_state_keeps_lifecycle() {
        let (forwarder, recorder, lifecycle) = forwarder(SessionLifecycleState::Connected);

        forwarder.on_state_changed(EngineState::Error, "s");

        assert_eq!(*lifecycle.lock(), SessionLifecycleState::Connected);
        assert_eq!(recorder.states.lock().len(), 1);
    }

    #[test]
    fn state_before_ready_does_not_move_lifecycle() {
        let (forwarder, _recorder, lifecycle) = forwarder(SessionLifecycleState::Initializing);

        forwarder.on_state_changed(EngineState::Disconnected, "s");

        assert_eq!(*lifecycle.lock(), SessionLifecycleState::Initializing);
    }

    #[test]
    fn errors_carry_engine_fields() {
        let (forwarder, recorder, _) = forwarder(SessionLifecycleState::Connected);

        let error = EngineError::new(-1009, "IVSBroadcastErrorDomain", "offline")
            .with_source("network")
            .fatal();
        forwarder.on_error(&error, "session-9");

        let errors = recorder.errors.lock();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, -1009);
        assert_eq!(errors[0].error_type, "IVSBroadcastErrorDomain");
        assert_eq!(errors[0].source.as_deref(), Some("network"));
        assert!(errors[0].is_fatal);
        assert_eq!(errors[0].session_id, "session-9");
    }

    #[test]
    fn deactivated_forwarder_is_silent() {
        let (forwarder, recorder, lifecycle) = forwarder(SessionLifecycleState::Ready);
        forwarder.deactivate();

        forwarder.on_state_changed(EngineState::Connected, "s");
        forwarder.on_transmission_statistics(&TransmissionStatistics {
            rtt: 10.0,
            measured_bitrate: 1.0,
            recommended_bitrate: 1.0,
            network_health: NetworkHealth::Good,
            broadcast_quality: BroadcastQuality::High,
        });
        forwarder.on_media_services_lost();

        assert!(recorder.states.lock().is_empty());
        assert!(recorder.statistics.lock().is_empty());
        assert!(recorder.passthrough.lock().is_empty());
        assert_eq!(*lifecycle.lock(), SessionLifecycleState::Ready);
    }

    #[test]
    fn passthrough_notifications_do_not_touch_lifecycle() {
        let (forwarder, recorder, lifecycle) = forwarder(SessionLifecycleState::Connected);

        forwarder.on_media_services_lost();
        forwarder.on_audio_session_resumed();
        forwarder.on_audio_session_interrupted();

        assert_eq!(*recorder.passthrough.lock(), vec!["lost", "resumed"]);
        assert_eq!(*lifecycle.lock(), SessionLifecycleState::Connected);
    }
}
