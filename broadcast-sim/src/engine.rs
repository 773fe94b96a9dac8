use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use broadcast_core::models::config::{AudioSessionStrategy, SessionConfiguration};
use broadcast_core::models::devices::{DeviceDescriptor, DevicePosition};
use broadcast_core::models::error::EngineError;
use broadcast_core::traits::broadcast_engine::{BroadcastEngine, ZoomControl};
use broadcast_core::traits::engine_listener::EngineListener;

use crate::catalog::{preset_for, three_camera_catalog};
use crate::session::{Dispatch, SimulatedSession};

#[derive(Default)]
struct ZoomState {
    contended: bool,
    locked: bool,
    ramps: Vec<(f64, f32)>,
}

/// Zoom handle on the simulated default back wide-angle camera.
pub struct SimZoomControl {
    state: Arc<Mutex<ZoomState>>,
    holds_lock: bool,
}

impl ZoomControl for SimZoomControl {
    fn lock_for_configuration(&mut self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if state.contended || state.locked {
            return Err(EngineError::new(
                -11852,
                "AVFoundationErrorDomain",
                "device is locked by another client",
            ));
        }
        state.locked = true;
        self.holds_lock = true;
        Ok(())
    }

    fn ramp_to_zoom_factor(&mut self, factor: f64, rate: f32) {
        if !self.holds_lock {
            log::warn!("Zoom ramp to {} without configuration lock", factor);
            return;
        }
        self.state.lock().ramps.push((factor, rate));
    }

    fn unlock_for_configuration(&mut self) {
        if self.holds_lock {
            self.state.lock().locked = false;
            self.holds_lock = false;
        }
    }
}

impl Drop for SimZoomControl {
    fn drop(&mut self) {
        self.unlock_for_configuration();
    }
}

struct EngineInner {
    catalog: Vec<DeviceDescriptor>,
    dispatch: Dispatch,
    sessions: Mutex<Vec<SimulatedSession>>,
    configurations: Mutex<Vec<SessionConfiguration>>,
    audio_strategy: Mutex<Option<AudioSessionStrategy>>,
    create_failure: Mutex<Option<EngineError>>,
    zoom: Arc<Mutex<ZoomState>>,
}

/// In-memory `BroadcastEngine`. Clones share state, so a test can keep one
/// handle for probing while the controller owns another.
#[derive(Clone)]
pub struct SimulatedEngine {
    inner: Arc<EngineInner>,
}

impl SimulatedEngine {
    /// Three-camera device with callbacks completing inline.
    pub fn new() -> Self {
        Self::with_catalog(three_camera_catalog(), Dispatch::Immediate)
    }

    /// Three-camera device whose callbacks wait for `run_pending`.
    pub fn manual() -> Self {
        Self::with_catalog(three_camera_catalog(), Dispatch::Manual)
    }

    pub fn with_catalog(catalog: Vec<DeviceDescriptor>, dispatch: Dispatch) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                catalog,
                dispatch,
                sessions: Mutex::new(Vec::new()),
                configurations: Mutex::new(Vec::new()),
                audio_strategy: Mutex::new(None),
                create_failure: Mutex::new(None),
                zoom: Arc::new(Mutex::new(ZoomState::default())),
            }),
        }
    }

    pub fn sessions_created(&self) -> usize {
        self.inner.sessions.lock().len()
    }

    pub fn last_session(&self) -> Option<SimulatedSession> {
        self.inner.sessions.lock().last().cloned()
    }

    pub fn last_configuration(&self) -> Option<SessionConfiguration> {
        self.inner.configurations.lock().last().cloned()
    }

    pub fn audio_session_strategy(&self) -> Option<AudioSessionStrategy> {
        *self.inner.audio_strategy.lock()
    }

    /// Make the next `create_session` fail with `error`.
    pub fn fail_next_session(&self, error: EngineError) {
        *self.inner.create_failure.lock() = Some(error);
    }

    /// Simulate another client holding the camera's configuration lock.
    pub fn set_zoom_contended(&self, contended: bool) {
        self.inner.zoom.lock().contended = contended;
    }

    pub fn zoom_ramps(&self) -> Vec<(f64, f32)> {
        self.inner.zoom.lock().ramps.clone()
    }

    pub fn zoom_is_locked(&self) -> bool {
        self.inner.zoom.lock().locked
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastEngine for SimulatedEngine {
    type Session = SimulatedSession;

    fn preset_devices(&self, position: DevicePosition) -> Vec<DeviceDescriptor> {
        preset_for(&self.inner.catalog, position)
    }

    fn set_application_audio_session_strategy(&self, strategy: AudioSessionStrategy) {
        *self.inner.audio_strategy.lock() = Some(strategy);
    }

    fn create_session(
        &self,
        configuration: &SessionConfiguration,
        descriptors: &[DeviceDescriptor],
        listener: Arc<dyn EngineListener>,
    ) -> Result<SimulatedSession, EngineError> {
        if let Some(e) = self.inner.create_failure.lock().take() {
            return Err(e);
        }

        let session = SimulatedSession::new(
            Uuid::new_v4().to_string(),
            self.inner.dispatch,
            self.inner.catalog.clone(),
            descriptors,
            listener,
        );
        log::info!(
            "Simulated session created with {} device(s)",
            descriptors.len()
        );
        self.inner.sessions.lock().push(session.clone());
        self.inner.configurations.lock().push(configuration.clone());
        Ok(session)
    }

    fn default_back_wide_camera(&self) -> Option<Box<dyn ZoomControl>> {
        let has_camera = self
            .inner
            .catalog
            .iter()
            .any(|d| d.is_camera() && d.position == DevicePosition::Back && d.is_default);
        if !has_camera {
            return None;
        }
        Some(Box::new(SimZoomControl {
            state: Arc::clone(&self.inner.zoom),
            holds_lock: false,
        }))
    }
}
