use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use crate::models::config::{
    AspectMode, CameraPosition, ConfigurationPreset, CustomAudioConfig, CustomVideoConfig,
    LogLevel, PreviewSettings, SessionConfiguration,
};
use crate::models::devices::{MixerSlotConfiguration, Size};
use crate::models::error::BroadcastError;
use crate::models::state::SessionLifecycleState;
use crate::processing::config_resolver::PendingConfiguration;
use crate::processing::slot_layout::map_to_canvas;
use crate::session::forwarder::EventForwarder;
use crate::session::pipeline::{DeviceContext, DeviceOperation, DevicePipeline, PreviewCallback};
use crate::session::registry::AttachedDeviceRegistry;
use crate::traits::broadcast_delegate::BroadcastDelegate;
use crate::traits::broadcast_engine::{BroadcastEngine, EngineSession};
use crate::traits::slot_view::SlotView;

/// Preview type produced by engine `E`.
pub type PreviewOf<E> = <<E as BroadcastEngine>::Session as EngineSession>::Preview;

/// Rate passed to the camera's zoom ramp.
pub const ZOOM_RAMP_RATE: f32 = 3.0;

/// Everything that exists only while an engine session is alive.
struct ActiveSession<S: EngineSession> {
    configuration: SessionConfiguration,
    pipeline: DevicePipeline<S>,
    forwarder: Arc<EventForwarder>,
}

impl<S: EngineSession> ActiveSession<S> {
    fn session(&self) -> &Arc<S> {
        self.pipeline.context().session()
    }
}

/// Owns a single broadcast engine session and its lifecycle.
///
/// Configuration is recorded until `initiate()` resolves it into an immutable
/// [`SessionConfiguration`]. Device-affecting calls made before initiation
/// update the pending initial state; afterwards they go through the device
/// pipeline. Engine callbacks are forwarded to the injected
/// [`BroadcastDelegate`].
///
/// ```text
/// set_* (pending) → initiate → [resolve → create session → attach devices]
///                       ↓
///   start/stop ─→ engine ─→ state/error/stats callbacks ─→ delegate
///   mute/swap/slot/preview ─→ DevicePipeline ─→ engine (one at a time)
/// ```
pub struct SessionController<E: BroadcastEngine> {
    engine: E,
    delegate: Arc<dyn BroadcastDelegate>,
    pending: PendingConfiguration,
    lifecycle: Arc<Mutex<SessionLifecycleState>>,
    active: Option<ActiveSession<E::Session>>,
}

impl<E: BroadcastEngine> SessionController<E> {
    pub fn new(engine: E, delegate: Arc<dyn BroadcastDelegate>) -> Self {
        Self {
            engine,
            delegate,
            pending: PendingConfiguration::default(),
            lifecycle: Arc::new(Mutex::new(SessionLifecycleState::Uninitialized)),
            active: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> SessionLifecycleState {
        *self.lifecycle.lock()
    }

    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the engine session can accept `start`.
    pub fn is_ready(&self) -> bool {
        self.active
            .as_ref()
            .map(|active| active.session().is_ready())
            .unwrap_or(false)
    }

    /// The configuration the live session was built with.
    pub fn configuration(&self) -> Option<&SessionConfiguration> {
        self.active.as_ref().map(|active| &active.configuration)
    }

    pub fn pending_configuration(&self) -> &PendingConfiguration {
        &self.pending
    }

    pub fn attached_devices(&self) -> Option<AttachedDeviceRegistry> {
        self.active
            .as_ref()
            .map(|active| active.pipeline.context().attached_devices())
    }

    pub fn live_slot_count(&self) -> usize {
        self.active
            .as_ref()
            .map(|active| active.pipeline.context().live_slot_count())
            .unwrap_or(0)
    }

    pub fn has_slot_source(&self, name: &str) -> bool {
        self.active
            .as_ref()
            .map(|active| active.pipeline.context().has_slot_source(name))
            .unwrap_or(false)
    }

    /// Device operations queued behind the one in flight.
    pub fn pending_device_operations(&self) -> usize {
        self.active
            .as_ref()
            .map(|active| active.pipeline.pending_len())
            .unwrap_or(0)
    }

    /// Resolve configuration and construct the engine session.
    ///
    /// Valid only once, from `Uninitialized`. A second call returns
    /// `BroadcastError::Lifecycle` without touching the engine.
    pub fn initiate(&mut self) -> Result<(), BroadcastError> {
        {
            let mut lifecycle = self.lifecycle.lock();
            match *lifecycle {
                SessionLifecycleState::Uninitialized => {
                    *lifecycle = SessionLifecycleState::Initializing;
                }
                SessionLifecycleState::TornDown => {
                    log::error!("initiate() called after deinitiate()");
                    return Err(BroadcastError::Lifecycle(
                        "broadcast session has been torn down".into(),
                    ));
                }
                other => {
                    log::error!("Broadcast session has already been initialized ({:?})", other);
                    return Err(BroadcastError::Lifecycle(
                        "broadcast session has already been initialized".into(),
                    ));
                }
            }
        }

        match self.construct_session() {
            Ok(active) => {
                log::info!(
                    "Broadcast session {} initialized",
                    active.session().session_id()
                );
                self.active = Some(active);
                *self.lifecycle.lock() = SessionLifecycleState::Ready;
                self.delegate.on_is_broadcast_ready(true);
                Ok(())
            }
            Err(e) => {
                log::warn!("Broadcast session initialization failed: {}", e);
                *self.lifecycle.lock() = SessionLifecycleState::Uninitialized;
                self.delegate.on_error(&e.to_string());
                self.delegate.on_is_broadcast_ready(false);
                Err(e)
            }
        }
    }

    fn construct_session(&self) -> Result<ActiveSession<E::Session>, BroadcastError> {
        let mut configuration = self.pending.resolve()?;
        configuration.video.enable_transparency = true;

        if let Some(strategy) = configuration.audio_session_strategy {
            log::debug!("Applying audio session strategy {}", strategy);
            self.engine.set_application_audio_session_strategy(strategy);
        }

        let descriptors = self
            .engine
            .preset_devices(configuration.initial_camera_position.into());
        let forwarder = Arc::new(EventForwarder::new(
            Arc::clone(&self.delegate),
            Arc::clone(&self.lifecycle),
        ));

        let session = Arc::new(self.engine.create_session(
            &configuration,
            &descriptors,
            forwarder.clone(),
        )?);
        session.set_log_level(configuration.session_log_level);

        let context = Arc::new(DeviceContext::new(
            session,
            AttachedDeviceRegistry::from_descriptors(&descriptors),
            configuration.preview,
        ));
        let pipeline = DevicePipeline::new(context);
        if configuration.initial_muted {
            pipeline.enqueue(DeviceOperation::SetMuted(true));
        }

        Ok(ActiveSession {
            configuration,
            pipeline,
            forwarder,
        })
    }

    /// Stop any connection and release the session and all slot sources.
    ///
    /// Idempotent and valid from any state. Leaves the controller `TornDown`.
    /// A `Disconnected` the engine reports during `stop()` still reaches the
    /// delegate; one reported later is dropped with every other late callback.
    pub fn deinitiate(&mut self) {
        if let Some(active) = self.active.take() {
            log::info!("Tearing down broadcast session {}", active.session().session_id());
            active.session().stop();
            active.forwarder.deactivate();
            active.pipeline.close();
        }

        let mut lifecycle = self.lifecycle.lock();
        if !lifecycle.is_torn_down() {
            log::debug!("Lifecycle {:?} -> TornDown", *lifecycle);
            *lifecycle = SessionLifecycleState::TornDown;
        }
    }

    /// Ask the engine to connect to `destination`.
    ///
    /// Only the URL is checked here; connection progress and failures arrive
    /// through the delegate.
    pub fn start(&self, destination: &str, stream_key: &str) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("start")?;
        let active = self.active.as_ref().ok_or_else(|| {
            BroadcastError::Lifecycle("start requires an initialized session".into())
        })?;

        let url = parse_destination(destination)?;
        log::info!("Starting broadcast to {}", url.host_str().unwrap_or_default());
        active.session().start(&url, stream_key)?;
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(active) = &self.active {
            log::info!("Stopping broadcast");
            active.session().stop();
        }
    }

    /// Mute or unmute the microphone.
    ///
    /// Before initiation this only records the initial value; the last one wins.
    pub fn set_is_muted(&mut self, muted: bool) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_is_muted")?;
        match &self.active {
            Some(active) => active.pipeline.enqueue(DeviceOperation::SetMuted(muted)),
            None => self.pending.initial_muted = muted,
        }
        Ok(())
    }

    /// Move to the camera at `position`.
    ///
    /// Before initiation this records the initial camera position. Afterwards
    /// it queues a swap that delivers a new preview to `on_preview`. Unlike
    /// [`swap_camera`](Self::swap_camera), nothing happens when the attached
    /// camera is already at `position`, and `on_preview` is not called.
    pub fn set_camera_position(
        &mut self,
        position: CameraPosition,
        on_preview: PreviewCallback<PreviewOf<E>>,
    ) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_camera_position")?;
        match &self.active {
            Some(active) => active.pipeline.enqueue(DeviceOperation::SwapCamera {
                target: Some(position.into()),
                on_preview,
            }),
            None => self.pending.initial_camera_position = position,
        }
        Ok(())
    }

    /// Swap to the opposite camera.
    #[deprecated(note = "use `set_camera_position`")]
    pub fn swap_camera(&mut self, on_preview: PreviewCallback<PreviewOf<E>>) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("swap_camera")?;
        match &self.active {
            Some(active) => active.pipeline.enqueue(DeviceOperation::SwapCamera {
                target: None,
                on_preview,
            }),
            None => log::debug!("swap_camera ignored: no session"),
        }
        Ok(())
    }

    pub fn set_camera_preview_aspect_mode(
        &mut self,
        aspect_mode: AspectMode,
        on_preview: PreviewCallback<PreviewOf<E>>,
    ) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_camera_preview_aspect_mode")?;
        self.pending.aspect_mode = aspect_mode;
        self.refresh_preview(on_preview);
        Ok(())
    }

    pub fn set_is_camera_preview_mirrored(
        &mut self,
        mirrored: bool,
        on_preview: PreviewCallback<PreviewOf<E>>,
    ) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_is_camera_preview_mirrored")?;
        self.pending.mirrored = mirrored;
        self.refresh_preview(on_preview);
        Ok(())
    }

    /// Fetch a preview once pending device changes settle.
    pub fn get_camera_preview_async(
        &self,
        on_preview: PreviewCallback<PreviewOf<E>>,
    ) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("get_camera_preview_async")?;
        if let Some(active) = &self.active {
            active
                .pipeline
                .enqueue(DeviceOperation::FetchPreview { on_preview });
        }
        Ok(())
    }

    fn refresh_preview(&self, on_preview: PreviewCallback<PreviewOf<E>>) {
        let Some(active) = &self.active else {
            return;
        };
        active.pipeline.context().set_preview_settings(PreviewSettings {
            aspect_mode: self.pending.aspect_mode,
            mirrored: self.pending.mirrored,
        });
        active
            .pipeline
            .enqueue(DeviceOperation::FetchPreview { on_preview });
    }

    /// Composite a snapshot of `view` into the mixer slot `name`.
    ///
    /// No-op without a session. The view is rasterized once, now; the
    /// snapshot is pushed into a fresh image source after any previous
    /// source for `name` has been detached.
    pub fn add_slot(&mut self, view: &dyn SlotView, name: &str) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("add_slot")?;
        let Some(active) = &self.active else {
            log::debug!("add_slot({}) ignored: no session", name);
            return Ok(());
        };

        let video = &active.configuration.video;
        let canvas = Size::new(video.width as f64, video.height as f64);
        let frame = map_to_canvas(view.frame(), view.screen_size(), canvas)?;
        let slot = MixerSlotConfiguration::user_image(name, frame)?;

        active.pipeline.enqueue(DeviceOperation::AttachSlot {
            slot,
            frame: view.render(),
        });
        Ok(())
    }

    /// Ramp the default back wide-angle camera to `factor`.
    ///
    /// Targets that physical camera whichever camera is attached. Failing to
    /// lock it is logged and otherwise ignored.
    pub fn set_zoom(&self, factor: f64) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_zoom")?;
        let Some(mut camera) = self.engine.default_back_wide_camera() else {
            log::warn!("No default back wide-angle camera to zoom");
            return Ok(());
        };
        if let Err(e) = camera.lock_for_configuration() {
            log::warn!("Could not lock camera for zoom: {}", e);
            return Ok(());
        }
        camera.ramp_to_zoom_factor(factor, ZOOM_RAMP_RATE);
        camera.unlock_for_configuration();
        Ok(())
    }

    /// Custom video overrides. No effect on a live session.
    pub fn set_video_config(&mut self, video: Option<CustomVideoConfig>) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_video_config")?;
        self.warn_if_live("video config");
        self.pending.video = video;
        Ok(())
    }

    /// Custom audio overrides. No effect on a live session.
    pub fn set_audio_config(&mut self, audio: Option<CustomAudioConfig>) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_audio_config")?;
        self.warn_if_live("audio config");
        self.pending.audio = audio;
        Ok(())
    }

    /// Preset seeding the configuration defaults. No effect on a live session.
    pub fn set_configuration_preset(
        &mut self,
        preset: Option<ConfigurationPreset>,
    ) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_configuration_preset")?;
        self.warn_if_live("configuration preset");
        self.pending.preset = preset;
        Ok(())
    }

    /// Engine configuration log level. No effect on a live session.
    pub fn set_log_level(&mut self, level: LogLevel) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_log_level")?;
        self.warn_if_live("log level");
        self.pending.log_level = level;
        Ok(())
    }

    /// Session log level, applied immediately when a session exists.
    pub fn set_session_log_level(&mut self, level: LogLevel) -> Result<(), BroadcastError> {
        self.ensure_not_torn_down("set_session_log_level")?;
        self.pending.session_log_level = level;
        if let Some(active) = &self.active {
            active.session().set_log_level(level);
        }
        Ok(())
    }

    fn warn_if_live(&self, what: &str) {
        if self.active.is_some() {
            log::debug!("{} recorded but the live session keeps its configuration", what);
        }
    }

    fn ensure_not_torn_down(&self, operation: &str) -> Result<(), BroadcastError> {
        if self.lifecycle.lock().is_torn_down() {
            log::error!("{}() called after deinitiate()", operation);
            return Err(BroadcastError::Lifecycle(format!(
                "{} called on a torn-down session",
                operation
            )));
        }
        Ok(())
    }
}

impl<E: BroadcastEngine> Drop for SessionController<E> {
    fn drop(&mut self) {
        if self.active.is_some() {
            self.deinitiate();
        }
    }
}

/// Parse an ingest URL, requiring a host.
pub fn parse_destination(destination: &str) -> Result<Url, BroadcastError> {
    let url = Url::parse(destination).map_err(|e| {
        BroadcastError::InvalidDestination(format!(
            "can not create a URL for {:?}: {}",
            destination, e
        ))
    })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(BroadcastError::InvalidDestination(format!(
            "{:?} has no host",
            destination
        )));
    }
    Ok(url)
}
