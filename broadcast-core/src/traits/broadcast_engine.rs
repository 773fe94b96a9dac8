use std::sync::Arc;

use url::Url;

use crate::models::config::{AspectMode, AudioSessionStrategy, LogLevel, SessionConfiguration};
use crate::models::devices::{DeviceDescriptor, DevicePosition, MixerSlotConfiguration, StillFrame};
use crate::models::error::EngineError;
use crate::traits::engine_listener::EngineListener;

/// Callback fired once the engine has no device-graph changes in flight.
pub type QuiescenceCallback = Box<dyn FnOnce() + Send + 'static>;

/// Callback fired when an asynchronous device operation completes.
pub type DeviceCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// The broadcast engine capability: session construction plus the few
/// process-wide hooks that exist outside any one session.
///
/// Implemented by platform backends and by `broadcast-sim`.
pub trait BroadcastEngine: Send + Sync {
    type Session: EngineSession;

    /// The initial device list (camera at `position` plus the default microphone).
    fn preset_devices(&self, position: DevicePosition) -> Vec<DeviceDescriptor>;

    /// Configure host audio routing for the whole process.
    fn set_application_audio_session_strategy(&self, strategy: AudioSessionStrategy);

    /// Construct a session and attach `descriptors`.
    ///
    /// `listener` receives every session callback until the session is dropped.
    fn create_session(
        &self,
        configuration: &SessionConfiguration,
        descriptors: &[DeviceDescriptor],
        listener: Arc<dyn EngineListener>,
    ) -> Result<Self::Session, EngineError>;

    /// Zoom control for the platform's default wide-angle back camera.
    fn default_back_wide_camera(&self) -> Option<Box<dyn ZoomControl>>;
}

/// A live engine session.
///
/// Asynchronous operations report completion through their callback, which
/// may fire on any thread, possibly before the call returns.
pub trait EngineSession: Send + Sync + 'static {
    /// Platform preview surface handed back to the host.
    type Preview: Send + 'static;

    fn session_id(&self) -> String;

    /// Whether the session can accept a `start`.
    fn is_ready(&self) -> bool;

    fn set_log_level(&self, level: LogLevel);

    /// Begin connecting. State progress arrives through the listener.
    fn start(&self, destination: &Url, stream_key: &str) -> Result<(), EngineError>;

    fn stop(&self);

    /// Run `on_quiescent` once no device-graph mutation is in flight.
    fn await_device_changes(&self, on_quiescent: QuiescenceCallback);

    fn list_available_devices(&self) -> Vec<DeviceDescriptor>;

    fn list_attached_devices(&self) -> Vec<DeviceDescriptor>;

    /// Replace attached device `old` with a device built from `new`.
    fn exchange_device(
        &self,
        old: &DeviceDescriptor,
        new: &DeviceDescriptor,
        on_complete: DeviceCallback<Result<DeviceDescriptor, EngineError>>,
    );

    /// Set input gain (0.0 to 1.0) on an attached audio device.
    fn set_gain(&self, device: &DeviceDescriptor, gain: f32) -> Result<(), EngineError>;

    fn preview(&self, aspect_mode: AspectMode, mirrored: bool) -> Result<Self::Preview, EngineError>;

    /// Add a mixer slot, or update the one with the same name.
    fn add_mixer_slot(&self, slot: &MixerSlotConfiguration) -> Result<(), EngineError>;

    fn create_image_source(&self, name: &str) -> Result<Arc<dyn ImageSource>, EngineError>;

    fn attach_image_source(
        &self,
        source: Arc<dyn ImageSource>,
        slot_name: &str,
        on_complete: DeviceCallback<Result<(), EngineError>>,
    );

    fn detach_image_source(&self, source: Arc<dyn ImageSource>, on_complete: DeviceCallback<()>);
}

/// Custom image source feeding a mixer slot.
pub trait ImageSource: Send + Sync {
    /// Engine-assigned identifier of this source.
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn submit_frame(&self, frame: &StillFrame) -> Result<(), EngineError>;
}

/// Hardware zoom on a physical camera.
pub trait ZoomControl: Send {
    /// Take exclusive configuration access. Fails under contention.
    fn lock_for_configuration(&mut self) -> Result<(), EngineError>;

    fn ramp_to_zoom_factor(&mut self, factor: f64, rate: f32);

    fn unlock_for_configuration(&mut self);
}
