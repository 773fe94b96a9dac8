//! # broadcast-core
//!
//! Engine-agnostic broadcast session lifecycle core.
//!
//! Resolves host configuration into engine settings, owns one engine session
//! from initiation to teardown, serializes device-graph mutations behind the
//! engine's quiescence barrier, and forwards engine callbacks to the host.
//! Concrete engines implement the `BroadcastEngine` trait and plug into the
//! generic `SessionController`.
//!
//! ## Architecture
//!
//! ```text
//! broadcast-core (this crate)
//! ├── traits/       ← BroadcastEngine, EngineSession, EngineListener, BroadcastDelegate, SlotView
//! ├── models/       ← BroadcastError, SessionLifecycleState, SessionConfiguration, devices, stats
//! ├── processing/   ← configuration resolution, slot geometry
//! ├── session/      ← SessionController, DevicePipeline, EventForwarder, registries
//! └── host/         ← HostProps, JsonEventDelegate
//! ```

pub mod host;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use host::events::{EventEmitter, JsonEventDelegate};
pub use host::props::{apply_props, HostProps};
pub use models::config::{
    AspectMode, AudioConfiguration, CameraPosition, ConfigurationPreset, CustomAudioConfig,
    CustomVideoConfig, LogLevel, SessionConfiguration, VideoConfiguration,
};
pub use models::devices::{DeviceDescriptor, DevicePosition, DeviceType, MixerSlotConfiguration, Rect, Size, StillFrame};
pub use models::error::{BroadcastError, EngineError};
pub use models::state::{EngineState, SessionLifecycleState};
pub use models::stats::{AudioStats, BroadcastErrorEvent, StateChange, TransmissionStatistics};
pub use processing::config_resolver::resolve_configuration;
pub use session::controller::{PreviewOf, SessionController};
pub use session::pipeline::PreviewCallback;
pub use traits::broadcast_delegate::BroadcastDelegate;
pub use traits::broadcast_engine::{BroadcastEngine, EngineSession, ImageSource, ZoomControl};
pub use traits::engine_listener::EngineListener;
pub use traits::slot_view::SlotView;
