//! # broadcast-sim
//!
//! In-memory broadcast engine backend for broadcast-core.
//!
//! Provides:
//! - `SimulatedEngine`: device catalog, session construction, zoom handle
//! - `SimulatedSession`: device graph bookkeeping, deferred device-change barrier,
//!   scripted state/error/statistics emission
//! - `RecordingDelegate`: records every host-bound event
//!
//! ## Usage
//! ```ignore
//! use broadcast_core::SessionController;
//! use broadcast_sim::{RecordingDelegate, SimulatedEngine};
//!
//! let engine = SimulatedEngine::new();
//! let delegate = RecordingDelegate::new();
//! let mut controller = SessionController::new(engine.clone(), delegate.clone());
//! controller.initiate()?;
//! controller.start("rtmps://ingest.example.com:443/app/", "sk_live")?;
//! ```

pub mod catalog;
pub mod engine;
pub mod image_source;
pub mod recorder;
pub mod session;

pub use engine::{SimZoomControl, SimulatedEngine};
pub use image_source::SimImageSource;
pub use recorder::{DelegateEvent, RecordingDelegate};
pub use session::{Dispatch, SimPreview, SimulatedSession};
