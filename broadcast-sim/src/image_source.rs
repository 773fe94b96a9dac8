use parking_lot::Mutex;
use uuid::Uuid;

use broadcast_core::models::devices::StillFrame;
use broadcast_core::models::error::EngineError;
use broadcast_core::traits::broadcast_engine::ImageSource;

/// In-memory custom image source that keeps every submitted frame.
pub struct SimImageSource {
    id: String,
    name: String,
    frames: Mutex<Vec<StillFrame>>,
}

impl SimImageSource {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            frames: Mutex::new(Vec::new()),
        }
    }

    pub fn frames(&self) -> Vec<StillFrame> {
        self.frames.lock().clone()
    }
}

impl ImageSource for SimImageSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn submit_frame(&self, frame: &StillFrame) -> Result<(), EngineError> {
        if frame.bgra.is_empty() {
            return Err(EngineError::new(-1, "SimImageSource", "empty frame"));
        }
        self.frames.lock().push(frame.clone());
        Ok(())
    }
}
