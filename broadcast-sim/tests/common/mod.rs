#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use broadcast_core::models::devices::{Rect, Size, StillFrame};
use broadcast_core::{PreviewCallback, SessionController, SlotView};
use broadcast_sim::{RecordingDelegate, SimPreview, SimulatedEngine};

pub const DESTINATION: &str = "rtmps://a1b2c3.global-contribute.live-video.net:443/app/";
pub const STREAM_KEY: &str = "sk_us-west-2_test";

pub fn controller(
    engine: &SimulatedEngine,
) -> (SessionController<SimulatedEngine>, Arc<RecordingDelegate>) {
    let delegate = RecordingDelegate::new();
    let controller = SessionController::new(engine.clone(), delegate.clone());
    (controller, delegate)
}

/// Collects previews delivered to the callbacks it hands out.
#[derive(Clone, Default)]
pub struct PreviewSink {
    previews: Arc<Mutex<Vec<SimPreview>>>,
}

impl PreviewSink {
    pub fn callback(&self) -> PreviewCallback<SimPreview> {
        let previews = Arc::clone(&self.previews);
        Box::new(move |preview| previews.lock().push(preview))
    }

    pub fn received(&self) -> Vec<SimPreview> {
        self.previews.lock().clone()
    }
}

/// A host view with a solid 2x2 rendering.
pub struct TestView {
    pub frame: Rect,
    pub screen: Size,
    pub shade: u8,
}

impl TestView {
    pub fn new(frame: Rect, shade: u8) -> Self {
        Self {
            frame,
            screen: Size::new(400.0, 800.0),
            shade,
        }
    }
}

impl SlotView for TestView {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn screen_size(&self) -> Size {
        self.screen
    }

    fn render(&self) -> StillFrame {
        StillFrame {
            width: 2,
            height: 2,
            bgra: vec![self.shade; 16],
        }
    }
}
