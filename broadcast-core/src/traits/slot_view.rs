use crate::models::devices::{Rect, Size, StillFrame};

/// A host view whose content is composited into a mixer slot.
///
/// Read on the caller's thread during `add_slot`; the controller keeps no
/// reference to the view afterwards.
pub trait SlotView {
    /// The view's frame in screen points.
    fn frame(&self) -> Rect;

    /// Bounds of the screen the view lives on, in points.
    fn screen_size(&self) -> Size;

    /// Rasterize the view's current content at scale 1.
    fn render(&self) -> StillFrame;
}
