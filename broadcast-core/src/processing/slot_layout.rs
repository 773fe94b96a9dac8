use crate::models::devices::{Rect, Size};
use crate::models::error::BroadcastError;

/// Map a view's on-screen frame onto the video canvas.
///
/// Each axis is scaled by `canvas / screen`, so the slot covers the same
/// fraction of the canvas as the view covers of the screen, independent of
/// the device's pixel density.
pub fn map_to_canvas(view: Rect, screen: Size, canvas: Size) -> Result<Rect, BroadcastError> {
    if screen.is_empty() {
        return Err(BroadcastError::Configuration(format!(
            "screen bounds must be non-empty, got {}x{}",
            screen.width, screen.height
        )));
    }

    let scale_x = canvas.width / screen.width;
    let scale_y = canvas.height / screen.height;

    let width = view.size.width * scale_x;
    let height = view.size.height * scale_y;
    let center = view.center();

    Ok(Rect::new(
        center.x * scale_x - width / 2.0,
        center.y * scale_y - height / 2.0,
        width,
        height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_screen_view_covers_canvas() {
        let slot = map_to_canvas(
            Rect::new(0.0, 0.0, 390.0, 844.0),
            Size::new(390.0, 844.0),
            Size::new(720.0, 1280.0),
        )
        .unwrap();

        assert_relative_eq!(slot.origin.x, 0.0);
        assert_relative_eq!(slot.origin.y, 0.0);
        assert_relative_eq!(slot.size.width, 720.0);
        assert_relative_eq!(slot.size.height, 1280.0);
    }

    #[test]
    fn quarter_view_in_bottom_right() {
        let slot = map_to_canvas(
            Rect::new(200.0, 400.0, 200.0, 400.0),
            Size::new(400.0, 800.0),
            Size::new(1280.0, 720.0),
        )
        .unwrap();

        assert_relative_eq!(slot.origin.x, 640.0);
        assert_relative_eq!(slot.origin.y, 360.0);
        assert_relative_eq!(slot.size.width, 640.0);
        assert_relative_eq!(slot.size.height, 360.0);
    }

    #[test]
    fn non_uniform_scaling() {
        let slot = map_to_canvas(
            Rect::new(39.0, 84.4, 97.5, 211.0),
            Size::new(390.0, 844.0),
            Size::new(1280.0, 720.0),
        )
        .unwrap();

        assert_relative_eq!(slot.origin.x, 128.0, epsilon = 1e-9);
        assert_relative_eq!(slot.origin.y, 72.0, epsilon = 1e-9);
        assert_relative_eq!(slot.size.width, 320.0, epsilon = 1e-9);
        assert_relative_eq!(slot.size.height, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_screen_is_rejected() {
        let result = map_to_canvas(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Size::new(0.0, 844.0),
            Size::new(1280.0, 720.0),
        );
        assert!(result.is_err());
    }
}
