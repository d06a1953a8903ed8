//! Mapping of detection geometry onto the display surface.

use crate::schema::{BoundingBox, Detection, Frame};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rectangle in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct OverlayRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl OverlayRect {
    pub const ZERO: OverlayRect = OverlayRect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }
}

/// Stretch `bounding_box` from a `source_width` x `source_height` frame onto a
/// `dest_width` x `dest_height` surface.
///
/// Each axis is scaled independently; no letterboxing is applied. Source
/// dimensions that are not positive (or any non-finite input) yield
/// [`OverlayRect::ZERO`], since they only occur before the first real frame.
pub fn project(
    bounding_box: &BoundingBox,
    source_width: f32,
    source_height: f32,
    dest_width: f32,
    dest_height: f32,
) -> OverlayRect {
    let dims = [source_width, source_height, dest_width, dest_height];
    if source_width <= 0.0 || source_height <= 0.0 || dims.iter().any(|d| !d.is_finite()) {
        return OverlayRect::ZERO;
    }

    let scale_x = dest_width / source_width;
    let scale_y = dest_height / source_height;

    OverlayRect {
        left: bounding_box.left as f32 * scale_x,
        top: bounding_box.top as f32 * scale_y,
        right: bounding_box.right as f32 * scale_x,
        bottom: bounding_box.bottom as f32 * scale_y,
    }
}

/// Project a detection's box using its frame's upright dimensions.
pub fn project_detection(
    detection: &Detection,
    frame: &Frame,
    dest_width: f32,
    dest_height: f32,
) -> Option<OverlayRect> {
    let (width, height) = frame.upright_size();
    detection
        .bounding_box
        .as_ref()
        .map(|bb| project(bb, width as f32, height as f32, dest_width, dest_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Rotation;

    #[test]
    fn scales_each_axis() {
        let bb = BoundingBox::new(100, 50, 200, 150);
        let r = project(&bb, 640.0, 480.0, 1280.0, 1440.0);
        assert_eq!(
            r,
            OverlayRect {
                left: 200.0,
                top: 150.0,
                right: 400.0,
                bottom: 450.0,
            }
        );
    }

    #[test]
    fn identity_when_sizes_match() {
        let bb = BoundingBox::new(3, 4, 30, 40);
        let r = project(&bb, 100.0, 100.0, 100.0, 100.0);
        assert_eq!((r.left, r.top, r.right, r.bottom), (3.0, 4.0, 30.0, 40.0));
    }

    #[test]
    fn zero_source_width_is_degenerate() {
        let bb = BoundingBox::new(10, 10, 20, 20);
        let r = project(&bb, 0.0, 1080.0, 1920.0, 1080.0);
        assert_eq!(r, OverlayRect::ZERO);
        assert!(r.is_empty());
        assert!(!r.left.is_nan());
    }

    #[test]
    fn negative_and_nan_dimensions_are_degenerate() {
        let bb = BoundingBox::new(10, 10, 20, 20);
        assert_eq!(project(&bb, -5.0, 100.0, 100.0, 100.0), OverlayRect::ZERO);
        assert_eq!(project(&bb, 100.0, 0.0, 100.0, 100.0), OverlayRect::ZERO);
        assert_eq!(project(&bb, 100.0, 100.0, f32::NAN, 100.0), OverlayRect::ZERO);
    }

    #[test]
    fn detection_projection_uses_upright_size() {
        // A 1920x1080 buffer rotated 90 degrees is shown as 1080x1920.
        let frame = Frame::new(1920, 1080).rotated(Rotation::Deg90);
        let d = Detection::with_value("a").bounding_box(BoundingBox::new(108, 192, 216, 384));
        let r = project_detection(&d, &frame, 540.0, 960.0).unwrap();
        assert_eq!((r.left, r.top, r.right, r.bottom), (54.0, 96.0, 108.0, 192.0));
    }

    #[test]
    fn detection_without_box_has_no_overlay() {
        let frame = Frame::new(640, 480);
        assert!(project_detection(&Detection::with_value("a"), &frame, 10.0, 10.0).is_none());
    }
}
