//! Garment overlay placement and compositing
//!
//! Computes a placement rectangle from the current landmarks and draws
//! the garment over the base frame on the CPU. The math is deterministic:
//! given the same landmarks, garment, and constants the output is
//! bit-for-bit identical.

mod catalog;

pub use catalog::{GarmentAsset, GarmentCatalog};

use crate::error::ComposeError;
use crate::frame::Frame;
use crate::pose::Landmarks;

/// Garment width as a multiple of the detected shoulder width.
pub const SCALE_FACTOR: f32 = 1.8;
/// Fraction of garment height the origin sits above the shoulder line,
/// placing the collar near the neck.
pub const VERTICAL_OFFSET: f32 = 0.25;

/// Placement rectangle for a garment, derived fresh each tick and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTransform {
    /// Scaled garment width in pixels
    pub width: f32,
    /// Scaled garment height in pixels
    pub height: f32,
    /// Left edge of the garment rectangle
    pub origin_x: f32,
    /// Top edge of the garment rectangle
    pub origin_y: f32,
}

impl OverlayTransform {
    /// Derive the placement rectangle from landmarks and the garment's
    /// intrinsic aspect ratio.
    pub fn from_landmarks(landmarks: &Landmarks, garment: &GarmentAsset) -> Self {
        let shoulder_width = landmarks.shoulder_width();
        let width = shoulder_width * SCALE_FACTOR;
        let height = width * garment.aspect_ratio();
        let anchor = landmarks.shoulder_anchor();
        Self {
            width,
            height,
            origin_x: anchor.x - width / 2.0,
            origin_y: anchor.y - height * VERTICAL_OFFSET,
        }
    }
}

/// The presentable composited image. Persists across ticks so a compose
/// no-op (unloaded garment) leaves the previous picture on screen.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// RGBA pixel data
    data: Vec<u8>,
    /// Surface width in pixels
    width: u32,
    /// Surface height in pixels
    height: u32,
}

impl Surface {
    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixels.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the surface holds a presentable image.
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == Frame::expected_size(self.width, self.height)
    }

    /// Copy the surface into an owned image for snapshot export.
    pub fn to_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }

    fn match_frame(&mut self, frame: &Frame) {
        if self.width != frame.width || self.height != frame.height {
            self.width = frame.width;
            self.height = frame.height;
            self.data = vec![0u8; Frame::expected_size(frame.width, frame.height)];
        }
    }
}

/// Draws the base frame and the placed garment into an owned surface.
pub struct OverlayCompositor {
    /// Target of every compose call
    surface: Surface,
    /// Whether to draw shoulder markers for debugging
    draw_markers: bool,
}

impl OverlayCompositor {
    /// Compositor with an empty surface; the first compose sizes it.
    pub fn new() -> Self {
        Self {
            surface: Surface::default(),
            draw_markers: false,
        }
    }

    /// Enable or disable shoulder debug markers.
    pub fn set_draw_markers(&mut self, enabled: bool) {
        self.draw_markers = enabled;
    }

    /// The composited surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Composite the frame and garment.
    ///
    /// If the garment pixels have not loaded yet this is a no-op that
    /// leaves the prior surface untouched. The frame must be valid; the
    /// render loop filters invalid frames before calling in, and a zero
    /// surface after sizing is a contract violation reported as
    /// [`ComposeError::SurfaceNotReady`].
    pub fn compose(
        &mut self,
        frame: &Frame,
        landmarks: &Landmarks,
        garment: &GarmentAsset,
    ) -> Result<(), ComposeError> {
        let Some(garment_pixels) = garment.pixels() else {
            log::debug!("garment '{}' not loaded yet, skipping compose", garment.name);
            return Ok(());
        };

        self.surface.match_frame(frame);
        if !self.surface.is_ready() {
            return Err(ComposeError::SurfaceNotReady {
                width: self.surface.width,
                height: self.surface.height,
            });
        }

        // Base frame first.
        self.surface.data.copy_from_slice(&frame.data);

        let transform = OverlayTransform::from_landmarks(landmarks, garment);
        self.draw_garment(garment_pixels, garment.width, garment.height, &transform);

        if self.draw_markers {
            self.draw_landmark_markers(landmarks);
        }

        Ok(())
    }

    /// Scale the garment into the placement rectangle with
    /// nearest-neighbor sampling. Fully transparent source pixels keep
    /// the base frame; everything else is an opaque copy. No blend
    /// modes, no occlusion, no perspective correction.
    fn draw_garment(&mut self, pixels: &[u8], gw: u32, gh: u32, transform: &OverlayTransform) {
        let out_w = transform.width.round() as i64;
        let out_h = transform.height.round() as i64;
        if out_w <= 0 || out_h <= 0 || gw == 0 || gh == 0 {
            return;
        }
        let x0 = transform.origin_x.round() as i64;
        let y0 = transform.origin_y.round() as i64;
        let sw = self.surface.width as i64;
        let sh = self.surface.height as i64;

        for dy in 0..out_h {
            let ty = y0 + dy;
            if ty < 0 || ty >= sh {
                continue;
            }
            let sy = (dy * gh as i64 / out_h) as usize;
            for dx in 0..out_w {
                let tx = x0 + dx;
                if tx < 0 || tx >= sw {
                    continue;
                }
                let sx = (dx * gw as i64 / out_w) as usize;
                let src = (sy * gw as usize + sx) * 4;
                if pixels[src + 3] == 0 {
                    continue;
                }
                let dst = ((ty * sw + tx) * 4) as usize;
                self.surface.data[dst..dst + 4].copy_from_slice(&pixels[src..src + 4]);
            }
        }
    }

    /// Draw half-intensity blue discs on both shoulders, radius 10.
    fn draw_landmark_markers(&mut self, landmarks: &Landmarks) {
        const RADIUS: i64 = 10;
        const COLOR: [u8; 3] = [0, 120, 255];

        let sw = self.surface.width as i64;
        let sh = self.surface.height as i64;
        for point in [landmarks.left_shoulder, landmarks.right_shoulder] {
            let cx = point.x.round() as i64;
            let cy = point.y.round() as i64;
            for dy in -RADIUS..=RADIUS {
                for dx in -RADIUS..=RADIUS {
                    if dx * dx + dy * dy > RADIUS * RADIUS {
                        continue;
                    }
                    let (x, y) = (cx + dx, cy + dy);
                    if x < 0 || x >= sw || y < 0 || y >= sh {
                        continue;
                    }
                    let idx = ((y * sw + x) * 4) as usize;
                    for c in 0..3 {
                        let base = self.surface.data[idx + c] as u16;
                        self.surface.data[idx + c] = ((base + COLOR[c] as u16) / 2) as u8;
                    }
                }
            }
        }
    }
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Point;

    fn frame(width: u32, height: u32, fill: u8) -> Frame {
        Frame::new(vec![fill; Frame::expected_size(width, height)], width, height, 1)
    }

    fn landmarks_with_shoulder_width(d: f32) -> Landmarks {
        Landmarks {
            left_shoulder: Point::new(320.0 - d / 2.0, 240.0),
            right_shoulder: Point::new(320.0 + d / 2.0, 240.0),
            nose: Point::new(320.0, 160.0),
        }
    }

    #[test]
    fn test_transform_height_is_exact() {
        // garmentHeight == (d * 1.8) * r, bit for bit.
        let lm = landmarks_with_shoulder_width(200.0);
        let garment = GarmentAsset::placeholder("g", 100, 150);
        let t = OverlayTransform::from_landmarks(&lm, &garment);
        assert_eq!(t.width, 200.0 * 1.8);
        assert_eq!(t.height, (200.0 * 1.8) * 1.5);
    }

    #[test]
    fn test_transform_centers_on_anchor() {
        let lm = landmarks_with_shoulder_width(200.0);
        let garment = GarmentAsset::placeholder("g", 100, 100);
        let t = OverlayTransform::from_landmarks(&lm, &garment);
        assert_eq!(t.origin_x, 320.0 - t.width / 2.0);
        assert_eq!(t.origin_y, 240.0 - t.height * VERTICAL_OFFSET);
    }

    #[test]
    fn test_compose_draws_base_and_garment() {
        let mut compositor = OverlayCompositor::new();
        let base = frame(640, 480, 9);
        let lm = Landmarks::proportional(640, 480);
        let garment = GarmentAsset::swatch("g", 40, 50, [200, 10, 10, 255]);

        compositor.compose(&base, &lm, &garment).unwrap();
        let surface = compositor.surface();
        assert_eq!(surface.width(), 640);
        assert_eq!(surface.height(), 480);

        // A corner pixel is base frame, untouched by the overlay.
        assert_eq!(&surface.data()[..4], &[9, 9, 9, 9]);
        // The shoulder anchor midpoint is covered by the garment.
        let anchor = lm.shoulder_anchor();
        let idx = ((anchor.y as usize) * 640 + anchor.x as usize) * 4;
        assert_eq!(&surface.data()[idx..idx + 3], &[200, 10, 10]);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let base = frame(320, 240, 30);
        let lm = Landmarks::proportional(320, 240);
        let garment = GarmentAsset::swatch("g", 33, 47, [1, 2, 3, 255]);

        let mut a = OverlayCompositor::new();
        let mut b = OverlayCompositor::new();
        a.compose(&base, &lm, &garment).unwrap();
        b.compose(&base, &lm, &garment).unwrap();
        assert_eq!(a.surface().data(), b.surface().data());
    }

    #[test]
    fn test_unloaded_garment_is_a_noop() {
        let mut compositor = OverlayCompositor::new();
        let lm = Landmarks::proportional(64, 64);
        let loaded = GarmentAsset::swatch("g", 8, 8, [5, 5, 5, 255]);
        compositor.compose(&frame(64, 64, 1), &lm, &loaded).unwrap();
        let before = compositor.surface().data().to_vec();

        let pending = GarmentAsset::placeholder("pending", 8, 8);
        compositor
            .compose(&frame(64, 64, 250), &lm, &pending)
            .unwrap();
        assert_eq!(compositor.surface().data(), &before[..]);
    }

    #[test]
    fn test_garment_clips_at_surface_edges() {
        let mut compositor = OverlayCompositor::new();
        // Shoulders near the left edge push the rectangle off-surface.
        let lm = Landmarks {
            left_shoulder: Point::new(2.0, 10.0),
            right_shoulder: Point::new(30.0, 10.0),
            nose: Point::new(16.0, 4.0),
        };
        let garment = GarmentAsset::swatch("g", 16, 16, [7, 7, 7, 255]);
        compositor.compose(&frame(32, 32, 0), &lm, &garment).unwrap();
        assert!(compositor.surface().is_ready());
    }

    #[test]
    fn test_markers_tint_shoulder_pixels() {
        let mut compositor = OverlayCompositor::new();
        compositor.set_draw_markers(true);
        let lm = Landmarks::proportional(64, 64);
        let garment = GarmentAsset::placeholder("pending", 8, 8);
        // Unloaded garment: no-op, markers not drawn either.
        compositor.compose(&frame(64, 64, 0), &lm, &garment).unwrap();
        assert!(!compositor.surface().is_ready());

        let garment = GarmentAsset::swatch("g", 8, 8, [0, 0, 0, 0]);
        compositor.compose(&frame(64, 64, 0), &lm, &garment).unwrap();
        let x = lm.left_shoulder.x.round() as usize;
        let y = lm.left_shoulder.y.round() as usize;
        let idx = (y * 64 + x) * 4;
        // (0 + 120) / 2 on the green channel.
        assert_eq!(compositor.surface().data()[idx + 1], 60);
    }
}
