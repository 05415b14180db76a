//! Synthetic demo-mode frames
//!
//! When camera acquisition fails the session substitutes a fixed-size
//! synthetic frame with a static silhouette so the same estimation and
//! compositing path keeps running against a believable subject.

use crate::frame::Frame;

/// Demo-mode frame width.
pub const FALLBACK_WIDTH: u32 = 640;
/// Demo-mode frame height.
pub const FALLBACK_HEIGHT: u32 = 480;

const BACKGROUND: [u8; 4] = [40, 44, 52, 255];
const SILHOUETTE: [u8; 4] = [96, 102, 114, 255];

/// Render the synthetic 640x480 frame: a dark background with a head
/// and torso silhouette proportioned to match the canonical landmark
/// formula, so the garment lands where a person would be.
pub fn synthetic_frame(frame_number: u64) -> Frame {
    let w = FALLBACK_WIDTH;
    let h = FALLBACK_HEIGHT;
    let mut data = vec![0u8; Frame::expected_size(w, h)];

    let wf = w as f32;
    let hf = h as f32;
    // Head centered on the nose landmark; torso below the shoulder line.
    let head_cx = wf * 0.5;
    let head_cy = hf * 0.2;
    let head_r = hf * 0.09;
    let torso_cx = wf * 0.5;
    let torso_cy = hf * 0.62;
    let torso_rx = wf * 0.17;
    let torso_ry = hf * 0.36;

    for y in 0..h {
        for x in 0..w {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let head = {
                let dx = px - head_cx;
                let dy = py - head_cy;
                dx * dx + dy * dy <= head_r * head_r
            };
            let torso = {
                let dx = (px - torso_cx) / torso_rx;
                let dy = (py - torso_cy) / torso_ry;
                dx * dx + dy * dy <= 1.0
            };

            let color = if head || torso { SILHOUETTE } else { BACKGROUND };
            let idx = ((y * w + x) * 4) as usize;
            data[idx..idx + 4].copy_from_slice(&color);
        }
    }

    Frame::new(data, w, h, frame_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmarks;

    #[test]
    fn test_synthetic_frame_dimensions() {
        let frame = synthetic_frame(1);
        assert_eq!(frame.width, FALLBACK_WIDTH);
        assert_eq!(frame.height, FALLBACK_HEIGHT);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_silhouette_covers_canonical_landmarks() {
        let frame = synthetic_frame(1);
        let lm = Landmarks::proportional(FALLBACK_WIDTH, FALLBACK_HEIGHT);

        // The nose landmark sits inside the head disc.
        let idx = ((lm.nose.y as u32 * FALLBACK_WIDTH + lm.nose.x as u32) * 4) as usize;
        assert_eq!(&frame.data[idx..idx + 4], &SILHOUETTE);

        // A corner pixel is background.
        assert_eq!(&frame.data[..4], &BACKGROUND);
    }

    #[test]
    fn test_synthetic_frame_is_static() {
        // Frame number advances but the picture does not.
        let a = synthetic_frame(1);
        let b = synthetic_frame(2);
        assert_eq!(a.data, b.data);
        assert_ne!(a.frame_number, b.frame_number);
    }
}
