//! Frame pixel-buffer representation
//!
//! A frame is one RGBA still sampled from a live camera or synthesized
//! for demo mode. Frames are consumed read-only by estimation and
//! compositing and are never retained across ticks.

/// A single RGBA frame with metadata.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw RGBA pixel data (4 bytes per pixel, row-major)
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Monotonic frame number within the producing stream
    pub frame_number: u64,
    /// Whether the buffer holds a complete, presentable image
    pub ready: bool,
}

impl Frame {
    /// Create a ready frame from raw RGBA data.
    pub fn new(data: Vec<u8>, width: u32, height: u32, frame_number: u64) -> Self {
        Self {
            data,
            width,
            height,
            frame_number,
            ready: true,
        }
    }

    /// Expected buffer size for the given dimensions (width * height * 4).
    pub fn expected_size(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 4
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        (self.width as usize) * 4
    }

    /// Check that the frame is ready, has nonzero dimensions, and that
    /// the buffer matches them. Invalid frames are skipped at the render
    /// loop boundary without touching session state.
    pub fn is_valid(&self) -> bool {
        self.ready
            && self.width > 0
            && self.height > 0
            && self.data.len() == Self::expected_size(self.width, self.height)
    }
}
