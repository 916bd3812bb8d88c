use std::time::Duration;

use crate::error::CurationError;

/// A single decoded video frame, RGBA layout.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// BT.601 luminance plane. Scene comparison always runs on this,
    /// never on the color data.
    pub fn luminance(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .map(|rgba| {
                ((rgba[0] as u32 * 299 + rgba[1] as u32 * 587 + rgba[2] as u32 * 114) / 1000) as u8
            })
            .collect()
    }

    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.as_secs_f64()
    }
}

/// Sequential frame reader over a decoded video.
///
/// Decoding itself is out of scope for this crate; callers wrap whatever
/// decoder they use behind this trait. Failure to open the underlying video
/// must be reported by the opener (as `CurationError::SourceUnavailable`),
/// not by `read_frame` — end-of-stream is `None`, never an error.
pub trait FrameSource {
    fn frame_count(&self) -> u64;
    fn fps(&self) -> f64;
    fn read_frame(&mut self) -> Option<Frame>;
}

/// Lazily opens a frame source. Invoked only when the detection stage
/// actually runs, so a resumed pipeline never touches the video file.
pub type SourceOpener = dyn FnMut() -> Result<Box<dyn FrameSource>, CurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 4];
        let frame = Frame::new(100, 100, data, 1000, 30);

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.timestamp.as_millis(), 1000);
        assert_eq!(frame.frame_number, 30);
    }

    #[test]
    fn test_luminance_plane() {
        let mut data = vec![0u8; 2 * 1 * 4];
        // one white pixel, one black
        data[0] = 255;
        data[1] = 255;
        data[2] = 255;
        let frame = Frame::new(2, 1, data, 0, 0);

        let luma = frame.luminance();
        assert_eq!(luma.len(), 2);
        assert_eq!(luma[0], 255);
        assert_eq!(luma[1], 0);
    }
}
