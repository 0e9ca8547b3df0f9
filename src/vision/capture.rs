//! Screen capture handling
//!
//! Grabs frames from the primary monitor via `xcap` and provides the frame
//! helpers the analyzers need: region extraction, brightness and color
//! sampling, and coordinate scaling.

use image::{imageops, GrayImage, Rgba, RgbaImage};
use xcap::Monitor;

use super::VisionError;

/// A capture region in screen pixels: (left, top, width, height)
pub type CaptureRegion = (u32, u32, u32, u32);

/// Screen grabber for the primary monitor.
///
/// An optional region restricts every capture to a sub-rectangle of the
/// screen, standing in for the original tool's game-window tracking.
pub struct ScreenGrabber {
    /// Optional capture region, full screen when `None`
    region: Option<CaptureRegion>,
    /// Frames captured so far
    frame_count: u64,
}

impl ScreenGrabber {
    /// Create a grabber that captures the whole primary monitor
    pub fn new() -> Self {
        Self {
            region: None,
            frame_count: 0,
        }
    }

    /// Restrict captures to a region of the screen
    pub fn with_region(mut self, region: CaptureRegion) -> Self {
        self.region = Some(region);
        self
    }

    /// Capture one frame from the primary monitor
    pub fn capture(&mut self) -> Result<RgbaImage, VisionError> {
        let monitors =
            Monitor::all().map_err(|e| VisionError::CaptureFailed(e.to_string()))?;
        let primary = monitors
            .first()
            .ok_or_else(|| VisionError::CaptureFailed("no monitors found".into()))?;

        let frame = primary
            .capture_image()
            .map_err(|e| VisionError::CaptureFailed(e.to_string()))?;

        if frame.width() == 0 || frame.height() == 0 {
            return Err(VisionError::CaptureFailed(
                "captured empty frame; check screen recording permissions".into(),
            ));
        }

        self.frame_count += 1;

        match self.region {
            Some((x, y, w, h)) => {
                if x + w > frame.width() || y + h > frame.height() {
                    return Err(VisionError::CaptureFailed(format!(
                        "capture region ({}, {}, {}, {}) exceeds screen {}x{}",
                        x,
                        y,
                        w,
                        h,
                        frame.width(),
                        frame.height()
                    )));
                }
                Ok(imageops::crop_imm(&frame, x, y, w, h).to_image())
            }
            None => Ok(frame),
        }
    }

    /// Get the number of frames captured so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for ScreenGrabber {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract a region of a frame, `None` when out of bounds
pub fn extract_region(
    frame: &RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Option<RgbaImage> {
    if x + width > frame.width() || y + height > frame.height() {
        return None;
    }
    Some(imageops::crop_imm(frame, x, y, width, height).to_image())
}

/// Mean luma of a grayscale region, `None` when out of bounds or empty
pub fn mean_brightness(
    gray: &GrayImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Option<f32> {
    if width == 0 || height == 0 || x + width > gray.width() || y + height > gray.height() {
        return None;
    }

    let mut sum: u64 = 0;
    for py in y..y + height {
        for px in x..x + width {
            sum += u64::from(gray.get_pixel(px, py)[0]);
        }
    }

    Some(sum as f32 / (u64::from(width) * u64::from(height)) as f32)
}

/// Check if a region matches a color within tolerance, sampling three points
pub fn region_matches_color(
    frame: &RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    target_color: Rgba<u8>,
    tolerance: u8,
) -> bool {
    let Some(region) = extract_region(frame, x, y, width, height) else {
        return false;
    };

    let samples = [
        (width / 4, height / 4),
        (width / 2, height / 2),
        (3 * width / 4, 3 * height / 4),
    ];

    samples.iter().all(|&(sx, sy)| {
        let pixel = region.get_pixel(sx.min(width - 1), sy.min(height - 1));
        color_matches(pixel, &target_color, tolerance)
    })
}

/// Scale coordinates from a reference resolution to the given frame size
pub fn scale_coords(
    x: i32,
    y: i32,
    ref_size: (u32, u32),
    frame_size: (u32, u32),
) -> (i32, i32) {
    let scale_x = frame_size.0 as f32 / ref_size.0 as f32;
    let scale_y = frame_size.1 as f32 / ref_size.1 as f32;
    ((x as f32 * scale_x) as i32, (y as f32 * scale_y) as i32)
}

/// Check if two colors match within tolerance
fn color_matches(a: &Rgba<u8>, b: &Rgba<u8>, tolerance: u8) -> bool {
    let dr = (i16::from(a[0]) - i16::from(b[0])).unsigned_abs() as u8;
    let dg = (i16::from(a[1]) - i16::from(b[1])).unsigned_abs() as u8;
    let db = (i16::from(a[2]) - i16::from(b[2])).unsigned_abs() as u8;

    dr <= tolerance && dg <= tolerance && db <= tolerance
}
