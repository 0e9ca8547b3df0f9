//! Template matching
//!
//! A thin wrapper around `imageproc`'s normalized cross-correlation template
//! matcher: run the correlation, take the global maximum, and accept it when
//! it clears the caller's confidence threshold.

use image::{imageops, GrayImage};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use super::template::Template;
use super::VisionError;

/// A successful template match in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    /// Top-left corner of the matched area
    pub x: u32,
    pub y: u32,
    /// Template dimensions
    pub width: u32,
    pub height: u32,
    /// Normalized cross-correlation score at the maximum
    pub score: f32,
}

impl TemplateMatch {
    /// Center point of the matched area, the spot the bot clicks
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }
}

/// Find the best occurrence of `template` in `frame`.
///
/// Returns `Ok(None)` when the best correlation score stays below
/// `confidence`. A template larger than the frame is an error rather than a
/// panic from the matcher.
pub fn find_in(
    frame: &GrayImage,
    template: &GrayImage,
    confidence: f32,
) -> Result<Option<TemplateMatch>, VisionError> {
    if template.width() > frame.width() || template.height() > frame.height() {
        return Err(VisionError::TemplateLargerThanFrame {
            template: (template.width(), template.height()),
            frame: (frame.width(), frame.height()),
        });
    }
    if template.width() == 0 || template.height() == 0 {
        return Err(VisionError::EmptyTemplate);
    }

    let scores = match_template(
        frame,
        template,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let extremes = find_extremes(&scores);

    if extremes.max_value < confidence {
        log::debug!(
            "best score {:.2} below threshold {:.2}",
            extremes.max_value,
            confidence
        );
        return Ok(None);
    }

    let (x, y) = extremes.max_value_location;
    Ok(Some(TemplateMatch {
        x,
        y,
        width: template.width(),
        height: template.height(),
        score: extremes.max_value,
    }))
}

/// Find a library template in `frame`, honoring its search region.
///
/// Matches inside the region when one is set and translates the result back
/// to frame coordinates.
pub fn find_template(
    frame: &GrayImage,
    template: &Template,
    confidence: f32,
) -> Result<Option<TemplateMatch>, VisionError> {
    match template.region {
        Some((rx, ry, rw, rh)) => {
            if rx + rw > frame.width() || ry + rh > frame.height() {
                return Err(VisionError::RegionOutOfBounds {
                    region: (rx, ry, rw, rh),
                    frame: (frame.width(), frame.height()),
                });
            }
            let cropped = imageops::crop_imm(frame, rx, ry, rw, rh).to_image();
            Ok(find_in(&cropped, &template.image, confidence)?.map(|m| TemplateMatch {
                x: m.x + rx,
                y: m.y + ry,
                ..m
            }))
        }
        None => find_in(frame, &template.image, confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    /// A high-contrast button-like pattern: left half white, right half black.
    ///
    /// Non-zero-mean correlation scores flat regions around 0.71 against this
    /// pattern, well below the exact-copy score of 1.0, so hits and misses
    /// separate cleanly.
    fn contrast_template(size: u32) -> GrayImage {
        ImageBuffer::from_fn(size, size, |px, _| {
            if px < size / 2 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    /// A flat gray frame with `template` stamped at (x, y)
    fn frame_with_pattern(w: u32, h: u32, x: u32, y: u32, template: &GrayImage) -> GrayImage {
        let mut frame: GrayImage = ImageBuffer::from_pixel(w, h, Luma([40]));
        for (tx, ty, pixel) in template.enumerate_pixels() {
            frame.put_pixel(x + tx, y + ty, *pixel);
        }
        frame
    }

    #[test]
    fn test_finds_embedded_template() {
        let template = contrast_template(8);
        let frame = frame_with_pattern(64, 48, 20, 12, &template);

        let found = find_in(&frame, &template, 0.8).unwrap().unwrap();
        assert_eq!((found.x, found.y), (20, 12));
        assert!(found.score > 0.95);
        assert_eq!(found.center(), (24, 16));
    }

    #[test]
    fn test_below_confidence_is_miss() {
        // Frame with no pattern at all
        let frame: GrayImage = ImageBuffer::from_pixel(64, 48, Luma([40]));
        let template = contrast_template(8);

        let found = find_in(&frame, &template, 0.8).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_oversized_template_is_error() {
        let frame: GrayImage = ImageBuffer::from_pixel(16, 16, Luma([40]));
        let template: GrayImage = ImageBuffer::from_pixel(32, 32, Luma([40]));

        assert!(find_in(&frame, &template, 0.5).is_err());
    }

    #[test]
    fn test_region_restricted_match() {
        let pattern = contrast_template(8);
        let frame = frame_with_pattern(100, 100, 60, 70, &pattern);

        let template = Template {
            image: pattern,
            region: Some((50, 60, 40, 40)),
        };

        let found = find_template(&frame, &template, 0.8).unwrap().unwrap();
        // Coordinates are reported in frame space, not region space
        assert_eq!((found.x, found.y), (60, 70));
    }

    #[test]
    fn test_region_out_of_bounds() {
        let frame: GrayImage = ImageBuffer::from_pixel(32, 32, Luma([40]));
        let template = Template {
            image: contrast_template(4),
            region: Some((20, 20, 32, 32)),
        };

        assert!(find_template(&frame, &template, 0.5).is_err());
    }
}
