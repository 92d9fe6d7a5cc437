//! Image redactor.
//!
//! Text spans and pixel boxes share no coordinate system, so alignment is by
//! value: a token is masked when its raw text occurs inside any PII value
//! (case-sensitive containment). Short tokens that happen to occur inside an
//! unrelated value are masked too.
//!
//! License: MIT OR APACHE 2.0

use std::path::Path;

use image::{DynamicImage, ImageReader, Rgb, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use log::{debug, info};

use crate::config::ImageRedactionConfig;
use crate::errors::WardscrubError;
use crate::ocr::WordBox;
use crate::pii_match::get_loggable_content;

/// A redacted copy of the source image and the number of boxes painted over.
#[derive(Debug, Clone)]
pub struct ImageRedaction {
    pub image: DynamicImage,
    pub masked_boxes: usize,
}

/// Decodes an in-memory image, guessing the format from its contents.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, WardscrubError> {
    image::load_from_memory(bytes).map_err(|e| WardscrubError::ImageLoadError(e.to_string()))
}

/// Reads and decodes an image file.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, WardscrubError> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)
        .map_err(|e| WardscrubError::ImageLoadError(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| WardscrubError::ImageLoadError(format!("{}: {}", path.display(), e)))?;
    reader
        .decode()
        .map_err(|e| WardscrubError::ImageLoadError(format!("{}: {}", path.display(), e)))
}

/// Encodes `image` to `path`; the format follows the file extension.
pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<(), WardscrubError> {
    image.save(path.as_ref())?;
    debug!("Saved redacted image to {}", path.as_ref().display());
    Ok(())
}

/// Selects the tokens whose box must be masked.
///
/// Tokens that are empty after trimming never match. Empty PII values are
/// ignored, otherwise every token would be contained in them trivially.
pub fn tokens_to_mask<'a>(boxes: &'a [WordBox], pii_values: &[String]) -> Vec<&'a WordBox> {
    boxes
        .iter()
        .filter(|b| !b.text.trim().is_empty())
        .filter(|b| pii_values.iter().any(|v| !v.is_empty() && v.contains(b.text.as_str())))
        .collect()
}

/// Pads `word` and clips it to a `width` x `height` canvas.
fn mask_rect(word: &WordBox, padding: u32, width: u32, height: u32) -> Option<Rect> {
    if word.width == 0 || word.height == 0 {
        return None;
    }
    let pad = i64::from(padding);
    let x0 = (i64::from(word.left) - pad).max(0);
    let y0 = (i64::from(word.top) - pad).max(0);
    let x1 = (i64::from(word.left) + i64::from(word.width) + pad).min(i64::from(width));
    let y1 = (i64::from(word.top) + i64::from(word.height) + pad).min(i64::from(height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    // Clipped coordinates lie inside the canvas, so they fit i32/u32.
    Some(Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32))
}

/// Paints an opaque mask over every token returned by [`tokens_to_mask`].
///
/// The input is never modified. Without token geometry the result is an
/// unmodified copy. Boxes partly outside the image are clipped; zero-sized
/// boxes and boxes entirely outside the image are skipped.
pub fn redact_image(
    image: &DynamicImage,
    word_boxes: Option<&[WordBox]>,
    pii_values: &[String],
    settings: &ImageRedactionConfig,
) -> ImageRedaction {
    let Some(boxes) = word_boxes else {
        debug!("No token geometry supplied; returning the image unchanged.");
        return ImageRedaction {
            image: image.clone(),
            masked_boxes: 0,
        };
    };

    let targets = tokens_to_mask(boxes, pii_values);
    let rects: Vec<Rect> = targets
        .iter()
        .inspect(|w| debug!("Masking token '{}' at ({}, {})", get_loggable_content(&w.text), w.left, w.top))
        .filter_map(|w| mask_rect(w, settings.padding, image.width(), image.height()))
        .collect();

    let [r, g, b] = settings.mask_color;
    let redacted = if image.color().has_alpha() {
        let mut canvas = image.to_rgba8();
        for rect in &rects {
            draw_filled_rect_mut(&mut canvas, *rect, Rgba([r, g, b, 255]));
        }
        DynamicImage::ImageRgba8(canvas)
    } else {
        let mut canvas = image.to_rgb8();
        for rect in &rects {
            draw_filled_rect_mut(&mut canvas, *rect, Rgb([r, g, b]));
        }
        DynamicImage::ImageRgb8(canvas)
    };

    info!("Masked {} of {} OCR tokens.", rects.len(), boxes.len());
    ImageRedaction {
        image: redacted,
        masked_boxes: rects.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_token_substring_of_value_is_masked() {
        let boxes = vec![
            WordBox::new("John", 10, 10, 20, 8),
            WordBox::new("Ward", 40, 10, 20, 8),
            WordBox::new("   ", 70, 10, 20, 8),
        ];
        let selected = tokens_to_mask(&boxes, &values(&["John Doe"]));
        assert_eq!(selected, vec![&boxes[0]]);
    }

    #[test]
    fn test_containment_is_case_sensitive() {
        let boxes = vec![WordBox::new("john", 0, 0, 5, 5)];
        assert!(tokens_to_mask(&boxes, &values(&["John Doe"])).is_empty());
    }

    #[test]
    fn test_empty_values_never_match() {
        let boxes = vec![WordBox::new("x", 0, 0, 5, 5)];
        assert!(tokens_to_mask(&boxes, &values(&[""])).is_empty());
    }

    #[test]
    fn test_masks_pixels_inside_box_only() {
        let img = white(100, 40);
        let boxes = vec![WordBox::new("John", 10, 10, 20, 8)];
        let out = redact_image(&img, Some(&boxes), &values(&["John Doe"]), &ImageRedactionConfig::default());
        assert_eq!(out.masked_boxes, 1);
        let rgb = out.image.to_rgb8();
        assert_eq!(rgb.get_pixel(10, 10), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(29, 17), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(30, 10), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(9, 10), &Rgb([255, 255, 255]));
        assert_eq!(img.to_rgb8().get_pixel(10, 10), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_without_geometry_returns_copy() {
        let img = white(8, 8);
        let out = redact_image(&img, None, &values(&["John"]), &ImageRedactionConfig::default());
        assert_eq!(out.masked_boxes, 0);
        assert_eq!(out.image.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_padding_and_color() {
        let img = white(20, 20);
        let settings = ImageRedactionConfig {
            mask_color: [255, 0, 0],
            padding: 2,
            mask_medications: false,
        };
        let boxes = vec![WordBox::new("45", 5, 5, 4, 4)];
        let out = redact_image(&img, Some(&boxes), &values(&["45"]), &settings).image.to_rgb8();
        assert_eq!(out.get_pixel(3, 3), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(11, 11), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_box_past_the_edge_is_clipped() {
        let img = white(10, 10);
        let boxes = vec![WordBox::new("X", -5, 6, 30, 30), WordBox::new("X", 1, 1, 0, 5)];
        let out = redact_image(&img, Some(&boxes), &values(&["X"]), &ImageRedactionConfig::default());
        assert_eq!(out.masked_boxes, 1);
        assert_eq!(out.image.to_rgb8().get_pixel(9, 9), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_huge_padding_covers_the_whole_image() {
        let img = white(6, 6);
        let settings = ImageRedactionConfig {
            mask_color: [0, 0, 0],
            padding: u32::MAX,
            mask_medications: false,
        };
        let boxes = vec![WordBox::new("45", 2, 2, 2, 2)];
        let out = redact_image(&img, Some(&boxes), &values(&["45"]), &settings);
        assert_eq!(out.masked_boxes, 1);
        let rgb = out.image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_outside_the_image_is_skipped() {
        let img = white(10, 10);
        let boxes = vec![WordBox::new("X", 50, 50, 5, 5), WordBox::new("X", i32::MIN, 0, 5, 5)];
        let out = redact_image(&img, Some(&boxes), &values(&["X"]), &ImageRedactionConfig::default());
        assert_eq!(out.masked_boxes, 0);
        assert_eq!(out.image.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_alpha_is_kept() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0])));
        let boxes = vec![WordBox::new("A", 0, 0, 2, 2)];
        let out = redact_image(&img, Some(&boxes), &values(&["A"]), &ImageRedactionConfig::default());
        assert!(out.image.color().has_alpha());
        assert_eq!(out.image.to_rgba8().get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(matches!(err, WardscrubError::ImageLoadError(_)));
    }
}
