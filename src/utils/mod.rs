//! Shared helpers: tracing setup and image cropping.

use image::RgbImage;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::errors::OcrError;
use crate::processors::geometry::BBox;

/// Initializes the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info` for this crate. Safe to call
/// once per process; later calls are ignored.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Cuts a field crop out of the document image.
///
/// The box is clamped to the image; a box without interior pixels is a
/// processing error since nothing can be recognized from it.
pub fn crop_field(image: &RgbImage, bbox: &BBox) -> Result<RgbImage, OcrError> {
    let (width, height) = image.dimensions();
    let (x, y, w, h) = bbox.crop_region(width, height).ok_or_else(|| {
        OcrError::processing(format!("degenerate field crop {bbox:?} in {width}x{height}"))
    })?;
    Ok(image::imageops::crop_imm(image, x, y, w, h).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_crop_field() {
        let mut image = RgbImage::from_pixel(40, 20, Rgb([0, 0, 0]));
        image.put_pixel(12, 7, Rgb([255, 0, 0]));
        let crop = crop_field(&image, &BBox::new(10.0, 5.0, 20.0, 15.0)).unwrap();
        assert_eq!(crop.dimensions(), (10, 10));
        assert_eq!(*crop.get_pixel(2, 2), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_degenerate_crop_is_error() {
        let image = RgbImage::from_pixel(40, 20, Rgb([0, 0, 0]));
        assert!(crop_field(&image, &BBox::new(50.0, 0.0, 60.0, 10.0)).is_err());
    }
}
