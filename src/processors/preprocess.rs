//! Image-to-tensor preprocessing for both model families.
//!
//! Both models take letterboxed inputs padded with the grey value
//! 114/255. The detector keeps the resize factor and padding so
//! detections can be mapped back into source pixels.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use ndarray::Array4;

/// Grey padding value in normalized intensity.
const PAD_VALUE: f32 = 114.0 / 255.0;

/// Prepares a document image for the detector.
///
/// Aspect-preserving resize into an `input_size` square, centered grey
/// padding, `[1, S, S, 3]` NHWC in `[0, 1]`. Also returns the resize
/// factor and the total `(dx, dy)` padding needed to undo the
/// letterbox on the model's outputs.
pub fn detector_tensor(
    image: &RgbImage,
    input_size: u32,
) -> (Array4<f32>, f32, (f32, f32)) {
    let (img_width, img_height) = image.dimensions();
    let side = input_size as f32;

    let (scale, resized_width, resized_height) = if img_height > img_width {
        let scale = side / img_height as f32;
        (scale, (img_width as f32 * scale) as u32, input_size)
    } else {
        let scale = side / img_width as f32;
        (scale, input_size, (img_height as f32 * scale) as u32)
    };
    let pad_x = side - (img_width as f32 * scale).round();
    let pad_y = side - (img_height as f32 * scale).round();

    let resized = imageops::resize(image, resized_width, resized_height, FilterType::Triangle);
    let left = (input_size - resized_width) / 2;
    let top = (input_size - resized_height) / 2;

    let mut tensor = Array4::from_elem(
        (1, input_size as usize, input_size as usize, 3),
        PAD_VALUE,
    );
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (tx, ty) = ((left + x) as usize, (top + y) as usize);
        for channel in 0..3 {
            tensor[[0, ty, tx, channel]] = pixel.0[channel] as f32 / 255.0;
        }
    }
    (tensor, scale, (pad_x, pad_y))
}

/// Prepares one field crop for a recognition model.
///
/// Grayscale, aspect-fit into `height × width`, centered grey padding,
/// then the width-major `[1, W, H, 1]` layout the recognition models
/// were exported with.
pub fn recognition_tensor(crop: &RgbImage, height: u32, width: u32) -> Array4<f32> {
    let gray: GrayImage = imageops::grayscale(crop);
    let (img_width, img_height) = gray.dimensions();

    let scale_w = width as f32 / img_width as f32;
    let scale_h = height as f32 / img_height as f32;
    let (resized_width, resized_height) = if scale_w < scale_h {
        (width, (img_height as f32 * scale_w) as u32)
    } else {
        ((img_width as f32 * scale_h) as u32, height)
    };

    let resized = imageops::resize(&gray, resized_width, resized_height, FilterType::Triangle);
    let left = (width - resized_width) / 2;
    let top = (height - resized_height) / 2;

    let mut tensor = Array4::from_elem((1, width as usize, height as usize, 1), PAD_VALUE);
    for (x, y, pixel) in resized.enumerate_pixels() {
        tensor[[0, (left + x) as usize, (top + y) as usize, 0]] = pixel.0[0] as f32 / 255.0;
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_detector_tensor_shape_and_scale() {
        let image = RgbImage::from_pixel(200, 100, Rgb([255, 0, 0]));
        let (tensor, scale, (pad_x, pad_y)) = detector_tensor(&image, 640);
        assert_eq!(tensor.shape(), &[1, 640, 640, 3]);
        assert!((scale - 3.2).abs() < 1e-6);
        assert_eq!((pad_x, pad_y), (0.0, 320.0));
    }

    #[test]
    fn test_detector_tensor_pads_centered() {
        let image = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        let (tensor, _, _) = detector_tensor(&image, 100);
        // Resized content occupies rows 25..75; outside is grey padding.
        assert!((tensor[[0, 10, 50, 0]] - PAD_VALUE).abs() < 1e-6);
        assert!((tensor[[0, 90, 50, 0]] - PAD_VALUE).abs() < 1e-6);
        assert!((tensor[[0, 50, 50, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_detector_tensor_square_input_no_padding() {
        let image = RgbImage::from_pixel(64, 64, Rgb([0, 255, 0]));
        let (tensor, scale, pad) = detector_tensor(&image, 64);
        assert_eq!(scale, 1.0);
        assert_eq!(pad, (0.0, 0.0));
        assert!((tensor[[0, 0, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recognition_tensor_layout() {
        // Width-major layout: axis 1 is x, axis 2 is y.
        let mut crop = RgbImage::from_pixel(128, 32, Rgb([0, 0, 0]));
        crop.put_pixel(5, 0, Rgb([255, 255, 255]));
        let tensor = recognition_tensor(&crop, 32, 128);
        assert_eq!(tensor.shape(), &[1, 128, 32, 1]);
        assert!((tensor[[0, 5, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 0, 5, 0]] < 0.01);
    }

    #[test]
    fn test_recognition_tensor_pads_narrow_crop() {
        let crop = RgbImage::from_pixel(16, 32, Rgb([255, 255, 255]));
        let tensor = recognition_tensor(&crop, 32, 128);
        // 16x32 fits by height; content sits centered at x in [56, 72).
        assert!((tensor[[0, 0, 16, 0]] - PAD_VALUE).abs() < 1e-6);
        assert!((tensor[[0, 64, 16, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 127, 16, 0]] - PAD_VALUE).abs() < 1e-6);
    }
}
