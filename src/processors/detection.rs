//! Detection postprocessing.
//!
//! The detector emits a fixed-size batch of candidate boxes in
//! normalized letterbox coordinates, many of them duplicates of the
//! same field. This module keeps the single best candidate per class
//! and maps boxes back into source-image pixels.

use crate::processors::geometry::BBox;

/// One raw detector candidate, box still in normalized model-input
/// coordinates `[x_min, y_min, x_max, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub class_id: u32,
    pub score: f32,
    pub bbox: [f32; 4],
}

/// Keeps the highest-scoring candidate of each class.
///
/// Candidates with non-positive scores (padding rows) are dropped.
/// Within a class, equal scores resolve to the earlier candidate, so
/// the selection is deterministic for a given detector output.
pub fn select_best_per_class(candidates: &[RawDetection]) -> Vec<RawDetection> {
    let mut ordered: Vec<&RawDetection> = candidates.iter().collect();
    // Stable sort: class ascending, then score descending.
    ordered.sort_by(|a, b| {
        a.class_id
            .cmp(&b.class_id)
            .then(b.score.total_cmp(&a.score))
    });

    let mut selected: Vec<RawDetection> = Vec::new();
    for candidate in ordered {
        if candidate.score <= 0.0 {
            continue;
        }
        if selected.last().is_some_and(|s| s.class_id == candidate.class_id) {
            continue;
        }
        selected.push(*candidate);
    }
    selected
}

/// Maps a normalized letterbox box back into source-image pixels.
///
/// `scale` and `(pad_x, pad_y)` are the resize factor and total padding
/// reported by the detector preprocessor; `input_size` is the square
/// model input side. The result is clamped to the image bounds.
pub fn rescale_box(
    bbox: [f32; 4],
    input_size: u32,
    scale: f32,
    pad: (f32, f32),
    img_width: u32,
    img_height: u32,
) -> BBox {
    let side = input_size as f32;
    let (pad_x, pad_y) = pad;
    let unpad = |coord: f32, pad: f32| (coord * side - pad / 2.0) / scale;

    BBox::new(
        unpad(bbox[0], pad_x),
        unpad(bbox[1], pad_y),
        unpad(bbox[2], pad_x),
        unpad(bbox[3], pad_y),
    )
    .clamp(img_width as f32, img_height as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_id: u32, score: f32, bbox: [f32; 4]) -> RawDetection {
        RawDetection {
            class_id,
            score,
            bbox,
        }
    }

    #[test]
    fn test_best_candidate_per_class() {
        let selected = select_best_per_class(&[
            det(4, 0.7, [0.1, 0.1, 0.2, 0.2]),
            det(3, 0.9, [0.0, 0.0, 1.0, 1.0]),
            det(4, 0.95, [0.12, 0.1, 0.21, 0.2]),
            det(3, 0.4, [0.0, 0.0, 0.9, 0.9]),
        ]);
        assert_eq!(selected.len(), 2);
        assert_eq!((selected[0].class_id, selected[0].score), (3, 0.9));
        assert_eq!((selected[1].class_id, selected[1].score), (4, 0.95));
    }

    #[test]
    fn test_padding_rows_dropped() {
        let selected = select_best_per_class(&[
            det(0, 0.0, [0.0; 4]),
            det(1, -1.0, [0.0; 4]),
            det(2, 0.5, [0.1, 0.1, 0.3, 0.3]),
        ]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].class_id, 2);
    }

    #[test]
    fn test_score_tie_keeps_first() {
        let first = det(5, 0.8, [0.1, 0.1, 0.2, 0.2]);
        let second = det(5, 0.8, [0.5, 0.5, 0.6, 0.6]);
        let selected = select_best_per_class(&[first, second]);
        assert_eq!(selected, vec![first]);
    }

    #[test]
    fn test_rescale_square_image_identity() {
        // Image already at model size: scale 1, no padding.
        let bbox = rescale_box([0.25, 0.5, 0.75, 1.0], 640, 1.0, (0.0, 0.0), 640, 640);
        assert_eq!(bbox, BBox::new(160.0, 320.0, 480.0, 640.0));
    }

    #[test]
    fn test_rescale_undoes_letterbox() {
        // 1000x500 image into a 640 square: scale 0.64, 180px of vertical
        // padding split evenly. A box covering the full document maps back
        // to the full image.
        let scale = 0.64;
        let pad = (0.0, 640.0 - 500.0 * scale);
        let bbox = rescale_box(
            [0.0, 160.0 / 640.0, 1.0, 480.0 / 640.0],
            640,
            scale,
            pad,
            1000,
            500,
        );
        assert!((bbox.x_min - 0.0).abs() < 1e-3);
        assert!((bbox.y_min - 0.0).abs() < 1e-3);
        assert!((bbox.x_max - 1000.0).abs() < 1e-3);
        assert!((bbox.y_max - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_rescale_clamps_to_image() {
        let bbox = rescale_box([-0.1, 0.0, 1.2, 1.1], 640, 1.0, (0.0, 0.0), 640, 640);
        assert_eq!(bbox, BBox::new(0.0, 0.0, 640.0, 640.0));
    }
}
