//! Document orientation inference and correction.
//!
//! The licence layout fixes the relative placement of certain field
//! pairs: on the front the photo sits left of the birthday line, on the
//! back the machine-readable code sits left of the serial block. The
//! observed placement of such an anchor pair tells us how far the
//! captured document is rotated from upright.

use image::imageops;
use image::RgbImage;
use tracing::debug;

use crate::domain::classes::LicenseFieldClass;
use crate::domain::result::DetectedField;
use crate::processors::geometry::BBox;

/// Rotation needed to bring the document upright, from the observed
/// placement of an anchor pair that is side-by-side when upright.
///
/// Degrees counter-clockwise; ambiguous placements (overlapping boxes)
/// fall through to 0°.
pub fn infer_angle(first: &BBox, second: &BBox) -> u32 {
    if first.x_min < second.x_min && first.x_max < second.x_min && first.y_min < second.y_min {
        0
    } else if first.y_min < second.y_min && first.y_max < second.y_min {
        90
    } else if first.x_max > second.x_max && first.x_min > second.x_max {
        180
    } else if first.y_max > second.y_max && first.y_min > second.y_max {
        270
    } else {
        0
    }
}

fn find(fields: &[DetectedField], class: LicenseFieldClass) -> Option<&DetectedField> {
    fields.iter().find(|f| f.field_class == class)
}

/// Infers the document rotation angle from whichever anchor pair is
/// present.
///
/// The front pair (photo, birthday) is evaluated first and the back
/// pair (machine-readable code, back serial) second, so on the rare
/// capture showing traces of both sides the back pair wins. Without a
/// complete pair the document is assumed upright.
pub fn infer_document_angle(fields: &[DetectedField]) -> u32 {
    let mut angle = 0;
    if let (Some(photo), Some(birthday)) = (
        find(fields, LicenseFieldClass::Photo),
        find(fields, LicenseFieldClass::Birthday),
    ) {
        angle = infer_angle(&photo.bbox, &birthday.bbox);
    }
    if let (Some(mrc), Some(serial)) = (
        find(fields, LicenseFieldClass::Mrc),
        find(fields, LicenseFieldClass::BackSerial),
    ) {
        angle = infer_angle(&mrc.bbox, &serial.bbox);
    }
    angle
}

/// Rotates the image and all detections counter-clockwise by `angle`
/// degrees, returning the corrected image. Boxes are updated in place
/// into the rotated image's coordinate system.
pub fn correct_orientation(
    image: RgbImage,
    fields: &mut [DetectedField],
    angle: u32,
) -> RgbImage {
    if angle % 360 == 0 {
        return image;
    }
    let (width, height) = image.dimensions();
    debug!(angle, width, height, "correcting document orientation");

    for field in fields.iter_mut() {
        field.bbox = field.bbox.rotate(angle, width, height);
    }

    // imageops names rotations clockwise; ours are counter-clockwise.
    match angle % 360 {
        90 => imageops::rotate270(&image),
        180 => imageops::rotate180(&image),
        270 => imageops::rotate90(&image),
        _ => image,
    }
}
