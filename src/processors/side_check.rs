//! Side determination and capture validation.

use crate::domain::classes::LicenseFieldClass;
use crate::domain::result::DetectedField;
use crate::domain::side::LicenseSide;

fn side_present(
    fields: &[DetectedField],
    required: &[LicenseFieldClass],
    threshold: f32,
) -> bool {
    required.iter().all(|class| {
        fields
            .iter()
            .any(|f| f.field_class == *class && f.score >= threshold)
    })
}

/// Decides whether the capture shows a usable licence side.
///
/// A side counts as present when every one of its required fields was
/// detected with a confident score. Front wins if both somehow match.
pub fn check_detection(
    fields: &[DetectedField],
    front_required: &[LicenseFieldClass],
    back_required: &[LicenseFieldClass],
    threshold: f32,
) -> (bool, LicenseSide) {
    let front = side_present(fields, front_required, threshold);
    let back = side_present(fields, back_required, threshold);

    let side = if front {
        LicenseSide::Front
    } else if back {
        LicenseSide::Back
    } else {
        LicenseSide::None
    };
    (front || back, side)
}
