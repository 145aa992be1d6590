//! Which side of the licence was captured.

use serde::{Deserialize, Serialize};

/// Side of the driver's licence determined by the detection validator.
///
/// Wire names match the public API schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LicenseSide {
    /// No side could be established (document rejected).
    #[default]
    #[serde(rename = "NoneSide")]
    None,
    /// The front side, carrying the photo and personal fields.
    #[serde(rename = "FrontSide")]
    Front,
    /// The back side, carrying the MRZ and back serial block.
    #[serde(rename = "BackSide")]
    Back,
}
