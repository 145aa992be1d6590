//! Field classes detected on a driver's licence.
//!
//! The detection model emits integer class ids; this module pins the
//! name↔id bijection for the current model version. The mapping is
//! closed and exhaustive: an id outside the table is a model/config
//! mismatch, not a recoverable condition.

use serde::{Deserialize, Serialize};

/// A semantic field class recognized by the detection model.
///
/// Discriminants are the detection model's class ids and must not be
/// reordered within a model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum LicenseFieldClass {
    BackSide = 0,
    Mrc = 1,
    BackSerial = 2,
    FrontSide = 3,
    Photo = 4,
    #[serde(rename = "datein")]
    DateIn = 5,
    #[serde(rename = "dateout")]
    DateOut = 6,
    Birthday = 7,
    #[serde(rename = "issuecode")]
    IssueCode = 8,
    Surname = 9,
    Name = 10,
    MiddleName = 11,
    FrontSerial = 12,
}

/// Validation category of a field's recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Strict `DD.MM.YYYY` calendar date.
    Date,
    /// Licence serial, `DD DD DDDDDD`.
    Serial,
    /// Free-form text (names); no structural constraint.
    Name,
    /// Fields without a recognized-text format (photo, side markers, MRZ).
    Free,
}

impl LicenseFieldClass {
    /// All classes in id order.
    pub const ALL: [LicenseFieldClass; 13] = [
        Self::BackSide,
        Self::Mrc,
        Self::BackSerial,
        Self::FrontSide,
        Self::Photo,
        Self::DateIn,
        Self::DateOut,
        Self::Birthday,
        Self::IssueCode,
        Self::Surname,
        Self::Name,
        Self::MiddleName,
        Self::FrontSerial,
    ];

    /// The detection model's integer id for this class.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Looks up a class by detection model id.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// The stable field name used in configuration and responses.
    pub fn name(self) -> &'static str {
        match self {
            Self::BackSide => "back_side",
            Self::Mrc => "mrc",
            Self::BackSerial => "back_serial",
            Self::FrontSide => "front_side",
            Self::Photo => "photo",
            Self::DateIn => "datein",
            Self::DateOut => "dateout",
            Self::Birthday => "birthday",
            Self::IssueCode => "issuecode",
            Self::Surname => "surname",
            Self::Name => "name",
            Self::MiddleName => "middle_name",
            Self::FrontSerial => "front_serial",
        }
    }

    /// Looks up a class by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// How this field's recognized text is validated.
    pub fn kind(self) -> FieldKind {
        match self {
            Self::DateIn | Self::DateOut | Self::Birthday => FieldKind::Date,
            Self::FrontSerial => FieldKind::Serial,
            Self::Surname | Self::Name | Self::MiddleName => FieldKind::Name,
            _ => FieldKind::Free,
        }
    }
}
