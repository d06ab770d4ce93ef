use crate::decoder::{DecodeError, SliceDecoder};

use std::{fmt, path::Path};
use thiserror::Error;

/// Physical distance between samples along each volume axis, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpacingFactors {
    /// Row spacing, first value of Pixel Spacing.
    pub x: f32,
    /// Column spacing, second value of Pixel Spacing.
    pub y: f32,
    /// Slice thickness.
    pub z: f32,
}

impl SpacingFactors {
    pub fn as_tuple(&self) -> (f32, f32, f32) {
        (self.x, self.y, self.z)
    }
}

impl fmt::Display for SpacingFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {} mm", self.x, self.y, self.z)
    }
}

/// Spacing attached to a loaded volume. Failure to read it is kept explicit
/// instead of being folded into zeros.
#[derive(Clone, Debug, PartialEq)]
pub enum Spacing {
    Known(SpacingFactors),
    Unknown { reason: String },
}

impl Spacing {
    pub fn known(&self) -> Option<SpacingFactors> {
        match self {
            Spacing::Known(factors) => Some(*factors),
            Spacing::Unknown { .. } => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Spacing::Known(_))
    }
}

impl From<Result<SpacingFactors, SpacingError>> for Spacing {
    fn from(result: Result<SpacingFactors, SpacingError>) -> Self {
        match result {
            Ok(factors) => Spacing::Known(factors),
            Err(e) => Spacing::Unknown {
                reason: e.to_string(),
            },
        }
    }
}

/// Slice metadata could not yield usable spacing. Never fatal to a load.
#[derive(Debug, Error)]
pub enum SpacingError {
    #[error("slice header unreadable: {0}")]
    Unreadable(#[from] DecodeError),

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("{field} value {value:?} is not a number")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} is not strictly positive")]
    NonPositive { field: &'static str, value: f32 },
}

const PIXEL_SPACING: &str = "pixel spacing";
const SLICE_THICKNESS: &str = "slice thickness";

/// Read the three spacing factors from the header of `slice`.
///
/// # Errors
///
/// Any [`SpacingError`]; callers are expected to carry on with
/// [`Spacing::Unknown`].
pub fn extract_spacing(
    decoder: &dyn SliceDecoder,
    slice: &Path,
) -> Result<SpacingFactors, SpacingError> {
    let header = decoder.read_header(slice)?;

    let pixel_spacing = header
        .pixel_spacing
        .ok_or(SpacingError::MissingField(PIXEL_SPACING))?;
    let mut values = pixel_spacing.split('\\');
    let x = parse_positive(PIXEL_SPACING, values.next())?;
    let y = parse_positive(PIXEL_SPACING, values.next())?;

    let thickness = header
        .slice_thickness
        .ok_or(SpacingError::MissingField(SLICE_THICKNESS))?;
    let z = parse_positive(SLICE_THICKNESS, thickness.split('\\').next())?;

    Ok(SpacingFactors { x, y, z })
}

fn parse_positive(field: &'static str, value: Option<&str>) -> Result<f32, SpacingError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(SpacingError::MissingField(field))?;
    let parsed: f32 = value.parse().map_err(|_| SpacingError::InvalidValue {
        field,
        value: value.to_string(),
    })?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(SpacingError::NonPositive {
            field,
            value: parsed,
        });
    }
    Ok(parsed)
}
