// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Error codes reported through the tessellator's error sink.

use thiserror::Error;

/// Everything the tessellator can report to [`TessCallback::error`](crate::TessCallback::error).
///
/// Protocol errors (`Missing*`) and `CoordTooLarge` are recoverable: the
/// tessellator repairs the situation and keeps going. `NeedCombineCallback`
/// and `OutOfMemory` abandon the current polygon, which then produces no
/// geometry; the tessellator itself stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TessError {
    #[error("missing gluTessBeginPolygon")]
    MissingBeginPolygon,
    #[error("missing gluTessBeginContour")]
    MissingBeginContour,
    #[error("missing gluTessEndPolygon")]
    MissingEndPolygon,
    #[error("missing gluTessEndContour")]
    MissingEndContour,
    #[error("tessellation coordinate too large")]
    CoordTooLarge,
    #[error("need combine callback")]
    NeedCombineCallback,
    #[error("invalid enumerant")]
    InvalidEnum,
    #[error("invalid value")]
    InvalidValue,
    #[error("out of memory")]
    OutOfMemory,
}

impl TessError {
    /// The numeric GLU error code.
    pub fn code(self) -> u32 {
        match self {
            TessError::MissingBeginPolygon => 100151,
            TessError::MissingBeginContour => 100152,
            TessError::MissingEndPolygon => 100153,
            TessError::MissingEndContour => 100154,
            TessError::CoordTooLarge => 100155,
            TessError::NeedCombineCallback => 100156,
            TessError::InvalidEnum => 100900,
            TessError::InvalidValue => 100901,
            TessError::OutOfMemory => 100902,
        }
    }

    pub fn from_code(code: u32) -> Option<TessError> {
        let err = match code {
            100151 => TessError::MissingBeginPolygon,
            100152 => TessError::MissingBeginContour,
            100153 => TessError::MissingEndPolygon,
            100154 => TessError::MissingEndContour,
            100155 => TessError::CoordTooLarge,
            100156 => TessError::NeedCombineCallback,
            100900 => TessError::InvalidEnum,
            100901 => TessError::InvalidValue,
            100902 => TessError::OutOfMemory,
            _ => return None,
        };
        Some(err)
    }

    /// True if the error abandons the polygon being tessellated.
    pub fn is_fatal(self) -> bool {
        matches!(self, TessError::NeedCombineCallback | TessError::OutOfMemory)
    }
}
