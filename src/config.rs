// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Tessellator configuration: winding rule, boundary mode, normal, tolerance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TessError;

/// Maps a region's winding number to inside/outside.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindingRule {
    #[default]
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    #[inline]
    pub fn is_inside(self, n: i32) -> bool {
        match self {
            WindingRule::Odd => n & 1 != 0,
            WindingRule::NonZero => n != 0,
            WindingRule::Positive => n > 0,
            WindingRule::Negative => n < 0,
            WindingRule::AbsGeqTwo => n >= 2 || n <= -2,
        }
    }

    /// GLU enumerant (`GLU_TESS_WINDING_*`).
    pub fn code(self) -> u32 {
        match self {
            WindingRule::Odd => 100130,
            WindingRule::NonZero => 100131,
            WindingRule::Positive => 100132,
            WindingRule::Negative => 100133,
            WindingRule::AbsGeqTwo => 100134,
        }
    }

    pub fn from_code(code: u32) -> Option<WindingRule> {
        match code {
            100130 => Some(WindingRule::Odd),
            100131 => Some(WindingRule::NonZero),
            100132 => Some(WindingRule::Positive),
            100133 => Some(WindingRule::Negative),
            100134 => Some(WindingRule::AbsGeqTwo),
            _ => None,
        }
    }
}

/// Numeric properties, addressed the way `gluTessProperty` addresses them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TessProperty {
    WindingRule,
    BoundaryOnly,
    Tolerance,
}

impl TessProperty {
    pub fn code(self) -> u32 {
        match self {
            TessProperty::WindingRule => 100140,
            TessProperty::BoundaryOnly => 100141,
            TessProperty::Tolerance => 100142,
        }
    }
}

impl TryFrom<u32> for TessProperty {
    type Error = TessError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            100140 => Ok(TessProperty::WindingRule),
            100141 => Ok(TessProperty::BoundaryOnly),
            100142 => Ok(TessProperty::Tolerance),
            _ => Err(TessError::InvalidEnum),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TessConfig {
    pub winding_rule: WindingRule,
    /// Emit one line loop per interior region instead of triangles.
    pub boundary_only: bool,
    /// Polygon normal. All zeros means "compute one from the input".
    pub normal: [f64; 3],
    /// Accepted in [0, 1] and reported back; it does not change any result.
    pub tolerance: f64,
    /// Emit a single consistently-oriented contour directly as a triangle
    /// fan, skipping the sweep. Off by default because the fan keeps
    /// repeated vertices as zero-area triangles.
    pub convex_fast_path: bool,
}

impl Default for TessConfig {
    fn default() -> Self {
        TessConfig {
            winding_rule: WindingRule::Odd,
            boundary_only: false,
            normal: [0.0; 3],
            tolerance: 0.0,
            convex_fast_path: false,
        }
    }
}

impl TessConfig {
    pub fn with_winding_rule(mut self, rule: WindingRule) -> Self {
        self.winding_rule = rule;
        self
    }

    pub fn with_boundary_only(mut self, boundary_only: bool) -> Self {
        self.boundary_only = boundary_only;
        self
    }

    pub fn with_normal(mut self, normal: [f64; 3]) -> Self {
        self.normal = normal;
        self
    }

    /// Applies a numeric property value. Out-of-range or non-integral
    /// winding values leave the configuration untouched.
    pub fn set_property(&mut self, prop: TessProperty, value: f64) -> Result<(), TessError> {
        match prop {
            TessProperty::Tolerance => {
                if !(0.0..=1.0).contains(&value) {
                    return Err(TessError::InvalidValue);
                }
                self.tolerance = value;
            }
            TessProperty::WindingRule => {
                if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
                    return Err(TessError::InvalidValue);
                }
                self.winding_rule =
                    WindingRule::from_code(value as u32).ok_or(TessError::InvalidValue)?;
            }
            TessProperty::BoundaryOnly => self.boundary_only = value != 0.0,
        }
        Ok(())
    }

    pub fn property(&self, prop: TessProperty) -> f64 {
        match prop {
            TessProperty::WindingRule => self.winding_rule.code() as f64,
            TessProperty::BoundaryOnly => {
                if self.boundary_only {
                    1.0
                } else {
                    0.0
                }
            }
            TessProperty::Tolerance => self.tolerance,
        }
    }
}
