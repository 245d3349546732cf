use crate::geom::{Vector, max_projection};
use serde::{Deserialize, Serialize};

const DIAG: f64 = std::f64::consts::FRAC_1_SQRT_2;
const SIN_60: f64 = 0.866_025_403_784_438_6;

const OCTILINEAR: [Vector; 8] = [
    Vector::new(1.0, 0.0),
    Vector::new(DIAG, DIAG),
    Vector::new(0.0, 1.0),
    Vector::new(-DIAG, DIAG),
    Vector::new(-1.0, 0.0),
    Vector::new(-DIAG, -DIAG),
    Vector::new(0.0, -1.0),
    Vector::new(DIAG, -DIAG),
];

const HEXILINEAR: [Vector; 6] = [
    Vector::new(1.0, 0.0),
    Vector::new(0.5, SIN_60),
    Vector::new(-0.5, SIN_60),
    Vector::new(-1.0, 0.0),
    Vector::new(-0.5, -SIN_60),
    Vector::new(0.5, -SIN_60),
];

/// Unit-vector families links are snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSet {
    /// 8 directions, 45 degrees apart.
    #[default]
    Octilinear,
    /// 6 directions, 60 degrees apart.
    Hexilinear,
}

impl DirectionSet {
    pub fn directions(self) -> &'static [Vector] {
        match self {
            DirectionSet::Octilinear => &OCTILINEAR,
            DirectionSet::Hexilinear => &HEXILINEAR,
        }
    }

    /// The direction best aligned with `v` (largest dot product).
    pub fn snap(self, v: Vector) -> Vector {
        // Both families are non-empty.
        max_projection(self.directions(), v).unwrap_or(OCTILINEAR[0])
    }
}
