use crate::directions::DirectionSet;
use crate::error::ConfigError;
use crate::scale::validate_range;
use serde::{Deserialize, Serialize};

/// Every simulation and constraint tunable of a metro map.
///
/// Field names match the persisted state, which flattens this struct into its top level.
/// Missing fields fall back to [`Tunables::default`]; in particular an absent `monoforce` or
/// `timeforce` leaves that constraint disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Octilinearity strength range, mapped from alpha `0.1 -> 0`.
    pub octoforce: [f64; 2],
    /// Line monotonicity strength range.
    pub monoforce: [f64; 2],
    /// Time-axis attraction strength range.
    pub timeforce: [f64; 2],
    pub charge: f64,
    pub gravity: f64,
    pub friction: f64,
    #[serde(rename = "linkStrength")]
    pub link_strength: f64,
    #[serde(rename = "linkDistance")]
    pub link_distance: f64,
    /// Canvas `[width, height]`.
    pub size: [f64; 2],
    pub directions: DirectionSet,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            octoforce: [0.0, 1.0],
            monoforce: [0.0, 0.0],
            timeforce: [0.0, 0.0],
            charge: -100.0,
            gravity: 0.1,
            friction: 0.9,
            link_strength: 1.0,
            link_distance: 40.0,
            size: [1.0, 1.0],
            directions: DirectionSet::Octilinear,
        }
    }
}

impl Tunables {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_range("octoforce", self.octoforce)?;
        validate_range("monoforce", self.monoforce)?;
        validate_range("timeforce", self.timeforce)?;
        finite("charge", self.charge)?;
        finite("gravity", self.gravity)?;
        within("friction", self.friction, 0.0, 1.0)?;
        within("linkStrength", self.link_strength, 0.0, 1.0)?;
        within("linkDistance", self.link_distance, 0.0, f64::MAX)?;
        validate_size(self.size)?;
        Ok(())
    }
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

pub(crate) fn within(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    finite(name, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

pub(crate) fn validate_size(size: [f64; 2]) -> Result<[f64; 2], ConfigError> {
    let [width, height] = size;
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(size)
    } else {
        Err(ConfigError::InvalidSize { width, height })
    }
}
