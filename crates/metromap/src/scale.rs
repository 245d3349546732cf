//! Linear scales mapping the cooling parameter to constraint strengths, and dates to x.

use crate::error::ConfigError;
use chrono::{DateTime, Utc};

/// Alpha domain every constraint strength is mapped from: full heat to fully cooled.
pub const ALPHA_DOMAIN: [f64; 2] = [0.1, 0.0];

/// A linear map from `domain` to `range`, optionally clamped to the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        // A collapsed domain maps everything to the middle of the range.
        let t = if span == 0.0 { 0.5 } else { (v - d0) / span };
        let t = if self.clamp { t.clamp(0.0, 1.0) } else { t };
        r0 + (r1 - r0) * t
    }
}

/// Strength of one constraint pass as a function of alpha.
///
/// Zeroing both ends of the range disables the constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthScale(LinearScale);

impl StrengthScale {
    pub fn new(range: [f64; 2]) -> Result<Self, ConfigError> {
        Ok(Self(
            LinearScale::new(ALPHA_DOMAIN, validate_range("strength", range)?).clamped(),
        ))
    }

    pub fn disabled() -> Self {
        Self(LinearScale::new(ALPHA_DOMAIN, [0.0, 0.0]).clamped())
    }

    pub fn range(&self) -> [f64; 2] {
        self.0.range()
    }

    pub fn strength(&self, alpha: f64) -> f64 {
        self.0.apply(alpha)
    }

    pub fn is_disabled(&self) -> bool {
        self.0.range() == [0.0, 0.0]
    }
}

pub(crate) fn validate_range(name: &'static str, range: [f64; 2]) -> Result<[f64; 2], ConfigError> {
    if !(range[0].is_finite() && range[1].is_finite()) {
        return Err(ConfigError::NonFiniteRange { name, range });
    }
    Ok(range)
}

/// Maps publication dates onto the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    scale: LinearScale,
}

impl TimeScale {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>, range: [f64; 2]) -> Self {
        Self {
            scale: LinearScale::new(
                [from.timestamp_millis() as f64, to.timestamp_millis() as f64],
                range,
            ),
        }
    }

    /// Spans the earliest to the latest of `dates`; `None` when there are none.
    pub fn spanning<I>(dates: I, range: [f64; 2]) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut lo: Option<DateTime<Utc>> = None;
        let mut hi: Option<DateTime<Utc>> = None;
        for d in dates {
            lo = Some(lo.map_or(d, |l| l.min(d)));
            hi = Some(hi.map_or(d, |h| h.max(d)));
        }
        Some(Self::new(lo?, hi?, range))
    }

    pub fn x(&self, date: DateTime<Utc>) -> f64 {
        self.scale.apply(date.timestamp_millis() as f64)
    }
}
