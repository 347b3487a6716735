//! Interval bounds for constrained parameters
//!
//! [`Bounds`] describes the constrained domain of a parameter. It parametrizes the
//! bounded-interval transformation and the opt-in validation of parameter
//! collections at the model boundary.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must be less than max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Bounds [{min}, {max}] must be finite on both sides")]
    NotFinite { min: f64, max: f64 },

    #[error("Value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },
}

/// Represents the domain of a constrained parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

// JSON has no infinities, so open ends are written as null.
impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;
        let min = if self.min == NEG_INFINITY {
            None
        } else {
            Some(self.min)
        };
        let max = if self.max == INFINITY {
            None
        } else {
            Some(self.max)
        };
        state.serialize_field("min", &min)?;
        state.serialize_field("max", &max)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;
        let min = helper.min.unwrap_or(NEG_INFINITY);
        let max = helper.max.unwrap_or(INFINITY);

        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Bounds {
    /// Create bounds with min and max values
    ///
    /// # Returns
    ///
    /// A new `Bounds` object if `min < max`, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use gpparams_rs::transforms::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert!(Bounds::new(1.0, 1.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        // Also rejects NaN on either side
        if !(min < max) {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// The whole real line
    pub fn unbounded() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }

    /// The strictly positive half line `(0, ∞)`
    pub fn positive() -> Self {
        Self {
            min: 0.0,
            max: INFINITY,
        }
    }

    /// Create bounds with only a minimum value
    pub fn min_only(min: f64) -> Self {
        Self { min, max: INFINITY }
    }

    /// Create bounds with only a maximum value
    pub fn max_only(max: f64) -> Self {
        Self {
            min: NEG_INFINITY,
            max,
        }
    }

    /// Check whether a value lies strictly inside the bounds.
    ///
    /// The open interval is the domain of every bijection onto the real line,
    /// so the endpoints themselves are rejected.
    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }

    /// Check whether a value lies strictly inside the bounds, as a `Result`
    pub fn check(&self, value: f64) -> Result<(), BoundsError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(BoundsError::ValueOutsideBounds {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Check if the bounds are finite (both min and max are finite)
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check if the parameter is bounded from below
    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    /// Check if the parameter is bounded from above
    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}
