//! One-shot state disturbances.
//!
//! Wire form: `[time, [s1, s2, ...]]`. Anything else is rejected before a
//! run starts.

use stc_core::{State, ensure_finite, state_from_slice};

use crate::error::{SimError, SimResult};

const SHAPE_MESSAGE: &str = "disturbance must be of the form [time, [s1, s2, ...]]";

/// A perturbation added to the state once, after the first step whose start
/// time is strictly later than `time`.
#[derive(Clone, Debug, PartialEq)]
pub struct Disturbance {
    pub time: f64,
    pub perturbation: State,
}

/// One element of the loosely-typed disturbance wire form.
#[derive(Clone, Debug, PartialEq)]
pub enum DisturbanceField {
    Time(f64),
    Vector(Vec<f64>),
}

impl From<f64> for DisturbanceField {
    fn from(t: f64) -> Self {
        DisturbanceField::Time(t)
    }
}

impl From<Vec<f64>> for DisturbanceField {
    fn from(v: Vec<f64>) -> Self {
        DisturbanceField::Vector(v)
    }
}

impl Disturbance {
    pub fn new(time: f64, perturbation: State) -> SimResult<Self> {
        let time = ensure_finite(time, "disturbance time")?;
        if perturbation.iter().any(|v| !v.is_finite()) {
            return Err(SimError::invalid("disturbance perturbation must be finite"));
        }
        Ok(Self { time, perturbation })
    }

    /// Parse the wire form `[time, [s1, s2, ...]]`.
    pub fn from_wire(fields: &[DisturbanceField]) -> SimResult<Self> {
        match fields {
            [DisturbanceField::Time(time), DisturbanceField::Vector(values)] => {
                let perturbation = state_from_slice(values, "disturbance perturbation")?;
                Self::new(*time, perturbation)
            }
            _ => Err(SimError::invalid(SHAPE_MESSAGE)),
        }
    }
}

impl TryFrom<Vec<DisturbanceField>> for Disturbance {
    type Error = SimError;

    fn try_from(fields: Vec<DisturbanceField>) -> SimResult<Self> {
        Self::from_wire(&fields)
    }
}
