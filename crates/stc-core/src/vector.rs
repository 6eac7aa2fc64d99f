//! State and action vectors.
//!
//! States and control actions are dense `f64` vectors whose length is fixed
//! per plant. A scalar action is a length-1 vector.

use nalgebra::DVector;

use crate::{CoreError, CoreResult};

/// Plant state vector.
pub type State = DVector<f64>;

/// Control action vector (length 1 for scalar inputs).
pub type Action = DVector<f64>;

/// Wrap a scalar control input as an [`Action`].
pub fn scalar_action(u: f64) -> Action {
    DVector::from_element(1, u)
}

/// Build a state from a slice, rejecting non-finite entries.
pub fn state_from_slice(values: &[f64], what: &'static str) -> CoreResult<State> {
    if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(CoreError::NonFinite { what, value: bad });
    }
    Ok(DVector::from_column_slice(values))
}

/// Check that a vector has the expected length.
pub fn check_dim(v: &DVector<f64>, expected: usize, what: &'static str) -> CoreResult<()> {
    if v.len() == expected {
        Ok(())
    } else {
        Err(CoreError::DimensionMismatch {
            what,
            expected,
            actual: v.len(),
        })
    }
}

/// True when every component is finite.
pub fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_action_has_length_one() {
        let u = scalar_action(2.5);
        assert_eq!(u.len(), 1);
        assert_eq!(u[0], 2.5);
    }

    #[test]
    fn state_from_slice_rejects_nan() {
        assert!(state_from_slice(&[1.0, 2.0], "ic").is_ok());
        let err = state_from_slice(&[1.0, f64::NAN], "ic").unwrap_err();
        assert!(matches!(err, CoreError::NonFinite { what: "ic", .. }));
    }

    #[test]
    fn check_dim_reports_lengths() {
        let v = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        assert!(check_dim(&v, 3, "state").is_ok());
        let err = check_dim(&v, 2, "state").unwrap_err();
        assert_eq!(
            err,
            CoreError::DimensionMismatch {
                what: "state",
                expected: 2,
                actual: 3
            }
        );
    }
}
