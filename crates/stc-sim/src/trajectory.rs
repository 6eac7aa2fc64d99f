//! Recorded closed-loop trajectories.

use nalgebra::DMatrix;
use stc_core::State;

use crate::integrator::OdeSolution;

/// Ordered (time, state) samples of one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// Sample times
    pub times: Vec<f64>,
    /// State at each sample, aligned by index with `times`
    pub states: Vec<State>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, t: f64, state: State) {
        self.times.push(t);
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last(&self) -> Option<(f64, &State)> {
        Some((*self.times.last()?, self.states.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> {
        self.times.iter().copied().zip(self.states.iter())
    }

    /// Inter-sample gaps `times[i+1] - times[i]`.
    pub fn intervals(&self) -> Vec<f64> {
        self.times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Time series of one state component.
    pub fn component(&self, index: usize) -> Vec<f64> {
        self.states.iter().map(|s| s[index]).collect()
    }

    /// States as a matrix: one row per sample, one column per component.
    pub fn states_matrix(&self) -> DMatrix<f64> {
        let cols = self.states.first().map_or(0, |s| s.len());
        DMatrix::from_fn(self.states.len(), cols, |r, c| self.states[r][c])
    }
}

impl From<OdeSolution> for Trajectory {
    fn from(sol: OdeSolution) -> Self {
        Self {
            times: sol.t,
            states: sol.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn matrix_rows_align_with_times() {
        let mut traj = Trajectory::new();
        traj.push(0.0, DVector::from_vec(vec![1.0, 2.0]));
        traj.push(0.5, DVector::from_vec(vec![3.0, 4.0]));

        let m = traj.states_matrix();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m[(1, 0)], 3.0);
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(traj.intervals(), vec![0.5]);
        assert_eq!(traj.component(1), vec![2.0, 4.0]);
    }

    #[test]
    fn empty_trajectory() {
        let traj = Trajectory::new();
        assert!(traj.is_empty());
        assert!(traj.last().is_none());
        assert_eq!(traj.states_matrix().shape(), (0, 0));
    }
}
