//! Simulation Result Module
//!
//! This module provides the raw output of the integration driver.
//!
//! # Key Components
//!
//! - [`Trajectory`]: evaluation times and the state matrix, one row per component
//! - [`IntegrationStats`]: solver work summed over the whole run
//! - [`NegativeExcursion`]: components that dipped below zero during the run

use std::fmt::{self, Display};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Solver statistics aggregated over all integration intervals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStats {
    /// Number of right-hand side evaluations
    pub evaluations: usize,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

impl IntegrationStats {
    pub(crate) fn accumulate(&mut self, stats: &ode_solvers::dop_shared::Stats) {
        self.evaluations += stats.num_eval as usize;
        self.accepted_steps += stats.accepted_steps as usize;
        self.rejected_steps += stats.rejected_steps as usize;
    }
}

impl Display for IntegrationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} evaluations, {} accepted steps, {} rejected steps",
            self.evaluations, self.accepted_steps, self.rejected_steps
        )
    }
}

/// Most negative value a component reached on the evaluation grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeExcursion {
    pub component: String,
    pub time: f64,
    pub value: f64,
}

/// Raw trajectory of a reactor run.
///
/// `states[[i, k]]` is component `i` at `time[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub time: Array1<f64>,
    pub states: Array2<f64>,
    pub components: Vec<String>,
    pub stats: IntegrationStats,
    pub excursions: Vec<NegativeExcursion>,
}

impl Trajectory {
    /// Assembles a trajectory from per-time state vectors and scans it for
    /// negative excursions.
    pub(crate) fn from_samples(
        time: Vec<f64>,
        samples: &[Vec<f64>],
        components: Vec<String>,
        stats: IntegrationStats,
    ) -> Self {
        let n_components = components.len();
        let states = Array2::from_shape_fn((n_components, samples.len()), |(i, k)| samples[k][i]);
        let time = Array1::from_vec(time);
        let excursions = find_excursions(&time, &states, &components);

        Self {
            time,
            states,
            components,
            stats,
            excursions,
        }
    }

    /// Number of evaluation points
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn n_components(&self) -> usize {
        self.states.nrows()
    }

    /// Values of component `index` over time.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn component(&self, index: usize) -> Vec<f64> {
        self.states.row(index).to_vec()
    }

    pub fn component_by_name(&self, name: &str) -> Option<Vec<f64>> {
        self.components
            .iter()
            .position(|component| component == name)
            .map(|index| self.component(index))
    }

    /// Full state vector at evaluation point `k`.
    pub fn state_at(&self, k: usize) -> Option<Vec<f64>> {
        (k < self.len()).then(|| self.states.column(k).to_vec())
    }

    pub fn final_state(&self) -> Option<Vec<f64>> {
        self.len().checked_sub(1).and_then(|k| self.state_at(k))
    }

    /// Checks that the trajectory carries `expected` components and one
    /// column per evaluation time.
    pub fn ensure_components(&self, expected: usize) -> Result<(), SimulationError> {
        if self.n_components() != expected {
            return Err(SimulationError::ShapeMismatch {
                expected,
                found: self.n_components(),
            });
        }
        if self.states.ncols() != self.len() {
            return Err(SimulationError::ShapeMismatch {
                expected: self.len(),
                found: self.states.ncols(),
            });
        }
        Ok(())
    }
}

fn find_excursions(
    time: &Array1<f64>,
    states: &Array2<f64>,
    components: &[String],
) -> Vec<NegativeExcursion> {
    states
        .outer_iter()
        .zip(components)
        .filter_map(|(row, component)| {
            let (k, value) = row
                .iter()
                .copied()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))?;
            (value < 0.0).then(|| NegativeExcursion {
                component: component.clone(),
                time: time[k],
                value,
            })
        })
        .collect()
}
