//! Setup module for configuring reactor simulations.
//!
//! This module provides the [`SimulationSetup`] struct and its builder for configuring
//! the numerical integration of a reactor model. It handles:
//!
//! - Time span (start and end times)
//! - The evaluation grid, either uniform or given explicitly
//! - Error tolerance settings (relative and absolute)
//! - The choice of the adaptive integration [`Method`]
//!
//! Reference setups for the shipped models are available through
//! [`SimulationSetup::bioremediation`] and [`SimulationSetup::rbc`].

use std::fmt::{self, Display};
use std::str::FromStr;

use derive_builder::Builder;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

/// Adaptive explicit Runge-Kutta schemes available to the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Dormand-Prince 5(4) with 4th order dense output
    #[default]
    Dopri5,
    /// Dormand-Prince 8(5,3)
    Dop853,
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Dopri5 => write!(f, "dopri5"),
            Method::Dop853 => write!(f, "dop853"),
        }
    }
}

impl FromStr for Method {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dopri5" | "rk45" => Ok(Method::Dopri5),
            "dop853" => Ok(Method::Dop853),
            _ => Err(ConfigurationError::UnknownVariant {
                kind: "integration method",
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for the numerical integration of a reactor model
///
/// # Fields
///
/// * `t0` - Start of the time span (default: 0.0)
/// * `t1` - End of the time span (default: 24.0)
/// * `n_points` - Size of the uniform evaluation grid over `[t0, t1]` (default: 100)
/// * `t_eval` - Explicit evaluation points, overriding `n_points` (default: None)
/// * `rtol` - Relative tolerance for error control (default: 1e-6)
/// * `atol` - Absolute tolerance for error control (default: 1e-8)
/// * `method` - Integration scheme (default: [`Method::Dopri5`])
///
/// # Examples
///
/// ```
/// use bioreactor::prelude::SimulationSetupBuilder;
///
/// let setup = SimulationSetupBuilder::default()
///     .t0(0.0)
///     .t1(100.0)
///     .n_points(1000)
///     .rtol(1e-6)
///     .atol(1e-8)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.evaluation_times().len(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSetup {
    #[builder(default = "0.0")]
    pub t0: f64,
    #[builder(default = "24.0")]
    pub t1: f64,
    #[builder(default = "100")]
    pub n_points: usize,
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_eval: Option<Vec<f64>>,
    #[builder(default = "1e-6")]
    pub rtol: f64,
    #[builder(default = "1e-8")]
    pub atol: f64,
    #[builder(default)]
    pub method: Method,
}

impl Default for SimulationSetup {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t1: 24.0,
            n_points: 100,
            t_eval: None,
            rtol: 1e-6,
            atol: 1e-8,
            method: Method::Dopri5,
        }
    }
}

impl SimulationSetup {
    /// Reference horizon of the bioremediation reactor: 100 h sampled at 1000 points.
    pub fn bioremediation() -> Self {
        Self {
            t1: 100.0,
            n_points: 1000,
            ..Default::default()
        }
    }

    /// Reference horizon of the RBC models: 24 h sampled at 100 points.
    pub fn rbc() -> Self {
        Self::default()
    }

    /// Returns a copy using `method`.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Times at which the trajectory is stored.
    ///
    /// Either the explicit `t_eval` points or `n_points` equally spaced
    /// points from `t0` to `t1`, both ends included.
    pub fn evaluation_times(&self) -> Vec<f64> {
        if let Some(t_eval) = &self.t_eval {
            return t_eval.clone();
        }

        let mut grid = Array1::linspace(self.t0, self.t1, self.n_points).to_vec();
        // linspace accumulates rounding on the last point
        if let Some(last) = grid.last_mut() {
            *last = self.t1;
        }
        grid
    }

    /// Checks the time span, the evaluation grid and the tolerances.
    ///
    /// Process time starts at or after zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let (t0, t1) = (self.t0, self.t1);
        if !t0.is_finite() || !t1.is_finite() || t0 < 0.0 || t1 <= t0 {
            return Err(ConfigurationError::InvalidTimeSpan { t0, t1 });
        }

        match &self.t_eval {
            Some(points) => {
                if points.len() < 2 {
                    return Err(ConfigurationError::TooFewPoints(points.len()));
                }
                let within = points.iter().all(|t| t.is_finite() && *t >= t0 && *t <= t1);
                let increasing = points.windows(2).all(|w| w[1] > w[0]);
                if !within || !increasing {
                    return Err(ConfigurationError::InvalidEvaluationPoints { t0, t1 });
                }
            }
            None if self.n_points < 2 => {
                return Err(ConfigurationError::TooFewPoints(self.n_points));
            }
            None => {}
        }

        let positive = |tol: f64| tol.is_finite() && tol > 0.0;
        if !positive(self.rtol) || !positive(self.atol) {
            return Err(ConfigurationError::InvalidTolerance {
                rtol: self.rtol,
                atol: self.atol,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builder_defaults_match_default() {
        let setup = SimulationSetupBuilder::default().build().unwrap();
        assert_eq!(setup, SimulationSetup::default());
        assert_eq!(setup.method, Method::Dopri5);
    }

    #[test]
    fn test_uniform_grid_hits_both_ends() {
        let grid = SimulationSetup::bioremediation().evaluation_times();
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[999], 100.0);
        assert_relative_eq!(grid[1], 100.0 / 999.0, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_points_override_grid() {
        let setup = SimulationSetupBuilder::default()
            .t1(10.0)
            .t_eval(vec![0.0, 2.5, 10.0])
            .build()
            .unwrap();
        assert!(setup.validate().is_ok());
        assert_eq!(setup.evaluation_times(), vec![0.0, 2.5, 10.0]);
    }

    #[test]
    fn test_validate_time_span() {
        let setup = SimulationSetup {
            t0: 5.0,
            t1: 5.0,
            ..Default::default()
        };
        assert_eq!(
            setup.validate(),
            Err(ConfigurationError::InvalidTimeSpan { t0: 5.0, t1: 5.0 })
        );

        let setup = SimulationSetup {
            t0: -1.0,
            ..Default::default()
        };
        assert!(setup.validate().is_err());
    }

    #[test]
    fn test_validate_points() {
        let setup = SimulationSetup {
            n_points: 1,
            ..Default::default()
        };
        assert_eq!(setup.validate(), Err(ConfigurationError::TooFewPoints(1)));

        let setup = SimulationSetup {
            t_eval: Some(vec![0.0, 3.0, 2.0]),
            ..Default::default()
        };
        assert!(matches!(
            setup.validate(),
            Err(ConfigurationError::InvalidEvaluationPoints { .. })
        ));

        let setup = SimulationSetup {
            t_eval: Some(vec![0.0, 30.0]),
            ..Default::default()
        };
        assert!(setup.validate().is_err());
    }

    #[test]
    fn test_validate_tolerances() {
        let setup = SimulationSetup {
            rtol: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            setup.validate(),
            Err(ConfigurationError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("DOP853".parse::<Method>().unwrap(), Method::Dop853);
        assert_eq!("dopri5".parse::<Method>().unwrap(), Method::Dopri5);
        assert!("euler".parse::<Method>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let setup: SimulationSetup = serde_json::from_str(r#"{"t1": 100.0, "method": "dop853"}"#).unwrap();
        assert_eq!(setup.t1, 100.0);
        assert_eq!(setup.n_points, 100);
        assert_eq!(setup.method, Method::Dop853);
    }
}
