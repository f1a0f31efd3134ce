//! Simulation Error Module
//!
//! This module provides the error types raised while setting up and running
//! reactor simulations.
//!
//! # Key Error Types
//!
//! - [`ConfigurationError`]: problems with parameter sets, initial states or the
//!   simulation setup. These are always detected before the first solver step.
//! - [`SimulationError`]: run-level failures, i.e. configuration errors surfaced
//!   by the driver, solver failures and malformed trajectories handed to the
//!   result extractor.

use thiserror::Error;

/// Errors detected while validating a run before integration starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Species parameter '{field}' has {found} entries but {expected} species are defined")]
    SpeciesLengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Species order {order:?} is not a permutation of {n_species} species")]
    InvalidPermutation { order: Vec<usize>, n_species: usize },
    /// A multi-species reactor without any species would degenerate into a
    /// pure oxygen balance.
    #[error("At least one bacterial species is required")]
    NoSpecies,
    #[error("Parameter '{name}' must be non-negative, got {value}")]
    NegativeParameter { name: String, value: f64 },
    #[error("Parameter '{name}' must be strictly positive, got {value}")]
    NonPositiveParameter { name: String, value: f64 },
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFiniteParameter { name: String, value: f64 },
    #[error("Initial state has {found} components but the model expects {expected}")]
    StateLength { expected: usize, found: usize },
    #[error("Initial state component {index} is not finite")]
    NonFiniteState { index: usize },
    #[error("Invalid time span: t0 = {t0}, t1 = {t1}")]
    InvalidTimeSpan { t0: f64, t1: f64 },
    #[error("At least two evaluation points are required, got {0}")]
    TooFewPoints(usize),
    #[error("Evaluation points must be strictly increasing and lie within [{t0}, {t1}]")]
    InvalidEvaluationPoints { t0: f64, t1: f64 },
    #[error("Tolerances must be positive: rtol = {rtol}, atol = {atol}")]
    InvalidTolerance { rtol: f64, atol: f64 },
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The solver gave up. `t_reached` and `state` describe the last
    /// evaluation point that was integrated successfully.
    #[error("Integration failed after t = {t_reached}: {reason}")]
    Integration {
        reason: String,
        t_reached: f64,
        state: Vec<f64>,
    },
    #[error("Trajectory has {found} components but the model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },
}
