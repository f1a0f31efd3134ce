use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::reactor::{ModelKind, Reactor, ReactorModel};
use crate::simulation::{
    error::{ConfigurationError, SimulationError},
    output::OutputFormat,
    setup::SimulationSetup,
};

/// A complete description of one reactor run.
///
/// # Fields
///
/// * `reactor` - The reactor model and its parameter set
/// * `initial_state` - Initial state in the layout of `reactor`
/// * `setup` - Time span, evaluation grid and solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub reactor: Reactor,
    pub initial_state: Vec<f64>,
    #[serde(default)]
    pub setup: SimulationSetup,
}

impl Scenario {
    /// The reference scenario of `kind`: default parameters, initial state
    /// and time domain.
    pub fn default_for(kind: ModelKind) -> Self {
        let reactor = Reactor::default_for(kind);
        Self {
            initial_state: reactor.default_initial_state(),
            setup: reactor.default_setup(),
            reactor,
        }
    }

    /// Checks parameters, initial state and setup without integrating.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.reactor.validate()?;
        self.reactor.validate_state(&self.initial_state)?;
        self.setup.validate()
    }

    /// Runs the scenario and converts the trajectory into `O`.
    pub fn run<O: OutputFormat>(&self) -> Result<O, SimulationError> {
        self.reactor.integrate(&self.initial_state, &self.setup)
    }
}

/// Loads and parses a scenario from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the scenario
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The file contents cannot be parsed as a scenario (`IOError::JsonParseError`),
///   including per-species parameter lists of different lengths
pub fn load_scenario(path: impl Into<PathBuf>) -> Result<Scenario, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a scenario to a pretty-printed JSON file.
pub fn save_scenario(path: impl Into<PathBuf>, scenario: &Scenario) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, scenario).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while reading or writing scenario files.
#[derive(Error, Debug)]
pub enum IOError {
    /// Wraps the underlying std::io::Error of the failed file operation.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// Wraps the underlying serde_json::Error of the failed (de)serialization.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}
