//! Bioreactor Rust Library
//!
//! This library simulates cyanide-degrading wastewater bioreactors as systems of
//! ordinary differential equations, including:
//! - A continuous stirred-tank reactor with cyanide degradation and nitrification
//! - Single- and multi-species rotating biological contactors (RBC)
//! - An adaptive integration driver with configurable tolerances
//! - Extraction of named time series and plotting of the results
//! - Reading/writing scenario files

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::models::bioremediation::{BioremediationParameters, BioremediationState};
    pub use crate::models::rbc::{RbcConditions, RbcParameters, RbcState, SpeciesKinetics};
    pub use crate::models::rbc_multi::*;
    pub use crate::models::reactor::*;
    pub use crate::simulation::error::*;
    pub use crate::simulation::output::*;
    pub use crate::simulation::result::*;
    pub use crate::simulation::runner::*;
    pub use crate::simulation::setup::*;

    #[cfg(feature = "plotting")]
    pub use crate::plotting::*;
}

/// Reactor models and their parameter sets
pub mod models {
    /// Bioremediation CSTR with cyanide degradation and nitrification
    pub mod bioremediation;
    /// Shared kinetic terms and parameter guards
    pub mod kinetics;
    /// Single-species rotating biological contactor
    pub mod rbc;
    /// Multi-species rotating biological contactor
    pub mod rbc_multi;
    /// The reactor model capability and the tagged reactor variant
    pub mod reactor;
}

/// Integration of reactor models
pub mod simulation {
    pub use crate::simulation::setup::SimulationSetup;

    /// Error types for configuration and simulation failures
    pub mod error;
    /// Output formats for simulation results
    pub mod output;
    /// Simulation result data structures
    pub mod result;
    /// Integration driver
    pub mod runner;
    /// Simulation setup and configuration
    pub mod setup;
    /// Adapter between reactor models and the ODE steppers
    pub(crate) mod system;
}

/// Plotting and visualization functionality
#[cfg(feature = "plotting")]
pub mod plotting;

/// Tabular display of reactors and results
pub mod info;

/// IO functionality
pub mod io;
