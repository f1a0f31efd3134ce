//! The reactor model capability and the tagged variant over all models.
//!
//! Every reactor is described by a [`ReactorModel`]: a pure right-hand side
//! `derivative(t, y) -> dy` over a fixed state layout, together with the
//! configuration checks and the result extraction that belong to that layout.
//! The integration driver is written once against this trait.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{
    bioremediation::{BioremediationParameters, BioremediationState},
    rbc::{RbcParameters, RbcState},
    rbc_multi::{MultiSpeciesRbcParameters, MultiSpeciesRbcState},
};
use crate::simulation::{
    error::{ConfigurationError, SimulationError},
    output::{ExtractedSeries, OutputFormat},
    result::Trajectory,
    runner::simulate,
    setup::SimulationSetup,
};

/// A reactor mass-balance model over a flat state vector.
pub trait ReactorModel {
    /// Short identifier of the model family
    fn name(&self) -> &'static str;

    /// Number of components in the state vector
    fn state_len(&self) -> usize;

    /// Names of the state components in layout order
    fn component_names(&self) -> Vec<String>;

    /// Checks the parameter set. Called by the driver before integration.
    fn validate(&self) -> Result<(), ConfigurationError>;

    /// Writes the time derivative of `y` into `dy`.
    ///
    /// `t` is accepted for solver compatibility; the models shipped with this
    /// crate are autonomous and ignore it. Both slices have length
    /// [`ReactorModel::state_len`].
    fn derivative(&self, t: f64, y: &[f64], dy: &mut [f64]);

    /// Slices a trajectory produced by this model into named series.
    fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError>;

    /// Allocating variant of [`ReactorModel::derivative`].
    fn rates(&self, t: f64, y: &[f64]) -> Vec<f64> {
        let mut dy = vec![0.0; y.len()];
        self.derivative(t, y, &mut dy);
        dy
    }

    /// Checks that an initial state fits the layout of this model.
    fn validate_state(&self, y0: &[f64]) -> Result<(), ConfigurationError> {
        if y0.len() != self.state_len() {
            return Err(ConfigurationError::StateLength {
                expected: self.state_len(),
                found: y0.len(),
            });
        }
        if let Some(index) = y0.iter().position(|value| !value.is_finite()) {
            return Err(ConfigurationError::NonFiniteState { index });
        }
        Ok(())
    }
}

/// The model families known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Bioremediation,
    Rbc,
    MultiSpeciesRbc,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Bioremediation,
        ModelKind::Rbc,
        ModelKind::MultiSpeciesRbc,
    ];
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Bioremediation => "bioremediation",
            ModelKind::Rbc => "rbc",
            ModelKind::MultiSpeciesRbc => "multi_species_rbc",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ModelKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "bioremediation" => Ok(ModelKind::Bioremediation),
            "rbc" => Ok(ModelKind::Rbc),
            "multi_species_rbc" | "rbc_multi" => Ok(ModelKind::MultiSpeciesRbc),
            _ => Err(ConfigurationError::UnknownVariant {
                kind: "model",
                value: s.to_string(),
            }),
        }
    }
}

/// Tagged variant over the three reactor models.
///
/// Serialized as `{"model": "<kind>", "parameters": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", content = "parameters", rename_all = "snake_case")]
pub enum Reactor {
    Bioremediation(BioremediationParameters),
    Rbc(RbcParameters),
    MultiSpeciesRbc(MultiSpeciesRbcParameters),
}

impl Reactor {
    /// Creates a reactor with the reference parameter values for `kind`.
    pub fn default_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Bioremediation => Reactor::Bioremediation(Default::default()),
            ModelKind::Rbc => Reactor::Rbc(Default::default()),
            ModelKind::MultiSpeciesRbc => Reactor::MultiSpeciesRbc(Default::default()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Reactor::Bioremediation(_) => ModelKind::Bioremediation,
            Reactor::Rbc(_) => ModelKind::Rbc,
            Reactor::MultiSpeciesRbc(_) => ModelKind::MultiSpeciesRbc,
        }
    }

    /// Reference initial state matching the layout of this reactor.
    pub fn default_initial_state(&self) -> Vec<f64> {
        match self {
            Reactor::Bioremediation(_) => BioremediationState::default().into(),
            Reactor::Rbc(_) => RbcState::default().into(),
            Reactor::MultiSpeciesRbc(params) => {
                let state = MultiSpeciesRbcState::default();
                if state.biomass.len() == params.n_species() {
                    state.into()
                } else {
                    // Spread the reference inoculum evenly over the configured species
                    let total: f64 = state.biomass.iter().sum();
                    let share = total / params.n_species() as f64;
                    params
                        .layout()
                        .pack_unchecked(state.cyanide, &vec![share; params.n_species()], state.oxygen)
                }
            }
        }
    }

    /// Reference time domain for this reactor.
    pub fn default_setup(&self) -> SimulationSetup {
        match self {
            Reactor::Bioremediation(_) => SimulationSetup::bioremediation(),
            Reactor::Rbc(_) | Reactor::MultiSpeciesRbc(_) => SimulationSetup::rbc(),
        }
    }

    /// Integrates this reactor and converts the trajectory into `O`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioreactor::prelude::*;
    ///
    /// let reactor = Reactor::default_for(ModelKind::Rbc);
    /// let y0 = reactor.default_initial_state();
    /// let series = reactor
    ///     .integrate::<ExtractedSeries>(&y0, &SimulationSetup::rbc())
    ///     .unwrap();
    ///
    /// assert_eq!(series.time.len(), 100);
    /// ```
    pub fn integrate<O: OutputFormat>(
        &self,
        y0: &[f64],
        setup: &SimulationSetup,
    ) -> Result<O, SimulationError> {
        simulate::<_, O>(self, y0, setup)
    }

    fn model(&self) -> &dyn ReactorModel {
        match self {
            Reactor::Bioremediation(params) => params,
            Reactor::Rbc(params) => params,
            Reactor::MultiSpeciesRbc(params) => params,
        }
    }
}

impl ReactorModel for Reactor {
    fn name(&self) -> &'static str {
        self.model().name()
    }

    fn state_len(&self) -> usize {
        self.model().state_len()
    }

    fn component_names(&self) -> Vec<String> {
        self.model().component_names()
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        self.model().validate()
    }

    fn derivative(&self, t: f64, y: &[f64], dy: &mut [f64]) {
        // Matched directly to keep the hot path free of dynamic dispatch
        match self {
            Reactor::Bioremediation(params) => params.derivative(t, y, dy),
            Reactor::Rbc(params) => params.derivative(t, y, dy),
            Reactor::MultiSpeciesRbc(params) => params.derivative(t, y, dy),
        }
    }

    fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError> {
        self.model().extract(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.to_string().parse::<ModelKind>().unwrap(), kind);
        }
        assert_eq!(
            "multi-species-rbc".parse::<ModelKind>().unwrap(),
            ModelKind::MultiSpeciesRbc
        );
        assert!("cstr".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_default_initial_state_fits_layout() {
        for kind in ModelKind::ALL {
            let reactor = Reactor::default_for(kind);
            let y0 = reactor.default_initial_state();
            assert_eq!(y0.len(), reactor.state_len());
            assert!(reactor.validate_state(&y0).is_ok());
            assert_eq!(reactor.kind(), kind);
        }
    }

    #[test]
    fn test_validate_state_length() {
        let reactor = Reactor::default_for(ModelKind::Rbc);
        assert_eq!(
            reactor.validate_state(&[0.0, 1.0]),
            Err(ConfigurationError::StateLength {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            reactor.validate_state(&[0.0, f64::NAN, 8.0]),
            Err(ConfigurationError::NonFiniteState { index: 1 })
        );
    }

    #[test]
    fn test_reactor_serde_tag() {
        let reactor = Reactor::default_for(ModelKind::Rbc);
        let json = serde_json::to_value(&reactor).unwrap();
        assert_eq!(json["model"], "rbc");
        assert_eq!(json["parameters"]["v"], 1000.0);

        let back: Reactor = serde_json::from_value(json).unwrap();
        assert_eq!(back, reactor);
    }

    #[test]
    fn test_delegated_derivative_matches_variant() {
        let params = RbcParameters::default();
        let reactor = Reactor::Rbc(params.clone());
        let y = [5.0, 10.0, 7.0];
        assert_eq!(reactor.rates(0.0, &y), params.rates(0.0, &y));
    }
}
