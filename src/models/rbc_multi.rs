//! Multi-species rotating biological contactor
//!
//! Generalizes [`crate::models::rbc`] to N bacterial populations competing for
//! the same cyanide pool and jointly depleting oxygen. Growth and decay are
//! independent per species; substrate uptake and oxygen demand are additive.
//!
//! ```text
//! mu_i    = mu_max_i C/(K_s_i + C)
//! dC/dt   = (Q_in C_in - Q_out C)/V - sum_i mu_i X_i/Y_i
//! dX_i/dt = mu_i X_i - k_d_i X_i
//! dO/dt   = k_La (O_star - O) - sum_i mu_i X_i/Y_o_i
//! ```
//!
//! # State layout
//!
//! The state is a flat vector of length N + 2, described by [`SpeciesLayout`]:
//!
//! | index      | component              |
//! |------------|------------------------|
//! | `0`        | cyanide `C`            |
//! | `1..=N`    | biomass `X_1 .. X_N`   |
//! | `N + 1`    | oxygen `O`             |
//!
//! Species `i` of the parameter set is always species `i` of the state and of
//! the extracted results.

use std::ops::Range;

use itertools::{izip, Itertools};
use serde::{Deserialize, Serialize};

use crate::models::rbc::{rbc_series, RbcConditions, SpeciesKinetics};
use crate::models::reactor::ReactorModel;
use crate::simulation::{
    error::{ConfigurationError, SimulationError},
    output::{ExtractedSeries, NamedSeries},
    result::Trajectory,
};

/// Index ranges of the flat multi-species state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesLayout {
    n_species: usize,
}

impl SpeciesLayout {
    pub const CYANIDE: usize = 0;

    /// Creates the layout for `n_species` populations. Zero species is rejected.
    pub fn new(n_species: usize) -> Result<Self, ConfigurationError> {
        if n_species == 0 {
            return Err(ConfigurationError::NoSpecies);
        }
        Ok(Self { n_species })
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    /// Length of the flat state vector
    pub fn len(&self) -> usize {
        self.n_species + 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Indices of the biomass entries
    pub fn biomass(&self) -> Range<usize> {
        1..self.n_species + 1
    }

    /// Index of the biomass of species `species` (0-based)
    pub fn biomass_index(&self, species: usize) -> usize {
        1 + species
    }

    pub fn oxygen(&self) -> usize {
        self.n_species + 1
    }

    /// Flattens `[C, X_1..X_N, O]` into one state vector.
    pub fn pack(
        &self,
        cyanide: f64,
        biomass: &[f64],
        oxygen: f64,
    ) -> Result<Vec<f64>, ConfigurationError> {
        if biomass.len() != self.n_species {
            return Err(ConfigurationError::SpeciesLengthMismatch {
                field: "biomass",
                expected: self.n_species,
                found: biomass.len(),
            });
        }
        Ok(self.pack_unchecked(cyanide, biomass, oxygen))
    }

    pub(crate) fn pack_unchecked(&self, cyanide: f64, biomass: &[f64], oxygen: f64) -> Vec<f64> {
        let mut state = Vec::with_capacity(self.len());
        state.push(cyanide);
        state.extend_from_slice(biomass);
        state.push(oxygen);
        state
    }

    /// Splits a state vector into cyanide, biomass slice and oxygen.
    ///
    /// # Panics
    ///
    /// Panics if `state` is shorter than [`SpeciesLayout::len`].
    pub fn unpack<'a>(&self, state: &'a [f64]) -> (f64, &'a [f64], f64) {
        debug_assert_eq!(state.len(), self.len());
        (
            state[Self::CYANIDE],
            &state[self.biomass()],
            state[self.oxygen()],
        )
    }
}

/// Parameter set of the multi-species RBC.
///
/// Holds at least one species; per-species kinetics are kept as one record per
/// species so that their pairing cannot drift. Serialized in column form (one
/// array per kinetic field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpeciesColumns", into = "SpeciesColumns")]
pub struct MultiSpeciesRbcParameters {
    conditions: RbcConditions,
    species: Vec<SpeciesKinetics>,
}

impl MultiSpeciesRbcParameters {
    pub fn new(
        conditions: RbcConditions,
        species: Vec<SpeciesKinetics>,
    ) -> Result<Self, ConfigurationError> {
        SpeciesLayout::new(species.len())?;
        Ok(Self {
            conditions,
            species,
        })
    }

    /// Builds the parameter set from per-field vectors. All vectors must have
    /// the same, non-zero length.
    pub fn from_vectors(
        conditions: RbcConditions,
        mu_max: Vec<f64>,
        k_s: Vec<f64>,
        k_d: Vec<f64>,
        y: Vec<f64>,
        y_o: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        let n_species = mu_max.len();
        SpeciesLayout::new(n_species)?;

        for (field, found) in [
            ("K_s", k_s.len()),
            ("k_d", k_d.len()),
            ("Y", y.len()),
            ("Y_o", y_o.len()),
        ] {
            if found != n_species {
                return Err(ConfigurationError::SpeciesLengthMismatch {
                    field,
                    expected: n_species,
                    found,
                });
            }
        }

        let species = izip!(mu_max, k_s, k_d, y, y_o)
            .map(|(mu_max, k_s, k_d, y, y_o)| SpeciesKinetics {
                mu_max,
                k_s,
                k_d,
                y,
                y_o,
            })
            .collect();

        Self::new(conditions, species)
    }

    pub fn conditions(&self) -> &RbcConditions {
        &self.conditions
    }

    pub fn species(&self) -> &[SpeciesKinetics] {
        &self.species
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn layout(&self) -> SpeciesLayout {
        SpeciesLayout {
            n_species: self.species.len(),
        }
    }

    /// Returns a copy with species reordered so that species `i` of the result
    /// is species `order[i]` of `self`.
    ///
    /// `order` must name every species index exactly once.
    pub fn permuted(&self, order: &[usize]) -> Result<Self, ConfigurationError> {
        let n_species = self.n_species();
        if order.len() != n_species || !order.iter().sorted().copied().eq(0..n_species) {
            return Err(ConfigurationError::InvalidPermutation {
                order: order.to_vec(),
                n_species,
            });
        }

        Self::new(
            self.conditions.clone(),
            order.iter().map(|&i| self.species[i]).collect(),
        )
    }
}

impl Default for MultiSpeciesRbcParameters {
    fn default() -> Self {
        Self {
            conditions: RbcConditions::default(),
            species: vec![
                SpeciesKinetics {
                    mu_max: 0.5,
                    k_s: 10.0,
                    k_d: 0.05,
                    y: 0.5,
                    y_o: 1.5,
                },
                SpeciesKinetics {
                    mu_max: 0.3,
                    k_s: 15.0,
                    k_d: 0.03,
                    y: 0.4,
                    y_o: 1.2,
                },
            ],
        }
    }
}

impl ReactorModel for MultiSpeciesRbcParameters {
    fn name(&self) -> &'static str {
        "multi_species_rbc"
    }

    fn state_len(&self) -> usize {
        self.layout().len()
    }

    fn component_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.state_len());
        names.push("cyanide".to_string());
        names.extend((1..=self.n_species()).map(species_biomass_name));
        names.push("oxygen".to_string());
        names
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        SpeciesLayout::new(self.species.len())?;
        self.conditions.validate()?;
        for (i, kinetics) in self.species.iter().enumerate() {
            kinetics.validate(Some(i))?;
        }
        Ok(())
    }

    fn derivative(&self, _t: f64, y: &[f64], dy: &mut [f64]) {
        let layout = self.layout();
        let (c, biomass, o) = layout.unpack(y);

        let mut uptake = 0.0;
        let mut oxygen_demand = 0.0;
        for (kinetics, &x, dx) in izip!(&self.species, biomass, &mut dy[layout.biomass()]) {
            let (species_uptake, growth, species_demand) = kinetics.fluxes(c, x);
            uptake += species_uptake;
            oxygen_demand += species_demand;
            *dx = growth;
        }

        dy[SpeciesLayout::CYANIDE] = self.conditions.substrate_supply(c) - uptake;
        dy[layout.oxygen()] = self.conditions.reaeration(o) - oxygen_demand;
    }

    fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError> {
        trajectory.ensure_components(self.state_len())?;
        let layout = self.layout();

        let biomass = (0..layout.n_species())
            .map(|i| {
                NamedSeries::new(
                    &species_biomass_name(i + 1),
                    &format!("Bacterial Species {} (mg/L)", i + 1),
                    trajectory.component(layout.biomass_index(i)),
                )
            })
            .collect();

        Ok(rbc_series(self.name(), trajectory, biomass))
    }
}

fn species_biomass_name(species: usize) -> String {
    format!("species_{species}_biomass")
}

/// Column form used for serialization, one entry per species in each vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpeciesColumns {
    #[serde(flatten)]
    conditions: RbcConditions,
    mu_max: Vec<f64>,
    k_s: Vec<f64>,
    k_d: Vec<f64>,
    y: Vec<f64>,
    y_o: Vec<f64>,
}

impl TryFrom<SpeciesColumns> for MultiSpeciesRbcParameters {
    type Error = ConfigurationError;

    fn try_from(columns: SpeciesColumns) -> Result<Self, Self::Error> {
        Self::from_vectors(
            columns.conditions,
            columns.mu_max,
            columns.k_s,
            columns.k_d,
            columns.y,
            columns.y_o,
        )
    }
}

impl From<MultiSpeciesRbcParameters> for SpeciesColumns {
    fn from(params: MultiSpeciesRbcParameters) -> Self {
        let column = |f: fn(&SpeciesKinetics) -> f64| -> Vec<f64> { params.species.iter().map(f).collect() };
        Self {
            mu_max: column(|s| s.mu_max),
            k_s: column(|s| s.k_s),
            k_d: column(|s| s.k_d),
            y: column(|s| s.y),
            y_o: column(|s| s.y_o),
            conditions: params.conditions,
        }
    }
}

/// Named view of the multi-species state vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSpeciesRbcState {
    pub cyanide: f64,
    pub biomass: Vec<f64>,
    pub oxygen: f64,
}

impl Default for MultiSpeciesRbcState {
    fn default() -> Self {
        Self {
            cyanide: 0.0,
            biomass: vec![10.0, 5.0],
            oxygen: 8.0,
        }
    }
}

impl MultiSpeciesRbcState {
    /// Packs the state for `params`, rejecting a biomass vector of the wrong length.
    pub fn pack(&self, params: &MultiSpeciesRbcParameters) -> Result<Vec<f64>, ConfigurationError> {
        params
            .layout()
            .pack(self.cyanide, &self.biomass, self.oxygen)
    }
}

impl From<MultiSpeciesRbcState> for Vec<f64> {
    fn from(state: MultiSpeciesRbcState) -> Self {
        let mut packed = Vec::with_capacity(state.biomass.len() + 2);
        packed.push(state.cyanide);
        packed.extend(state.biomass);
        packed.push(state.oxygen);
        packed
    }
}
