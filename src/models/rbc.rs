//! Single-species rotating biological contactor (RBC)
//!
//! Flow-through cyanide balance with Monod-limited consumption by one attached
//! bacterial population, and an oxygen balance combining reaeration with the
//! biological oxygen demand.
//!
//! State layout: `[C, X, O]`
//!
//! ```text
//! mu    = mu_max C/(K_s + C)
//! dC/dt = (Q_in C_in - Q_out C)/V - mu X/Y
//! dX/dt = mu X - k_d X
//! dO/dt = k_La (O_star - O) - mu X/Y_o
//! ```
//!
//! [`RbcConditions`] and [`SpeciesKinetics`] are shared with the
//! multi-species model in [`crate::models::rbc_multi`].

use serde::{Deserialize, Serialize};

use crate::models::kinetics::{ensure_non_negative, ensure_positive, monod};
use crate::models::reactor::ReactorModel;
use crate::simulation::{
    error::{ConfigurationError, SimulationError},
    output::{ExtractedSeries, NamedSeries, PanelGrid, SeriesPanel},
    result::Trajectory,
};

pub const CYANIDE: usize = 0;
pub const BIOMASS: usize = 1;
pub const OXYGEN: usize = 2;

const COMPONENTS: [&str; 3] = ["cyanide", "biomass", "oxygen"];

/// Hydraulic and aeration conditions of an RBC unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbcConditions {
    /// Inflow rate (L/h)
    pub q_in: f64,
    /// Inflow cyanide concentration (mg/L)
    pub c_in: f64,
    /// Outflow rate (L/h)
    pub q_out: f64,
    /// Volume of the RBC system (L)
    pub v: f64,
    /// Oxygen transfer coefficient (1/h)
    pub k_la: f64,
    /// Saturation oxygen concentration (mg/L)
    pub o_star: f64,
}

impl Default for RbcConditions {
    fn default() -> Self {
        Self {
            q_in: 10.0,
            c_in: 100.0,
            q_out: 10.0,
            v: 1000.0,
            k_la: 20.0,
            o_star: 8.0,
        }
    }
}

impl RbcConditions {
    /// Net hydraulic cyanide supply `(Q_in C_in - Q_out C)/V`
    pub fn substrate_supply(&self, cyanide: f64) -> f64 {
        (self.q_in * self.c_in - self.q_out * cyanide) / self.v
    }

    /// Physical reaeration `k_La (O_star - O)`
    pub fn reaeration(&self, oxygen: f64) -> f64 {
        self.k_la * (self.o_star - oxygen)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_positive("V", self.v)?;
        ensure_non_negative("Q_in", self.q_in)?;
        ensure_non_negative("C_in", self.c_in)?;
        ensure_non_negative("Q_out", self.q_out)?;
        ensure_non_negative("k_La", self.k_la)?;
        ensure_non_negative("O_star", self.o_star)
    }
}

/// Growth kinetics of one bacterial species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesKinetics {
    /// Maximum specific growth rate (1/h)
    pub mu_max: f64,
    /// Half-saturation constant for cyanide (mg/L)
    pub k_s: f64,
    /// Decay rate (1/h)
    pub k_d: f64,
    /// Yield coefficient (mg bacteria/mg cyanide)
    pub y: f64,
    /// Oxygen yield coefficient (mg oxygen/mg cyanide)
    pub y_o: f64,
}

impl Default for SpeciesKinetics {
    fn default() -> Self {
        Self {
            mu_max: 0.5,
            k_s: 10.0,
            k_d: 0.05,
            y: 0.5,
            y_o: 1.5,
        }
    }
}

impl SpeciesKinetics {
    /// Specific growth rate `mu_max C/(K_s + C)`
    pub fn growth_rate(&self, cyanide: f64) -> f64 {
        monod(self.mu_max, self.k_s, cyanide)
    }

    /// Returns the cyanide uptake `mu X/Y`, the net growth `mu X - k_d X` and
    /// the oxygen demand `mu X/Y_o` of `biomass` at `cyanide`.
    pub fn fluxes(&self, cyanide: f64, biomass: f64) -> (f64, f64, f64) {
        let growth = self.growth_rate(cyanide) * biomass;
        (
            growth / self.y,
            growth - self.k_d * biomass,
            growth / self.y_o,
        )
    }

    pub(crate) fn validate(&self, species: Option<usize>) -> Result<(), ConfigurationError> {
        let label = |name: &str| match species {
            Some(i) => format!("{name}[{i}]"),
            None => name.to_string(),
        };
        ensure_non_negative(&label("mu_max"), self.mu_max)?;
        ensure_non_negative(&label("K_s"), self.k_s)?;
        ensure_non_negative(&label("k_d"), self.k_d)?;
        ensure_positive(&label("Y"), self.y)?;
        ensure_positive(&label("Y_o"), self.y_o)
    }
}

/// Parameter set of the single-species RBC.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RbcParameters {
    #[serde(flatten)]
    pub conditions: RbcConditions,
    #[serde(flatten)]
    pub kinetics: SpeciesKinetics,
}

impl ReactorModel for RbcParameters {
    fn name(&self) -> &'static str {
        "rbc"
    }

    fn state_len(&self) -> usize {
        COMPONENTS.len()
    }

    fn component_names(&self) -> Vec<String> {
        COMPONENTS.iter().map(|name| name.to_string()).collect()
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        self.conditions.validate()?;
        self.kinetics.validate(None)
    }

    fn derivative(&self, _t: f64, y: &[f64], dy: &mut [f64]) {
        let (c, x, o) = (y[CYANIDE], y[BIOMASS], y[OXYGEN]);
        let (uptake, growth, oxygen_demand) = self.kinetics.fluxes(c, x);

        dy[CYANIDE] = self.conditions.substrate_supply(c) - uptake;
        dy[BIOMASS] = growth;
        dy[OXYGEN] = self.conditions.reaeration(o) - oxygen_demand;
    }

    fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError> {
        trajectory.ensure_components(self.state_len())?;
        Ok(rbc_series(
            self.name(),
            trajectory,
            vec![NamedSeries::new(
                COMPONENTS[BIOMASS],
                "Bacterial Concentration (mg/L)",
                trajectory.component(BIOMASS),
            )],
        ))
    }
}

/// Builds the stacked cyanide / bacteria / oxygen panels shared by both RBC
/// models. Cyanide is the first and oxygen the last trajectory row.
pub(crate) fn rbc_series(
    model: &str,
    trajectory: &Trajectory,
    biomass: Vec<NamedSeries>,
) -> ExtractedSeries {
    let oxygen = trajectory.n_components() - 1;

    ExtractedSeries {
        model: model.to_string(),
        time: trajectory.time.to_vec(),
        grid: PanelGrid::new(3, 1),
        panels: vec![
            SeriesPanel {
                title: "Cyanide Concentration Over Time".to_string(),
                y_label: "Cyanide (mg/L)".to_string(),
                series: vec![NamedSeries::new(
                    "cyanide",
                    "Cyanide Concentration (mg/L)",
                    trajectory.component(0),
                )],
            },
            SeriesPanel {
                title: "Bacterial Concentration Over Time".to_string(),
                y_label: "Bacteria (mg/L)".to_string(),
                series: biomass,
            },
            SeriesPanel {
                title: "Oxygen Concentration Over Time".to_string(),
                y_label: "Oxygen (mg/L)".to_string(),
                series: vec![NamedSeries::new(
                    "oxygen",
                    "Oxygen Concentration (mg/L)",
                    trajectory.component(oxygen),
                )],
            },
        ],
    }
}

/// Named view of the RBC state vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RbcState {
    pub cyanide: f64,
    pub biomass: f64,
    pub oxygen: f64,
}

impl Default for RbcState {
    fn default() -> Self {
        Self {
            cyanide: 0.0,
            biomass: 10.0,
            oxygen: 8.0,
        }
    }
}

impl From<RbcState> for Vec<f64> {
    fn from(state: RbcState) -> Self {
        vec![state.cyanide, state.biomass, state.oxygen]
    }
}
