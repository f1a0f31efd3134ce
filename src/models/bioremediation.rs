//! Single-reactor bioremediation model (cyanide degradation + nitrification)
//!
//! A continuous-flow stirred-tank reactor carrying two microbial populations:
//! heterotrophs degrading cyanide into ammonia and nitrifiers consuming the
//! ammonia. Each balance is a dilution term plus Monod reaction terms.
//!
//! State layout: `[C, N, X, X_nit]`
//!
//! ```text
//! dC/dt     = (Q/V)(C_in - C)         - mu_max X C/(Ks + C)
//! dN/dt     = (Q/V)(N_in - N)         + Y mu_max X C/(Ks + C) - mu_nit X_nit N/(K_nit + N)
//! dX/dt     = (Q/V)(X_in - X)         + mu_max X C/(Ks + C)   - kd X
//! dX_nit/dt = (Q/V)(X_nit_in - X_nit) + mu_nit X_nit N/(K_nit + N) - kd_nit X_nit
//! ```

use serde::{Deserialize, Serialize};

use crate::models::kinetics::{ensure_non_negative, ensure_positive, monod};
use crate::models::reactor::ReactorModel;
use crate::simulation::{
    error::{ConfigurationError, SimulationError},
    output::{ExtractedSeries, NamedSeries, PanelGrid, SeriesPanel},
    result::Trajectory,
};

pub const CYANIDE: usize = 0;
pub const AMMONIA: usize = 1;
pub const BIOMASS: usize = 2;
pub const NITRIFIER_BIOMASS: usize = 3;

const COMPONENTS: [&str; 4] = ["cyanide", "ammonia", "biomass", "nitrifier_biomass"];

/// Physical constants of the bioremediation reactor.
///
/// Concentrations are in mg/L, rates in 1/h, flows in L/h and volumes in L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioremediationParameters {
    /// Flow rate
    pub q: f64,
    /// Reactor volume
    pub v: f64,
    /// Maximum cyanide degradation rate
    pub mu_max: f64,
    /// Half-saturation constant for cyanide
    pub k_s: f64,
    /// Yield of ammonia per degraded cyanide
    pub y: f64,
    /// Maximum nitrification rate
    pub mu_nit: f64,
    /// Half-saturation constant for ammonia
    pub k_nit: f64,
    /// Decay rate of the heterotrophic biomass
    pub k_d: f64,
    /// Decay rate of the nitrifying biomass
    pub k_d_nit: f64,
    /// Inflow concentrations
    pub c_in: f64,
    pub n_in: f64,
    pub x_in: f64,
    pub x_nit_in: f64,
}

impl Default for BioremediationParameters {
    fn default() -> Self {
        Self {
            q: 10.0,
            v: 100.0,
            mu_max: 0.5,
            k_s: 5.0,
            y: 0.2,
            mu_nit: 0.3,
            k_nit: 2.0,
            k_d: 0.05,
            k_d_nit: 0.05,
            c_in: 100.0,
            n_in: 0.0,
            x_in: 10.0,
            x_nit_in: 5.0,
        }
    }
}

impl BioremediationParameters {
    /// Dilution rate `Q/V`
    pub fn dilution_rate(&self) -> f64 {
        self.q / self.v
    }

    /// Cyanide degradation rate `mu_max X C/(Ks + C)`
    pub fn degradation_rate(&self, cyanide: f64, biomass: f64) -> f64 {
        monod(self.mu_max, self.k_s, cyanide) * biomass
    }

    /// Nitrification rate `mu_nit X_nit N/(K_nit + N)`
    pub fn nitrification_rate(&self, ammonia: f64, nitrifier_biomass: f64) -> f64 {
        monod(self.mu_nit, self.k_nit, ammonia) * nitrifier_biomass
    }
}

impl ReactorModel for BioremediationParameters {
    fn name(&self) -> &'static str {
        "bioremediation"
    }

    fn state_len(&self) -> usize {
        COMPONENTS.len()
    }

    fn component_names(&self) -> Vec<String> {
        COMPONENTS.iter().map(|name| name.to_string()).collect()
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_positive("V", self.v)?;
        for (name, value) in [
            ("Q", self.q),
            ("mu_max", self.mu_max),
            ("Ks", self.k_s),
            ("Y", self.y),
            ("mu_nit", self.mu_nit),
            ("K_nit", self.k_nit),
            ("kd", self.k_d),
            ("kd_nit", self.k_d_nit),
            ("C_in", self.c_in),
            ("N_in", self.n_in),
            ("X_in", self.x_in),
            ("X_nit_in", self.x_nit_in),
        ] {
            ensure_non_negative(name, value)?;
        }
        Ok(())
    }

    fn derivative(&self, _t: f64, y: &[f64], dy: &mut [f64]) {
        let (c, n, x, x_nit) = (y[CYANIDE], y[AMMONIA], y[BIOMASS], y[NITRIFIER_BIOMASS]);
        let d = self.dilution_rate();

        let degradation = self.degradation_rate(c, x);
        let nitrification = self.nitrification_rate(n, x_nit);

        dy[CYANIDE] = d * (self.c_in - c) - degradation;
        dy[AMMONIA] = d * (self.n_in - n) + self.y * degradation - nitrification;
        dy[BIOMASS] = d * (self.x_in - x) + degradation - self.k_d * x;
        dy[NITRIFIER_BIOMASS] = d * (self.x_nit_in - x_nit) + nitrification - self.k_d_nit * x_nit;
    }

    fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError> {
        trajectory.ensure_components(self.state_len())?;

        let panel = |title: &str, y_label: &str, index: usize, label: &str| SeriesPanel {
            title: title.to_string(),
            y_label: y_label.to_string(),
            series: vec![NamedSeries::new(
                COMPONENTS[index],
                label,
                trajectory.component(index),
            )],
        };

        Ok(ExtractedSeries {
            model: self.name().to_string(),
            time: trajectory.time.to_vec(),
            grid: PanelGrid::new(2, 2),
            panels: vec![
                panel("Cyanide Concentration", "Concentration (mg/L)", CYANIDE, "Cyanide (C)"),
                panel("Ammonia Concentration", "Concentration (mg/L)", AMMONIA, "Ammonia (N)"),
                panel(
                    "Microbial Population",
                    "Population (mg/L)",
                    BIOMASS,
                    "Microbial Population (X)",
                ),
                panel(
                    "Nitrifying Bacterial Population",
                    "Population (mg/L)",
                    NITRIFIER_BIOMASS,
                    "Nitrifying Bacteria (X_nit)",
                ),
            ],
        })
    }
}

/// Named view of the bioremediation state vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BioremediationState {
    pub cyanide: f64,
    pub ammonia: f64,
    pub biomass: f64,
    pub nitrifier_biomass: f64,
}

impl Default for BioremediationState {
    fn default() -> Self {
        Self {
            cyanide: 0.0,
            ammonia: 0.0,
            biomass: 1.0,
            nitrifier_biomass: 1.0,
        }
    }
}

impl From<BioremediationState> for Vec<f64> {
    fn from(state: BioremediationState) -> Self {
        vec![
            state.cyanide,
            state.ammonia,
            state.biomass,
            state.nitrifier_biomass,
        ]
    }
}
