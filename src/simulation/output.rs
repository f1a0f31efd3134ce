//! Output Module for Reactor Simulation Results
//!
//! This module turns the raw [`Trajectory`] of a run into the structure the
//! caller asked for. It defines the [`OutputFormat`] trait and the
//! [`ExtractedSeries`] bundle produced by the result extractor.
//!
//! # Key Components
//!
//! - [`OutputFormat`] trait: conversion target of [`crate::simulation::runner::simulate`]
//! - [`ExtractedSeries`]: named time series grouped into presentation panels
//! - [`SeriesPanel`], [`NamedSeries`], [`PanelGrid`]: the parts of the bundle
//!
//! The extraction itself is model specific and lives with each model, see
//! [`ReactorModel::extract`].

use serde::{Deserialize, Serialize};

use crate::models::reactor::ReactorModel;

use super::{error::SimulationError, result::Trajectory};

/// Trait to specify the output format of a simulation
pub trait OutputFormat: Sized {
    /// Creates the output from the trajectory produced for `model`
    fn create_output<M: ReactorModel + ?Sized>(
        trajectory: Trajectory,
        model: &M,
    ) -> Result<Self, SimulationError>;
}

impl OutputFormat for Trajectory {
    fn create_output<M: ReactorModel + ?Sized>(
        trajectory: Trajectory,
        _model: &M,
    ) -> Result<Self, SimulationError> {
        Ok(trajectory)
    }
}

impl OutputFormat for ExtractedSeries {
    fn create_output<M: ReactorModel + ?Sized>(
        trajectory: Trajectory,
        model: &M,
    ) -> Result<Self, SimulationError> {
        model.extract(&trajectory)
    }
}

/// One component over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    /// Stable identifier, e.g. `cyanide` or `species_2_biomass`
    pub name: String,
    /// Legend label including the unit
    pub label: String,
    pub values: Vec<f64>,
}

impl NamedSeries {
    pub fn new(name: &str, label: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            values,
        }
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// A group of series sharing one set of axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPanel {
    pub title: String,
    pub y_label: String,
    pub series: Vec<NamedSeries>,
}

/// Arrangement of the panels, filled row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelGrid {
    pub rows: usize,
    pub columns: usize,
}

impl PanelGrid {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Zero-based `(row, column)` of panel `index`
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }
}

/// Named series of a run, grouped into panels.
///
/// Every series has one value per entry of `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSeries {
    pub model: String,
    pub time: Vec<f64>,
    pub grid: PanelGrid,
    pub panels: Vec<SeriesPanel>,
}

impl ExtractedSeries {
    /// All series in panel order
    pub fn series(&self) -> impl Iterator<Item = &NamedSeries> {
        self.panels.iter().flat_map(|panel| panel.series.iter())
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series()
            .find(|series| series.name == name)
            .map(|series| series.values.as_slice())
    }

    pub fn names(&self) -> Vec<&str> {
        self.series().map(|series| series.name.as_str()).collect()
    }

    /// Value of every series at the last evaluation time
    pub fn final_values(&self) -> Vec<(&str, f64)> {
        self.series()
            .filter_map(|series| Some((series.name.as_str(), series.last()?)))
            .collect()
    }
}
