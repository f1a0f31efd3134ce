//! Information display module for reactors and simulation results
//!
//! This module implements [`Display`] for [`Reactor`], [`ExtractedSeries`] and
//! [`Trajectory`], rendering parameter sets and run summaries as tables.

use std::fmt::{self, Display};

use itertools::{Itertools, MinMaxResult};
use tabled::{builder::Builder, settings::Style};

use crate::models::reactor::Reactor;
use crate::simulation::{
    output::{ExtractedSeries, NamedSeries},
    result::{NegativeExcursion, Trajectory},
};

/// Trait for converting result components to table records
trait TableRecord {
    /// Get the column headers for the table
    fn columns() -> Vec<String>;

    /// Convert the instance to a record for display in a table
    fn to_record(&self) -> Vec<String>;
}

impl Display for Reactor {
    /// Formats the reactor as a two-column parameter table.
    ///
    /// Per-species parameters of the multi-species model are shown as lists.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec!["Parameter".to_string(), "Value".to_string()]);

        let json = serde_json::to_value(self).map_err(|_| fmt::Error)?;
        if let Some(parameters) = json.get("parameters").and_then(|p| p.as_object()) {
            for (name, value) in parameters {
                builder.push_record(vec![name.clone(), value.to_string()]);
            }
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        write!(f, "{} reactor\n{}", self.kind(), table)
    }
}

impl Display for ExtractedSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec![format!("{} simulation", self.model)]);

        if let (Some(t0), Some(t1)) = (self.time.first(), self.time.last()) {
            builder.push_record(vec![format!(
                "{} points from t = {} to t = {}",
                self.time.len(),
                t0,
                t1
            )]);
        }

        let series: Vec<&NamedSeries> = self.series().collect();
        builder.push_record(vec![to_table(&series)]);

        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{}", table)
    }
}

impl Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec![format!("Trajectory ({} samples)", self.len())]);
        builder.push_record(vec![self.stats.to_string()]);

        if !self.excursions.is_empty() {
            builder.push_record(vec!["Negative excursions".to_string()]);
            builder.push_record(vec![to_table(&self.excursions)]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{}", table)
    }
}

/// Converts a collection of TableRecord implementors to a formatted table string
fn to_table<T: TableRecord>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn format_value(value: f64) -> String {
    format!("{value:.4}")
}

impl TableRecord for &NamedSeries {
    fn columns() -> Vec<String> {
        ["Series", "Initial", "Final", "Min", "Max"]
            .iter()
            .map(|column| column.to_string())
            .collect()
    }

    fn to_record(&self) -> Vec<String> {
        let (min, max) = match self.values.iter().copied().minmax() {
            MinMaxResult::NoElements => (f64::NAN, f64::NAN),
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let first = self.values.first().copied().unwrap_or(f64::NAN);
        let last = self.last().unwrap_or(f64::NAN);

        vec![
            self.name.clone(),
            format_value(first),
            format_value(last),
            format_value(min),
            format_value(max),
        ]
    }
}

impl TableRecord for NegativeExcursion {
    fn columns() -> Vec<String> {
        vec!["Component".to_string(), "Time".to_string(), "Value".to_string()]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.component.clone(),
            self.time.to_string(),
            format!("{:.3e}", self.value),
        ]
    }
}
