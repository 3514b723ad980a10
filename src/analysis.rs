use ndarray::Array1;
use ndarray_stats::QuantileExt;
use serde_derive::Serialize;

use crate::error::{Result, SimulationError};
use crate::model::Compartment;
use crate::settings::Analysis;
use crate::simulator::Trajectory;

/// Maximum of a compartment, located on the time grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub index: usize,
    pub time: f64,
    pub value: f64,
}

/// Outcome of a threshold scan
///
/// `NotFound` is a regular result: the series never reached the threshold within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Crossing {
    Found { index: usize, time: f64, value: f64 },
    NotFound,
}

impl Crossing {
    pub fn time(&self) -> Option<f64> {
        match self {
            Crossing::Found { time, .. } => Some(*time),
            Crossing::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Crossing::Found { .. })
    }
}

/// Locates the maximum of `compartment`
///
/// The time is read from the grid at the arg-max index. Ties resolve to the earliest sample.
pub fn peak(trajectory: &Trajectory, compartment: Compartment) -> Result<Peak> {
    let series = trajectory.compartment(compartment);
    let index = series.argmax().map_err(|e| {
        SimulationError::Analysis(format!(
            "cannot locate the peak of {}: {}",
            compartment.label(),
            e
        ))
    })?;
    Ok(Peak {
        index,
        time: trajectory.times()[index],
        value: series[index],
    })
}

pub fn peak_value(trajectory: &Trajectory, compartment: Compartment) -> Result<f64> {
    Ok(peak(trajectory, compartment)?.value)
}

pub fn peak_time(trajectory: &Trajectory, compartment: Compartment) -> Result<f64> {
    Ok(peak(trajectory, compartment)?.time)
}

/// Largest number of decimal places a series can be rounded to
///
/// f64 carries about 15 significant decimal digits, and `10^decimals` overflows past 308.
pub const MAX_DECIMALS: u32 = 15;

pub fn check_decimals(decimals: u32) -> Result<()> {
    if decimals > MAX_DECIMALS {
        return Err(SimulationError::Analysis(format!(
            "cannot round to {} decimal places, at most {} are supported",
            decimals, MAX_DECIMALS
        )));
    }
    Ok(())
}

/// Rounds half away from zero to `decimals` places
///
/// `decimals` above [MAX_DECIMALS] are treated as [MAX_DECIMALS].
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * factor).round() / factor
}

/// The series of `compartment`, rounded to `decimals` places
pub fn rounded(trajectory: &Trajectory, compartment: Compartment, decimals: u32) -> Array1<f64> {
    trajectory
        .compartment(compartment)
        .mapv(|value| round_to(value, decimals))
}

/// First sample at or after `from_index` whose rounded value is `<= threshold`
pub fn first_at_or_below(
    trajectory: &Trajectory,
    compartment: Compartment,
    threshold: f64,
    decimals: u32,
    from_index: usize,
) -> Result<Crossing> {
    check_decimals(decimals)?;
    let series = trajectory.compartment(compartment);
    Ok(series
        .iter()
        .enumerate()
        .skip(from_index)
        .map(|(index, value)| (index, round_to(*value, decimals)))
        .find(|(_, value)| *value <= threshold)
        .map_or(Crossing::NotFound, |(index, value)| Crossing::Found {
            index,
            time: trajectory.times()[index],
            value,
        }))
}

/// Scan for the fall back to `threshold`, starting right after an already located peak
pub fn crossing_after_peak(
    trajectory: &Trajectory,
    peak: &Peak,
    compartment: Compartment,
    threshold: f64,
    decimals: u32,
) -> Result<Crossing> {
    first_at_or_below(trajectory, compartment, threshold, decimals, peak.index + 1)
}

/// First time after the peak at which `compartment` falls back to `threshold` or below
///
/// Values are rounded to `decimals` places before the comparison. Samples up to and including
/// the peak are skipped, so the initial rise through the threshold is never reported.
pub fn threshold_crossing(
    trajectory: &Trajectory,
    compartment: Compartment,
    threshold: f64,
    decimals: u32,
) -> Result<Crossing> {
    let peak = peak(trajectory, compartment)?;
    crossing_after_peak(trajectory, &peak, compartment, threshold, decimals)
}

/// Scalar summary of one compartment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub compartment: Compartment,
    pub peak: Peak,
    pub threshold: f64,
    pub decimals: u32,
    pub crossing: Crossing,
}

pub fn summarize(trajectory: &Trajectory, analysis: &Analysis) -> Result<Summary> {
    let peak = peak(trajectory, analysis.compartment)?;
    let crossing = crossing_after_peak(
        trajectory,
        &peak,
        analysis.compartment,
        analysis.threshold,
        analysis.decimals,
    )?;
    tracing::debug!(
        "Rounded {} series: {}",
        analysis.compartment.label(),
        rounded(trajectory, analysis.compartment, analysis.decimals)
    );
    Ok(Summary {
        compartment: analysis.compartment,
        peak,
        threshold: analysis.threshold,
        decimals: analysis.decimals,
        crossing,
    })
}
