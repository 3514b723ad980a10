use std::time::Instant;

use eyre::{Result, WrapErr};

use crate::analysis::{summarize, Crossing, Summary};
use crate::logger;
use crate::output::{write_summary, write_trajectory};
use crate::settings::Settings;
use crate::simulator::{simulate, Scenario, Trajectory};

/// Trajectory and summary of one run, together with the scenario that produced them
#[derive(Debug, Clone)]
pub struct SimulationResult {
    scenario: Scenario,
    trajectory: Trajectory,
    summary: Summary,
}

impl SimulationResult {
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Logs peak value, peak day and threshold-crossing day
    pub fn report(&self) {
        let summary = &self.summary;
        let label = summary.compartment.label();
        tracing::info!("Peak {} population: {:.2}", label, summary.peak.value);
        tracing::info!("Day of peak {} population: {:.2}", label, summary.peak.time);
        match summary.crossing {
            Crossing::Found { time, value, .. } => tracing::info!(
                "{} population falls to {} or below on day {:.2} ({:.2})",
                label,
                summary.threshold,
                time,
                value
            ),
            Crossing::NotFound => tracing::info!(
                "{} population does not fall back to {} or below within the simulated horizon",
                label,
                summary.threshold
            ),
        }
    }

    /// Writes `trajectory.csv`, `summary.json` and `settings.json` to the output folder
    pub fn write_outputs(&self, settings: &Settings) -> Result<()> {
        let folder = &settings.output.path;
        tracing::debug!("Writing outputs to {:?}", folder);
        settings.write().wrap_err("Failed to write settings")?;
        write_trajectory(&self.trajectory, folder).wrap_err("Failed to write trajectory")?;
        write_summary(&self.summary, folder).wrap_err("Failed to write summary")?;
        Ok(())
    }
}

/// Primary entrypoint
///
/// Sets up logging, runs the scenario described by `settings`, reports the summary and writes the
/// output files when `output.write` is enabled.
pub fn run(settings: Settings) -> Result<SimulationResult> {
    let now = Instant::now();
    logger::setup_log(&settings)?;
    tracing::info!("Starting SEIRD simulation");

    match settings.output.write {
        true => tracing::info!("Output files will be written to {}", settings.output.path),
        false => tracing::info!(
            "Output files will not be written - set `write = true` in the [output] section to enable output files"
        ),
    }

    let result = match run_internal(&settings) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!("An error has occurred during the simulation: {}", err);
            return Err(err);
        }
    };
    result.report();

    if settings.output.write {
        result.write_outputs(&settings)?;
    }

    tracing::info!("Program complete after {:.2?}", now.elapsed());
    Ok(result)
}

/// Alternative entrypoint, primarily meant for third-party libraries
///
/// Does not configure logging and does not write any output files.
pub fn run_internal(settings: &Settings) -> Result<SimulationResult> {
    settings.validate()?;
    let scenario = settings.scenario();
    tracing::debug!(
        "Simulating {} grid points with parameters {:?}",
        scenario.grid.len(),
        scenario.parameters
    );

    let trajectory = simulate(&scenario, &settings.solver).wrap_err("Simulation failed")?;
    let summary = summarize(&trajectory, &settings.analysis).wrap_err("Analysis failed")?;

    Ok(SimulationResult {
        scenario,
        trajectory,
        summary,
    })
}
