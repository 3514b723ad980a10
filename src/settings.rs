use std::path::Path;

use config::Config as eConfig;
use eyre::{Result, WrapErr};
use serde_derive::{Deserialize, Serialize};

use crate::analysis::MAX_DECIMALS;
use crate::error::SimulationError;
use crate::model::{Compartment, Parameters, State};
use crate::output::OutputFolder;
use crate::simulator::{Scenario, TimeGrid};

/// Settings for a single simulation run
///
/// Every section has defaults reproducing the reference scenario, so a configuration file only
/// needs to list the values it changes. See [read] for the file format.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub parameters: Parameters,
    pub initial: State,
    pub grid: Grid,
    pub analysis: Analysis,
    pub solver: Solver,
    pub log: Log,
    pub output: Output,
}

/// Evenly spaced sampling of the simulated horizon, in days
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Grid {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            start: 0.0,
            end: 150.0,
            points: 50,
        }
    }
}

impl Grid {
    pub fn time_grid(&self) -> TimeGrid {
        TimeGrid::linspace(self.start, self.end, self.points)
    }
}

/// Which compartment is summarised, and the level it must fall back to
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Analysis {
    pub compartment: Compartment,
    pub threshold: f64,
    /// Decimal places the series is rounded to before comparing against `threshold`
    pub decimals: u32,
}

impl Default for Analysis {
    fn default() -> Self {
        Analysis {
            compartment: Compartment::Infectious,
            threshold: default_threshold(),
            decimals: default_decimals(),
        }
    }
}

/// Tolerances of the adaptive Runge-Kutta solver
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Solver {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            rtol: default_tolerance(),
            atol: default_tolerance(),
        }
    }
}

impl Solver {
    pub fn validate(&self) -> std::result::Result<(), SimulationError> {
        if !(self.rtol > 0.0 && self.rtol.is_finite() && self.atol > 0.0 && self.atol.is_finite())
        {
            return Err(SimulationError::Validation(format!(
                "solver tolerances must be positive, got rtol = {} and atol = {}",
                self.rtol, self.atol
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Log {
    pub level: String,
    /// Also write the log to `file` inside the output folder
    pub write: bool,
    pub file: String,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: default_log_level(),
            write: false,
            file: "log.txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Output {
    pub write: bool,
    pub path: String,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            write: true,
            path: "outputs/".to_string(),
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// The scenario described by these settings
    pub fn scenario(&self) -> Scenario {
        Scenario::new(self.parameters, self.initial, self.grid.time_grid())
    }

    /// Checks the scenario, the analysis threshold and the solver tolerances
    pub fn validate(&self) -> std::result::Result<(), SimulationError> {
        self.scenario().validate()?;
        self.solver.validate()?;
        if !self.analysis.threshold.is_finite() {
            return Err(SimulationError::Validation(format!(
                "analysis threshold must be finite, got {}",
                self.analysis.threshold
            )));
        }
        if self.analysis.decimals > MAX_DECIMALS {
            return Err(SimulationError::Validation(format!(
                "analysis decimals must be at most {}, got {}",
                MAX_DECIMALS, self.analysis.decimals
            )));
        }
        Ok(())
    }

    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = parameters;
    }

    pub fn set_initial(&mut self, initial: State) {
        self.initial = initial;
    }

    pub fn set_grid(&mut self, start: f64, end: f64, points: usize) {
        self.grid = Grid { start, end, points };
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.analysis.threshold = threshold;
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output.path = path.into();
    }

    pub fn set_write(&mut self, write: bool) {
        self.output.write = write;
    }

    pub fn set_log_level(&mut self, level: impl Into<String>) {
        self.log.level = level.into();
    }

    /// Writes the effective settings to `settings.json` in the output folder
    pub fn write(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        let (mut file, _) = OutputFolder::open(&self.output.path)?.create("settings.json")?;
        std::io::Write::write_all(&mut file, serialized.as_bytes())
            .wrap_err("Failed to write settings.json")?;
        Ok(())
    }
}

/// Typed construction of [Settings] in code
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parameters(mut self, parameters: Parameters) -> Self {
        self.settings.parameters = parameters;
        self
    }

    pub fn set_initial(mut self, initial: State) -> Self {
        self.settings.initial = initial;
        self
    }

    pub fn set_grid(mut self, start: f64, end: f64, points: usize) -> Self {
        self.settings.set_grid(start, end, points);
        self
    }

    pub fn set_analysis(mut self, compartment: Compartment, threshold: f64, decimals: u32) -> Self {
        self.settings.analysis = Analysis {
            compartment,
            threshold,
            decimals,
        };
        self
    }

    pub fn set_solver(mut self, rtol: f64, atol: f64) -> Self {
        self.settings.solver = Solver { rtol, atol };
        self
    }

    pub fn set_output(mut self, write: bool, path: impl Into<String>) -> Self {
        self.settings.output = Output {
            write,
            path: path.into(),
        };
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Reads settings from a TOML file, overlaid with `SEIRD_` environment variables
///
/// Nested keys are separated by a double underscore, e.g. `SEIRD_PARAMETERS__RB=0.5`
/// overrides `rb` in the `[parameters]` table.
///
/// ```toml
/// [parameters]
/// rb = 0.8
/// epsilon = 0.2
/// gamma = 0.1
/// delta = 0.05
///
/// [initial]
/// susceptible = 999
/// infectious = 1
///
/// [grid]
/// start = 0
/// end = 150
/// points = 50
/// ```
pub fn read(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();

    let parsed = eConfig::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix("SEIRD")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .wrap_err_with(|| format!("Failed to read settings from {}", path.display()))?;

    let settings: Settings = parsed
        .try_deserialize()
        .wrap_err_with(|| format!("Failed to parse settings in {}", path.display()))?;
    settings.validate()?;

    Ok(settings)
}

// *********************************
// Default values for deserializing
// *********************************
fn default_threshold() -> f64 {
    10.0
}

fn default_decimals() -> u32 {
    2
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_log_level() -> String {
    "info".to_string()
}
