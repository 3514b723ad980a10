use std::fs::{create_dir_all, File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use eyre::{Result, WrapErr};
use serde_derive::Serialize;

use crate::analysis::Summary;
use crate::simulator::Trajectory;

/// The folder every output of a run is written to
///
/// The directory tree is created once, when the folder is opened. Each [OutputFolder::create]
/// then truncates or creates a single file inside it.
#[derive(Debug, Clone)]
pub struct OutputFolder {
    root: PathBuf,
}

impl OutputFolder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        create_dir_all(&root)
            .wrap_err_with(|| format!("Failed to create output folder {:?}", root))?;
        Ok(OutputFolder { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates `name` inside the folder, returning the open file and its path
    pub fn create(&self, name: &str) -> Result<(File, PathBuf)> {
        let path = self.root.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .wrap_err_with(|| format!("Failed to open file: {:?}", path))?;
        Ok((file, path))
    }
}

/// Writes the trajectory to `trajectory.csv`, one row per time point
///
/// Columns: `time, susceptible, exposed, infectious, recovered, deaths, total`. The file is meant
/// to be handed to a plotting tool; `total` should stay flat at the initial population.
pub fn write_trajectory(trajectory: &Trajectory, folder: &str) -> Result<PathBuf> {
    tracing::debug!("Writing trajectory...");

    #[derive(Debug, Clone, Serialize)]
    struct Row {
        time: f64,
        susceptible: f64,
        exposed: f64,
        infectious: f64,
        recovered: f64,
        deaths: f64,
        total: f64,
    }

    let (file, path) = OutputFolder::open(folder)?.create("trajectory.csv")?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for (time, state) in trajectory.iter() {
        writer.serialize(Row {
            time,
            susceptible: state.s,
            exposed: state.e,
            infectious: state.i,
            recovered: state.r,
            deaths: state.d,
            total: state.total(),
        })?;
    }
    writer.flush()?;

    tracing::debug!("Trajectory written to {:?}", path);
    Ok(path)
}

/// Writes the summary to `summary.json`
pub fn write_summary(summary: &Summary, folder: &str) -> Result<PathBuf> {
    let (file, path) = OutputFolder::open(folder)?.create("summary.json")?;
    serde_json::to_writer_pretty(file, summary).wrap_err("Failed to write summary.json")?;
    Ok(path)
}
