//! Visualization and export.
//!
//! - Render commands: platform-agnostic animation frames ([`render`])
//! - Export pipeline: CSV and JSON Lines, one artifact per run
//!
//! # Example
//!
//! ```rust
//! use physdemo::visualization::{Exporter, ExportFormat};
//!
//! let exporter = Exporter::new(ExportFormat::Csv);
//! assert_eq!(exporter.format(), ExportFormat::Csv);
//! ```

pub mod render;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::bloch::Trajectory;
use crate::domains::monte_carlo::Sample;
use crate::error::{SimError, SimResult};

pub use render::{
    render_bloch_animation, render_bloch_frame, render_pi_animation, render_pi_frame, Color,
    RenderCommand, RenderFrame, View3,
};

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// JSON Lines of the raw data.
    #[serde(alias = "jsonl")]
    JsonLines,
    /// JSON Lines of rendered animation frames.
    Frames,
}

impl ExportFormat {
    /// Short name as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::JsonLines => "jsonl",
            Self::Frames => "frames",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json_lines" | "jsonlines" => Ok(Self::JsonLines),
            "frames" => Ok(Self::Frames),
            other => Err(SimError::invalid_argument(
                "format",
                format!("unknown format '{other}' (expected csv, jsonl or frames)"),
            )),
        }
    }
}

#[derive(Serialize)]
struct SampleRecord<'a> {
    index: usize,
    #[serde(flatten)]
    sample: &'a Sample,
}

#[derive(Serialize)]
struct StateRecord {
    time: f64,
    s1: f64,
    s2: f64,
    s3: f64,
}

/// Writes simulation output to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create an exporter for `format`.
    #[must_use]
    pub const fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Configured format.
    #[must_use]
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Export π samples in the configured format.
    ///
    /// `Frames` renders `frame_count` scatter frames first.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or file operations fail.
    pub fn export_samples(&self, samples: &[Sample], frame_count: usize, path: &Path) -> SimResult<()> {
        match self.format {
            ExportFormat::Csv => Self::samples_to_csv(samples, path),
            ExportFormat::JsonLines => {
                let records = samples
                    .iter()
                    .enumerate()
                    .map(|(index, sample)| SampleRecord { index, sample });
                Self::to_json_lines(records, path)
            }
            ExportFormat::Frames => {
                Self::to_json_lines(render_pi_animation(samples, frame_count)?, path)
            }
        }
    }

    /// Export a Bloch trajectory in the configured format.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or file operations fail.
    pub fn export_trajectory(&self, trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        match self.format {
            ExportFormat::Csv => Self::trajectory_to_csv(trajectory, path),
            ExportFormat::JsonLines => Self::to_json_lines(
                trajectory.iter().map(|(time, s)| StateRecord {
                    time,
                    s1: s.s1,
                    s2: s.s2,
                    s3: s.s3,
                }),
                path,
            ),
            ExportFormat::Frames => Self::to_json_lines(render_bloch_animation(trajectory)?, path),
        }
    }

    /// Write samples as CSV (`index,x,y,estimate`).
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn samples_to_csv(samples: &[Sample], path: &Path) -> SimResult<()> {
        let mut writer = create(path)?;
        writeln!(writer, "index,x,y,estimate")
            .map_err(|e| SimError::io(format!("Write header failed: {e}")))?;
        for (i, s) in samples.iter().enumerate() {
            writeln!(writer, "{i},{},{},{}", s.x, s.y, s.estimate)
                .map_err(|e| SimError::io(format!("Write data failed: {e}")))?;
        }
        finish(writer, samples.len(), path)
    }

    /// Write a trajectory as CSV (`time,s1,s2,s3`).
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn trajectory_to_csv(trajectory: &Trajectory, path: &Path) -> SimResult<()> {
        let mut writer = create(path)?;
        writeln!(writer, "time,s1,s2,s3")
            .map_err(|e| SimError::io(format!("Write header failed: {e}")))?;
        for (t, s) in trajectory.iter() {
            writeln!(writer, "{t},{},{},{}", s.s1, s.s2, s.s3)
                .map_err(|e| SimError::io(format!("Write data failed: {e}")))?;
        }
        finish(writer, trajectory.len(), path)
    }

    /// Write any serializable records as JSON Lines.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file operations fail.
    pub fn to_json_lines<I>(records: I, path: &Path) -> SimResult<()>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let mut writer = create(path)?;
        let mut count = 0;
        for record in records {
            let json = serde_json::to_string(&record)
                .map_err(|e| SimError::serialization(format!("JSON serialization failed: {e}")))?;
            writeln!(writer, "{json}").map_err(|e| SimError::io(format!("Write failed: {e}")))?;
            count += 1;
        }
        finish(writer, count, path)
    }
}

fn create(path: &Path) -> SimResult<BufWriter<File>> {
    let file = File::create(path)
        .map_err(|e| SimError::io(format!("Failed to create {}: {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn finish(mut writer: BufWriter<File>, records: usize, path: &Path) -> SimResult<()> {
    writer
        .flush()
        .map_err(|e| SimError::io(format!("Flush failed: {e}")))?;
    debug!(records, path = %path.display(), "export complete");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
