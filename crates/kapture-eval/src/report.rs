use std::fmt;

use kapture_core::RecordKey;
use serde::{Deserialize, Serialize};

use crate::Bin;

/// Errors of one ground-truth frame that has an estimated pose.
///
/// An axis is `None` when either pose lacks the parts needed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameError {
    pub key: RecordKey,
    /// Distance between estimated and true device positions.
    pub translation: Option<f64>,
    /// Angle of the relative rotation, in degrees within `[0, 180]`.
    pub rotation_deg: Option<f64>,
}

/// A (translation, rotation) pair of statistics, each computed on its own
/// axis over the frames where that error is available.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorStats {
    pub translation: Option<f64>,
    pub rotation_deg: Option<f64>,
}

/// Aggregate error statistics over found frames.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: ErrorStats,
    pub median: ErrorStats,
    /// Frame with the smallest translation error.
    pub min: Option<FrameError>,
    /// Frame with the largest translation error.
    pub max: Option<FrameError>,
}

/// Pass rates of one bin, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinResult {
    pub bin: Bin,
    /// Share of found frames passing the bin.
    pub found_rate: f64,
    /// Share of all ground-truth frames passing the bin; missing frames fail.
    pub all_rate: f64,
}

/// Outcome of [`evaluate`](crate::evaluate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Number of ground-truth frames.
    pub total_frames: usize,
    /// Ground-truth frames with an estimated pose.
    pub found_frames: usize,
    /// Percentage of ground-truth frames with an evaluable position.
    pub position_found_rate: f64,
    /// Percentage of ground-truth frames with an evaluable rotation.
    pub rotation_found_rate: f64,
    /// Per-frame errors of found frames, in key order.
    pub frames: Vec<FrameError>,
    pub statistics: Statistics,
    pub bins: Vec<BinResult>,
}

impl Report {
    /// Ground-truth frames without an estimate.
    pub fn missing_frames(&self) -> usize {
        self.total_frames - self.found_frames
    }
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}{unit}"))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "found {} / {} frames, positions {:.2}%, rotations {:.2}%",
            self.found_frames, self.total_frames, self.position_found_rate, self.rotation_found_rate
        )?;
        let s = &self.statistics;
        writeln!(
            f,
            "mean: {} {}",
            fmt_opt(s.mean.translation, "m"),
            fmt_opt(s.mean.rotation_deg, "deg")
        )?;
        writeln!(
            f,
            "median: {} {}",
            fmt_opt(s.median.translation, "m"),
            fmt_opt(s.median.rotation_deg, "deg")
        )?;
        for (label, frame) in [("min", &s.min), ("max", &s.max)] {
            if let Some(frame) = frame {
                writeln!(
                    f,
                    "{label}: {} {} at {}",
                    fmt_opt(frame.translation, "m"),
                    fmt_opt(frame.rotation_deg, "deg"),
                    frame.key
                )?;
            }
        }
        for b in &self.bins {
            writeln!(
                f,
                "({}m, {}deg): {:.2}% of found, {:.2}% of all",
                b.bin.max_translation, b.bin.max_rotation_deg, b.found_rate, b.all_rate
            )?;
        }
        Ok(())
    }
}
