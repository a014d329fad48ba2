//! Per-frame errors and aggregate accuracy of an estimated trajectory.

use kapture_core::{relative_rotation_angle_deg, Pose, PoseConvention, RecordKey, Trajectory};
use log::{debug, info};

use crate::{
    BinResult, ErrorStats, EvaluationError, EvaluationOptions, FrameError, Report, Statistics,
};

/// Compare `estimated` against `ground_truth`, frame by frame.
///
/// Every ground-truth key is a frame. A frame without an estimate is not
/// found: it counts in the found-rate denominators and fails every bin in
/// [`BinResult::all_rate`], but takes no part in the error statistics.
/// Trajectories are compared as they are; no alignment is estimated.
///
/// # Errors
///
/// - [`EvaluationError::InvalidBin`] for a malformed threshold,
/// - [`EvaluationError::EmptyGroundTruth`] when there is nothing to compare to,
/// - [`EvaluationError::ConventionMismatch`] when the trajectories use
///   different pose conventions,
/// - [`EvaluationError::FrameMismatch`] when a non-empty estimate shares no
///   frame with the ground truth.
pub fn evaluate(
    estimated: &Trajectory,
    ground_truth: &Trajectory,
    options: &EvaluationOptions,
) -> Result<Report, EvaluationError> {
    options.validate()?;
    if ground_truth.is_empty() {
        return Err(EvaluationError::EmptyGroundTruth);
    }
    if estimated.convention() != ground_truth.convention() {
        return Err(EvaluationError::ConventionMismatch {
            estimated: estimated.convention(),
            ground_truth: ground_truth.convention(),
        });
    }
    let convention = ground_truth.convention();

    let mut frames = Vec::new();
    let mut missing = 0usize;
    for (key, truth) in ground_truth.iter() {
        match estimated.get(key) {
            Some(estimate) => frames.push(frame_error(key, estimate, truth, convention)),
            None => {
                debug!("no estimate for frame {key}");
                missing += 1;
            }
        }
    }
    if frames.is_empty() && !estimated.is_empty() {
        return Err(EvaluationError::FrameMismatch);
    }

    let total = ground_truth.len();
    let found = frames.len();
    let with_position = frames.iter().filter(|f| f.translation.is_some()).count();
    let with_rotation = frames.iter().filter(|f| f.rotation_deg.is_some()).count();

    let bins = options
        .bins
        .iter()
        .map(|bin| {
            let passed = frames
                .iter()
                .filter(|f| bin.accepts(f.translation, f.rotation_deg))
                .count();
            BinResult {
                bin: *bin,
                found_rate: percent(passed, found),
                all_rate: percent(passed, total),
            }
        })
        .collect();

    let report = Report {
        total_frames: total,
        found_frames: found,
        position_found_rate: percent(with_position, total),
        rotation_found_rate: percent(with_rotation, total),
        statistics: statistics(&frames),
        frames,
        bins,
    };
    info!(
        "evaluated {total} frames: {found} found, {missing} missing, {:.1}% with position",
        report.position_found_rate
    );
    Ok(report)
}

fn frame_error(key: &RecordKey, estimate: &Pose, truth: &Pose, convention: PoseConvention) -> FrameError {
    let translation = estimate
        .device_position(convention)
        .zip(truth.device_position(convention))
        .map(|(e, t)| (e - t).norm());
    let rotation_deg = estimate
        .rotation
        .zip(truth.rotation)
        .map(|(e, t)| relative_rotation_angle_deg(&e, &t));
    FrameError {
        key: key.clone(),
        translation,
        rotation_deg,
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

fn statistics(frames: &[FrameError]) -> Statistics {
    let translations: Vec<f64> = frames.iter().filter_map(|f| f.translation).collect();
    let rotations: Vec<f64> = frames.iter().filter_map(|f| f.rotation_deg).collect();

    // first frame wins ties
    let mut min: Option<&FrameError> = None;
    let mut max: Option<&FrameError> = None;
    for frame in frames {
        let Some(t) = frame.translation else { continue };
        if min.and_then(|m| m.translation).map_or(true, |m| t < m) {
            min = Some(frame);
        }
        if max.and_then(|m| m.translation).map_or(true, |m| t > m) {
            max = Some(frame);
        }
    }

    Statistics {
        mean: ErrorStats {
            translation: mean(&translations),
            rotation_deg: mean(&rotations),
        },
        median: ErrorStats {
            translation: median(translations),
            rotation_deg: median(rotations),
        },
        min: min.cloned(),
        max: max.cloned(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value; the mean of the two middle values for even counts.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    })
}
