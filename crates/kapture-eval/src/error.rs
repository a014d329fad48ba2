use kapture_core::PoseConvention;
use thiserror::Error;

/// Errors that can occur while evaluating a trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// The estimate is non-empty but shares no (timestamp, sensor) key with
    /// the ground truth.
    #[error("estimated and ground-truth trajectories share no frame")]
    FrameMismatch,
    #[error("ground-truth trajectory is empty")]
    EmptyGroundTruth,
    #[error("estimated poses are {estimated:?}, ground truth is {ground_truth:?}")]
    ConventionMismatch {
        estimated: PoseConvention,
        ground_truth: PoseConvention,
    },
    #[error("bin #{index} is invalid: {reason}")]
    InvalidBin { index: usize, reason: String },
}
