use serde::{Deserialize, Serialize};

use crate::EvaluationError;

/// Accuracy threshold: a frame passes when its translation error is at most
/// `max_translation` and its rotation error at most `max_rotation_deg`.
///
/// A negative `max_rotation_deg` disables the rotation check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub max_translation: f64,
    pub max_rotation_deg: f64,
}

impl Bin {
    pub const fn new(max_translation: f64, max_rotation_deg: f64) -> Self {
        Self {
            max_translation,
            max_rotation_deg,
        }
    }

    /// Bin that only looks at the translation error.
    pub const fn translation_only(max_translation: f64) -> Self {
        Self::new(max_translation, -1.0)
    }

    pub fn ignores_rotation(&self) -> bool {
        self.max_rotation_deg < 0.0
    }

    /// Whether errors `(translation, rotation)` pass this bin. A missing
    /// error fails unless its check is disabled.
    pub fn accepts(&self, translation: Option<f64>, rotation_deg: Option<f64>) -> bool {
        let t_ok = translation.is_some_and(|t| t <= self.max_translation);
        let r_ok = self.ignores_rotation() || rotation_deg.is_some_and(|r| r <= self.max_rotation_deg);
        t_ok && r_ok
    }
}

/// Options for [`evaluate`](crate::evaluate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Thresholds reported in the given order.
    pub bins: Vec<Bin>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            bins: vec![Bin::new(0.25, 2.0), Bin::new(0.5, 5.0), Bin::new(5.0, 10.0)],
        }
    }
}

impl EvaluationOptions {
    pub fn with_bins(bins: impl IntoIterator<Item = Bin>) -> Self {
        Self {
            bins: bins.into_iter().collect(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), EvaluationError> {
        for (index, bin) in self.bins.iter().enumerate() {
            let reason = if bin.max_translation.is_nan() || bin.max_translation < 0.0 {
                "translation threshold must be a non-negative number"
            } else if bin.max_rotation_deg.is_nan() {
                "rotation threshold is NaN"
            } else {
                continue;
            };
            return Err(EvaluationError::InvalidBin {
                index,
                reason: reason.to_string(),
            });
        }
        Ok(())
    }
}
