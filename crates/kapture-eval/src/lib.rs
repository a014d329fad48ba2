//! Localization accuracy evaluation.
//!
//! [`evaluate`] measures, for every ground-truth frame, the position and
//! orientation error of the estimated pose and summarises them as found
//! rates, per-threshold pass rates and error statistics.
//!
//! ```
//! use kapture_core::synthetic::scene::{self, SceneSpec};
//! use kapture_eval::{evaluate, EvaluationOptions};
//!
//! let truth = scene::trajectory(&SceneSpec::new("seq", &["cam0"], 0..10)).unwrap();
//! let report = evaluate(&truth, &truth, &EvaluationOptions::default()).unwrap();
//! assert_eq!(report.position_found_rate, 100.0);
//! assert!(report.bins.iter().all(|b| b.all_rate == 100.0));
//! ```

mod error;
mod evaluate;
mod options;
mod report;

pub use error::*;
pub use evaluate::evaluate;
pub use options::*;
pub use report::*;
