//! Options passed across the boundary to external tools.
//!
//! Adapters towards reconstruction tools get an explicit structure listing
//! the options we recognise, plus an ordered list of extra key/value tokens
//! forwarded verbatim. Nothing else is forwarded.

use serde::{Deserialize, Serialize};

/// How record files are brought into a dataset directory by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferAction {
    /// Leave files where they are.
    Skip,
    #[default]
    Copy,
    Move,
    LinkAbsolute,
    LinkRelative,
}

impl TransferAction {
    pub fn name(self) -> &'static str {
        match self {
            TransferAction::Skip => "skip",
            TransferAction::Copy => "copy",
            TransferAction::Move => "move",
            TransferAction::LinkAbsolute => "link_absolute",
            TransferAction::LinkRelative => "link_relative",
        }
    }
}

/// Options for an adapter invocation.
///
/// # Example
///
/// ```
/// use kapture_core::{AdapterOptions, TransferAction};
///
/// let opts = AdapterOptions {
///     force_overwrite_existing: true,
///     transfer: TransferAction::LinkRelative,
///     extra: vec![("--SiftExtraction.use_gpu".into(), "0".into())],
///     ..Default::default()
/// };
/// assert_eq!(
///     opts.to_tokens(),
///     ["--force", "--transfer", "link_relative", "--SiftExtraction.use_gpu", "0"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// Overwrite files already present at the destination.
    pub force_overwrite_existing: bool,
    /// How record files are transferred.
    pub transfer: TransferAction,
    /// Restrict the conversion to these sensor ids (all when empty).
    pub sensor_ids: Vec<String>,
    /// Opaque `(key, value)` tokens forwarded in order; an empty value
    /// forwards the key alone.
    pub extra: Vec<(String, String)>,
}

impl AdapterOptions {
    /// Render as an ordered command-line style token list.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        if self.force_overwrite_existing {
            tokens.push("--force".to_string());
        }
        if self.transfer != TransferAction::default() {
            tokens.push("--transfer".to_string());
            tokens.push(self.transfer.name().to_string());
        }
        for sensor in &self.sensor_ids {
            tokens.push("--sensor".to_string());
            tokens.push(sensor.clone());
        }
        for (key, value) in &self.extra {
            tokens.push(key.clone());
            if !value.is_empty() {
                tokens.push(value.clone());
            }
        }
        tokens
    }
}
