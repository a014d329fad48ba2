//! Dataset-level workflows.
//!
//! Thin glue over the algorithm crates: they pick the relevant parts of a
//! [`Dataset`], call the typed API and attach context to failures.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kapture_core::{Dataset, EntityKind};
use kapture_eval::{evaluate, EvaluationOptions, Report};
use kapture_merge::{merge_with_summary, MergeOptions};
use kapture_retrieval::{generate_pairs, ImagePairScore, PairingOptions};
use log::{debug, info};
use serde::de::DeserializeOwned;

/// Merge `datasets` in order into a new dataset.
pub fn merge_datasets(datasets: &[&Dataset], options: &MergeOptions) -> Result<Dataset> {
    let (merged, summary) = merge_with_summary(datasets, options)
        .with_context(|| format!("merging {} datasets", datasets.len()))?;
    for kind in EntityKind::ALL {
        let dedup = summary.deduplicated(kind);
        if dedup > 0 {
            debug!("{kind}: {} inserted, {dedup} shared", summary.inserted(kind));
        }
    }
    Ok(merged)
}

/// Image pairs between the global features of `mapping` and `query`.
///
/// Without `query`, mapping images are paired among themselves.
pub fn pairs_from_datasets(
    mapping: &Dataset,
    query: Option<&Dataset>,
    options: &PairingOptions,
) -> Result<Vec<ImagePairScore>> {
    let mapping_features = mapping
        .global_features()
        .context("mapping dataset has no global features")?;
    let query_features = match query {
        Some(ds) => ds
            .global_features()
            .context("query dataset has no global features")?,
        None => mapping_features,
    };
    if query_features.feature_type() != mapping_features.feature_type() {
        anyhow::bail!(
            "global feature types differ: mapping `{}`, query `{}`",
            mapping_features.feature_type().name,
            query_features.feature_type().name
        );
    }
    let pairs = generate_pairs(mapping_features, query_features, options)
        .context("generating image pairs")?;
    info!("{} image pairs", pairs.len());
    Ok(pairs)
}

/// Evaluate the poses of `estimated` against those of `ground_truth`.
///
/// Rig poses of both datasets are first expanded to their member sensors.
pub fn evaluate_datasets(
    estimated: &Dataset,
    ground_truth: &Dataset,
    options: &EvaluationOptions,
) -> Result<Report> {
    let estimated = estimated
        .expand_rigs()
        .context("expanding rig poses of the estimate")?;
    let ground_truth = ground_truth
        .expand_rigs()
        .context("expanding rig poses of the ground truth")?;
    evaluate(estimated.trajectory(), ground_truth.trajectory(), options)
        .context("evaluating trajectory")
}

/// Deserialize a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

/// Options from an optional JSON file; defaults when no file is given.
pub fn options_from_json<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => load_json(path),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kapture_core::synthetic::scene::{self, SceneSpec};
    use kapture_core::{FeatureArray, FeatureType};

    #[test]
    fn missing_global_features_are_reported() {
        let ds = scene::dataset(&SceneSpec::new("m", &["cam0"], 0..2)).unwrap();
        let err = pairs_from_datasets(&ds, None, &PairingOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no global features"));
    }

    #[test]
    fn differing_feature_types_are_rejected() {
        let mut mapping = scene::dataset(&SceneSpec::new("m", &["cam0"], 0..2)).unwrap();
        scene::add_random_global_features(&mut mapping, 4, 0).unwrap();
        let mut query = scene::dataset(&SceneSpec::new("q", &["cam0"], 0..1)).unwrap();
        query
            .add_global_feature(
                &FeatureType::new("other", "float32", 4),
                "q/cam0/0000.jpg",
                FeatureArray::single(vec![0.5; 4]),
            )
            .unwrap();
        assert!(pairs_from_datasets(&mapping, Some(&query), &PairingOptions::default()).is_err());
    }

    #[test]
    fn absent_options_file_gives_defaults() {
        let opts: EvaluationOptions = options_from_json(None).unwrap();
        assert_eq!(opts, EvaluationOptions::default());
        let err = load_json::<MergeOptions>(Path::new("/nonexistent/merge.json")).unwrap_err();
        assert!(err.to_string().starts_with("reading"));
    }
}
