//! Union of several datasets into a freshly built one.
//!
//! Kinds are processed in dependency order and, within a kind, datasets in
//! input order. Every entry goes through the regular validating insertion of
//! [`Dataset`], so the result satisfies the same invariants as a dataset
//! built by hand. Inputs are only read.

use kapture_core::{Dataset, EntityKind};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{MergeConflictError, MergeError};

/// Options for [`merge`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Kinds dropped from every input before the union.
    pub excluded: BTreeSet<EntityKind>,
}

impl MergeOptions {
    pub fn excluding(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            excluded: kinds.into_iter().collect(),
        }
    }
}

/// Per-kind bookkeeping of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Entries copied into the output.
    pub inserted: BTreeMap<EntityKind, usize>,
    /// Entries found identical in an earlier input and skipped.
    pub deduplicated: BTreeMap<EntityKind, usize>,
    /// Kinds that were excluded.
    pub excluded: BTreeSet<EntityKind>,
}

impl MergeSummary {
    pub fn inserted(&self, kind: EntityKind) -> usize {
        self.inserted.get(&kind).copied().unwrap_or(0)
    }

    pub fn deduplicated(&self, kind: EntityKind) -> usize {
        self.deduplicated.get(&kind).copied().unwrap_or(0)
    }
}

/// Merge `datasets` into a new dataset.
///
/// # Errors
///
/// - [`MergeError::NoInput`] for an empty input sequence,
/// - [`MergeError::Conflict`] when two inputs carry different payloads for
///   the same identifier, different pose conventions or different feature
///   types,
/// - [`MergeError::Inconsistent`] when the union breaks a dataset invariant.
pub fn merge(datasets: &[&Dataset], options: &MergeOptions) -> Result<Dataset, MergeError> {
    merge_with_summary(datasets, options).map(|(ds, _)| ds)
}

/// Same as [`merge`], also returning what was inserted and deduplicated.
pub fn merge_with_summary(
    datasets: &[&Dataset],
    options: &MergeOptions,
) -> Result<(Dataset, MergeSummary), MergeError> {
    let first = datasets.first().ok_or(MergeError::NoInput)?;
    let convention = first.convention();
    if let Some((idx, ds)) = datasets
        .iter()
        .enumerate()
        .find(|(_, ds)| ds.convention() != convention)
    {
        return Err(MergeConflictError {
            kind: EntityKind::Trajectories,
            id: "pose convention".into(),
            dataset: idx,
            detail: format!("{:?} vs {:?}", ds.convention(), convention),
        }
        .into());
    }

    let mut merger = Merger {
        out: Dataset::new(convention),
        summary: MergeSummary {
            excluded: options.excluded.clone(),
            ..MergeSummary::default()
        },
    };
    for kind in EntityKind::ALL {
        if options.excluded.contains(&kind) {
            debug!("merge: excluding {kind}");
            continue;
        }
        for (idx, ds) in datasets.iter().enumerate() {
            merger.union_kind(kind, idx, ds)?;
        }
    }

    info!(
        "merged {} datasets: {} camera records, {} poses, {} deduplicated entries",
        datasets.len(),
        merger.out.count(EntityKind::RecordsCamera),
        merger.out.count(EntityKind::Trajectories),
        merger.summary.deduplicated.values().sum::<usize>()
    );
    Ok((merger.out, merger.summary))
}

enum Presence {
    Absent,
    Same,
    Different,
}

fn presence<T: PartialEq + ?Sized>(existing: Option<&T>, incoming: &T) -> Presence {
    match existing {
        None => Presence::Absent,
        Some(e) if e == incoming => Presence::Same,
        Some(_) => Presence::Different,
    }
}

struct Merger {
    out: Dataset,
    summary: MergeSummary,
}

impl Merger {
    fn inserted(&mut self, kind: EntityKind) {
        *self.summary.inserted.entry(kind).or_default() += 1;
    }

    fn deduplicated(&mut self, kind: EntityKind, id: &dyn std::fmt::Display) {
        debug!("merge: identical {kind} `{id}` deduplicated");
        *self.summary.deduplicated.entry(kind).or_default() += 1;
    }

    /// Insert when absent, skip when identical, fail when different.
    fn resolve(
        &mut self,
        kind: EntityKind,
        dataset: usize,
        id: &dyn std::fmt::Display,
        found: Presence,
        insert: impl FnOnce(&mut Dataset) -> Result<(), kapture_core::ConsistencyError>,
    ) -> Result<(), MergeError> {
        match found {
            Presence::Absent => {
                insert(&mut self.out)?;
                self.inserted(kind);
            }
            Presence::Same => self.deduplicated(kind, id),
            Presence::Different => {
                return Err(MergeConflictError {
                    kind,
                    id: id.to_string(),
                    dataset,
                    detail: "payload differs".into(),
                }
                .into())
            }
        }
        Ok(())
    }

    fn union_kind(&mut self, kind: EntityKind, idx: usize, ds: &Dataset) -> Result<(), MergeError> {
        match kind {
            EntityKind::Sensors => {
                for (id, sensor) in ds.sensors() {
                    // Descriptive fields (name) do not count; the first one wins.
                    let found = match self.out.sensor(id) {
                        None => Presence::Absent,
                        Some(e) if e.same_definition(sensor) => Presence::Same,
                        Some(_) => Presence::Different,
                    };
                    self.resolve(kind, idx, id, found, |out| {
                        out.add_sensor(id.clone(), sensor.clone())
                    })?;
                }
            }
            EntityKind::Rigs => {
                for (id, rig) in ds.rigs() {
                    let found = presence(self.out.rig(id), rig);
                    self.resolve(kind, idx, id, found, |out| out.add_rig(id.clone(), rig.clone()))?;
                }
            }
            EntityKind::RecordsCamera => {
                for (key, image) in ds.records_camera().iter() {
                    let mut found = presence(self.out.records_camera().get(key), image);
                    if matches!(found, Presence::Absent) {
                        if let Some(other) = self.out.record_by_image(image) {
                            debug!("merge: image `{image}` recorded at both {other} and {key}");
                            found = Presence::Different;
                        }
                    }
                    self.resolve(kind, idx, key, found, |out| {
                        out.add_camera_record(key.timestamp, key.sensor_id.clone(), image.clone())
                    })?;
                }
            }
            EntityKind::RecordsLidar => {
                for (key, cloud) in ds.records_lidar().iter() {
                    let found = presence(self.out.records_lidar().get(key), cloud);
                    self.resolve(kind, idx, key, found, |out| {
                        out.add_lidar_record(key.timestamp, key.sensor_id.clone(), cloud.clone())
                    })?;
                }
            }
            EntityKind::RecordsGnss => {
                for (key, fix) in ds.records_gnss().iter() {
                    let found = presence(self.out.records_gnss().get(key), fix);
                    self.resolve(kind, idx, key, found, |out| {
                        out.add_gnss_record(key.timestamp, key.sensor_id.clone(), *fix)
                    })?;
                }
            }
            EntityKind::Trajectories => {
                for (key, pose) in ds.trajectory().iter() {
                    let found = presence(self.out.trajectory().get(key), pose);
                    self.resolve(kind, idx, key, found, |out| out.add_pose(key.clone(), *pose))?;
                }
            }
            EntityKind::Keypoints | EntityKind::Descriptors | EntityKind::GlobalFeatures => {
                let Some(set) = ds.features(kind) else {
                    return Ok(());
                };
                if let Some(existing) = self.out.features(kind) {
                    if existing.feature_type() != set.feature_type() {
                        return Err(MergeConflictError {
                            kind,
                            id: "feature type".into(),
                            dataset: idx,
                            detail: format!(
                                "`{}` vs `{}`",
                                set.feature_type().name,
                                existing.feature_type().name
                            ),
                        }
                        .into());
                    }
                }
                let feature_type = set.feature_type();
                for (image, array) in set.iter() {
                    let found = presence(self.out.features(kind).and_then(|s| s.get(image)), array);
                    self.resolve(kind, idx, &image, found, |out| match kind {
                        EntityKind::Keypoints => out.add_keypoints(feature_type, image, array.clone()),
                        EntityKind::Descriptors => {
                            out.add_descriptors(feature_type, image, array.clone())
                        }
                        _ => out.add_global_feature(feature_type, image, array.clone()),
                    })?;
                }
            }
            EntityKind::Matches => {
                for (pair, matches) in ds.matches().iter() {
                    let found = presence(self.out.matches().get(pair), matches);
                    let id = format!("{}/{}", pair.first(), pair.second());
                    self.resolve(kind, idx, &id, found, |out| {
                        out.add_matches(pair.first(), pair.second(), matches.to_vec())
                    })?;
                }
            }
            EntityKind::Points3d => {
                for (id, point) in ds.points3d() {
                    let found = presence(self.out.point(id), point);
                    self.resolve(kind, idx, &id, found, |out| out.add_point(id, *point))?;
                }
            }
            EntityKind::Observations => {
                // Observations are set members: union, never conflict.
                for (id, obs) in ds.observations() {
                    if self.out.has_observation(id, obs) {
                        self.deduplicated(kind, &id);
                        continue;
                    }
                    self.out.add_observation(id, obs.clone())?;
                    self.inserted(kind);
                }
            }
        }
        Ok(())
    }
}
