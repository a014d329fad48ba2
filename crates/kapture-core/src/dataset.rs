//! The dataset model: every entity kind of one capture, with insertion-time
//! validation of uniqueness and referential integrity.
//!
//! A dataset is built through `&mut self` insertions by a single owner. Each
//! insertion checks everything first and only then mutates, so a failed call
//! leaves the dataset exactly as it was. Once built it is a plain value that
//! can be shared by reference (or behind an `Arc`) for reading.

use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ConsistencyError, EntityKind, FeatureArray, FeatureSet, FeatureType, GnssRecord, ImagePair,
    Match, Matches, Observation, Point3d, PointId, Pose, PoseConvention, RecordKey, Records, Rig,
    Sensor, SensorId, SensorKind, Timestamp, Trajectory,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    sensors: BTreeMap<SensorId, Sensor>,
    rigs: BTreeMap<SensorId, Rig>,
    records_camera: Records<String>,
    records_lidar: Records<String>,
    records_gnss: Records<GnssRecord>,
    /// image name -> camera record key
    image_index: BTreeMap<String, RecordKey>,
    trajectory: Trajectory,
    keypoints: Option<FeatureSet>,
    descriptors: Option<FeatureSet>,
    global_features: Option<FeatureSet>,
    matches: Matches,
    points3d: BTreeMap<PointId, Point3d>,
    observations: BTreeMap<PointId, BTreeSet<Observation>>,
}

fn duplicate(kind: EntityKind, id: impl ToString) -> ConsistencyError {
    ConsistencyError::Duplicate {
        kind,
        id: id.to_string(),
    }
}

fn non_finite(kind: EntityKind, id: impl ToString) -> ConsistencyError {
    ConsistencyError::NonFinite {
        kind,
        id: id.to_string(),
    }
}

impl Dataset {
    /// Empty dataset whose poses follow `convention`.
    pub fn new(convention: PoseConvention) -> Self {
        Self {
            trajectory: Trajectory::new(convention),
            ..Self::default()
        }
    }

    pub fn convention(&self) -> PoseConvention {
        self.trajectory.convention()
    }

    // ---------------------------------------------------------------------
    // sensors and rigs

    pub fn add_sensor(
        &mut self,
        sensor_id: impl Into<SensorId>,
        sensor: Sensor,
    ) -> Result<(), ConsistencyError> {
        let sensor_id = sensor_id.into();
        if self.sensors.contains_key(&sensor_id) || self.rigs.contains_key(&sensor_id) {
            return Err(duplicate(EntityKind::Sensors, sensor_id));
        }
        if let Some(params) = sensor.camera_params() {
            if params.model.params().iter().any(|v| !v.is_finite()) {
                return Err(non_finite(EntityKind::Sensors, sensor_id));
            }
        }
        self.sensors.insert(sensor_id, sensor);
        Ok(())
    }

    pub fn add_rig(&mut self, rig_id: impl Into<SensorId>, rig: Rig) -> Result<(), ConsistencyError> {
        let rig_id = rig_id.into();
        if self.rigs.contains_key(&rig_id) {
            return Err(duplicate(EntityKind::Rigs, rig_id));
        }
        if self.sensors.contains_key(&rig_id) {
            return Err(ConsistencyError::InvalidRig {
                rig: rig_id,
                reason: "id already used by a sensor".into(),
            });
        }
        if rig.is_empty() {
            return Err(ConsistencyError::InvalidRig {
                rig: rig_id,
                reason: "no members".into(),
            });
        }
        for (member, pose) in rig.members() {
            if !self.sensors.contains_key(member) {
                return Err(ConsistencyError::UnknownSensor(member.clone()));
            }
            if !pose.is_complete() {
                return Err(ConsistencyError::InvalidRig {
                    rig: rig_id,
                    reason: format!("pose of member `{member}` is incomplete"),
                });
            }
            if !pose.is_finite() {
                return Err(non_finite(EntityKind::Rigs, format!("{rig_id}/{member}")));
            }
        }
        self.rigs.insert(rig_id, rig);
        Ok(())
    }

    pub fn sensor(&self, sensor_id: &str) -> Option<&Sensor> {
        self.sensors.get(sensor_id)
    }

    pub fn sensors(&self) -> impl Iterator<Item = (&SensorId, &Sensor)> {
        self.sensors.iter()
    }

    pub fn rig(&self, rig_id: &str) -> Option<&Rig> {
        self.rigs.get(rig_id)
    }

    pub fn rigs(&self) -> impl Iterator<Item = (&SensorId, &Rig)> {
        self.rigs.iter()
    }

    // ---------------------------------------------------------------------
    // records

    fn check_record_sensor(
        &self,
        sensor_id: &str,
        expected: &'static str,
        accepts: fn(&SensorKind) -> bool,
    ) -> Result<(), ConsistencyError> {
        let sensor = self
            .sensors
            .get(sensor_id)
            .ok_or_else(|| ConsistencyError::UnknownSensor(sensor_id.to_string()))?;
        if !accepts(&sensor.kind) {
            return Err(ConsistencyError::SensorKindMismatch {
                sensor: sensor_id.to_string(),
                expected,
                actual: sensor.kind.name(),
            });
        }
        Ok(())
    }

    /// Add an image record. Image names must be unique within the dataset.
    pub fn add_camera_record(
        &mut self,
        timestamp: Timestamp,
        sensor_id: impl Into<SensorId>,
        image: impl Into<String>,
    ) -> Result<(), ConsistencyError> {
        let key = RecordKey::new(timestamp, sensor_id);
        let image = image.into();
        self.check_record_sensor(&key.sensor_id, "camera", |k| {
            matches!(k, SensorKind::Camera { .. })
        })?;
        if self.records_camera.contains(&key) {
            return Err(duplicate(EntityKind::RecordsCamera, &key));
        }
        if let Some(existing) = self.image_index.get(&image) {
            return Err(ConsistencyError::DuplicateImageName {
                image,
                existing: existing.clone(),
            });
        }
        self.image_index.insert(image.clone(), key.clone());
        self.records_camera.insert_unchecked(key, image);
        Ok(())
    }

    pub fn add_lidar_record(
        &mut self,
        timestamp: Timestamp,
        sensor_id: impl Into<SensorId>,
        point_cloud: impl Into<String>,
    ) -> Result<(), ConsistencyError> {
        let key = RecordKey::new(timestamp, sensor_id);
        self.check_record_sensor(&key.sensor_id, "lidar", |k| matches!(k, SensorKind::Lidar))?;
        if self.records_lidar.contains(&key) {
            return Err(duplicate(EntityKind::RecordsLidar, &key));
        }
        self.records_lidar.insert_unchecked(key, point_cloud.into());
        Ok(())
    }

    pub fn add_gnss_record(
        &mut self,
        timestamp: Timestamp,
        sensor_id: impl Into<SensorId>,
        record: GnssRecord,
    ) -> Result<(), ConsistencyError> {
        let key = RecordKey::new(timestamp, sensor_id);
        self.check_record_sensor(&key.sensor_id, "gnss", |k| matches!(k, SensorKind::Gnss { .. }))?;
        if self.records_gnss.contains(&key) {
            return Err(duplicate(EntityKind::RecordsGnss, &key));
        }
        if [record.x, record.y, record.z, record.dop]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(non_finite(EntityKind::RecordsGnss, &key));
        }
        self.records_gnss.insert_unchecked(key, record);
        Ok(())
    }

    pub fn records_camera(&self) -> &Records<String> {
        &self.records_camera
    }

    pub fn records_lidar(&self) -> &Records<String> {
        &self.records_lidar
    }

    pub fn records_gnss(&self) -> &Records<GnssRecord> {
        &self.records_gnss
    }

    /// Key of the camera record holding `image`.
    pub fn record_by_image(&self, image: &str) -> Option<&RecordKey> {
        self.image_index.get(image)
    }

    /// Whether any record kind has an entry at `key`.
    pub fn has_record(&self, key: &RecordKey) -> bool {
        self.records_camera.contains(key)
            || self.records_lidar.contains(key)
            || self.records_gnss.contains(key)
    }

    // ---------------------------------------------------------------------
    // trajectory

    /// Add a pose for a sensor record, or for a rig when one of its members
    /// has a record at that timestamp.
    pub fn add_pose(&mut self, key: RecordKey, pose: Pose) -> Result<(), ConsistencyError> {
        let referenced = self.has_record(&key)
            || self.rigs.get(&key.sensor_id).is_some_and(|rig| {
                rig.members()
                    .any(|(member, _)| self.has_record(&RecordKey::new(key.timestamp, member.as_str())))
            });
        if !referenced {
            return Err(ConsistencyError::UnknownRecord(key));
        }
        self.trajectory.insert(key, pose)
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn pose(&self, timestamp: Timestamp, sensor_id: &str) -> Option<&Pose> {
        self.trajectory.pose(timestamp, sensor_id)
    }

    // ---------------------------------------------------------------------
    // features

    fn check_features(
        &self,
        kind: EntityKind,
        feature_type: &FeatureType,
        image: &str,
        array: &FeatureArray,
    ) -> Result<(), ConsistencyError> {
        if !self.image_index.contains_key(image) {
            return Err(ConsistencyError::UnknownImage(image.to_string()));
        }
        let bad_shape = |reason: String| ConsistencyError::BadFeatureShape {
            kind,
            image: image.to_string(),
            reason,
        };
        if !array.is_well_formed() {
            return Err(bad_shape(format!(
                "{} values do not form rows of {}",
                array.values().len(),
                array.dsize()
            )));
        }
        if array.values().iter().any(|v| !v.is_finite()) {
            return Err(non_finite(kind, image));
        }
        if array.dsize() != feature_type.dsize {
            return Err(bad_shape(format!(
                "row width {} but type `{}` declares {}",
                array.dsize(),
                feature_type.name,
                feature_type.dsize
            )));
        }
        if let Some(set) = self.features(kind) {
            if set.feature_type() != feature_type {
                return Err(ConsistencyError::FeatureTypeMismatch {
                    kind,
                    expected: set.feature_type().name.clone(),
                    actual: feature_type.name.clone(),
                });
            }
            if set.contains(image) {
                return Err(duplicate(kind, image));
            }
        }
        // Descriptors pair one-to-one with keypoints of the same image.
        let counterpart = match kind {
            EntityKind::Keypoints => self.descriptors.as_ref(),
            EntityKind::Descriptors => self.keypoints.as_ref(),
            _ => None,
        };
        if let Some(other) = counterpart.and_then(|set| set.get(image)) {
            if other.rows() != array.rows() {
                return Err(bad_shape(format!(
                    "{} rows but {} rows on the keypoint/descriptor side",
                    array.rows(),
                    other.rows()
                )));
            }
        }
        if kind == EntityKind::GlobalFeatures && array.rows() != 1 {
            return Err(bad_shape(format!(
                "global features need exactly one row, got {}",
                array.rows()
            )));
        }
        Ok(())
    }

    fn insert_features(
        &mut self,
        kind: EntityKind,
        feature_type: &FeatureType,
        image: String,
        array: FeatureArray,
    ) -> Result<(), ConsistencyError> {
        self.check_features(kind, feature_type, &image, &array)?;
        let slot = match kind {
            EntityKind::Keypoints => &mut self.keypoints,
            EntityKind::Descriptors => &mut self.descriptors,
            _ => &mut self.global_features,
        };
        slot.get_or_insert_with(|| FeatureSet::new(feature_type.clone()))
            .insert(image, array);
        Ok(())
    }

    pub fn add_keypoints(
        &mut self,
        feature_type: &FeatureType,
        image: impl Into<String>,
        keypoints: FeatureArray,
    ) -> Result<(), ConsistencyError> {
        self.insert_features(EntityKind::Keypoints, feature_type, image.into(), keypoints)
    }

    pub fn add_descriptors(
        &mut self,
        feature_type: &FeatureType,
        image: impl Into<String>,
        descriptors: FeatureArray,
    ) -> Result<(), ConsistencyError> {
        self.insert_features(EntityKind::Descriptors, feature_type, image.into(), descriptors)
    }

    pub fn add_global_feature(
        &mut self,
        feature_type: &FeatureType,
        image: impl Into<String>,
        feature: FeatureArray,
    ) -> Result<(), ConsistencyError> {
        self.insert_features(EntityKind::GlobalFeatures, feature_type, image.into(), feature)
    }

    pub fn keypoints(&self) -> Option<&FeatureSet> {
        self.keypoints.as_ref()
    }

    pub fn descriptors(&self) -> Option<&FeatureSet> {
        self.descriptors.as_ref()
    }

    pub fn global_features(&self) -> Option<&FeatureSet> {
        self.global_features.as_ref()
    }

    /// Feature set of a feature kind; `None` for other kinds or when empty.
    pub fn features(&self, kind: EntityKind) -> Option<&FeatureSet> {
        match kind {
            EntityKind::Keypoints => self.keypoints.as_ref(),
            EntityKind::Descriptors => self.descriptors.as_ref(),
            EntityKind::GlobalFeatures => self.global_features.as_ref(),
            _ => None,
        }
    }

    fn keypoint_count(&self, image: &str) -> Result<usize, ConsistencyError> {
        self.keypoints
            .as_ref()
            .and_then(|set| set.get(image))
            .map(FeatureArray::rows)
            .ok_or_else(|| ConsistencyError::MissingKeypoints(image.to_string()))
    }

    fn check_keypoint_index(&self, image: &str, index: usize) -> Result<(), ConsistencyError> {
        let count = self.keypoint_count(image)?;
        if index >= count {
            return Err(ConsistencyError::KeypointOutOfRange {
                image: image.to_string(),
                index,
                count,
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // matches

    /// Add matches between `a` and `b`; `first` of each match indexes `a`.
    ///
    /// The pair is stored in canonical order, swapping indices as needed.
    pub fn add_matches(
        &mut self,
        a: impl Into<String>,
        b: impl Into<String>,
        matches: Vec<Match>,
    ) -> Result<(), ConsistencyError> {
        let (pair, swapped) = ImagePair::canonical(a, b);
        if pair.is_self_pair() {
            return Err(ConsistencyError::SelfMatch(pair.first().to_string()));
        }
        if self.matches.get(&pair).is_some() {
            return Err(duplicate(
                EntityKind::Matches,
                format!("{}/{}", pair.first(), pair.second()),
            ));
        }
        let matches: Vec<Match> = if swapped {
            matches.into_iter().map(Match::swapped).collect()
        } else {
            matches
        };
        if matches
            .iter()
            .any(|m| m.score.is_some_and(|s| !s.is_finite()))
        {
            return Err(non_finite(
                EntityKind::Matches,
                format!("{}/{}", pair.first(), pair.second()),
            ));
        }
        let count_first = self.keypoint_count(pair.first())?;
        let count_second = self.keypoint_count(pair.second())?;
        for m in &matches {
            if m.first >= count_first {
                return Err(ConsistencyError::KeypointOutOfRange {
                    image: pair.first().to_string(),
                    index: m.first,
                    count: count_first,
                });
            }
            if m.second >= count_second {
                return Err(ConsistencyError::KeypointOutOfRange {
                    image: pair.second().to_string(),
                    index: m.second,
                    count: count_second,
                });
            }
        }
        self.matches.insert_unchecked(pair, matches);
        Ok(())
    }

    pub fn matches(&self) -> &Matches {
        &self.matches
    }

    /// Matches between two images in either order, oriented as asked.
    pub fn matches_between(&self, a: &str, b: &str) -> Option<Vec<Match>> {
        self.matches.between(a, b)
    }

    // ---------------------------------------------------------------------
    // 3D points

    pub fn add_point(&mut self, point_id: PointId, point: Point3d) -> Result<(), ConsistencyError> {
        if self.points3d.contains_key(&point_id) {
            return Err(duplicate(EntityKind::Points3d, point_id));
        }
        if point.position.iter().any(|v| !v.is_finite()) {
            return Err(non_finite(EntityKind::Points3d, point_id));
        }
        self.points3d.insert(point_id, point);
        Ok(())
    }

    pub fn add_observation(
        &mut self,
        point_id: PointId,
        observation: Observation,
    ) -> Result<(), ConsistencyError> {
        if !self.points3d.contains_key(&point_id) {
            return Err(ConsistencyError::UnknownPoint(point_id));
        }
        self.check_keypoint_index(&observation.image, observation.keypoint)?;
        let seen = self.observations.entry(point_id).or_default();
        if seen.contains(&observation) {
            return Err(duplicate(
                EntityKind::Observations,
                format!("{point_id}:{}#{}", observation.image, observation.keypoint),
            ));
        }
        seen.insert(observation);
        Ok(())
    }

    pub fn point(&self, point_id: PointId) -> Option<&Point3d> {
        self.points3d.get(&point_id)
    }

    pub fn points3d(&self) -> impl Iterator<Item = (PointId, &Point3d)> {
        self.points3d.iter().map(|(id, p)| (*id, p))
    }

    /// Observations of one point, ordered by image then keypoint.
    pub fn observations_of(&self, point_id: PointId) -> impl Iterator<Item = &Observation> {
        self.observations.get(&point_id).into_iter().flatten()
    }

    pub fn has_observation(&self, point_id: PointId, observation: &Observation) -> bool {
        self.observations
            .get(&point_id)
            .is_some_and(|set| set.contains(observation))
    }

    pub fn observations(&self) -> impl Iterator<Item = (PointId, &Observation)> {
        self.observations
            .iter()
            .flat_map(|(id, obs)| obs.iter().map(move |o| (*id, o)))
    }

    // ---------------------------------------------------------------------
    // whole-dataset queries

    /// Number of entries of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Sensors => self.sensors.len(),
            EntityKind::Rigs => self.rigs.len(),
            EntityKind::RecordsCamera => self.records_camera.len(),
            EntityKind::RecordsLidar => self.records_lidar.len(),
            EntityKind::RecordsGnss => self.records_gnss.len(),
            EntityKind::Trajectories => self.trajectory.len(),
            EntityKind::Keypoints | EntityKind::Descriptors | EntityKind::GlobalFeatures => {
                self.features(kind).map_or(0, FeatureSet::len)
            }
            EntityKind::Matches => self.matches.len(),
            EntityKind::Points3d => self.points3d.len(),
            EntityKind::Observations => self.observations.values().map(BTreeSet::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|&kind| self.count(kind) == 0)
    }

    /// Copy of this dataset where every rig pose is replaced by one pose per
    /// member sensor recorded at that timestamp. Rigs are dropped.
    ///
    /// Rig poses lacking rotation or translation cannot be propagated and are
    /// skipped. A member that already has its own pose keeps it; a member
    /// shared by several rigs takes its pose from the first rig in id order.
    pub fn expand_rigs(&self) -> Result<Dataset, ConsistencyError> {
        let convention = self.convention();
        let mut trajectory = Trajectory::new(convention);
        let mut derived: Vec<(RecordKey, Pose, &str)> = Vec::new();
        for (key, pose) in self.trajectory.iter() {
            let Some(rig) = self.rigs.get(&key.sensor_id) else {
                trajectory.insert(key.clone(), *pose)?;
                continue;
            };
            for (member, sensor_from_rig) in rig.members() {
                let member_key = RecordKey::new(key.timestamp, member.as_str());
                if !self.has_record(&member_key) {
                    continue;
                }
                let member_pose = match convention {
                    PoseConvention::WorldToDevice => sensor_from_rig.compose(pose),
                    PoseConvention::DeviceToWorld => sensor_from_rig
                        .inverse()
                        .and_then(|rig_from_sensor| pose.compose(&rig_from_sensor)),
                };
                match member_pose {
                    Some(p) => derived.push((member_key, p, key.sensor_id.as_str())),
                    None => warn!("rig pose at {key} is incomplete; not propagated to `{member}`"),
                }
            }
        }
        // explicit poses first, then rigs in id order
        let mut from_rig: BTreeMap<RecordKey, &str> = BTreeMap::new();
        for (key, pose, rig_id) in derived {
            if let Some(first) = from_rig.get(&key) {
                debug!("pose at {key} already derived from rig `{first}`; ignoring rig `{rig_id}`");
                continue;
            }
            if trajectory.contains(&key) {
                debug!("keeping explicit pose at {key} over the one derived from rig `{rig_id}`");
                continue;
            }
            trajectory.insert(key.clone(), pose)?;
            from_rig.insert(key, rig_id);
        }
        Ok(Dataset {
            rigs: BTreeMap::new(),
            trajectory,
            ..self.clone()
        })
    }
}
