//! Small synthetic captures: a camera rig driving along a circle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    CameraModel, CameraParams, ConsistencyError, Dataset, FeatureArray, FeatureType, Pose,
    PoseConvention, Quat, RecordKey, Sensor, Timestamp, Trajectory, Vec3,
};

/// Parameters of a synthetic capture.
#[derive(Debug, Clone)]
pub struct SceneSpec {
    /// Camera sensor ids; each camera records at every timestamp.
    pub cameras: Vec<String>,
    /// Timestamps of the capture.
    pub timestamps: Vec<Timestamp>,
    /// Prefix of image names, e.g. `"mapping"` gives `mapping/cam0/0003.jpg`.
    pub image_prefix: String,
    /// Radius of the circular path.
    pub radius: f64,
    pub convention: PoseConvention,
}

impl SceneSpec {
    pub fn new(
        prefix: impl Into<String>,
        cameras: &[&str],
        timestamps: impl IntoIterator<Item = Timestamp>,
    ) -> Self {
        Self {
            cameras: cameras.iter().map(|c| c.to_string()).collect(),
            timestamps: timestamps.into_iter().collect(),
            image_prefix: prefix.into(),
            radius: 5.0,
            convention: PoseConvention::WorldToDevice,
        }
    }

    pub fn image_name(&self, camera: &str, timestamp: Timestamp) -> String {
        format!("{}/{camera}/{timestamp:04}.jpg", self.image_prefix)
    }
}

/// Pinhole VGA camera used by synthetic scenes.
pub fn vga_camera() -> Sensor {
    Sensor::camera(CameraParams {
        width: 640,
        height: 480,
        model: CameraModel::Pinhole {
            fx: 500.0,
            fy: 500.0,
            cx: 320.0,
            cy: 240.0,
        },
    })
}

/// Pose of `camera_index` at step `step`, looking at the circle centre.
pub fn circle_pose(spec: &SceneSpec, step: usize, camera_index: usize) -> Pose {
    let angle = step as f64 * 0.1 + camera_index as f64 * 0.02;
    let position = Vec3::new(spec.radius * angle.cos(), spec.radius * angle.sin(), 1.5);
    let yaw = angle + std::f64::consts::PI;
    let world_from_device = Pose::new(Quat::from_euler_angles(0.0, 0.0, yaw), position);
    match spec.convention {
        PoseConvention::DeviceToWorld => world_from_device,
        PoseConvention::WorldToDevice => world_from_device.inverse().unwrap_or(world_from_device),
    }
}

/// Ground-truth trajectory of a scene, without building a dataset.
pub fn trajectory(spec: &SceneSpec) -> Result<Trajectory, ConsistencyError> {
    let mut traj = Trajectory::new(spec.convention);
    for (step, &ts) in spec.timestamps.iter().enumerate() {
        for (ci, cam) in spec.cameras.iter().enumerate() {
            traj.insert(RecordKey::new(ts, cam.as_str()), circle_pose(spec, step, ci))?;
        }
    }
    Ok(traj)
}

/// Dataset with sensors, image records and ground-truth poses.
pub fn dataset(spec: &SceneSpec) -> Result<Dataset, ConsistencyError> {
    let mut ds = Dataset::new(spec.convention);
    for cam in &spec.cameras {
        ds.add_sensor(cam.as_str(), vga_camera().with_name(cam.as_str()))?;
    }
    for (key, pose) in trajectory(spec)?.iter() {
        let image = spec.image_name(&key.sensor_id, key.timestamp);
        ds.add_camera_record(key.timestamp, key.sensor_id.as_str(), image)?;
        ds.add_pose(key.clone(), *pose)?;
    }
    Ok(ds)
}

/// Add `count` keypoints on a regular grid to every image of `ds`.
pub fn add_grid_keypoints(ds: &mut Dataset, count: usize) -> Result<(), ConsistencyError> {
    let kind = FeatureType::new("grid", "float32", 2);
    let images: Vec<String> = ds.records_camera().iter().map(|(_, img)| img.clone()).collect();
    for image in images {
        let values = (0..count)
            .flat_map(|i| [(i % 32) as f32 * 20.0, (i / 32) as f32 * 20.0])
            .collect();
        ds.add_keypoints(&kind, image, FeatureArray::new(2, values))?;
    }
    Ok(())
}

/// Deterministic L2-normalised random vector.
pub fn random_unit_vector(rng: &mut StdRng, dim: usize) -> Vec<f32> {
    let mut v: Vec<f32> = (0..dim).map(|_| rng.random::<f32>() - 0.5).collect();
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

/// Add seeded random, L2-normalised global features to every image of `ds`.
pub fn add_random_global_features(
    ds: &mut Dataset,
    dim: usize,
    seed: u64,
) -> Result<(), ConsistencyError> {
    let kind = FeatureType::new("random", "float32", dim);
    let mut rng = StdRng::seed_from_u64(seed);
    let images: Vec<String> = ds.records_camera().iter().map(|(_, img)| img.clone()).collect();
    for image in images {
        let v = random_unit_vector(&mut rng, dim);
        ds.add_global_feature(&kind, image, FeatureArray::single(v))?;
    }
    Ok(())
}
