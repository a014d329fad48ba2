//! Insertion-time invariants of the dataset model.

use approx::assert_relative_eq;
use kapture_core::synthetic::scene::{self, vga_camera, SceneSpec};
use kapture_core::{
    CameraModel, CameraParams, ConsistencyError, Dataset, EntityKind, FeatureArray, FeatureType,
    GnssRecord, Match, Observation, Point3d, Pose, PoseConvention, Pt3, Quat, RecordKey, Rig,
    Sensor, SensorKind, Vec3,
};

fn two_images() -> Dataset {
    let mut ds = Dataset::new(PoseConvention::WorldToDevice);
    ds.add_sensor("cam0", vga_camera()).unwrap();
    ds.add_camera_record(0, "cam0", "a.jpg").unwrap();
    ds.add_camera_record(1, "cam0", "b.jpg").unwrap();
    let kp = FeatureType::new("sift", "float32", 2);
    ds.add_keypoints(&kp, "a.jpg", FeatureArray::from_rows(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]))
        .unwrap();
    ds.add_keypoints(&kp, "b.jpg", FeatureArray::from_rows(&[[5.0, 5.0], [6.0, 6.0]]))
        .unwrap();
    ds
}

#[test]
fn identifiers_are_unique() {
    let mut ds = two_images();
    assert!(matches!(
        ds.add_sensor("cam0", vga_camera()),
        Err(ConsistencyError::Duplicate {
            kind: EntityKind::Sensors,
            ..
        })
    ));
    assert!(matches!(
        ds.add_camera_record(0, "cam0", "c.jpg"),
        Err(ConsistencyError::Duplicate {
            kind: EntityKind::RecordsCamera,
            ..
        })
    ));
    assert!(matches!(
        ds.add_camera_record(7, "cam0", "a.jpg"),
        Err(ConsistencyError::DuplicateImageName { .. })
    ));
    ds.add_point(1, Point3d::new(Pt3::origin())).unwrap();
    assert!(ds.add_point(1, Point3d::new(Pt3::new(1.0, 0.0, 0.0))).is_err());
}

#[test]
fn records_need_matching_sensor() {
    let mut ds = two_images();
    assert_eq!(
        ds.add_camera_record(3, "cam9", "x.jpg"),
        Err(ConsistencyError::UnknownSensor("cam9".into()))
    );
    assert!(matches!(
        ds.add_lidar_record(0, "cam0", "scan.pcd"),
        Err(ConsistencyError::SensorKindMismatch { .. })
    ));
    ds.add_sensor("gps", Sensor::new(SensorKind::Gnss { epsg: "EPSG:4326".into() }))
        .unwrap();
    let fix = GnssRecord {
        x: 2.35,
        y: 48.85,
        z: 35.0,
        utc: 0,
        dop: 1.2,
    };
    ds.add_gnss_record(0, "gps", fix).unwrap();
    assert_eq!(ds.records_gnss().get(&RecordKey::new(0, "gps")), Some(&fix));
}

#[test]
fn pose_requires_record() {
    let mut ds = two_images();
    assert_eq!(
        ds.add_pose(RecordKey::new(9, "cam0"), Pose::identity()),
        Err(ConsistencyError::UnknownRecord(RecordKey::new(9, "cam0")))
    );
    ds.add_pose(RecordKey::new(0, "cam0"), Pose::from_rotation(Quat::identity()))
        .unwrap();
    let pose = ds.pose(0, "cam0").unwrap();
    assert!(pose.translation.is_none());
    assert!(ds.pose(1, "cam0").is_none());
}

#[test]
fn matches_are_canonical_and_bounded() {
    let mut ds = two_images();
    ds.add_matches("b.jpg", "a.jpg", vec![Match::new(1, 2), Match::new(0, 0)])
        .unwrap();
    let stored = ds.matches_between("a.jpg", "b.jpg").unwrap();
    assert_eq!((stored[0].first, stored[0].second), (2, 1));
    assert!(ds.matches().contains("b.jpg", "a.jpg"));
    assert!(matches!(
        ds.add_matches("a.jpg", "b.jpg", vec![]),
        Err(ConsistencyError::Duplicate { .. })
    ));
}

#[test]
fn out_of_range_match_is_rejected_atomically() {
    let mut ds = two_images();
    let before = ds.clone();
    let err = ds
        .add_matches("a.jpg", "b.jpg", vec![Match::new(0, 0), Match::new(1, 2)])
        .unwrap_err();
    assert_eq!(
        err,
        ConsistencyError::KeypointOutOfRange {
            image: "b.jpg".into(),
            index: 2,
            count: 2
        }
    );
    assert_eq!(ds, before);
    assert_eq!(
        ds.add_matches("a.jpg", "a.jpg", vec![]),
        Err(ConsistencyError::SelfMatch("a.jpg".into()))
    );
}

#[test]
fn matches_need_keypoints() {
    let mut ds = two_images();
    ds.add_camera_record(2, "cam0", "c.jpg").unwrap();
    assert_eq!(
        ds.add_matches("a.jpg", "c.jpg", vec![Match::new(0, 0)]),
        Err(ConsistencyError::MissingKeypoints("c.jpg".into()))
    );
}

#[test]
fn feature_shapes_are_checked() {
    let mut ds = two_images();
    let desc = FeatureType::new("sift", "uint8", 4);
    assert!(matches!(
        ds.add_descriptors(&desc, "a.jpg", FeatureArray::new(4, vec![0.0; 8])),
        Err(ConsistencyError::BadFeatureShape { .. })
    ));
    ds.add_descriptors(&desc, "a.jpg", FeatureArray::new(4, vec![0.0; 12]))
        .unwrap();
    let other = FeatureType::new("orb", "uint8", 4);
    assert!(matches!(
        ds.add_descriptors(&other, "b.jpg", FeatureArray::new(4, vec![0.0; 8])),
        Err(ConsistencyError::FeatureTypeMismatch { .. })
    ));
    let global = FeatureType::new("netvlad", "float32", 3);
    assert!(ds
        .add_global_feature(&global, "a.jpg", FeatureArray::new(3, vec![0.0; 6]))
        .is_err());
    assert_eq!(
        ds.add_global_feature(&global, "zzz.jpg", FeatureArray::single(vec![0.0; 3])),
        Err(ConsistencyError::UnknownImage("zzz.jpg".into()))
    );
}

#[test]
fn observations_reference_points_and_keypoints() {
    let mut ds = two_images();
    assert_eq!(
        ds.add_observation(4, Observation::new("a.jpg", 0)),
        Err(ConsistencyError::UnknownPoint(4))
    );
    ds.add_point(4, Point3d::with_color(Pt3::new(1.0, 2.0, 3.0), [255, 0, 0]))
        .unwrap();
    ds.add_observation(4, Observation::new("b.jpg", 1)).unwrap();
    ds.add_observation(4, Observation::new("a.jpg", 2)).unwrap();
    assert!(ds.add_observation(4, Observation::new("a.jpg", 3)).is_err());
    assert!(ds.add_observation(4, Observation::new("a.jpg", 2)).is_err());
    let obs: Vec<_> = ds.observations_of(4).map(|o| o.image.as_str()).collect();
    assert_eq!(obs, ["a.jpg", "b.jpg"]);
    assert_eq!(ds.count(EntityKind::Observations), 2);
}

#[test]
fn rig_poses_expand_to_members() {
    let mut ds = Dataset::new(PoseConvention::WorldToDevice);
    ds.add_sensor("left", vga_camera()).unwrap();
    ds.add_sensor("right", vga_camera()).unwrap();
    let right_from_rig = Pose::new(Quat::identity(), Vec3::new(-0.2, 0.0, 0.0));
    let rig = Rig::new()
        .with_member("left", Pose::identity())
        .with_member("right", right_from_rig);
    assert!(matches!(
        ds.add_rig("left", rig.clone()),
        Err(ConsistencyError::InvalidRig { .. })
    ));
    ds.add_rig("rig", rig).unwrap();
    ds.add_camera_record(0, "left", "l0.jpg").unwrap();
    ds.add_camera_record(0, "right", "r0.jpg").unwrap();
    ds.add_camera_record(1, "left", "l1.jpg").unwrap();

    let rig_from_world = Pose::new(Quat::identity(), Vec3::new(0.0, 0.0, 3.0));
    ds.add_pose(RecordKey::new(0, "rig"), rig_from_world).unwrap();
    ds.add_pose(RecordKey::new(1, "rig"), rig_from_world).unwrap();
    assert!(ds.add_pose(RecordKey::new(5, "rig"), rig_from_world).is_err());

    let flat = ds.expand_rigs().unwrap();
    assert_eq!(flat.rigs().count(), 0);
    assert_eq!(flat.trajectory().len(), 3);
    let right = flat.pose(0, "right").unwrap().translation.unwrap();
    assert_relative_eq!(right, Vec3::new(-0.2, 0.0, 3.0), epsilon = 1e-12);
    assert!(flat.pose(1, "right").is_none());
    assert!(flat.pose(0, "rig").is_none());
}

#[test]
fn device_to_world_rig_poses_expand_through_rig_rotation() {
    let mut ds = Dataset::new(PoseConvention::DeviceToWorld);
    ds.add_sensor("left", vga_camera()).unwrap();
    ds.add_sensor("right", vga_camera()).unwrap();
    // right camera sits 0.2 along the rig x axis, turned 90 deg about z
    let turn = Quat::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
    let rig_from_right = Pose::new(turn, Vec3::new(0.2, 0.0, 0.0));
    let rig = Rig::new()
        .with_member("left", Pose::identity())
        .with_member("right", rig_from_right.inverse().unwrap());
    ds.add_rig("rig", rig).unwrap();
    ds.add_camera_record(0, "left", "l0.jpg").unwrap();
    ds.add_camera_record(0, "right", "r0.jpg").unwrap();

    let yaw = Quat::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
    let world_from_rig = Pose::new(yaw, Vec3::new(1.0, 2.0, 0.0));
    ds.add_pose(RecordKey::new(0, "rig"), world_from_rig).unwrap();

    let flat = ds.expand_rigs().unwrap();
    assert_eq!(flat.trajectory().len(), 2);
    let left = flat.pose(0, "left").unwrap();
    assert_relative_eq!(left.translation.unwrap(), Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-12);
    let right = flat.pose(0, "right").unwrap();
    assert_relative_eq!(right.translation.unwrap(), Vec3::new(1.0, 2.2, 0.0), epsilon = 1e-12);
    assert_relative_eq!(
        right.rotation.unwrap().angle_to(&(yaw * turn)),
        0.0,
        epsilon = 1e-9
    );
}

#[test]
fn shared_rig_member_takes_pose_of_first_rig() {
    let mut ds = Dataset::new(PoseConvention::WorldToDevice);
    ds.add_sensor("cam0", vga_camera()).unwrap();
    ds.add_sensor("cam1", vga_camera()).unwrap();
    ds.add_rig("rig_a", Rig::new().with_member("cam0", Pose::identity()))
        .unwrap();
    let offset = Pose::new(Quat::identity(), Vec3::new(0.5, 0.0, 0.0));
    ds.add_rig(
        "rig_b",
        Rig::new().with_member("cam0", offset).with_member("cam1", offset),
    )
    .unwrap();
    ds.add_camera_record(0, "cam0", "c0.jpg").unwrap();
    ds.add_camera_record(0, "cam1", "c1.jpg").unwrap();
    ds.add_pose(RecordKey::new(0, "rig_a"), Pose::identity()).unwrap();
    ds.add_pose(RecordKey::new(0, "rig_b"), Pose::identity()).unwrap();

    let flat = ds.expand_rigs().unwrap();
    assert_eq!(flat.pose(0, "cam0"), Some(&Pose::identity()));
    assert_eq!(flat.pose(0, "cam1"), Some(&offset));
}

#[test]
fn non_finite_values_are_rejected() {
    let mut ds = two_images();
    ds.add_sensor("gps", Sensor::new(SensorKind::Gnss { epsg: "EPSG:4326".into() }))
        .unwrap();
    let before = ds.clone();
    let kind_of = |r: Result<(), ConsistencyError>| match r {
        Err(ConsistencyError::NonFinite { kind, .. }) => Some(kind),
        _ => None,
    };

    let bad_camera = Sensor::camera(CameraParams {
        width: 10,
        height: 10,
        model: CameraModel::SimplePinhole {
            f: f64::NAN,
            cx: 5.0,
            cy: 5.0,
        },
    });
    assert_eq!(kind_of(ds.add_sensor("cam9", bad_camera)), Some(EntityKind::Sensors));
    let bad_rig = Rig::new().with_member(
        "cam0",
        Pose::new(Quat::identity(), Vec3::new(f64::NAN, 0.0, 0.0)),
    );
    assert_eq!(kind_of(ds.add_rig("rig", bad_rig)), Some(EntityKind::Rigs));
    let fix = GnssRecord {
        x: 1.0,
        y: 2.0,
        z: 3.0,
        utc: 0,
        dop: f64::NAN,
    };
    assert_eq!(kind_of(ds.add_gnss_record(0, "gps", fix)), Some(EntityKind::RecordsGnss));
    let far = Pose::from_translation(Vec3::new(f64::INFINITY, 0.0, 0.0));
    assert_eq!(
        kind_of(ds.add_pose(RecordKey::new(0, "cam0"), far)),
        Some(EntityKind::Trajectories)
    );
    assert_eq!(
        kind_of(ds.add_global_feature(
            &FeatureType::new("netvlad", "float32", 2),
            "a.jpg",
            FeatureArray::single(vec![f32::NAN, 0.0]),
        )),
        Some(EntityKind::GlobalFeatures)
    );
    let scored = Match {
        first: 0,
        second: 1,
        score: Some(f32::NAN),
    };
    assert_eq!(
        kind_of(ds.add_matches("a.jpg", "b.jpg", vec![scored])),
        Some(EntityKind::Matches)
    );
    assert_eq!(
        kind_of(ds.add_point(7, Point3d::new(Pt3::new(0.0, f64::NAN, 0.0)))),
        Some(EntityKind::Points3d)
    );
    assert_eq!(ds, before);
}

#[test]
fn unrelated_datasets_build_concurrently() {
    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            std::thread::spawn(move || {
                let spec = SceneSpec::new(format!("seq{i}"), &["cam0"], 0..(10 + i));
                scene::dataset(&spec).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let ds = handle.join().unwrap();
        assert_eq!(ds.records_camera().len(), 10 + i);
    }
}
