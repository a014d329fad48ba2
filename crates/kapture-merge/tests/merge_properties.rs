//! Algebraic properties of dataset merging.

use kapture_core::synthetic::scene::{self, SceneSpec};
use kapture_core::{ConsistencyError, Dataset, EntityKind, Match, Observation, Point3d, Pt3};
use kapture_merge::{merge, MergeError, MergeOptions};

fn capture(prefix: &str, camera: &str, first_point: u64) -> Dataset {
    let spec = SceneSpec::new(prefix, &[camera], 0..4);
    let mut ds = scene::dataset(&spec).unwrap();
    scene::add_grid_keypoints(&mut ds, 8).unwrap();
    scene::add_random_global_features(&mut ds, 16, first_point).unwrap();
    let a = spec.image_name(camera, 0);
    let b = spec.image_name(camera, 1);
    ds.add_matches(a.as_str(), b.as_str(), vec![Match::with_score(0, 0, 0.9), Match::new(3, 4)])
        .unwrap();
    ds.add_point(first_point, Point3d::new(Pt3::new(0.0, 0.0, 2.0)))
        .unwrap();
    ds.add_observation(first_point, Observation::new(a.as_str(), 0))
        .unwrap();
    ds.add_observation(first_point, Observation::new(b.as_str(), 0))
        .unwrap();
    ds
}

#[test]
fn disjoint_merge_is_order_independent() {
    let a = capture("map", "cam0", 1);
    let b = capture("query", "cam1", 2);
    let ab = merge(&[&a, &b], &MergeOptions::default()).unwrap();
    let ba = merge(&[&b, &a], &MergeOptions::default()).unwrap();
    assert_eq!(ab, ba);
    for kind in EntityKind::ALL {
        assert_eq!(ab.count(kind), a.count(kind) + b.count(kind), "{kind}");
    }
}

#[test]
fn merging_with_itself_is_identity() {
    let a = capture("map", "cam0", 1);
    let aa = merge(&[&a, &a], &MergeOptions::default()).unwrap();
    assert_eq!(aa, a);
}

#[test]
fn merge_is_associative_on_overlapping_inputs() {
    let a = capture("map", "cam0", 1);
    let b = capture("query", "cam1", 2);
    let ab = merge(&[&a, &b], &MergeOptions::default()).unwrap();
    let nested = merge(&[&ab, &b, &a], &MergeOptions::default()).unwrap();
    assert_eq!(nested, ab);
}

#[test]
fn excluded_kinds_are_empty_in_output() {
    let a = capture("map", "cam0", 1);
    let b = capture("query", "cam1", 2);
    let opts = MergeOptions::excluding([
        EntityKind::Matches,
        EntityKind::Observations,
        EntityKind::Points3d,
        EntityKind::GlobalFeatures,
    ]);
    let merged = merge(&[&a, &b], &opts).unwrap();
    for kind in &opts.excluded {
        assert_eq!(merged.count(*kind), 0, "{kind}");
    }
    assert_eq!(merged.count(EntityKind::Keypoints), 8);
    assert_eq!(merged.trajectory().len(), 8);
}

#[test]
fn excluding_a_dependency_is_inconsistent() {
    let a = capture("map", "cam0", 1);
    let err = merge(&[&a], &MergeOptions::excluding([EntityKind::Keypoints])).unwrap_err();
    assert!(matches!(
        err,
        MergeError::Inconsistent(ConsistencyError::MissingKeypoints(_))
    ));
    let err = merge(&[&a], &MergeOptions::excluding([EntityKind::RecordsCamera])).unwrap_err();
    assert!(matches!(
        err,
        MergeError::Inconsistent(ConsistencyError::UnknownRecord(_))
    ));
}

#[test]
fn inputs_are_left_untouched() {
    let a = capture("map", "cam0", 1);
    let b = capture("map", "cam0", 1);
    let before = a.clone();
    let _ = merge(&[&a, &b], &MergeOptions::default()).unwrap();
    assert_eq!(a, before);
}
