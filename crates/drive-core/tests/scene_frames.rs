//! Whole-scene frames over the reference world.

use drive_core::{
    CameraMode, DrawList, FixedStep, HeadlessAssets, Key, KeySet, Scene, World, WorldConfig,
    render::Pass,
};
use glam::Vec3;

fn world() -> Scene {
    World::build(&mut HeadlessAssets::new(), &WorldConfig::default()).unwrap()
}

fn run(scene: &mut Scene, clock: &mut FixedStep, frames: u32, keys: &KeySet) -> DrawList {
    let mut draws = DrawList::new();
    for _ in 0..frames {
        draws.clear();
        scene.frame(clock.tick(), keys, &mut draws);
    }
    draws
}

#[test]
fn accelerating_moves_the_truck_along_its_heading() {
    let mut scene = world();
    let mut clock = FixedStep::new(60.0);
    let rig = scene.vehicle_rig().unwrap();
    let start = scene.graph().node(rig.chassis).pose;

    run(&mut scene, &mut clock, 60, &KeySet::from([Key::Accelerate]));

    let pose = scene.graph().node(rig.chassis).pose;
    let state = scene.vehicle().unwrap().state();
    assert!(state.forward > 0.0);
    // The truck starts facing -X.
    assert!(pose.position.x < start.position.x - 1.0);
    assert!((pose.position.z - start.position.z).abs() < 1e-3);
    assert!((pose.yaw - start.yaw).abs() < 1e-6);
}

#[test]
fn steering_right_while_driving_turns_clockwise() {
    let mut scene = world();
    let mut clock = FixedStep::new(60.0);
    let rig = scene.vehicle_rig().unwrap();
    let start_yaw = scene.graph().node(rig.chassis).pose.yaw;

    run(&mut scene, &mut clock, 30, &KeySet::from([Key::Accelerate]));
    run(
        &mut scene,
        &mut clock,
        60,
        &KeySet::from([Key::Accelerate, Key::SteerRight]),
    );

    let state = scene.vehicle().unwrap().state();
    assert!(state.wheel_angle > 0.0);
    assert!(state.turn_radius.is_some());
    assert!(scene.graph().node(rig.chassis).pose.yaw < start_yaw);
}

#[test]
fn every_meshed_node_is_drawn_and_only_casters_shadowed() {
    let mut scene = world();
    let mut clock = FixedStep::new(60.0);
    let draws = run(&mut scene, &mut clock, 1, &KeySet::new());

    let meshed = scene.graph().nodes().iter().filter(|n| n.mesh.is_some()).count();
    let casters = scene
        .graph()
        .nodes()
        .iter()
        .filter(|n| n.mesh.is_some() && n.casts_shadow)
        .count();
    assert_eq!(draws.pass(Pass::Opaque).count(), meshed);
    assert_eq!(draws.pass(Pass::Shadow).count(), casters);
    // Trees, helicopters, rotors, chassis and wheels.
    assert_eq!(casters, 38 + 2 + 4 + 1 + 4);

    let first_shadow = draws.calls.iter().position(|c| c.pass == Pass::Shadow).unwrap();
    assert!(draws.calls[first_shadow..].iter().all(|c| c.pass == Pass::Shadow));
}

#[test]
fn draws_carry_composed_world_transforms() {
    let mut scene = world();
    let mut clock = FixedStep::new(60.0);
    let draws = run(&mut scene, &mut clock, 10, &KeySet::from([Key::Accelerate]));

    for call in draws.pass(Pass::Opaque) {
        let expected = scene.graph().resolve_world_matrix(call.node);
        assert!(call.world.abs_diff_eq(expected, 1e-3), "node {}", call.node);
    }
}

#[test]
fn rotors_spin_with_their_helicopter() {
    let mut scene = world();
    let mut clock = FixedStep::new(60.0);
    run(&mut scene, &mut clock, 30, &KeySet::new());

    let graph = scene.graph();
    let rotor = graph.find("main_rotor").unwrap();
    let node = graph.node(rotor);
    let heli = node.parent.unwrap();

    assert!((node.pose.yaw - 30.0 * 0.5).abs() < 1e-3);
    let expected = graph.world_matrix(heli).transform_point3(Vec3::new(0.0, 13.5, 5.0));
    let actual = graph.world_matrix(rotor).w_axis.truncate();
    assert!(actual.abs_diff_eq(expected, 1e-4));
}

#[test]
fn follow_camera_chases_and_cycles_distance() {
    let mut scene = world();
    // Power-of-two rate keeps frame times exact.
    let mut clock = FixedStep::new(64.0);
    run(&mut scene, &mut clock, 1, &KeySet::from([Key::FollowCamera]));
    assert_eq!(scene.camera().mode(), CameraMode::Follow);

    let target = scene.chase_target().unwrap();
    let distance = scene.camera().distance();
    let expected = target.position - target.heading * distance + Vec3::Y * distance * 0.35;
    assert!(scene.camera().camera().position.abs_diff_eq(expected, 1e-3));

    // Held for 0.75 s: switches at 0, 0.25 and 0.5 s.
    run(&mut scene, &mut clock, 48, &KeySet::from([Key::CycleDistance]));
    assert!((scene.camera().distance() - 60.0).abs() < f32::EPSILON);

    run(&mut scene, &mut clock, 1, &KeySet::from([Key::FreeCamera]));
    assert_eq!(scene.camera().mode(), CameraMode::Free);
}
