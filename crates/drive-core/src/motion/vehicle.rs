//! Chassis kinematics: drive force, steering and single-track turning.
//!
//! Forward speed is integrated from a per-frame drive force with exponential
//! drag. Turning is geometric: the front and rear axle lines are intersected to
//! find the turn center, the chassis is moved along its velocity and then
//! snapped back onto the circle through its previous position, and yaw advances
//! by the angle subtended by the chord it travelled.

use glam::Vec3;

use super::{FrameContext, MotionRule};
use crate::{
    config::VehicleParams,
    geometry::{ground, snap_to_circle, turn_center},
    graph::SceneNode,
    input::Key,
    pose::Pose,
};

/// Mutable kinematic state of the chassis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VehicleState {
    /// World-space velocity along the heading.
    pub velocity: Vec3,
    /// Signed speed along the heading, integrated from the drive force.
    pub forward_speed: f32,
    /// Velocity projected onto the heading: positive forward, negative reversing.
    pub forward: f32,
    /// Front wheel angle used by the turning geometry (radians, positive = right).
    pub wheel_angle: f32,
    /// Drive force applied on the last step.
    pub drive_force: f32,
    /// Radius of the arc followed on the last step, if turning.
    pub turn_radius: Option<f32>,
}

/// Motion rule for the player-controlled chassis.
#[derive(Clone, Debug)]
pub struct VehicleKinematics {
    params: VehicleParams,
    state: VehicleState,
    /// Set while the turn geometry is degenerate, so the fallback logs once.
    degenerate: bool,
}

impl VehicleKinematics {
    pub fn new(params: VehicleParams) -> Self {
        Self {
            params,
            state: VehicleState::default(),
            degenerate: false,
        }
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut VehicleState {
        &mut self.state
    }

    /// Apply drive and steering keys, returning this frame's drive force.
    fn apply_input(&mut self, ctx: &FrameContext<'_>) -> f32 {
        let p = &self.params;
        let keys = ctx.keys;
        let dt = ctx.time.dt;
        let state = &mut self.state;

        let mut force = 0.0;
        if keys.contains(Key::Accelerate) {
            force += p.accelerate_impulse * dt;
        } else if keys.contains(Key::Brake) {
            force -= p.brake_impulse * dt;
        }

        if keys.contains(Key::SteerRight) && state.wheel_angle < p.max_steer {
            state.wheel_angle = (state.wheel_angle + p.steer_rate * dt).min(p.max_steer);
            force -= force * dt;
        } else if keys.contains(Key::SteerLeft) && state.wheel_angle > -p.max_steer {
            state.wheel_angle = (state.wheel_angle - p.steer_rate * dt).max(-p.max_steer);
            force -= force * dt;
        } else if keys.contains(Key::CenterSteering) && state.wheel_angle.abs() < p.center_tolerance {
            state.wheel_angle = 0.0;
        }

        if keys.contains(Key::Handbrake) {
            force -= force * p.handbrake_force_decay * dt;
            state.forward_speed -= state.forward_speed * p.handbrake_speed_decay * dt;
        }

        force
    }

    /// Integrate forward speed and derive the velocity for the current heading.
    fn integrate(&mut self, force: f32, heading: Vec3, dt: f32) {
        let p = &self.params;
        let state = &mut self.state;

        let forward_acceleration = force * p.inverse_mass;
        state.forward_speed += forward_acceleration * dt;
        state.forward_speed *= (-dt * p.drag * p.inverse_mass).exp()
            * (state.wheel_angle / p.scrub_divisor).cos().abs();

        state.velocity = heading * state.forward_speed;
        state.forward = state.velocity.length() * heading.dot(state.velocity.normalize_or_zero());
        state.drive_force = force;
    }

    /// Move the chassis for one frame, along an arc when the wheels are turned.
    fn advance(&mut self, pose: &mut Pose, heading: Vec3, dt: f32) {
        let state = &mut self.state;
        let moved = pose.position + state.velocity * dt;
        let position = ground(pose.position);

        state.turn_radius = None;
        let center = turn_center(
            position,
            ground(heading),
            state.wheel_angle,
            self.params.wheelbase,
        );
        let Some(center) = center else {
            self.degenerate = false;
            pose.position = moved;
            return;
        };

        let radius = position.distance(center);
        let snapped = snap_to_circle(center, radius, ground(moved));
        let Some(snapped) = snapped.filter(|_| radius > f32::EPSILON) else {
            if !self.degenerate {
                tracing::warn!(
                    "Degenerate turn geometry (center {center}, radius {radius}), moving straight"
                );
                self.degenerate = true;
            }
            pose.position = moved;
            return;
        };
        self.degenerate = false;

        pose.position = Vec3::new(snapped.x, moved.y, snapped.y);
        let distance = position.distance(snapped);
        let swept = 2.0 * (distance / (2.0 * radius)).min(1.0).asin();
        pose.yaw += yaw_sign(state.wheel_angle, state.forward) * swept;
        state.turn_radius = Some(radius);
    }
}

/// Direction of the yaw change for a wheel angle and direction of travel.
///
/// Wheels turned right (positive angle) while moving forward decrease yaw, as
/// do wheels turned left while reversing. The mirrored cases increase yaw.
/// Straight wheels or a stationary chassis give no change.
pub fn yaw_sign(wheel_angle: f32, forward: f32) -> f32 {
    if (wheel_angle < 0.0 && forward > 0.0) || (wheel_angle > 0.0 && forward < 0.0) {
        1.0
    } else if (wheel_angle > 0.0 && forward > 0.0) || (wheel_angle < 0.0 && forward < 0.0) {
        -1.0
    } else {
        0.0
    }
}

impl MotionRule for VehicleKinematics {
    fn step(&mut self, ctx: &FrameContext<'_>, pose: &mut Pose, _nodes: &[SceneNode]) -> bool {
        let dt = ctx.time.dt;
        let force = self.apply_input(ctx);
        let heading = pose.heading();
        self.integrate(force, heading, dt);
        self.advance(pose, heading, dt);
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::{clock::FrameTime, input::KeySet};

    const DT: f32 = 1.0 / 60.0;

    fn step(vehicle: &mut VehicleKinematics, pose: &mut Pose, keys: &KeySet, dt: f32) {
        let ctx = FrameContext {
            time: FrameTime::new(dt, 0.0),
            keys,
        };
        assert!(vehicle.step(&ctx, pose, &[]));
    }

    fn vehicle() -> VehicleKinematics {
        VehicleKinematics::new(VehicleParams::default())
    }

    #[test]
    fn test_accelerate_from_rest() {
        let mut vehicle = vehicle();
        let mut pose = Pose::default();
        let keys = KeySet::from([Key::Accelerate]);

        let mut last_speed = 0.0;
        for _ in 0..60 {
            step(&mut vehicle, &mut pose, &keys, DT);
            let speed = vehicle.state().forward_speed;
            assert!(speed > last_speed, "speed should keep increasing");
            last_speed = speed;
        }

        assert!(vehicle.state().forward > 0.0);
        assert!(pose.position.z > 0.0);
        assert!(pose.position.x.abs() < 1e-4);
        assert!(pose.yaw.abs() < 1e-6);
    }

    #[test]
    fn test_brake_reverses() {
        let mut vehicle = vehicle();
        let mut pose = Pose::default();
        let keys = KeySet::from([Key::Brake]);
        for _ in 0..30 {
            step(&mut vehicle, &mut pose, &keys, DT);
        }
        assert!(vehicle.state().forward < 0.0);
        assert!(pose.position.z < 0.0);
    }

    #[test]
    fn test_straight_line_fallback() {
        let mut vehicle = vehicle();
        vehicle.state_mut().forward_speed = 12.0;
        let mut pose = Pose::at(Vec3::new(1.0, 5.75, 2.0)).with_yaw(0.8);
        let before = pose;

        step(&mut vehicle, &mut pose, &KeySet::new(), DT);

        let expected = before.position + vehicle.state().velocity * DT;
        assert!((pose.position - expected).length() < 1e-5);
        assert!((pose.yaw - before.yaw).abs() < f32::EPSILON);
        assert!(vehicle.state().turn_radius.is_none());
    }

    #[test]
    fn test_turn_stays_on_circle() {
        let mut vehicle = vehicle();
        vehicle.state_mut().forward_speed = 20.0;
        vehicle.state_mut().wheel_angle = 0.3;
        let mut pose = Pose::at(Vec3::new(4.0, 5.75, -3.0)).with_yaw(-1.2);

        let start = ground(pose.position);
        let center = turn_center(start, ground(pose.heading()), 0.3, 14.0).unwrap();
        let radius = start.distance(center);

        step(&mut vehicle, &mut pose, &KeySet::new(), DT);

        let after = ground(pose.position);
        assert!((after.distance(center) - radius).abs() < 1e-3);
        assert!(after.distance(start) > 0.0);
        assert!((pose.position.y - 5.75).abs() < 1e-6);
        assert!((vehicle.state().turn_radius.unwrap() - radius).abs() < 1e-4);
    }

    #[test]
    fn test_right_turn_forward_decreases_yaw() {
        let mut vehicle = vehicle();
        vehicle.state_mut().forward_speed = 20.0;
        vehicle.state_mut().wheel_angle = 0.3;
        let mut pose = Pose::default();
        step(&mut vehicle, &mut pose, &KeySet::new(), DT);
        assert!(pose.yaw < 0.0);
        // Heading +Z turning right drifts toward -X.
        assert!(pose.position.x < 0.0);
    }

    #[test]
    fn test_reverse_flips_yaw_delta() {
        let run = |speed: f32| {
            let mut vehicle = vehicle();
            vehicle.state_mut().forward_speed = speed;
            vehicle.state_mut().wheel_angle = -0.25;
            let mut pose = Pose::default().with_yaw(0.5);
            step(&mut vehicle, &mut pose, &KeySet::new(), DT);
            pose.yaw - 0.5
        };
        let forward = run(15.0);
        let reverse = run(-15.0);
        assert!(forward > 0.0);
        assert!(reverse < 0.0);
        assert!((forward + reverse).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_sign_table() {
        assert!((yaw_sign(0.2, 1.0) + 1.0).abs() < f32::EPSILON);
        assert!((yaw_sign(0.2, -1.0) - 1.0).abs() < f32::EPSILON);
        assert!((yaw_sign(-0.2, 1.0) - 1.0).abs() < f32::EPSILON);
        assert!((yaw_sign(-0.2, -1.0) + 1.0).abs() < f32::EPSILON);
        assert!(yaw_sign(0.0, 1.0).abs() < f32::EPSILON);
        assert!(yaw_sign(0.2, 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_centering_snaps_small_angles() {
        let mut vehicle = vehicle();
        vehicle.state_mut().wheel_angle = 2.5f32.to_radians();
        let mut pose = Pose::default();
        step(&mut vehicle, &mut pose, &KeySet::from([Key::CenterSteering]), DT);
        assert!(vehicle.state().wheel_angle.abs() < f32::EPSILON);

        vehicle.state_mut().wheel_angle = 10f32.to_radians();
        step(&mut vehicle, &mut pose, &KeySet::from([Key::CenterSteering]), DT);
        assert!((vehicle.state().wheel_angle - 10f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_steering_bleeds_drive_force() {
        let mut straight = vehicle();
        let mut turning = vehicle();
        let mut pose = Pose::default();
        step(&mut straight, &mut pose, &KeySet::from([Key::Accelerate]), DT);
        let mut pose = Pose::default();
        step(
            &mut turning,
            &mut pose,
            &KeySet::from([Key::Accelerate, Key::SteerLeft]),
            DT,
        );
        assert!(turning.state().drive_force < straight.state().drive_force);
        assert!(turning.state().wheel_angle < 0.0);
    }

    #[test]
    fn test_handbrake_slows() {
        let mut braked = vehicle();
        let mut coasting = vehicle();
        braked.state_mut().forward_speed = 30.0;
        coasting.state_mut().forward_speed = 30.0;
        let mut pose = Pose::default();
        step(&mut braked, &mut pose, &KeySet::from([Key::Handbrake]), DT);
        let mut pose = Pose::default();
        step(&mut coasting, &mut pose, &KeySet::new(), DT);
        assert!(braked.state().forward_speed < coasting.state().forward_speed);
        assert!(braked.state().forward_speed > 0.0);
    }

    #[test]
    fn test_degenerate_wheelbase_falls_back() {
        let mut vehicle = VehicleKinematics::new(VehicleParams {
            wheelbase: 0.0,
            ..Default::default()
        });
        vehicle.state_mut().forward_speed = 10.0;
        vehicle.state_mut().wheel_angle = 0.3;
        let mut pose = Pose::default();
        step(&mut vehicle, &mut pose, &KeySet::new(), DT);
        assert!(pose.position.is_finite());
        assert!(pose.yaw.is_finite());
        assert!(pose.position.z > 0.0);
    }

    #[test]
    fn test_stationary_turned_wheels_do_not_move() {
        let mut vehicle = vehicle();
        vehicle.state_mut().wheel_angle = 0.4;
        let mut pose = Pose::at(Vec3::new(3.0, 0.0, 3.0));
        step(&mut vehicle, &mut pose, &KeySet::new(), DT);
        assert!((ground(pose.position) - Vec2::new(3.0, 3.0)).length() < 1e-5);
        assert!(pose.yaw.abs() < f32::EPSILON);
    }

    fn arb_steer_keys() -> impl Strategy<Value = KeySet> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(left, right, center, accelerate)| {
                let mut keys = KeySet::new();
                if left {
                    keys.press(Key::SteerLeft);
                }
                if right {
                    keys.press(Key::SteerRight);
                }
                if center {
                    keys.press(Key::CenterSteering);
                }
                if accelerate {
                    keys.press(Key::Accelerate);
                }
                keys
            },
        )
    }

    proptest! {
        #[test]
        fn prop_wheel_angle_stays_clamped(
            frames in prop::collection::vec((arb_steer_keys(), 0.001f32..0.5), 1..200),
        ) {
            let mut vehicle = vehicle();
            let mut pose = Pose::default();
            let max = vehicle.params().max_steer;
            for (keys, dt) in &frames {
                step(&mut vehicle, &mut pose, keys, *dt);
                prop_assert!(vehicle.state().wheel_angle.abs() <= max);
                prop_assert!(pose.position.is_finite());
            }
        }

        #[test]
        fn prop_centering_zeroes_within_tolerance(angle in -0.05f32..0.05) {
            let mut vehicle = vehicle();
            vehicle.state_mut().wheel_angle = angle;
            let mut pose = Pose::default();
            step(&mut vehicle, &mut pose, &KeySet::from([Key::CenterSteering]), DT);
            prop_assert!(vehicle.state().wheel_angle == 0.0);
        }
    }
}
