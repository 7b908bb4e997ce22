//! Wheel presentation: visual steering and rolling.

use super::{FrameContext, MotionRule};
use crate::{
    config::WheelParams,
    graph::{NodeId, SceneNode},
    input::Key,
    pose::Pose,
};

/// Wheel slot on the chassis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    /// All slots, front pair first.
    pub const ALL: [Self; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
    ];

    /// Node name used for this slot.
    pub fn name(self) -> &'static str {
        match self {
            Self::FrontLeft => "wheel_front_left",
            Self::FrontRight => "wheel_front_right",
            Self::RearLeft => "wheel_rear_left",
            Self::RearRight => "wheel_rear_right",
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }
}

/// Mirrors the chassis state onto one wheel.
///
/// Front wheels turn with the steering keys on their own clock; this is purely
/// visual and does not feed back into the chassis. Every wheel rolls at a rate
/// proportional to the chassis' signed forward speed.
#[derive(Clone, Debug)]
pub struct WheelSync {
    position: WheelPosition,
    chassis: NodeId,
    params: WheelParams,
}

impl WheelSync {
    pub fn new(position: WheelPosition, chassis: NodeId, params: WheelParams) -> Self {
        Self {
            position,
            chassis,
            params,
        }
    }

    pub fn position(&self) -> WheelPosition {
        self.position
    }
}

impl MotionRule for WheelSync {
    fn step(&mut self, ctx: &FrameContext<'_>, pose: &mut Pose, nodes: &[SceneNode]) -> bool {
        let dt = ctx.time.dt;
        let p = &self.params;

        if self.position.is_front() {
            if ctx.keys.contains(Key::SteerLeft) && pose.yaw < p.max_steer {
                pose.yaw = (pose.yaw + p.steer_rate * dt).min(p.max_steer);
            }
            if ctx.keys.contains(Key::SteerRight) && pose.yaw > -p.max_steer {
                pose.yaw = (pose.yaw - p.steer_rate * dt).max(-p.max_steer);
            }
        }

        let forward = nodes
            .get(self.chassis.index())
            .and_then(|chassis| chassis.motion.as_vehicle())
            .map(|vehicle| vehicle.state().forward);
        if let Some(forward) = forward.filter(|f| f.is_finite()) {
            pose.pitch += forward * dt * p.roll_scale;
        }

        true
    }
}
