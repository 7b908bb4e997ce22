//! Per-node motion rules.
//!
//! Every node carries one [`Motion`]. Once per frame the graph calls
//! [`Motion::step`] with the frame timing, the held keys and a read-only view
//! of all nodes. The rule mutates the node's pose (and its own state) and
//! reports whether it should keep running.

mod rotor;
mod vehicle;
mod wheel;

use std::fmt;

pub use rotor::{RotorAxis, RotorSpin};
pub use vehicle::{VehicleKinematics, VehicleState, yaw_sign};
pub use wheel::{WheelPosition, WheelSync};

use crate::{clock::FrameTime, graph::SceneNode, input::KeySet, pose::Pose};

/// Per-frame inputs shared by every motion rule.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub time: FrameTime,
    pub keys: &'a KeySet,
}

/// A behavior stepped once per frame.
pub trait MotionRule: fmt::Debug + Send + Sync {
    /// Advance by one frame. Returns `false` once the rule has finished.
    fn step(&mut self, ctx: &FrameContext<'_>, pose: &mut Pose, nodes: &[SceneNode]) -> bool;
}

/// The motion rule attached to a node.
#[derive(Debug, Default)]
pub enum Motion {
    /// Static node.
    #[default]
    None,
    /// Player-driven chassis.
    Vehicle(VehicleKinematics),
    /// Wheel following the chassis.
    Wheel(WheelSync),
    /// Constant-rate spin.
    Rotor(RotorSpin),
    /// Caller-supplied behavior.
    Custom(Box<dyn MotionRule>),
}

impl Motion {
    /// Wrap a caller-supplied rule.
    pub fn custom(rule: impl MotionRule + 'static) -> Self {
        Self::Custom(Box::new(rule))
    }

    /// Step the rule. The no-op rule never finishes.
    pub fn step(&mut self, ctx: &FrameContext<'_>, pose: &mut Pose, nodes: &[SceneNode]) -> bool {
        match self {
            Self::None => true,
            Self::Vehicle(rule) => rule.step(ctx, pose, nodes),
            Self::Wheel(rule) => rule.step(ctx, pose, nodes),
            Self::Rotor(rule) => rule.step(ctx, pose, nodes),
            Self::Custom(rule) => rule.step(ctx, pose, nodes),
        }
    }

    /// The vehicle model, if this is a chassis.
    pub fn as_vehicle(&self) -> Option<&VehicleKinematics> {
        match self {
            Self::Vehicle(vehicle) => Some(vehicle),
            _ => None,
        }
    }

    pub fn as_vehicle_mut(&mut self) -> Option<&mut VehicleKinematics> {
        match self {
            Self::Vehicle(vehicle) => Some(vehicle),
            _ => None,
        }
    }
}

impl From<VehicleKinematics> for Motion {
    fn from(rule: VehicleKinematics) -> Self {
        Self::Vehicle(rule)
    }
}

impl From<WheelSync> for Motion {
    fn from(rule: WheelSync) -> Self {
        Self::Wheel(rule)
    }
}

impl From<RotorSpin> for Motion {
    fn from(rule: RotorSpin) -> Self {
        Self::Rotor(rule)
    }
}
