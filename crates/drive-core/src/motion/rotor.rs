//! Constant-rate rotor spin.

use super::{FrameContext, MotionRule};
use crate::{graph::SceneNode, pose::Pose};

/// Which pose angle a rotor advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotorAxis {
    Yaw,
    Pitch,
    Roll,
}

/// Spins a node about one of its local axes at a fixed rate.
#[derive(Clone, Debug)]
pub struct RotorSpin {
    pub axis: RotorAxis,
    /// Radians per second.
    pub rate: f32,
}

impl RotorSpin {
    pub fn new(axis: RotorAxis, rate: f32) -> Self {
        Self { axis, rate }
    }
}

impl MotionRule for RotorSpin {
    fn step(&mut self, ctx: &FrameContext<'_>, pose: &mut Pose, _nodes: &[SceneNode]) -> bool {
        let delta = self.rate * ctx.time.dt;
        match self.axis {
            RotorAxis::Yaw => pose.yaw += delta,
            RotorAxis::Pitch => pose.pitch += delta,
            RotorAxis::Roll => pose.roll += delta,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FrameTime, input::KeySet};

    #[test]
    fn test_rotor_accumulates_without_wrapping() {
        let keys = KeySet::new();
        let ctx = FrameContext {
            time: FrameTime::new(0.5, 0.0),
            keys: &keys,
        };
        let mut rotor = RotorSpin::new(RotorAxis::Yaw, 30.0);
        let mut pose = Pose::default();
        for _ in 0..10 {
            assert!(rotor.step(&ctx, &mut pose, &[]));
        }
        assert!((pose.yaw - 150.0).abs() < 1e-3);
        assert!(pose.pitch.abs() < f32::EPSILON);
    }
}
