//! Position plus independent Euler angles.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position and orientation of a node relative to its parent.
///
/// Angles are radians and are never wrapped; spinning rotors accumulate large
/// magnitudes over a session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Rotation about +Y.
    pub yaw: f32,
    /// Rotation about +X, applied after yaw.
    pub pitch: f32,
    /// Rotation about +Z, applied after pitch.
    pub roll: f32,
}

impl Pose {
    /// A pose at `position` with no rotation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    #[must_use]
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Rotation as `Ry(yaw) * Rx(pitch) * Rz(roll)`.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// Local transform: translation composed with rotation.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }

    /// Unit heading on the ground plane, `(sin yaw, 0, cos yaw)`.
    pub fn heading(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}
