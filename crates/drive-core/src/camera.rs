//! Perspective camera with free-fly and chase modes.
//!
//! ## Modes
//!
//! - **Free**: WASD-style translation and key-driven look, unrelated to the
//!   vehicle (default).
//! - **Follow**: sits behind the tracked vehicle along its heading at the
//!   current chase distance, looking at it. The distance key steps through a
//!   fixed list of distances, at most once per re-trigger delay.
//!
//! Mode changes take effect on the frame their key is seen.

use glam::{Mat4, Vec3};

use crate::{
    clock::FrameTime,
    config::CameraParams,
    input::{Key, KeySet},
};

/// Pitch limit for free look, just short of straight up/down.
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Camera mode.
#[derive(Default, PartialEq, Eq, Clone, Copy, Debug)]
pub enum CameraMode {
    /// Free-flight camera (default).
    #[default]
    Free,
    /// Chase camera following the vehicle.
    Follow,
}

/// Position, orientation and projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation about +Y; zero looks down +Z.
    pub yaw: f32,
    /// Elevation above the ground plane.
    pub pitch: f32,
    /// Viewport width over height.
    pub aspect: f32,
    /// Vertical field of view (radians).
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(params: &CameraParams) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            aspect: 1.0,
            fov: params.fov,
            near: params.near,
            far: params.far,
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch)
    }

    /// Unit right vector on the ground plane.
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-cos_yaw, 0.0, sin_yaw)
    }

    /// Turn to face `target`. Leaves the orientation alone if already there.
    pub fn look_at(&mut self, target: Vec3) {
        let direction = (target - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        self.yaw = direction.x.atan2(direction.z);
        self.pitch = direction.y.clamp(-1.0, 1.0).asin();
    }

    /// Update the aspect ratio from viewport dimensions.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// What the chase camera tracks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaseTarget {
    pub position: Vec3,
    /// Unit heading on the ground plane.
    pub heading: Vec3,
}

/// Camera plus mode state and the chase distance cycle.
#[derive(Clone, Debug)]
pub struct CameraController {
    camera: Camera,
    mode: CameraMode,
    params: CameraParams,
    distance: f32,
    /// Elapsed time of the last distance switch.
    last_switch: Option<f32>,
}

impl CameraController {
    pub fn new(params: CameraParams) -> Self {
        Self {
            camera: Camera::new(&params),
            mode: CameraMode::default(),
            distance: params.initial_distance,
            params,
            last_switch: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            tracing::info!("Camera mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Current chase distance.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Advance one frame.
    ///
    /// `target` is the vehicle to chase; without one, follow mode holds the
    /// camera where it is.
    pub fn update(&mut self, time: FrameTime, keys: &KeySet, target: Option<ChaseTarget>) {
        if keys.contains(Key::FollowCamera) {
            self.set_mode(CameraMode::Follow);
        } else if keys.contains(Key::FreeCamera) {
            self.set_mode(CameraMode::Free);
        }

        match self.mode {
            CameraMode::Free => self.fly(time.dt, keys),
            CameraMode::Follow => {
                if keys.contains(Key::CycleDistance) {
                    self.cycle_distance(time.t);
                }
                if let Some(target) = target {
                    self.chase(target);
                }
            }
        }
    }

    /// Step to the next chase distance unless the last switch was too recent.
    ///
    /// Returns whether the distance changed.
    pub fn cycle_distance(&mut self, now: f32) -> bool {
        if let Some(last) = self.last_switch
            && now - last < self.params.switch_delay
        {
            return false;
        }

        let distances = &self.params.chase_distances;
        let Some(first) = distances.first().copied() else {
            return false;
        };
        // The first listed distance above the current one, wrapping around.
        let next = distances
            .iter()
            .copied()
            .find(|d| *d > self.distance)
            .unwrap_or(first);

        tracing::info!("Chase distance {} -> {}", self.distance, next);
        self.distance = next;
        self.last_switch = Some(now);
        true
    }

    /// Place the camera behind and above the target, looking at it.
    fn chase(&mut self, target: ChaseTarget) {
        let height = self.distance * self.params.chase_height_ratio;
        self.camera.position = target.position - target.heading * self.distance + Vec3::Y * height;
        self.camera.look_at(target.position);
    }

    fn fly(&mut self, dt: f32, keys: &KeySet) {
        let turn = self.params.turn_rate * dt;
        if keys.contains(Key::LookLeft) {
            self.camera.yaw += turn;
        }
        if keys.contains(Key::LookRight) {
            self.camera.yaw -= turn;
        }
        if keys.contains(Key::LookUp) {
            self.camera.pitch += turn;
        }
        if keys.contains(Key::LookDown) {
            self.camera.pitch -= turn;
        }
        self.camera.pitch = self.camera.pitch.clamp(-MAX_PITCH, MAX_PITCH);

        let forward = self.camera.forward();
        let right = self.camera.right();
        let mut movement = Vec3::ZERO;
        let axes = [
            (Key::FlyForward, forward),
            (Key::FlyBack, -forward),
            (Key::FlyRight, right),
            (Key::FlyLeft, -right),
            (Key::FlyUp, Vec3::Y),
            (Key::FlyDown, Vec3::NEG_Y),
        ];
        for (key, direction) in axes {
            if keys.contains(key) {
                movement += direction;
            }
        }

        if movement != Vec3::ZERO {
            self.camera.position += movement.normalize() * self.params.fly_speed * dt;
        }
    }
}
