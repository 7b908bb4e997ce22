//! Tuning parameters for the vehicle, wheels and camera.
//!
//! Every struct carries the reference constants in its `Default` impl and
//! deserialises with `#[serde(default)]`, so a tuning file only needs to name
//! the values it overrides.

use std::{f32::consts::PI, path::Path};

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;

/// Chassis kinematics parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct VehicleParams {
    /// Inverse mass (1/kg).
    pub inverse_mass: f32,
    /// Exponential drag coefficient on forward speed.
    pub drag: f32,
    /// Distance between front and rear axles.
    pub wheelbase: f32,
    /// Drive impulse per second while accelerating.
    pub accelerate_impulse: f32,
    /// Reverse impulse per second while braking (applied as negative).
    pub brake_impulse: f32,
    /// Wheel angle change rate while steering (rad/s).
    pub steer_rate: f32,
    /// Maximum wheel angle magnitude (radians).
    pub max_steer: f32,
    /// Angle below which the centering key snaps the wheels straight (radians).
    pub center_tolerance: f32,
    /// Drive force decay factor while the handbrake is held.
    pub handbrake_force_decay: f32,
    /// Forward speed decay factor while the handbrake is held.
    pub handbrake_speed_decay: f32,
    /// Wheel angle divisor for cornering scrub, `|cos(angle / divisor)|`.
    pub scrub_divisor: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            inverse_mass: 10.0,
            drag: 0.05,
            wheelbase: 14.0,
            accelerate_impulse: 1000.0,
            brake_impulse: 500.0,
            steer_rate: PI / 8.0,
            max_steer: PI / 6.0,
            center_tolerance: 3f32.to_radians(),
            handbrake_force_decay: 10.0,
            handbrake_speed_decay: 0.5,
            scrub_divisor: 4.0,
        }
    }
}

/// Visual wheel parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WheelParams {
    /// Front wheel visual steer rate (rad/s).
    pub steer_rate: f32,
    /// Front wheel visual steer limit (radians).
    pub max_steer: f32,
    /// Rolling pitch per unit of chassis forward speed.
    pub roll_scale: f32,
}

impl Default for WheelParams {
    fn default() -> Self {
        Self {
            steer_rate: PI / 6.0,
            max_steer: PI / 6.0,
            roll_scale: 0.2,
        }
    }
}

/// Camera projection, free-fly and chase parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraParams {
    /// Vertical field of view (radians).
    pub fov: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Free-fly translation speed (units/s).
    pub fly_speed: f32,
    /// Free-fly rotation speed (rad/s).
    pub turn_rate: f32,
    /// Chase distances cycled by the distance key, in order.
    pub chase_distances: Vec<f32>,
    /// Chase distance at startup.
    pub initial_distance: f32,
    /// Height of the chase camera above the vehicle, as a fraction of distance.
    pub chase_height_ratio: f32,
    /// Minimum interval between two distance switches (seconds).
    pub switch_delay: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov: PI / 3.0,
            near: 0.5,
            far: 10_000.0,
            fly_speed: 60.0,
            turn_rate: 1.5,
            chase_distances: vec![45.0, 60.0, 76.0],
            initial_distance: 60.0,
            chase_height_ratio: 0.35,
            switch_delay: 0.25,
        }
    }
}

/// Everything needed to build the reference world.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub vehicle: VehicleParams,
    pub wheels: WheelParams,
    pub camera: CameraParams,
    /// Direction the light travels in (normalised on use).
    pub light_direction: Vec3,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleParams::default(),
            wheels: WheelParams::default(),
            camera: CameraParams::default(),
            light_direction: Vec3::new(0.5, -1.0, 1.0),
        }
    }
}

impl WorldConfig {
    /// Load a tuning file, falling back to defaults for unnamed fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path_display.clone(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path_display.clone(),
            source,
        })?;
        tracing::info!("Loaded tuning from {path_display}");
        Ok(config)
    }

    /// Parse a tuning document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = WorldConfig::from_json(r#"{ "vehicle": { "wheelbase": 10.0 } }"#).unwrap();
        assert!((config.vehicle.wheelbase - 10.0).abs() < f32::EPSILON);
        assert!((config.vehicle.inverse_mass - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.camera, CameraParams::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = WorldConfig::from_json("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorldConfig::load("/nonexistent/tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_bad_json() {
        assert!(WorldConfig::from_json("{ vehicle: 3 }").is_err());
    }
}
