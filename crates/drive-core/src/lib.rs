//! Scene graph, vehicle kinematics and chase camera for a small driving scene.
//!
//! The crate is renderer-agnostic: a [`scene::Scene`] advances its nodes'
//! motion rules, composes world transforms and hands draws to a
//! [`render::Renderer`]. The viewer crate supplies the window, meshes and
//! input; tests and the headless simulator use [`render::DrawList`].

pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod motion;
pub mod pose;
pub mod render;
pub mod scene;
pub mod script;
pub mod telemetry;
pub mod world;

pub use camera::{Camera, CameraController, CameraMode, ChaseTarget};
pub use clock::{FixedStep, FrameClock, FrameTime};
pub use config::{CameraParams, VehicleParams, WheelParams, WorldConfig};
pub use error::{ConfigError, Result, SceneError};
pub use graph::{NodeId, SceneGraph, SceneNode};
pub use input::{Key, KeySet, UnknownKey};
pub use pose::Pose;
pub use render::{AssetSource, DrawList, FrameUniforms, HeadlessAssets, MeshHandle, Renderer};
pub use scene::{Scene, VehicleRig};
pub use script::{InputScript, ScriptError, ScriptStep};
pub use world::World;
