//! The reference driving world: a road through grass, two rows of trees,
//! two helicopters with spinning rotors and the drivable truck.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};

use glam::Vec3;

use crate::{
    camera::CameraController,
    config::WorldConfig,
    error::Result,
    graph::{SceneGraph, SceneNode},
    motion::{RotorAxis, RotorSpin, VehicleKinematics, WheelPosition, WheelSync},
    pose::Pose,
    render::{AssetSource, MeshHandle},
    scene::{Scene, VehicleRig},
};

/// Asset paths requested from the [`AssetSource`].
pub mod assets {
    pub const TREE: &str = "media/json/tree.json";
    pub const HELI: &str = "media/json/heli/heli1.json";
    pub const MAIN_ROTOR: &str = "media/json/heli/mainrotor.json";
    pub const TAIL_ROTOR: &str = "media/json/heli/tailrotor.json";
    pub const CHASSIS: &str = "media/json/chevy/chassis.json";
    pub const WHEEL: &str = "media/json/chevy/wheel.json";
    pub const ROAD: &str = "media/road.jpg";
    pub const GRASS: &str = "media/grass.png";

    /// Every path, in the order the world requests them.
    pub const ALL: [&str; 8] = [
        TREE, HELI, MAIN_ROTOR, TAIL_ROTOR, CHASSIS, WHEEL, ROAD, GRASS,
    ];
}

/// Node name of the truck chassis.
pub const CHASSIS: &str = "chassis";

const TREE_SPACING: f32 = 110.0;
const TILE_SIZE: f32 = 100.0;
/// Road tiles run along X for this many tiles either side of the origin.
const ROAD_HALF_LENGTH: i32 = 40;
/// Grass rows either side of the road.
const GRASS_ROWS: i32 = 10;

const MAIN_ROTOR_RATE: f32 = 30.0;
const TAIL_ROTOR_RATE: f32 = 35.0;

const CHASSIS_POSITION: Vec3 = Vec3::new(0.0, 5.75, 0.0);
const CAMERA_START: Vec3 = Vec3::new(0.0, 30.0, -120.0);

struct Meshes {
    tree: MeshHandle,
    heli: MeshHandle,
    main_rotor: MeshHandle,
    tail_rotor: MeshHandle,
    chassis: MeshHandle,
    wheel: MeshHandle,
    road: MeshHandle,
    grass: MeshHandle,
}

impl Meshes {
    fn load(assets: &mut dyn AssetSource) -> Result<Self> {
        Ok(Self {
            tree: assets.mesh(assets::TREE)?,
            heli: assets.mesh(assets::HELI)?,
            main_rotor: assets.mesh(assets::MAIN_ROTOR)?,
            tail_rotor: assets.mesh(assets::TAIL_ROTOR)?,
            chassis: assets.mesh(assets::CHASSIS)?,
            wheel: assets.mesh(assets::WHEEL)?,
            road: assets.mesh(assets::ROAD)?,
            grass: assets.mesh(assets::GRASS)?,
        })
    }
}

/// Local offset of a wheel from the chassis origin.
fn wheel_offset(position: WheelPosition) -> Vec3 {
    // +X is the driver's left when facing +Z.
    let x = match position {
        WheelPosition::FrontLeft | WheelPosition::RearLeft => 7.0,
        WheelPosition::FrontRight | WheelPosition::RearRight => -7.0,
    };
    let z = if position.is_front() { 14.0 } else { -11.0 };
    Vec3::new(x, -3.0, z)
}

/// Builder for the reference world.
pub struct World;

impl World {
    /// Assemble the world, requesting meshes from `assets`.
    ///
    /// # Errors
    ///
    /// Fails if a mesh cannot be supplied or the graph rejects a node.
    pub fn build(assets: &mut dyn AssetSource, config: &WorldConfig) -> Result<Scene> {
        let meshes = Meshes::load(assets)?;
        let mut graph = SceneGraph::new();

        for i in -18..=0 {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * TREE_SPACING;
            for z in [TREE_SPACING, -TREE_SPACING] {
                graph.add(
                    SceneNode::new("tree", Pose::at(Vec3::new(x, 0.0, z))).with_mesh(meshes.tree),
                )?;
            }
        }

        for x in [-50.0, -18.0 * TREE_SPACING + 50.0] {
            let heli = graph.add(
                SceneNode::new("heli", Pose::at(Vec3::new(x, 5.0, -110.0))).with_mesh(meshes.heli),
            )?;
            graph.add(
                SceneNode::new("main_rotor", Pose::at(Vec3::new(0.0, 13.5, 5.0)))
                    .with_mesh(meshes.main_rotor)
                    .with_parent(heli)
                    .with_motion(RotorSpin::new(RotorAxis::Yaw, MAIN_ROTOR_RATE)),
            )?;
            graph.add(
                SceneNode::new("tail_rotor", Pose::at(Vec3::new(1.0, 10.0, -35.0)))
                    .with_mesh(meshes.tail_rotor)
                    .with_parent(heli)
                    .with_motion(RotorSpin::new(RotorAxis::Pitch, TAIL_ROTOR_RATE)),
            )?;
        }

        let chassis = graph.add(
            SceneNode::new(CHASSIS, Pose::at(CHASSIS_POSITION).with_yaw(-FRAC_PI_2))
                .with_mesh(meshes.chassis)
                .with_motion(VehicleKinematics::new(config.vehicle.clone())),
        )?;
        for (i, position) in WheelPosition::ALL.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let pitch = i as f32 * FRAC_PI_6;
            let pose = Pose::at(wheel_offset(position)).with_pitch(pitch);
            graph.add(
                SceneNode::new(position.name(), pose)
                    .with_mesh(meshes.wheel)
                    .with_parent(chassis)
                    .with_motion(WheelSync::new(position, chassis, config.wheels.clone())),
            )?;
        }

        for i in -ROAD_HALF_LENGTH..=ROAD_HALF_LENGTH {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * TILE_SIZE;
            graph.add(
                SceneNode::new("road", Pose::at(Vec3::new(x, 0.0, 0.0)))
                    .with_mesh(meshes.road)
                    .without_shadow(),
            )?;
            for j in (-GRASS_ROWS..=GRASS_ROWS).filter(|&j| j != 0) {
                #[allow(clippy::cast_precision_loss)]
                let z = j as f32 * TILE_SIZE;
                graph.add(
                    SceneNode::new("grass", Pose::at(Vec3::new(x, 0.0, z)))
                        .with_mesh(meshes.grass)
                        .without_shadow(),
                )?;
            }
        }

        let rig = VehicleRig::find(&graph)?;
        let mut camera = CameraController::new(config.camera.clone());
        camera.camera_mut().position = CAMERA_START;
        camera.camera_mut().look_at(CHASSIS_POSITION);

        tracing::info!("Built world with {} nodes", graph.len());
        Ok(Scene::new(graph, camera, config.light_direction).with_vehicle(rig))
    }
}
