//! Per-frame orchestration.
//!
//! A frame runs in four steps: every motion rule in insertion order, a full
//! world-transform composition pass, the opaque draws, then the shadow draws
//! for shadow casters. The camera is updated between composition and drawing
//! so it chases the vehicle where it is this frame.

use glam::{Mat4, Vec3};

use crate::{
    camera::{CameraController, ChaseTarget},
    clock::FrameTime,
    error::{Result, SceneError},
    graph::{NodeId, SceneGraph},
    input::KeySet,
    motion::{VehicleKinematics, WheelPosition},
    render::{FrameUniforms, Renderer, shadow_matrix},
    world::CHASSIS,
};

/// Handles of the chassis and its wheels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleRig {
    pub chassis: NodeId,
    /// Front left, front right, rear left, rear right.
    pub wheels: [NodeId; 4],
}

impl VehicleRig {
    /// Locate the chassis and wheels by node name.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::MissingNode`] naming the first node not found.
    pub fn find(graph: &SceneGraph) -> Result<Self> {
        let lookup = |role: &'static str| graph.find(role).ok_or(SceneError::MissingNode { role });
        let chassis = lookup(CHASSIS)?;
        let [fl, fr, rl, rr] = WheelPosition::ALL;
        Ok(Self {
            chassis,
            wheels: [
                lookup(fl.name())?,
                lookup(fr.name())?,
                lookup(rl.name())?,
                lookup(rr.name())?,
            ],
        })
    }
}

/// The scene graph, camera and frame uniforms.
#[derive(Debug)]
pub struct Scene {
    graph: SceneGraph,
    camera: CameraController,
    vehicle: Option<VehicleRig>,
    shadow: Mat4,
    uniforms: FrameUniforms,
}

impl Scene {
    pub fn new(graph: SceneGraph, camera: CameraController, light_direction: Vec3) -> Self {
        let shadow = shadow_matrix(light_direction);
        let uniforms = FrameUniforms::new(camera.camera(), shadow);
        let mut scene = Self {
            graph,
            camera,
            vehicle: None,
            shadow,
            uniforms,
        };
        scene.graph.compose_world_transforms();
        scene
    }

    /// Track a vehicle with the chase camera.
    #[must_use]
    pub fn with_vehicle(mut self, rig: VehicleRig) -> Self {
        self.vehicle = Some(rig);
        self
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn vehicle_rig(&self) -> Option<VehicleRig> {
        self.vehicle
    }

    /// The chassis motion rule, if a vehicle is tracked.
    pub fn vehicle(&self) -> Option<&VehicleKinematics> {
        let rig = self.vehicle?;
        self.graph.node(rig.chassis).motion.as_vehicle()
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Update the camera aspect ratio for a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.camera_mut().set_viewport(width, height);
        self.uniforms = FrameUniforms::new(self.camera.camera(), self.shadow);
    }

    /// Advance motion, composition and camera by one frame.
    pub fn update(&mut self, time: FrameTime, keys: &KeySet) {
        self.graph.step_motion(time, keys);
        self.graph.compose_world_transforms();
        let target = self.chase_target();
        self.camera.update(time, keys, target);
        self.uniforms = FrameUniforms::new(self.camera.camera(), self.shadow);
    }

    /// Issue the opaque pass, then the shadow pass.
    pub fn render(&self, renderer: &mut impl Renderer) {
        for (id, node) in self.graph.iter() {
            if let Some(mesh) = node.mesh {
                renderer.draw(id, mesh, node.world_matrix(), &self.uniforms);
            }
        }
        for (id, node) in self.graph.iter() {
            if let Some(mesh) = node.mesh.filter(|_| node.casts_shadow) {
                renderer.draw_shadow(id, mesh, node.world_matrix(), &self.uniforms);
            }
        }
    }

    /// Run a full frame.
    pub fn frame(&mut self, time: FrameTime, keys: &KeySet, renderer: &mut impl Renderer) {
        self.update(time, keys);
        self.render(renderer);
    }

    /// Position and heading of the tracked vehicle from composed transforms.
    ///
    /// The heading runs from the rear left wheel to the front left wheel,
    /// falling back to the chassis yaw when the wheels coincide.
    pub fn chase_target(&self) -> Option<ChaseTarget> {
        let rig = self.vehicle?;
        let chassis = self.graph.node(rig.chassis);
        let position = chassis.world_matrix().w_axis.truncate();

        let front = self.graph.world_matrix(rig.wheels[0]).w_axis.truncate();
        let rear = self.graph.world_matrix(rig.wheels[2]).w_axis.truncate();
        let heading = (front - rear)
            .with_y(0.0)
            .try_normalize()
            .unwrap_or_else(|| chassis.pose.heading());

        Some(ChaseTarget { position, heading })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CameraParams,
        graph::SceneNode,
        pose::Pose,
        render::{DrawList, MeshHandle, Pass},
    };

    #[test]
    fn test_render_passes() {
        let mut graph = SceneGraph::new();
        let a = graph
            .add(SceneNode::new("a", Pose::default()).with_mesh(MeshHandle(1)))
            .unwrap();
        let b = graph
            .add(
                SceneNode::new("b", Pose::at(Vec3::X))
                    .with_mesh(MeshHandle(2))
                    .without_shadow(),
            )
            .unwrap();
        graph.add(SceneNode::new("empty", Pose::default())).unwrap();

        let scene = Scene::new(
            graph,
            CameraController::new(CameraParams::default()),
            Vec3::new(0.5, -1.0, 1.0),
        );
        let mut draws = DrawList::new();
        scene.render(&mut draws);

        let opaque: Vec<_> = draws.pass(Pass::Opaque).map(|c| c.node).collect();
        let shadow: Vec<_> = draws.pass(Pass::Shadow).map(|c| c.node).collect();
        assert_eq!(opaque, vec![a, b]);
        assert_eq!(shadow, vec![a]);
        // Every opaque draw precedes every shadow draw.
        assert_eq!(draws.calls[2].pass, Pass::Shadow);
    }

    #[test]
    fn test_resize_updates_projection() {
        let mut scene = Scene::new(
            SceneGraph::new(),
            CameraController::new(CameraParams::default()),
            Vec3::NEG_Y,
        );
        let before = scene.uniforms().projection;
        scene.resize(1600, 900);
        assert!((scene.camera().camera().aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_ne!(before, scene.uniforms().projection);
    }

    #[test]
    fn test_find_rig_reports_missing_wheel() {
        let mut graph = SceneGraph::new();
        let chassis = graph.add(SceneNode::new(CHASSIS, Pose::default())).unwrap();
        for position in &WheelPosition::ALL[..3] {
            graph
                .add(SceneNode::new(position.name(), Pose::default()).with_parent(chassis))
                .unwrap();
        }
        assert_eq!(
            VehicleRig::find(&graph),
            Err(SceneError::MissingNode {
                role: "wheel_rear_right"
            })
        );
    }

    #[test]
    fn test_find_rig_reports_missing_chassis() {
        assert_eq!(
            VehicleRig::find(&SceneGraph::new()),
            Err(SceneError::MissingNode { role: CHASSIS })
        );
    }
}
