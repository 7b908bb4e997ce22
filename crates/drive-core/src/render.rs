//! Interfaces to the renderer and asset collaborators.
//!
//! The core never touches GPU resources. It asks an [`AssetSource`] for opaque
//! mesh handles while building the world, and each frame hands a [`Renderer`]
//! one draw per meshed node in the opaque pass and one per shadow caster in the
//! shadow pass, together with the frame's [`FrameUniforms`].

use glam::{Mat4, Vec3, Vec4};

use crate::{
    camera::Camera,
    error::{Result, SceneError},
    graph::NodeId,
};

/// Height above the ground at which planar shadows are drawn.
const SHADOW_LIFT: f32 = 0.01;

/// Opaque mesh handle supplied by the asset collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Supplies mesh handles keyed by asset path.
pub trait AssetSource {
    /// Load (or look up) the mesh at `path`.
    fn mesh(&mut self, path: &str) -> Result<MeshHandle>;
}

/// An [`AssetSource`] that loads nothing and hands out one handle per path.
#[derive(Clone, Debug, Default)]
pub struct HeadlessAssets {
    paths: Vec<String>,
}

impl HeadlessAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path a handle was issued for.
    pub fn path(&self, mesh: MeshHandle) -> Option<&str> {
        self.paths.get(mesh.0 as usize).map(String::as_str)
    }
}

impl AssetSource for HeadlessAssets {
    fn mesh(&mut self, path: &str) -> Result<MeshHandle> {
        let index = match self.paths.iter().position(|p| p == path) {
            Some(index) => index,
            None => {
                self.paths.push(path.to_owned());
                self.paths.len() - 1
            }
        };
        let index = u32::try_from(index).map_err(|_| SceneError::Asset {
            path: path.to_owned(),
            message: "too many meshes".to_owned(),
        })?;
        Ok(MeshHandle(index))
    }
}

/// Per-frame shader inputs shared by every draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    /// Flattens world geometry onto the ground along the light direction.
    pub shadow_matrix: Mat4,
}

impl FrameUniforms {
    pub fn new(camera: &Camera, shadow_matrix: Mat4) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        Self {
            view,
            projection,
            view_projection: projection * view,
            camera_position: camera.position,
            shadow_matrix,
        }
    }
}

/// Receives draws from [`crate::scene::Scene::render`].
pub trait Renderer {
    /// Draw a node's mesh with its world transform.
    fn draw(&mut self, node: NodeId, mesh: MeshHandle, world: Mat4, uniforms: &FrameUniforms);

    /// Draw a node's planar shadow. `world` is the node's world transform; the
    /// projection onto the ground is `uniforms.shadow_matrix`.
    fn draw_shadow(
        &mut self,
        node: NodeId,
        mesh: MeshHandle,
        world: Mat4,
        uniforms: &FrameUniforms,
    );
}

/// Planar projection onto the ground along `light_direction`.
///
/// A point `p` maps to `p - l * (p.y / l.y)`, with the result lifted to
/// `SHADOW_LIFT`. `light_direction` must point downward.
pub fn shadow_matrix(light_direction: Vec3) -> Mat4 {
    let l = light_direction.normalize_or(Vec3::NEG_Y);
    let d = -l.y;
    Mat4::from_cols(
        Vec4::X,
        Vec4::new(l.x / d, 0.0, l.z / d, 0.0),
        Vec4::Z,
        Vec4::new(0.0, SHADOW_LIFT, 0.0, 1.0),
    )
}

/// Which pass a recorded draw belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Opaque,
    Shadow,
}

/// A recorded draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub pass: Pass,
    pub node: NodeId,
    pub mesh: MeshHandle,
    pub world: Mat4,
}

/// A [`Renderer`] that records draws, for headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub calls: Vec<DrawCall>,
    /// Uniforms of the last frame recorded.
    pub uniforms: Option<FrameUniforms>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.uniforms = None;
    }

    /// Draws recorded for one pass, in order.
    pub fn pass(&self, pass: Pass) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(move |call| call.pass == pass)
    }
}

impl Renderer for DrawList {
    fn draw(&mut self, node: NodeId, mesh: MeshHandle, world: Mat4, uniforms: &FrameUniforms) {
        self.uniforms = Some(*uniforms);
        self.calls.push(DrawCall {
            pass: Pass::Opaque,
            node,
            mesh,
            world,
        });
    }

    fn draw_shadow(
        &mut self,
        node: NodeId,
        mesh: MeshHandle,
        world: Mat4,
        uniforms: &FrameUniforms,
    ) {
        self.uniforms = Some(*uniforms);
        self.calls.push(DrawCall {
            pass: Pass::Shadow,
            node,
            mesh,
            world,
        });
    }
}
