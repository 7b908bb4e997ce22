//! Arena-backed scene graph.
//!
//! Nodes live in a flat `Vec` and refer to their parent by [`NodeId`]. A parent
//! must already be in the arena when its child is added, so every parent index
//! is strictly smaller than its child's. That ordering rules out cycles and
//! lets a single forward pass compose world transforms. Nodes are never
//! removed, so handles never dangle.

use std::fmt;

use glam::Mat4;

use crate::{
    clock::FrameTime,
    error::{Result, SceneError},
    input::KeySet,
    motion::{FrameContext, Motion},
    pose::Pose,
    render::MeshHandle,
};

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the scene: pose, optional mesh, optional parent and a motion rule.
#[derive(Debug)]
pub struct SceneNode {
    /// Diagnostic label.
    pub name: &'static str,
    pub pose: Pose,
    /// Shared mesh handle; several nodes may draw the same mesh.
    pub mesh: Option<MeshHandle>,
    pub parent: Option<NodeId>,
    pub motion: Motion,
    pub casts_shadow: bool,
    /// Composed world transform, refreshed once per frame.
    world: Mat4,
}

impl SceneNode {
    /// A root node with no mesh and no motion.
    pub fn new(name: &'static str, pose: Pose) -> Self {
        Self {
            name,
            pose,
            mesh: None,
            parent: None,
            motion: Motion::None,
            casts_shadow: true,
            world: pose.local_matrix(),
        }
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshHandle) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_motion(mut self, motion: impl Into<Motion>) -> Self {
        self.motion = motion.into();
        self
    }

    /// Exclude the node from the shadow pass.
    #[must_use]
    pub fn without_shadow(mut self) -> Self {
        self.casts_shadow = false;
        self
    }

    /// World transform as of the last composition pass.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }
}

/// Flat arena of scene nodes in insertion order.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its handle.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownParent`] if the node names a parent that
    /// has not been added yet.
    pub fn add(&mut self, node: SceneNode) -> Result<NodeId> {
        let len = self.nodes.len();
        if let Some(parent) = node.parent
            && parent.index() >= len
        {
            return Err(SceneError::UnknownParent { parent, len });
        }
        self.nodes.push(node);
        Ok(NodeId(len))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    /// Look up a node that is known to exist.
    ///
    /// Handles are only minted by [`SceneGraph::add`] and nodes are never
    /// removed, so this cannot fail for handles from this graph.
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.index()]
    }

    /// First node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|node| node.name == name).map(NodeId)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Node handles paired with nodes, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Run every motion rule once, in insertion order.
    ///
    /// Each rule sees the other nodes as they are at that point of the pass.
    /// A rule that reports itself finished is replaced by [`Motion::None`].
    pub fn step_motion(&mut self, time: FrameTime, keys: &KeySet) {
        let ctx = FrameContext { time, keys };
        for index in 0..self.nodes.len() {
            if matches!(self.nodes[index].motion, Motion::None) {
                continue;
            }
            let mut motion = std::mem::take(&mut self.nodes[index].motion);
            let mut pose = self.nodes[index].pose;
            let active = motion.step(&ctx, &mut pose, &self.nodes);
            let node = &mut self.nodes[index];
            node.pose = pose;
            if active {
                node.motion = motion;
            } else {
                tracing::debug!("Motion rule on {} finished", node.name);
            }
        }
    }

    /// Recompute every cached world transform from the current poses.
    pub fn compose_world_transforms(&mut self) {
        for index in 0..self.nodes.len() {
            let local = self.nodes[index].pose.local_matrix();
            let world = match self.nodes[index].parent {
                // Parents precede children, so this is already this frame's value.
                Some(parent) => self.nodes[parent.index()].world * local,
                None => local,
            };
            self.nodes[index].world = world;
        }
    }

    /// Cached world transform of a node.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        self.node(id).world
    }

    /// World transform computed directly from the parent chain, bypassing the cache.
    pub fn resolve_world_matrix(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        let local = node.pose.local_matrix();
        match node.parent {
            Some(parent) => self.resolve_world_matrix(parent) * local,
            None => local,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;

    use super::*;
    use crate::motion::{MotionRule, RotorAxis, RotorSpin};

    /// Spins for a fixed number of frames, then reports itself finished.
    #[derive(Debug)]
    struct Countdown(u32);

    impl MotionRule for Countdown {
        fn step(&mut self, ctx: &FrameContext<'_>, pose: &mut Pose, _nodes: &[SceneNode]) -> bool {
            pose.pitch += ctx.time.dt;
            self.0 = self.0.saturating_sub(1);
            self.0 > 0
        }
    }

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-4), "{a:?} != {b:?}");
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut graph = SceneGraph::new();
        let root = graph.add(SceneNode::new("root", Pose::default())).unwrap();
        let bogus = NodeId(5);
        let err = graph
            .add(SceneNode::new("child", Pose::default()).with_parent(bogus))
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownParent { parent: bogus, len: 1 });
        assert!(graph.add(SceneNode::new("ok", Pose::default()).with_parent(root)).is_ok());
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut graph = SceneGraph::new();
        let first = graph.add(SceneNode::new("tree", Pose::default())).unwrap();
        graph.add(SceneNode::new("tree", Pose::default())).unwrap();
        assert_eq!(graph.find("tree"), Some(first));
        assert_eq!(graph.find("heli"), None);
    }

    #[test]
    fn test_root_world_is_local() {
        let mut graph = SceneGraph::new();
        let pose = Pose::at(Vec3::new(3.0, 1.0, -2.0)).with_yaw(0.4);
        let id = graph.add(SceneNode::new("root", pose)).unwrap();
        graph.compose_world_transforms();
        assert_mat_eq(graph.world_matrix(id), pose.local_matrix());
    }

    #[test]
    fn test_child_sees_parent_pose_from_same_frame() {
        let mut graph = SceneGraph::new();
        let heli = graph
            .add(SceneNode::new("heli", Pose::at(Vec3::new(-50.0, 5.0, -110.0))))
            .unwrap();
        let rotor = graph
            .add(
                SceneNode::new("rotor", Pose::at(Vec3::new(0.0, 13.5, 5.0)))
                    .with_parent(heli)
                    .with_motion(RotorSpin::new(RotorAxis::Yaw, 30.0)),
            )
            .unwrap();

        graph.node_mut(heli).pose.position.x += 10.0;
        graph.step_motion(FrameTime::new(0.1, 0.1), &KeySet::new());
        graph.compose_world_transforms();

        let expected = graph.node(heli).pose.local_matrix() * graph.node(rotor).pose.local_matrix();
        assert_mat_eq(graph.world_matrix(rotor), expected);
        let origin = graph.world_matrix(rotor).transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(-40.0, 18.5, -105.0)).length() < 1e-4);
    }

    #[test]
    fn test_finished_motion_is_dropped() {
        let mut graph = SceneGraph::new();
        let id = graph
            .add(
                SceneNode::new("spinner", Pose::default()).with_motion(Motion::custom(Countdown(2))),
            )
            .unwrap();
        for _ in 0..2 {
            graph.step_motion(FrameTime::new(0.1, 0.0), &KeySet::new());
        }
        assert!(matches!(graph.node(id).motion, Motion::None));
        let pitch = graph.node(id).pose.pitch;
        graph.step_motion(FrameTime::new(0.1, 0.0), &KeySet::new());
        assert!((graph.node(id).pose.pitch - pitch).abs() < f32::EPSILON);
    }

    fn arb_pose() -> impl Strategy<Value = Pose> {
        (
            -100.0f32..100.0,
            -100.0f32..100.0,
            -100.0f32..100.0,
            -10.0f32..10.0,
            -10.0f32..10.0,
            -10.0f32..10.0,
        )
            .prop_map(|(x, y, z, yaw, pitch, roll)| Pose {
                position: Vec3::new(x, y, z),
                yaw,
                pitch,
                roll,
            })
    }

    proptest! {
        #[test]
        fn prop_world_is_parent_world_times_local(
            poses in prop::collection::vec(arb_pose(), 1..12),
            parents in prop::collection::vec(any::<prop::sample::Index>(), 12),
        ) {
            let mut graph = SceneGraph::new();
            for (i, pose) in poses.iter().enumerate() {
                let mut node = SceneNode::new("n", *pose);
                // Every other node hangs off some earlier node.
                if i > 0 && i % 2 == 1 {
                    node = node.with_parent(NodeId(parents[i].index(i)));
                }
                graph.add(node).unwrap();
            }
            graph.compose_world_transforms();

            for (id, node) in graph.iter() {
                let expected = match node.parent {
                    Some(parent) => graph.world_matrix(parent) * node.pose.local_matrix(),
                    None => node.pose.local_matrix(),
                };
                prop_assert!(graph.world_matrix(id).abs_diff_eq(expected, 1e-3));
                prop_assert!(graph.world_matrix(id).abs_diff_eq(graph.resolve_world_matrix(id), 1e-2));
            }
        }
    }
}
