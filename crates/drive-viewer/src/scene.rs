//! Bevy front end for the core scene.
//!
//! One entity is spawned per meshed node. Each frame the core scene runs with
//! Bevy's clock and the held keys, drawing into a [`DrawList`]; the recorded
//! opaque pass is copied onto entity transforms and the shadow pass decides
//! which entities cast shadows from the directional light.

use bevy::{
    camera::ClearColorConfig,
    light::{NotShadowCaster, light_consts::lux},
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};
use drive_core::{DrawList, FrameTime, World, render::Pass};

use crate::{
    assets::{MeshRegistry, PrimitiveAssets},
    input::{HeldKeys, SampleKeys},
    launch_params::LaunchParams,
};

/// Sky colour behind the scene.
const SKY: Color = Color::srgb(0.5294, 0.8078, 0.9216);

// ============================================================================
// Resources and components
// ============================================================================

/// The core scene driven by this app.
#[derive(Resource)]
pub struct DriveScene(pub drive_core::Scene);

/// Draws recorded by the last frame.
#[derive(Resource, Default)]
struct FrameDraws(DrawList);

/// Entity for each node, indexed by node handle. Nodes without a mesh have none.
#[derive(Resource, Default)]
struct NodeEntities(Vec<Option<Entity>>);

/// Marker for the camera driven by the core camera.
#[derive(Component)]
struct ViewerCamera;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that builds the world and runs it every frame.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MeshRegistry>()
            .init_resource::<FrameDraws>()
            .init_resource::<NodeEntities>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (
                    resize_viewport,
                    run_frame,
                    sync_transforms,
                    sync_shadows,
                    sync_camera,
                )
                    .chain()
                    .after(SampleKeys)
                    .run_if(resource_exists::<DriveScene>),
            );
    }
}

// ============================================================================
// Setup
// ============================================================================

fn setup_scene(
    mut commands: Commands,
    params: Res<LaunchParams>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<MeshRegistry>,
    mut entities: ResMut<NodeEntities>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut exit: MessageWriter<AppExit>,
) {
    let config = params.world_config();
    let mut assets = PrimitiveAssets {
        meshes: &mut meshes,
        materials: &mut materials,
        registry: &mut registry,
    };
    let mut scene = match World::build(&mut assets, &config) {
        Ok(scene) => scene,
        Err(e) => {
            tracing::error!("Failed to build the world: {e}");
            exit.write(AppExit::error());
            return;
        }
    };

    scene.camera_mut().set_mode(params.camera_mode);
    if let Ok(window) = window.single() {
        scene.resize(window.physical_width(), window.physical_height());
    }

    entities.0 = scene
        .graph()
        .iter()
        .map(|(_, node)| {
            let (mesh, material) = registry.get(node.mesh?)?.clone();
            let mut entity = commands.spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_matrix(node.world_matrix()),
                Name::new(node.name),
            ));
            if !node.casts_shadow {
                entity.insert(NotShadowCaster);
            }
            Some(entity.id())
        })
        .collect();

    let camera = scene.camera().camera();
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(SKY),
            ..default()
        },
        Transform::from_translation(camera.position).looking_to(camera.forward(), Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov,
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        ViewerCamera,
    ));

    // Shadows fall along the configured light direction.
    commands.spawn((
        DirectionalLight {
            illuminance: lux::AMBIENT_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::default().looking_to(config.light_direction, Vec3::Y),
    ));

    tracing::info!(
        "Scene setup complete - arrows to drive, R/F to switch camera, V to cycle distance"
    );
    commands.insert_resource(DriveScene(scene));
}

// ============================================================================
// Per-frame systems
// ============================================================================

fn resize_viewport(
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window>,
    mut scene: ResMut<DriveScene>,
) {
    for event in resized.read() {
        if let Ok(window) = windows.get(event.window) {
            scene.0.resize(window.physical_width(), window.physical_height());
        }
    }
}

fn run_frame(
    time: Res<Time>,
    keys: Res<HeldKeys>,
    mut scene: ResMut<DriveScene>,
    mut draws: ResMut<FrameDraws>,
) {
    let frame = FrameTime::new(time.delta_secs(), time.elapsed_secs());
    draws.0.clear();
    scene.0.frame(frame, &keys.0, &mut draws.0);
}

fn sync_transforms(
    draws: Res<FrameDraws>,
    entities: Res<NodeEntities>,
    mut transforms: Query<&mut Transform, Without<ViewerCamera>>,
) {
    for call in draws.0.pass(Pass::Opaque) {
        let Some(Some(entity)) = entities.0.get(call.node.index()) else {
            continue;
        };
        if let Ok(mut transform) = transforms.get_mut(*entity) {
            transform.set_if_neq(Transform::from_matrix(call.world));
        }
    }
}

/// Toggle [`NotShadowCaster`] so exactly the shadow pass casts shadows.
fn sync_shadows(
    mut commands: Commands,
    draws: Res<FrameDraws>,
    entities: Res<NodeEntities>,
    casters: Query<Has<NotShadowCaster>>,
) {
    let mut casts = vec![false; entities.0.len()];
    for call in draws.0.pass(Pass::Shadow) {
        if let Some(slot) = casts.get_mut(call.node.index()) {
            *slot = true;
        }
    }

    for (entity, casts) in entities.0.iter().zip(casts) {
        let Some(entity) = *entity else {
            continue;
        };
        match casters.get(entity) {
            Ok(true) if casts => {
                commands.entity(entity).remove::<NotShadowCaster>();
            }
            Ok(false) if !casts => {
                commands.entity(entity).insert(NotShadowCaster);
            }
            _ => {}
        }
    }
}

fn sync_camera(
    scene: Res<DriveScene>,
    mut query: Query<(&mut Transform, &mut Projection), With<ViewerCamera>>,
) {
    let camera = scene.0.camera().camera();
    for (mut transform, mut projection) in &mut query {
        transform.set_if_neq(
            Transform::from_translation(camera.position).looking_to(camera.forward(), Vec3::Y),
        );
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.fov = camera.fov;
            perspective.near = camera.near;
            perspective.far = camera.far;
        }
    }
}
