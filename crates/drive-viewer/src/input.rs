//! Keyboard bindings for the driving scene.
//!
//! Physical keys are mapped onto [`DriveAction`]s with `leafwing-input-manager`.
//! Once per frame the held actions are collected into a [`KeySet`] for the core.

use bevy::prelude::*;
use drive_core::{Key, KeySet};
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

// ============================================================================
// Actions
// ============================================================================

/// Driving and camera actions, one per core [`Key`].
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    CenterSteering,
    Handbrake,
    FollowCamera,
    FreeCamera,
    CycleDistance,
    FlyForward,
    FlyBack,
    FlyLeft,
    FlyRight,
    FlyUp,
    FlyDown,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
}

impl DriveAction {
    const ALL: [Self; 19] = [
        Self::Accelerate,
        Self::Brake,
        Self::SteerLeft,
        Self::SteerRight,
        Self::CenterSteering,
        Self::Handbrake,
        Self::FollowCamera,
        Self::FreeCamera,
        Self::CycleDistance,
        Self::FlyForward,
        Self::FlyBack,
        Self::FlyLeft,
        Self::FlyRight,
        Self::FlyUp,
        Self::FlyDown,
        Self::LookLeft,
        Self::LookRight,
        Self::LookUp,
        Self::LookDown,
    ];

    fn key(self) -> Key {
        match self {
            Self::Accelerate => Key::Accelerate,
            Self::Brake => Key::Brake,
            Self::SteerLeft => Key::SteerLeft,
            Self::SteerRight => Key::SteerRight,
            Self::CenterSteering => Key::CenterSteering,
            Self::Handbrake => Key::Handbrake,
            Self::FollowCamera => Key::FollowCamera,
            Self::FreeCamera => Key::FreeCamera,
            Self::CycleDistance => Key::CycleDistance,
            Self::FlyForward => Key::FlyForward,
            Self::FlyBack => Key::FlyBack,
            Self::FlyLeft => Key::FlyLeft,
            Self::FlyRight => Key::FlyRight,
            Self::FlyUp => Key::FlyUp,
            Self::FlyDown => Key::FlyDown,
            Self::LookLeft => Key::LookLeft,
            Self::LookRight => Key::LookRight,
            Self::LookUp => Key::LookUp,
            Self::LookDown => Key::LookDown,
        }
    }
}

/// Create the default input map.
pub fn default_input_map() -> InputMap<DriveAction> {
    InputMap::default()
        .with(DriveAction::Accelerate, KeyCode::ArrowUp)
        .with(DriveAction::Brake, KeyCode::ArrowDown)
        .with(DriveAction::SteerLeft, KeyCode::ArrowLeft)
        .with(DriveAction::SteerRight, KeyCode::ArrowRight)
        .with(DriveAction::CenterSteering, KeyCode::ControlLeft)
        .with(DriveAction::CenterSteering, KeyCode::ControlRight)
        .with(DriveAction::Handbrake, KeyCode::Space)
        .with(DriveAction::FollowCamera, KeyCode::KeyR)
        .with(DriveAction::FreeCamera, KeyCode::KeyF)
        .with(DriveAction::CycleDistance, KeyCode::KeyV)
        .with(DriveAction::FlyForward, KeyCode::KeyW)
        .with(DriveAction::FlyBack, KeyCode::KeyS)
        .with(DriveAction::FlyLeft, KeyCode::KeyA)
        .with(DriveAction::FlyRight, KeyCode::KeyD)
        .with(DriveAction::FlyUp, KeyCode::KeyE)
        .with(DriveAction::FlyDown, KeyCode::KeyQ)
        .with(DriveAction::LookLeft, KeyCode::KeyJ)
        .with(DriveAction::LookRight, KeyCode::KeyL)
        .with(DriveAction::LookUp, KeyCode::KeyI)
        .with(DriveAction::LookDown, KeyCode::KeyK)
}

// ============================================================================
// Plugin
// ============================================================================

/// Keys held this frame, in core terms.
#[derive(Resource, Default, Debug)]
pub struct HeldKeys(pub KeySet);

/// System set that fills [`HeldKeys`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleKeys;

/// Plugin that registers the action type and samples it every frame.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .init_resource::<HeldKeys>()
            .add_systems(Startup, spawn_input)
            .add_systems(
                PreUpdate,
                sample_keys
                    .in_set(SampleKeys)
                    .after(InputManagerSystem::Update),
            );
    }
}

fn spawn_input(mut commands: Commands) {
    commands.spawn((default_input_map(), ActionState::<DriveAction>::default()));
}

fn sample_keys(action_query: Query<&ActionState<DriveAction>>, mut held: ResMut<HeldKeys>) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    held.0 = DriveAction::ALL
        .into_iter()
        .filter(|action| action_state.pressed(action))
        .map(DriveAction::key)
        .collect();
}
