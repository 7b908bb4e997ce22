//! Stand-in meshes for the scene's asset paths.
//!
//! The core asks for meshes by path. The viewer answers with primitive shapes
//! sized like the models they replace, each with a flat-coloured material.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use drive_core::{AssetSource, MeshHandle, SceneError, world::assets};

/// Bevy handles for every mesh issued to the core, indexed by [`MeshHandle`].
#[derive(Resource, Default)]
pub struct MeshRegistry {
    paths: Vec<String>,
    handles: Vec<(Handle<Mesh>, Handle<StandardMaterial>)>,
}

impl MeshRegistry {
    pub fn get(&self, mesh: MeshHandle) -> Option<&(Handle<Mesh>, Handle<StandardMaterial>)> {
        self.handles.get(mesh.0 as usize)
    }
}

/// [`AssetSource`] backed by Bevy's mesh and material stores.
pub struct PrimitiveAssets<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub registry: &'a mut MeshRegistry,
}

impl AssetSource for PrimitiveAssets<'_> {
    fn mesh(&mut self, path: &str) -> drive_core::Result<MeshHandle> {
        if let Some(index) = self.registry.paths.iter().position(|p| p == path) {
            return to_handle(path, index);
        }

        let (mesh, color) = stand_in(path).ok_or_else(|| SceneError::Asset {
            path: path.to_owned(),
            message: "no stand-in mesh for this path".to_owned(),
        })?;
        let mesh = self.meshes.add(mesh);
        let material = self.materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        });

        tracing::debug!("Created stand-in mesh for {path}");
        self.registry.paths.push(path.to_owned());
        self.registry.handles.push((mesh, material));
        to_handle(path, self.registry.handles.len() - 1)
    }
}

fn to_handle(path: &str, index: usize) -> drive_core::Result<MeshHandle> {
    u32::try_from(index)
        .map(MeshHandle)
        .map_err(|_| SceneError::Asset {
            path: path.to_owned(),
            message: "too many meshes".to_owned(),
        })
}

/// Primitive shape and colour standing in for a model.
fn stand_in(path: &str) -> Option<(Mesh, Color)> {
    let shape = match path {
        assets::TREE => (
            Mesh::from(Cone {
                radius: 12.0,
                height: 40.0,
            })
            .translated_by(Vec3::Y * 20.0),
            Color::srgb(0.13, 0.4, 0.15),
        ),
        assets::HELI => (
            Mesh::from(Capsule3d::new(6.0, 30.0))
                .rotated_by(Quat::from_rotation_x(FRAC_PI_2))
                .translated_by(Vec3::Y * 6.0),
            Color::srgb(0.35, 0.4, 0.25),
        ),
        assets::MAIN_ROTOR => (
            Mesh::from(Cuboid::new(60.0, 0.5, 3.0)),
            Color::srgb(0.15, 0.15, 0.15),
        ),
        assets::TAIL_ROTOR => (
            Mesh::from(Cuboid::new(0.5, 12.0, 1.5)),
            Color::srgb(0.15, 0.15, 0.15),
        ),
        assets::CHASSIS => (
            Mesh::from(Cuboid::new(14.0, 6.0, 34.0)),
            Color::srgb(0.7, 0.1, 0.1),
        ),
        // Axle along X so pitch rolls the wheel.
        assets::WHEEL => (
            Mesh::from(Cylinder::new(3.0, 2.0)).rotated_by(Quat::from_rotation_z(FRAC_PI_2)),
            Color::srgb(0.05, 0.05, 0.05),
        ),
        assets::ROAD => (
            Plane3d::default().mesh().size(100.0, 100.0).build(),
            Color::srgb(0.3, 0.3, 0.32),
        ),
        assets::GRASS => (
            Plane3d::default().mesh().size(100.0, 100.0).build(),
            Color::srgb(0.3, 0.55, 0.2),
        ),
        _ => return None,
    };
    Some(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_world_asset_has_a_stand_in() {
        for path in assets::ALL {
            assert!(stand_in(path).is_some(), "{path}");
        }
        assert!(stand_in("media/json/unknown.json").is_none());
    }

    #[test]
    fn test_paths_share_handles() {
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut registry = MeshRegistry::default();
        let mut source = PrimitiveAssets {
            meshes: &mut meshes,
            materials: &mut materials,
            registry: &mut registry,
        };

        let tree = source.mesh(assets::TREE).unwrap();
        let road = source.mesh(assets::ROAD).unwrap();
        assert_eq!(source.mesh(assets::TREE).unwrap(), tree);
        assert_ne!(tree, road);
        assert!(source.mesh("missing.json").is_err());
        assert!(registry.get(road).is_some());
    }
}
