//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;
use drive_core::{CameraMode, WorldConfig};

/// Launch parameters for the viewer.
#[derive(Resource, Debug, Default)]
pub struct LaunchParams {
    /// Initial camera mode.
    pub camera_mode: CameraMode,
    /// JSON tuning file overriding the default constants.
    pub tuning: Option<PathBuf>,
}

impl LaunchParams {
    /// Load the tuning file, falling back to the defaults if it is unreadable.
    pub fn world_config(&self) -> WorldConfig {
        let Some(path) = &self.tuning else {
            return WorldConfig::default();
        };
        WorldConfig::load(path).unwrap_or_else(|e| {
            tracing::error!("{e}; using default tuning");
            WorldConfig::default()
        })
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::{Parser, ValueEnum};

    use super::*;

    /// Camera mode as accepted on the command line.
    #[derive(Clone, Copy, Debug, Default, ValueEnum)]
    enum ModeArg {
        #[default]
        Free,
        Follow,
    }

    impl From<ModeArg> for CameraMode {
        fn from(mode: ModeArg) -> Self {
            match mode {
                ModeArg::Free => Self::Free,
                ModeArg::Follow => Self::Follow,
            }
        }
    }

    #[derive(Parser)]
    #[command(about = "Drive a truck around a small 3D scene")]
    struct CliArgs {
        /// Initial camera mode.
        #[arg(long, value_enum, default_value_t = ModeArg::default())]
        mode: ModeArg,

        /// JSON tuning file (vehicle, wheels, camera, light direction).
        #[arg(long)]
        tuning: Option<PathBuf>,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            camera_mode: args.mode.into(),
            tuning: args.tuning,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
