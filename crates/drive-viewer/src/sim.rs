//! Headless driving simulation.
//!
//! Builds the reference world without a window, replays a scripted key
//! sequence at a fixed rate and writes CSV telemetry for every frame.
//!
//! Run with: cargo run -p drive-viewer --bin drive-sim -- --script "accelerate:2,steer-right+accelerate:1.5"

#[cfg(target_family = "wasm")]
fn main() {}

#[cfg(not(target_family = "wasm"))]
fn main() -> std::process::ExitCode {
    sim::run()
}

#[cfg(not(target_family = "wasm"))]
mod sim {
    use std::{path::PathBuf, process::ExitCode};

    use clap::{Parser, ValueEnum};
    use drive_core::{
        CameraMode, DrawList, FixedStep, HeadlessAssets, InputScript, KeySet, World,
        WorldConfig,
        telemetry::{
            FileTelemetryOutput, StdoutTelemetryOutput, TelemetryOutput, TelemetrySnapshot,
            emit_telemetry_to, reset_telemetry_to,
        },
    };

    /// Default script: accelerate, turn right, then coast.
    const DEFAULT_SCRIPT: &str = "accelerate:2,steer-right+accelerate:1.5,idle:1.5";

    #[derive(Clone, Copy, Debug, Default, ValueEnum)]
    enum ModeArg {
        Free,
        #[default]
        Follow,
    }

    #[derive(Parser)]
    #[command(about = "Run the driving scene headlessly and print CSV telemetry")]
    struct CliArgs {
        /// Simulated seconds. Defaults to the script's length.
        #[arg(long)]
        seconds: Option<f32>,

        /// Simulation rate in frames per second.
        #[arg(long, default_value_t = 60.0)]
        hz: f32,

        /// Comma-separated `keys:seconds` steps; join keys with `+`, `idle` holds nothing.
        #[arg(long, default_value = DEFAULT_SCRIPT)]
        script: InputScript,

        /// JSON tuning file (vehicle, wheels, camera, light direction).
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Camera mode during the run.
        #[arg(long, value_enum, default_value_t = ModeArg::default())]
        mode: ModeArg,

        /// Write telemetry to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    }

    pub fn run() -> ExitCode {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        // Logs go to stderr so stdout stays pure CSV.
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();

        let args = CliArgs::parse();
        if !(args.hz.is_finite() && args.hz > 0.0) {
            tracing::error!("--hz must be positive, got {}", args.hz);
            return ExitCode::FAILURE;
        }

        let config = match &args.tuning {
            Some(path) => match WorldConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("{e}");
                    return ExitCode::FAILURE;
                }
            },
            None => WorldConfig::default(),
        };

        let mut scene = match World::build(&mut HeadlessAssets::new(), &config) {
            Ok(scene) => scene,
            Err(e) => {
                tracing::error!("Failed to build the world: {e}");
                return ExitCode::FAILURE;
            }
        };
        scene.camera_mut().set_mode(match args.mode {
            ModeArg::Free => CameraMode::Free,
            ModeArg::Follow => CameraMode::Follow,
        });

        let mut output: Box<dyn TelemetryOutput> = match args.output {
            Some(path) => Box::new(FileTelemetryOutput::new(path)),
            None => Box::new(StdoutTelemetryOutput),
        };

        let seconds = args.seconds.unwrap_or_else(|| args.script.duration());
        let frames = frame_count(seconds, args.hz);
        tracing::info!(
            "Simulating {seconds} s at {} Hz ({frames} frames), {} script steps",
            args.hz,
            args.script.steps().len()
        );

        let idle = KeySet::new();
        let mut clock = FixedStep::new(args.hz);
        let mut draws = DrawList::new();
        reset_telemetry_to(output.as_mut());
        for _ in 0..frames {
            let time = clock.tick();
            let keys = args.script.keys_at(time.t - time.dt).unwrap_or(&idle);
            draws.clear();
            scene.frame(time, keys, &mut draws);
            if let Some(snapshot) = TelemetrySnapshot::capture(&scene, time) {
                emit_telemetry_to(&snapshot, output.as_mut());
            }
        }

        if let (Some(vehicle), Some(rig)) = (scene.vehicle(), scene.vehicle_rig()) {
            let pose = scene.graph().node(rig.chassis).pose;
            tracing::info!(
                "Finished at ({:.2}, {:.2}), yaw {:.1} deg, speed {:.2}",
                pose.position.x,
                pose.position.z,
                pose.yaw.to_degrees(),
                vehicle.state().forward
            );
        }
        ExitCode::SUCCESS
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn frame_count(seconds: f32, hz: f32) -> u32 {
        let frames = (seconds * hz).ceil();
        if frames.is_finite() {
            frames.clamp(0.0, u32::MAX as f32) as u32
        } else {
            0
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_frame_count() {
            assert_eq!(frame_count(2.0, 60.0), 120);
            assert_eq!(frame_count(0.01, 60.0), 1);
            assert_eq!(frame_count(-1.0, 60.0), 0);
            assert_eq!(frame_count(f32::NAN, 60.0), 0);
        }

        #[test]
        fn test_default_script_parses() {
            let args = CliArgs::parse_from(["drive-sim"]);
            assert!((args.script.duration() - 5.0).abs() < 1e-6);
            assert!((args.hz - 60.0).abs() < f32::EPSILON);
        }
    }
}
