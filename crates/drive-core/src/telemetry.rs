//! Vehicle telemetry as CSV.
//!
//! Rows are written through the [`TelemetryOutput`] trait so the headless
//! simulator can stream to stdout while interactive runs append to a file.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::{clock::FrameTime, scene::Scene};

/// Default telemetry file path.
pub const TELEMETRY_PATH: &str = "telemetry.csv";

/// Vehicle and camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetrySnapshot {
    pub elapsed: f32,
    pub dt: f32,
    pub speed: f32,
    pub forward: f32,
    pub wheel_angle: f32,
    pub yaw: f32,
    pub x: f32,
    pub z: f32,
    pub turn_radius: Option<f32>,
    pub camera_distance: f32,
}

impl TelemetrySnapshot {
    /// Read the tracked vehicle's state after a frame. `None` without a vehicle.
    pub fn capture(scene: &Scene, time: FrameTime) -> Option<Self> {
        let rig = scene.vehicle_rig()?;
        let state = scene.vehicle()?.state();
        let pose = scene.graph().node(rig.chassis).pose;
        Some(Self {
            elapsed: time.t,
            dt: time.dt,
            speed: state.velocity.length(),
            forward: state.forward_speed,
            wheel_angle: state.wheel_angle,
            yaw: pose.yaw,
            x: pose.position.x,
            z: pose.position.z,
            turn_radius: state.turn_radius,
            camera_distance: scene.camera().distance(),
        })
    }
}

/// Destination for telemetry rows.
pub trait TelemetryOutput: Send + Sync {
    /// Write the CSV header.
    fn write_header(&mut self, header: &str);
    /// Write a data row.
    fn write_row(&mut self, row: &str);
}

/// Appends to a CSV file, truncating it when the header is written.
#[derive(Debug)]
pub struct FileTelemetryOutput {
    path: PathBuf,
}

impl FileTelemetryOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileTelemetryOutput {
    fn default() -> Self {
        Self::new(TELEMETRY_PATH)
    }
}

impl TelemetryOutput for FileTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        let result = File::create(&self.path).and_then(|mut file| writeln!(file, "{header}"));
        if let Err(e) = result {
            tracing::warn!("Failed to reset telemetry file {}: {e}", self.path.display());
        }
    }

    fn write_row(&mut self, row: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{row}"));
        if let Err(e) = result {
            tracing::warn!("Failed to append telemetry to {}: {e}", self.path.display());
        }
    }
}

/// Prints rows to stdout, for piping headless runs.
#[derive(Debug, Default)]
pub struct StdoutTelemetryOutput;

impl TelemetryOutput for StdoutTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        println!("{header}");
    }

    fn write_row(&mut self, row: &str) {
        println!("{row}");
    }
}

/// Collects rows in memory.
#[derive(Debug, Default)]
pub struct BufferTelemetryOutput {
    pub header: Option<String>,
    pub rows: Vec<String>,
}

impl TelemetryOutput for BufferTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        self.header = Some(header.to_owned());
        self.rows.clear();
    }

    fn write_row(&mut self, row: &str) {
        self.rows.push(row.to_owned());
    }
}

/// Defines the CSV schema once and generates the header and row writers from
/// it, so column names and formats cannot drift apart.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// CSV header line.
        pub const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );

        /// Write the header, starting a new log.
        pub fn reset_telemetry_to(output: &mut dyn TelemetryOutput) {
            output.write_header(CSV_HEADER.trim_end_matches(','));
        }

        /// Write one row.
        pub fn emit_telemetry_to($snapshot: &TelemetrySnapshot, output: &mut dyn TelemetryOutput) {
            $( $prelude )*

            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            output.write_row(line.trim_end_matches(','));
        }
    };
}

define_telemetry! {
    columns: {
        t: "{:.4}",
        dt: "{:.5}",
        speed: "{:.3}",
        forward: "{:.3}",
        wheel_deg: "{:.2}",
        yaw_deg: "{:.2}",
        x: "{:.3}",
        z: "{:.3}",
        turn_radius: "{:.3}",
        cam_dist: "{:.1}",
    },
    prelude: |s| {
        // Straight-line motion has no turning circle.
        let radius = s.turn_radius.unwrap_or(-1.0);
    },
    row_values: {
        s.elapsed,
        s.dt,
        s.speed,
        s.forward,
        s.wheel_angle.to_degrees(),
        s.yaw.to_degrees(),
        s.x,
        s.z,
        radius,
        s.camera_distance,
    }
}
