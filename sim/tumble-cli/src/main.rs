//! Headless driver for the tumbling box.
//!
//! Builds a [`Scene`] from a JSON config file and/or command-line overrides,
//! runs it un-paused for a fixed number of frames and prints the world
//! transform of every frame.
//!
//! # Output
//! - `text`: one line per frame, `step time m00 m10 m20 m30 m01 ... m33`
//!   (column-major, translation in the last four entries)
//! - `json`: one JSON object per line with `step`, `time` and `transform`
//!
//! Set `RUST_LOG=debug` to see each integration step.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::info;
use tumble_core::{Frame, Gravity, Scene, SceneConfig};

#[derive(Parser, Debug)]
#[command(name = "tumble")]
#[command(about = "Step a rigid box under gravity and print its world transform")]
struct Args {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Frame time in seconds (clamped to the scene's max timestep)
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// JSON scene configuration; flags below override its values.
    ///
    /// A partial "body" object fills its missing fields from a 1 m cube of
    /// density 1, not from the default 10 cm cube of density 10.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Box extent along X (m)
    #[arg(long)]
    width: Option<f64>,

    /// Box extent along Y (m)
    #[arg(long)]
    height: Option<f64>,

    /// Box extent along Z (m)
    #[arg(long)]
    depth: Option<f64>,

    /// Box density (kg/m³)
    #[arg(long)]
    density: Option<f64>,

    /// Gravity as `x,y,z` (m/s²)
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    gravity: Option<Vector3<f64>>,

    /// Do not apply the one-shot impulse on the first step
    #[arg(long)]
    no_impulse: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// One line of `json` output.
#[derive(Debug, Serialize)]
struct FrameRecord {
    step: u64,
    time: f64,
    transform: [f64; 16],
}

impl From<&Frame> for FrameRecord {
    fn from(frame: &Frame) -> Self {
        let mut transform = [0.0; 16];
        transform.copy_from_slice(frame.transform.as_slice());
        Self {
            step: frame.step,
            time: frame.time,
            transform,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let mut scene = Scene::new(config).context("invalid scene configuration")?;
    scene.resume();

    let frames = scene
        .run(args.frames, args.dt)
        .context("simulation step failed")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_frames(&mut out, &frames, args.format)?;
    out.flush()?;

    if let Some(body) = scene.body() {
        info!(
            steps = scene.integrator().steps(),
            time = scene.integrator().time(),
            kinetic_energy = body.kinetic_energy(),
            "simulation finished"
        );
    }

    Ok(())
}

/// Start from the config file (or the default scene) and apply flag overrides.
fn build_config(args: &Args) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SceneConfig::default(),
    };

    if let Some(width) = args.width {
        config.body.width = width;
    }
    if let Some(height) = args.height {
        config.body.height = height;
    }
    if let Some(depth) = args.depth {
        config.body.depth = depth;
    }
    if let Some(density) = args.density {
        config.body.density = density;
    }
    if let Some(gravity) = args.gravity {
        config.integrator.gravity = Gravity::custom(gravity);
    }
    if args.no_impulse {
        config.integrator.impulse = None;
    }

    Ok(config)
}

fn load_config(path: &Path) -> Result<SceneConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn write_frames(out: &mut impl Write, frames: &[Frame], format: OutputFormat) -> Result<()> {
    for frame in frames {
        match format {
            OutputFormat::Text => {
                write!(out, "{} {:.6}", frame.step, frame.time)?;
                for value in frame.transform.iter() {
                    write!(out, " {value:.6}")?;
                }
                writeln!(out)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &FrameRecord::from(frame))?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn parse_vector(s: &str) -> Result<Vector3<f64>> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid number in '{s}'"))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => bail!("expected three comma-separated values, got '{s}'"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tumble").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("0,-9.81,0").unwrap(), Vector3::new(0.0, -9.81, 0.0));
        assert_eq!(parse_vector(" 1, 2 ,3").unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert!(parse_vector("1,2").is_err());
        assert!(parse_vector("1,x,3").is_err());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--width",
            "0.5",
            "--density",
            "3",
            "--gravity",
            "0,-1,0",
            "--no-impulse",
        ]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.body.width, 0.5);
        assert_eq!(config.body.height, 0.1);
        assert_eq!(config.body.density, 3.0);
        assert_eq!(config.integrator.gravity.acceleration, Vector3::new(0.0, -1.0, 0.0));
        assert!(config.integrator.impulse.is_none());
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.frames, 120);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(build_config(&args).unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_json_output() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.resume();
        let frames = scene.run(2, 0.01).unwrap();

        let mut buf = Vec::new();
        write_frames(&mut buf, &frames, OutputFormat::Json).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(record["step"], 2);
        assert_eq!(record["transform"].as_array().unwrap().len(), 16);
        assert_eq!(record["transform"][15], 1.0);
    }

    #[test]
    fn test_text_output() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.resume();
        let frames = scene.run(3, 0.01).unwrap();

        let mut buf = Vec::new();
        write_frames(&mut buf, &frames, OutputFormat::Text).unwrap();
        let text = String::from_utf8(buf).unwrap();

        for (i, line) in text.lines().enumerate() {
            let fields: Vec<_> = line.split_whitespace().collect();
            assert_eq!(fields.len(), 18);
            assert_eq!(fields[0], (i + 1).to_string());
        }
    }
}
