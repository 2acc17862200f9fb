// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for capture operations
//!
//! This module provides command-line functionality for:
//! - Storing a capture from raw depth + color files
//! - Listing the captures of an object folder
//! - Inspecting the metadata embedded in a depth image

use clap::Args;
use depth_capture::Config;
use depth_capture::depth::OwnedDepthMap;
use depth_capture::motion::{Acceleration, Attitude};
use depth_capture::pipelines::capture::{
    ArtifactOutcome, CalibrationData, CapturePipeline, CaptureRequest, read_embedded_metadata,
};
use depth_capture::pipelines::photo::ColorImage;
use depth_capture::storage::load_latest_capture;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct CaptureArgs {
    /// Raw depth map: little-endian f32 samples, row-major
    #[arg(long)]
    depth: Option<PathBuf>,

    /// Depth map width in pixels
    #[arg(long, requires = "depth")]
    width: Option<u32>,

    /// Depth map height in pixels
    #[arg(long, requires = "depth")]
    height: Option<u32>,

    /// Color photograph (JPEG is stored as-is, other formats are re-encoded)
    #[arg(long)]
    color: PathBuf,

    /// Calibration JSON: {"intrinsicMatrix": [[..],[..],[..]], "referenceDimensions": {...}}
    #[arg(long)]
    calibration: PathBuf,

    /// Object label, used as the folder name
    #[arg(short, long)]
    object: Option<String>,

    /// File prefix (default: next free frame_N)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Root folder for object folders (overrides the configuration)
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Roll relative to the first capture, radians
    #[arg(long, allow_hyphen_values = true)]
    roll: Option<f64>,

    /// Pitch relative to the first capture, radians
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f64>,

    /// Yaw relative to the first capture, radians
    #[arg(long, allow_hyphen_values = true)]
    yaw: Option<f64>,

    /// User acceleration in g as x,y,z
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
    accel: Option<Vec<f64>>,
}

impl CaptureArgs {
    fn has_motion(&self) -> bool {
        self.roll.is_some() || self.pitch.is_some() || self.yaw.is_some() || self.accel.is_some()
    }
}

/// Store one capture from files on disk
pub fn capture(config: &Config, args: CaptureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = config.clone();
    if let Some(root) = args.output_root.clone() {
        config.output_root = root;
    }

    let calibration_text = std::fs::read_to_string(&args.calibration)?;
    let calibration: CalibrationData = serde_json::from_str(&calibration_text)
        .map_err(|e| format!("{}: {}", args.calibration.display(), e))?;

    let depth = match args.depth.as_ref() {
        Some(path) => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err("--width and --height are required with --depth".into());
            };
            let bytes = std::fs::read(path)?;
            Some(OwnedDepthMap::from_le_bytes(width, height, &bytes)?)
        }
        None => None,
    };

    let mut pipeline = CapturePipeline::new(&config);
    if args.has_motion() {
        // Values on the command line are already relative: use a zero reference
        let accel = args.accel.clone().unwrap_or_default();
        let acceleration = Acceleration::new(
            accel.first().copied().unwrap_or(0.0),
            accel.get(1).copied().unwrap_or(0.0),
            accel.get(2).copied().unwrap_or(0.0),
        );
        let motion = pipeline.motion_mut();
        motion.push_sample(Attitude::default(), Acceleration::default());
        motion.push_sample(
            Attitude::new(
                args.roll.unwrap_or(0.0),
                args.pitch.unwrap_or(0.0),
                args.yaw.unwrap_or(0.0),
            ),
            acceleration,
        );
    }

    let request = CaptureRequest {
        color: ColorImage::Encoded(std::fs::read(&args.color)?),
        calibration,
        object_label: args.object.clone(),
        prefix: args.prefix.clone(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(pipeline.capture(request, depth.as_ref()))?;

    match outcome.depth_range {
        Some(range) => println!("Depth range: {:.4} .. {:.4}", range.min, range.max),
        None => println!("No usable depth, stored color only"),
    }

    let report = &outcome.report;
    println!("Capture {} in {}", report.prefix, report.folder.display());
    for artifact in &report.artifacts {
        match &artifact.outcome {
            ArtifactOutcome::Written { bytes } => {
                println!("  saved   {} ({} bytes)", artifact.path.display(), bytes)
            }
            ArtifactOutcome::Skipped => println!("  skipped {}", artifact.kind),
            ArtifactOutcome::Failed(e) => {
                println!("  FAILED  {}: {}", artifact.path.display(), e)
            }
        }
    }

    if !report.is_complete() {
        return Err(format!("{} artifact(s) failed", report.failures().count()).into());
    }
    Ok(())
}

/// List the captures of an object folder
pub fn list_captures(folder: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let captures = depth_capture::pipelines::capture::list_captures(&folder)?;

    if captures.is_empty() {
        println!("No captures found.");
        return Ok(());
    }

    println!("Captures in {}:", folder.display());
    println!();
    for capture in &captures {
        let mark = |present: bool, name: &'static str| if present { name } else { "-" };
        println!(
            "  {:<16} {:<6} {:<6} {:<9}",
            capture.prefix,
            mark(capture.color.is_some(), "color"),
            mark(capture.depth.is_some(), "depth"),
            mark(capture.metadata.is_some(), "metadata"),
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    if let Some(latest) = rt.block_on(load_latest_capture(folder)) {
        println!();
        println!("Latest: {}", latest.prefix);
    }

    Ok(())
}

/// Print the metadata embedded in a depth PNG
pub fn inspect(png: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match read_embedded_metadata(png)? {
        Some(metadata) => {
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            if let Some(range) = metadata.depth_range() {
                let calibration = metadata.calibration();
                let (fx, fy) = calibration.focal_length();
                let (cx, cy) = calibration.principal_point();
                println!();
                println!("Depth range: {:.4} .. {:.4}", range.min, range.max);
                println!("Focal length: {:.2}, {:.2}", fx, fy);
                println!("Principal point: {:.2}, {:.2}", cx, cy);
            }
        }
        None => println!("No metadata embedded in {}", png.display()),
    }
    Ok(())
}

/// Print the configuration in effect
pub fn show_config(
    config: &Config,
    path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match path.or_else(Config::default_path) {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no configuration directory"),
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
