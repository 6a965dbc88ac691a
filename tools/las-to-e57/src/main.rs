/*
 * Small application that converts a colored LAS or LAZ point cloud
 * together with a set of spherical panorama images into a single E57 file.
 *
 * The images are listed in a JSON manifest with their file path, name,
 * position, rotation quaternion and pixel size in radians.
 * Relative image paths are resolved against the directory of the manifest.
 *
 * The pose of the point cloud can be set with the translation and rotation options.
 * If anything fails, the incomplete output file is removed again.
 */

use anyhow::{ensure, Context, Result};
use clap::Parser;
use e57_pano::{convert, ConversionConfig, Pose, Quaternion, Translation, DEFAULT_SCAN_NAME};
use env_logger::Builder;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "las-to-e57",
    about = "Converts a LAS point cloud and panorama images into an E57 file",
    version
)]
struct Cli {
    /// LAS or LAZ input file with RGB colors
    #[arg(long, value_name = "FILE")]
    las: PathBuf,

    /// JSON manifest describing the panorama images
    #[arg(long, value_name = "FILE")]
    manifest: PathBuf,

    /// E57 output file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Translation of the scan as x,y,z in meters
    #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true, value_parser = parse_vector::<3>)]
    translation: Option<[f64; 3]>,

    /// Rotation of the scan as unit quaternion w,x,y,z
    #[arg(long, value_name = "W,X,Y,Z", allow_hyphen_values = true, value_parser = parse_vector::<4>)]
    rotation: Option<[f64; 4]>,

    /// Name of the scan
    #[arg(long, default_value = DEFAULT_SCAN_NAME)]
    scan_name: String,

    /// Quality of encoded JPEG images between 1 and 100
    #[arg(long, default_value_t = 75)]
    jpeg_quality: u8,

    /// Embed JPEG input images without encoding them again
    #[arg(long)]
    keep_jpeg: bool,
}

fn parse_vector<const N: usize>(value: &str) -> std::result::Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma separated numbers"));
    }
    let mut vector = [0.0; N];
    for (target, part) in vector.iter_mut().zip(parts) {
        *target = part
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{part}': {e}"))?;
    }
    Ok(vector)
}

fn main() -> Result<()> {
    Builder::new()
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    log::info!("LAS input: {}", args.las.display());
    log::info!("Manifest: {}", args.manifest.display());
    log::info!("Output: {}", args.output.display());

    let translation = args.translation.unwrap_or_default();
    let rotation = args.rotation.unwrap_or([1.0, 0.0, 0.0, 0.0]);
    let pose = Pose::new(
        Quaternion {
            w: rotation[0],
            x: rotation[1],
            y: rotation[2],
            z: rotation[3],
        },
        Translation {
            x: translation[0],
            y: translation[1],
            z: translation[2],
        },
    );
    ensure!(pose.is_finite(), "The scan pose must only contain finite numbers");

    let mut config = ConversionConfig::new(args.las, args.manifest, args.output);
    config.scan_pose = pose;
    config.scan_name = args.scan_name;
    config.jpeg_quality = args.jpeg_quality;
    config.keep_jpeg_bytes = args.keep_jpeg;

    let start = std::time::Instant::now();
    let summary = convert(&config).context("Failed to create E57 file")?;
    log::info!(
        "Wrote {} points and {} image(s) into {} in {:?}",
        summary.points,
        summary.images,
        summary.output_path.display(),
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors() {
        assert_eq!(parse_vector::<3>("1, -2.5,3").unwrap(), [1.0, -2.5, 3.0]);
        assert!(parse_vector::<4>("1,0,0").is_err());
        assert!(parse_vector::<3>("1,a,0").is_err());
    }

    #[test]
    fn arguments() {
        let cli = Cli::parse_from([
            "las-to-e57",
            "--las",
            "in.las",
            "--manifest",
            "images.json",
            "-o",
            "out.e57",
            "--translation",
            "-1,2,3",
            "--keep-jpeg",
        ]);
        assert_eq!(cli.translation, Some([-1.0, 2.0, 3.0]));
        assert_eq!(cli.rotation, None);
        assert_eq!(cli.jpeg_quality, 75);
        assert_eq!(cli.scan_name, DEFAULT_SCAN_NAME);
        assert!(cli.keep_jpeg);
    }
}
