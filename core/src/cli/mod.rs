pub mod report;

use crate::annotations::source_id_from_path;
use crate::error::Result;
use crate::types::{RawImage, TriageConfig};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Command-line arguments for mammotriage
#[derive(Parser, Debug)]
#[command(name = "mammotriage")]
#[command(about = "Mammogram plausibility check, view classification and region detection")]
#[command(version)]
pub struct Cli {
    /// Image files to triage (PNG, JPEG, TIFF, BMP)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Breast-level annotation table (CSV)
    #[arg(long, value_name = "CSV")]
    pub breast_annotations: Option<PathBuf>,

    /// Finding-level annotation table (CSV)
    #[arg(long, value_name = "CSV")]
    pub finding_annotations: Option<PathBuf>,

    /// Threshold configuration (JSON)
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Reject the whole set if any image fails validation
    #[arg(short, long)]
    pub batch: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Decodes an image file into an 8-bit grayscale [`RawImage`]
///
/// Files named after a dataset identifier get that identifier attached for
/// annotation lookup.
pub fn load_image(path: &Path) -> Result<RawImage> {
    let gray = image::open(path)?.to_luma8();
    let image = RawImage::from_gray_image(&gray)?;
    Ok(match source_id_from_path(path) {
        Some(id) => image.with_source_id(id),
        None => image,
    })
}

/// Reads the threshold configuration, or the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<TriageConfig> {
    let Some(path) = path else {
        return Ok(TriageConfig::default());
    };

    #[cfg(feature = "json")]
    {
        let json = std::fs::read_to_string(path)?;
        TriageConfig::from_json(&json)
    }
    #[cfg(not(feature = "json"))]
    {
        Err(crate::error::TriageError::ConfigError(format!(
            "reading {} requires the 'json' feature",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_arguments() {
        let cli = Cli::try_parse_from([
            "mammotriage",
            "--breast-annotations",
            "breast.csv",
            "--batch",
            "a.png",
            "b.png",
        ])
        .unwrap();
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.breast_annotations, Some(PathBuf::from("breast.csv")));
        assert!(cli.finding_annotations.is_none());
        assert!(cli.batch);
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn test_cli_requires_a_file() {
        assert!(Cli::try_parse_from(["mammotriage"]).is_err());
    }

    #[test]
    fn test_load_image_attaches_dataset_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0123456789abcdef0123456789abcdef.png");
        GrayImage::from_fn(8, 4, |x, _| Luma([(x * 32) as u8])).save(&path).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(image.source_id(), Some("0123456789abcdef0123456789abcdef"));
        assert_eq!(image.get(0, 0), 0.0);
        assert!((image.get(4, 0) - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_image_without_dataset_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        GrayImage::from_pixel(4, 4, Luma([100])).save(&path).unwrap();
        assert_eq!(load_image(&path).unwrap().source_id(), None);
    }

    #[test]
    fn test_load_image_rejects_non_images() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(load_image(&path).is_err());
    }

    #[test]
    fn test_load_config_defaults() {
        assert_eq!(load_config(None).unwrap(), TriageConfig::default());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"quality": {"max_histogram_entropy": 3.8}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.quality.max_histogram_entropy, 3.8);
        assert_eq!(config.regions.max_regions, 3);
    }
}
