use crate::error::{Result, TriageError};

/// Plausibility thresholds applied by the quality validator
///
/// Defaults describe a typical processed screening mammogram normalized to
/// `[0, 1]`. An image fails if any statistic falls outside its band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct QualityThresholds {
    pub min_mean_intensity: f64,
    pub max_mean_intensity: f64,
    pub min_std_intensity: f64,
    pub max_histogram_entropy: f64,
    pub min_mean_gradient: f64,
    pub max_mean_gradient: f64,
    /// Number of histogram bins used for the entropy statistic
    pub histogram_bins: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_mean_intensity: 0.20,
            max_mean_intensity: 0.75,
            min_std_intensity: 0.10,
            max_histogram_entropy: 3.5,
            min_mean_gradient: 0.05,
            max_mean_gradient: 0.40,
            histogram_bins: 50,
        }
    }
}

/// Contour filters used by the heuristic region detector
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct RegionDetectorConfig {
    /// Contours must enclose more than this many pixels
    pub min_area: f64,
    /// Contours must enclose less than this fraction of the image
    pub max_area_fraction: f64,
    /// Exclusive bounds on bounding-box width / height
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Fraction of each dimension excluded on both sides when checking
    /// that a region center is central
    pub border_margin: f64,
    /// Maximum number of heuristic regions reported
    pub max_regions: usize,
    /// Confidence of heuristic regions when no severity is known
    pub default_confidence: f64,
}

impl Default for RegionDetectorConfig {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            max_area_fraction: 0.3,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
            border_margin: 0.2,
            max_regions: 3,
            default_confidence: 0.5,
        }
    }
}

/// Configuration for the triage pipeline
///
/// # Example
///
/// ```
/// use mammotriage_core::{QualityThresholds, TriageConfig};
///
/// let config = TriageConfig::default()
///     .with_quality(QualityThresholds {
///         max_histogram_entropy: 3.8,
///         ..QualityThresholds::default()
///     })
///     .with_max_regions(2);
///
/// assert_eq!(config.quality.max_histogram_entropy, 3.8);
/// assert_eq!(config.quality.min_std_intensity, 0.10);
/// assert_eq!(config.regions.max_regions, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct TriageConfig {
    pub quality: QualityThresholds,
    pub regions: RegionDetectorConfig,
}

impl TriageConfig {
    /// Builder: Set quality thresholds
    pub fn with_quality(mut self, quality: QualityThresholds) -> Self {
        self.quality = quality;
        self
    }

    /// Builder: Set region detector filters
    pub fn with_regions(mut self, regions: RegionDetectorConfig) -> Self {
        self.regions = regions;
        self
    }

    /// Builder: Limit the number of heuristic regions
    pub fn with_max_regions(mut self, max_regions: usize) -> Self {
        self.regions.max_regions = max_regions;
        self
    }

    /// Checks that every band is well-formed
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::ConfigError`] naming the first inconsistent field.
    pub fn validate(&self) -> Result<()> {
        let q = &self.quality;
        let r = &self.regions;
        let checks = [
            (
                q.min_mean_intensity <= q.max_mean_intensity,
                "quality.min_mean_intensity exceeds max",
            ),
            (
                q.min_mean_gradient <= q.max_mean_gradient,
                "quality.min_mean_gradient exceeds max",
            ),
            (q.histogram_bins > 0, "quality.histogram_bins must be positive"),
            (
                r.min_aspect_ratio < r.max_aspect_ratio,
                "regions.min_aspect_ratio must be below max",
            ),
            (
                r.max_area_fraction > 0.0 && r.max_area_fraction <= 1.0,
                "regions.max_area_fraction must be in (0, 1]",
            ),
            (
                (0.0..0.5).contains(&r.border_margin),
                "regions.border_margin must be in [0, 0.5)",
            ),
            (
                (0.0..=1.0).contains(&r.default_confidence),
                "regions.default_confidence must be in [0, 1]",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(TriageError::ConfigError(message.to_string())),
            None => Ok(()),
        }
    }

    /// Parses and validates a configuration from JSON; missing fields keep
    /// their defaults
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TriageError::ConfigError(format!("{}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
