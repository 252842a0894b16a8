use super::{FindingCategory, Provenance};
use std::fmt;

/// Confidence assigned to a region whose severity is unknown
pub const DEFAULT_SEVERITY_CONFIDENCE: f64 = 0.6;

/// Maps a BI-RADS assessment onto a region confidence
///
/// BI-RADS 3 → 0.7, 4 → 0.85, 5 → 0.95; anything else (including a missing
/// assessment) → [`DEFAULT_SEVERITY_CONFIDENCE`].
pub fn severity_confidence(bi_rads: Option<u8>) -> f64 {
    match bi_rads {
        Some(3) => 0.7,
        Some(4) => 0.85,
        Some(5) => 0.95,
        _ => DEFAULT_SEVERITY_CONFIDENCE,
    }
}

/// Formats a BI-RADS assessment as a severity tag ("BI-RADS 4")
pub fn bi_rads_tag(bi_rads: u8) -> String {
    format!("BI-RADS {}", bi_rads)
}

/// Human-readable description of a finding keyed by category and severity
pub fn finding_description(category: FindingCategory, bi_rads: Option<u8>) -> String {
    let text = match (category, bi_rads) {
        (FindingCategory::Mass, Some(3)) => "Probably benign mass, follow-up recommended",
        (FindingCategory::Mass, Some(4)) => "Suspicious mass, histological evaluation recommended",
        (FindingCategory::Mass, Some(5)) => "Mass highly suggestive of malignancy",
        (FindingCategory::Calcification, Some(3)) => "Probably benign calcifications",
        (FindingCategory::Calcification, Some(4)) => {
            "Suspicious calcifications, evaluation recommended"
        }
        (FindingCategory::Calcification, Some(5)) => {
            "Calcifications highly suggestive of malignancy"
        }
        (FindingCategory::Asymmetry, Some(3)) => "Probably benign asymmetry",
        (FindingCategory::Asymmetry, Some(4)) => "Suspicious asymmetry, evaluation recommended",
        (FindingCategory::Asymmetry, Some(5)) => "Asymmetry highly suggestive of malignancy",
        (FindingCategory::ArchitecturalDistortion, Some(3)) => {
            "Probably benign architectural distortion"
        }
        (FindingCategory::ArchitecturalDistortion, Some(4)) => {
            "Suspicious architectural distortion"
        }
        (FindingCategory::ArchitecturalDistortion, Some(5)) => {
            "Architectural distortion highly suggestive of malignancy"
        }
        (FindingCategory::Unknown, Some(3)) => "Probably benign region, follow-up recommended",
        (FindingCategory::Unknown, Some(4)) => {
            "Suspicious region, histological evaluation recommended"
        }
        (FindingCategory::Unknown, Some(5)) => "Region highly suggestive of malignancy",
        (FindingCategory::Unknown, _) => return "Region of interest detected".to_string(),
        (category, _) => return format!("{} detected", category.label()),
    };
    text.to_string()
}

/// Axis-aligned pixel bounding box
///
/// `xmax`/`ymax` are exclusive, so a box fits an image when
/// `xmax <= width` and `ymax <= height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BoundingBox {
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

impl BoundingBox {
    pub fn new(xmin: u32, ymin: u32, xmax: u32, ymax: u32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Builds a box from floating-point dataset coordinates clipped to an image
    ///
    /// Returns `None` when a coordinate is not finite or the clipped box is empty.
    pub fn clipped(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        if ![xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite()) {
            return None;
        }

        let clip = |v: f64, limit: u32| v.trunc().clamp(0.0, limit as f64) as u32;
        let bbox = Self::new(
            clip(xmin.min(xmax), width),
            clip(ymin.min(ymax), height),
            clip(xmin.max(xmax), width),
            clip(ymin.max(ymax), height),
        );

        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    /// Clips the box to an image, returning `None` when nothing remains
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Self> {
        let bbox = Self::new(
            self.xmin.min(width),
            self.ymin.min(height),
            self.xmax.min(width),
            self.ymax.min(height),
        );
        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    pub fn width(&self) -> u32 {
        self.xmax.saturating_sub(self.xmin)
    }

    pub fn height(&self) -> u32 {
        self.ymax.saturating_sub(self.ymin)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Checks whether the box lies within an image of the given size
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.xmin <= self.xmax
            && self.ymin <= self.ymax
            && self.xmax <= width
            && self.ymax <= height
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] - [{}, {}]",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

/// Candidate abnormal finding within an image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct RegionOfInterest {
    /// Identifier unique within one image ("region_1", ...)
    pub id: String,

    pub category: FindingCategory,

    /// Confidence in [0, 1]
    pub confidence: f64,

    pub bbox: BoundingBox,

    /// Severity label, "BI-RADS n" when an assessment is known
    pub severity_tag: String,

    /// Human-readable description of the finding
    pub description: String,

    pub provenance: Provenance,
}

impl RegionOfInterest {
    /// Returns the 1-based region identifier for a position in a list
    pub fn region_id(index: usize) -> String {
        format!("region_{}", index + 1)
    }
}
