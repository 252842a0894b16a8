use std::fmt;

/// Why an image failed quality validation
///
/// Declared in evaluation order: when several rules would fire, the first
/// one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum RejectionReason {
    IntensityOutOfRange,
    InsufficientContrast,
    DistributionTooUniform,
    GradientOutOfRange,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::IntensityOutOfRange => "intensity out of range",
            RejectionReason::InsufficientContrast => "insufficient contrast",
            RejectionReason::DistributionTooUniform => "distribution too uniform",
            RejectionReason::GradientOutOfRange => "gradient out of range",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the plausibility check, with the statistics it was based on
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct QualityVerdict {
    pub accepted: bool,
    pub reason: Option<RejectionReason>,
    pub mean_intensity: f64,
    pub std_intensity: f64,
    pub histogram_entropy: f64,
    pub mean_gradient_magnitude: f64,
}

impl QualityVerdict {
    /// Returns the rejection message, if the image was rejected
    pub fn reason_str(&self) -> Option<&'static str> {
        self.reason.map(|r| r.as_str())
    }
}

impl fmt::Display for QualityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            None => write!(f, "accepted")?,
            Some(reason) => write!(f, "rejected: {}", reason)?,
        }
        write!(
            f,
            " (mean={:.3}, std={:.3}, entropy={:.3}, gradient={:.3})",
            self.mean_intensity,
            self.std_intensity,
            self.histogram_entropy,
            self.mean_gradient_magnitude
        )
    }
}
