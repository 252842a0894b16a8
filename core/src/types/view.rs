use super::{Laterality, Provenance, ViewPosition};
use std::fmt;

/// Highest confidence the heuristic tier may report
pub const HEURISTIC_CONFIDENCE_CAP: f64 = 0.95;

/// Caps a heuristic confidence so the fallback tier never claims certainty
pub fn cap_heuristic_confidence(confidence: f64) -> f64 {
    confidence.clamp(0.0, HEURISTIC_CONFIDENCE_CAP)
}

/// View position, laterality and the tier that determined them
///
/// Labels are built only through the per-tier constructors: annotated
/// labels always carry confidence 1.0, heuristic labels never exceed
/// [`HEURISTIC_CONFIDENCE_CAP`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ViewLabel {
    view: ViewPosition,
    side: Laterality,
    confidence: f64,
    provenance: Provenance,
}

impl ViewLabel {
    /// Label taken from reference annotations (confidence 1.0)
    pub fn annotated(view: ViewPosition, side: Laterality) -> Self {
        Self {
            view,
            side,
            confidence: 1.0,
            provenance: Provenance::Annotation,
        }
    }

    /// Label predicted by a trained classifier, confidence clamped to [0, 1]
    pub fn predicted(view: ViewPosition, side: Laterality, confidence: f64) -> Self {
        Self {
            view,
            side,
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            provenance: Provenance::TrainedModel,
        }
    }

    /// Label produced by image heuristics, confidence capped at
    /// [`HEURISTIC_CONFIDENCE_CAP`]
    pub fn heuristic(view: ViewPosition, side: Laterality, confidence: f64) -> Self {
        Self {
            view,
            side,
            confidence: cap_heuristic_confidence(confidence),
            provenance: Provenance::Heuristic,
        }
    }

    pub fn view(&self) -> ViewPosition {
        self.view
    }

    pub fn side(&self) -> Laterality {
        self.side
    }

    /// Confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Tier that produced the label
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Returns the combined code used by datasets and models ("CC_L")
    pub fn code(&self) -> String {
        format!("{}_{}", self.view.short_str(), self.side.short_str())
    }
}

impl fmt::Display for ViewLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({:.2}, {})",
            self.side.simple_name(),
            self.view.simple_name(),
            self.confidence,
            self.provenance
        )
    }
}

/// Parses a combined view code such as "CC_L", "MLO-R" or "cc right"
///
/// Returns `None` unless both halves are recognised.
pub fn parse_view_code(code: &str) -> Option<(ViewPosition, Laterality)> {
    let mut parts = code
        .trim()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    let view = ViewPosition::from_str(parts.next()?)?;
    let side = Laterality::from_str(parts.next()?)?;

    if parts.next().is_some() {
        return None;
    }
    Some((view, side))
}
