use super::laterality::{LateralityDetector, SideBasis};
use super::stats::HalfMeans;
use super::view_scoring::{
    fuse, score_aspect_ratio, score_edge_density, score_symmetry, ViewDecision,
};
use crate::types::{RawImage, ViewLabel};
use imageproc::edges::canny;
use log::debug;

/// Hysteresis thresholds of the edge detector, on the 8-bit scale
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Image features the view heuristic votes on
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ViewFeatures {
    /// Width divided by height
    pub aspect_ratio: f64,
    /// |mean(left half) - mean(right half)| on the 8-bit scale
    pub horizontal_symmetry: f64,
    /// |mean(top half) - mean(bottom half)| on the 8-bit scale
    pub vertical_symmetry: f64,
    /// Fraction of pixels marked as edges
    pub edge_density: f64,
}

impl ViewFeatures {
    pub fn extract(image: &RawImage) -> Self {
        let halves = HalfMeans::of(image);
        let edges = canny(&image.to_gray8(), CANNY_LOW, CANNY_HIGH);
        let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();

        Self {
            aspect_ratio: image.aspect_ratio(),
            horizontal_symmetry: (halves.left - halves.right).abs() * 255.0,
            vertical_symmetry: (halves.top - halves.bottom).abs() * 255.0,
            edge_density: edge_pixels as f64 / image.area() as f64,
        }
    }
}

/// Full result of the heuristic tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicClassification {
    pub label: ViewLabel,
    pub decision: ViewDecision,
    pub features: ViewFeatures,
    pub side_basis: SideBasis,
}

/// Multi-signal CC/MLO classifier used when no annotation or model label
/// is available
///
/// # Example
///
/// ```
/// use mammotriage_core::{HeuristicViewClassifier, Provenance, RawImage, ViewPosition};
///
/// // smooth top-to-bottom gradient on a square image
/// let pixels = (0..300)
///     .flat_map(|y| (0..300).map(move |_| 0.2 + 0.6 * y as f32 / 299.0))
///     .collect();
/// let image = RawImage::new(300, 300, pixels).unwrap();
///
/// let label = HeuristicViewClassifier::default().classify(&image);
/// assert_eq!(label.view(), ViewPosition::Cc);
/// assert_eq!(label.provenance(), Provenance::Heuristic);
/// assert!(label.confidence() <= 0.95);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicViewClassifier {
    laterality: LateralityDetector,
}

impl HeuristicViewClassifier {
    pub fn new(laterality: LateralityDetector) -> Self {
        Self { laterality }
    }

    /// Classifies view and side from pixels alone
    pub fn classify(&self, image: &RawImage) -> ViewLabel {
        self.classify_detailed(image).label
    }

    /// Like [`classify`](Self::classify), also returning the features,
    /// votes, and side rule behind the label
    pub fn classify_detailed(&self, image: &RawImage) -> HeuristicClassification {
        let features = ViewFeatures::extract(image);
        let scores = [
            score_aspect_ratio(features.aspect_ratio),
            score_symmetry(features.horizontal_symmetry, features.vertical_symmetry),
            score_edge_density(features.edge_density),
        ];
        let decision = fuse(&scores, features.aspect_ratio);
        let side = self.laterality.detect_side(image);

        debug!(
            "Heuristic view: aspect={:.2}, h_sym={:.2}, v_sym={:.2}, edges={:.3} -> {} ({}, cc={}, \
             mlo={})",
            features.aspect_ratio,
            features.horizontal_symmetry,
            features.vertical_symmetry,
            features.edge_density,
            decision.view,
            decision.tier,
            decision.cc_score,
            decision.mlo_score
        );

        HeuristicClassification {
            label: ViewLabel::heuristic(decision.view, side.side, decision.confidence),
            decision,
            features,
            side_basis: side.basis,
        }
    }
}
