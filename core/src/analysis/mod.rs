//! Pixel-level analysis for mammogram triage
//!
//! This module provides:
//! - Statistical plausibility validation ([`QualityValidator`])
//! - Heuristic CC/MLO view classification ([`HeuristicViewClassifier`])
//! - Brightness-based laterality detection ([`LateralityDetector`])
//! - Contour-based region of interest detection ([`RegionDetector`])

mod laterality;
mod quality;
mod regions;
mod stats;
mod view_classifier;
mod view_scoring;

pub use laterality::{LateralityDetector, SideBasis, SideDecision};
pub use quality::{evaluate, ImageStatistics, QualityValidator};
pub use regions::{RegionDetector, SUSPICIOUS_MASS_TAG};
pub use stats::{histogram_entropy, mean_and_std, mean_gradient_magnitude, region_mean, HalfMeans};
pub use view_classifier::{HeuristicClassification, HeuristicViewClassifier, ViewFeatures};
pub use view_scoring::{
    aspect_ratio_fallback, fuse, mean_confidence, score_aspect_ratio, score_edge_density,
    score_symmetry, DecisionTier, SignalScore, ViewDecision,
};
