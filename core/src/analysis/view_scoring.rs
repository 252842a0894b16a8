//! Vote tables and confidence fusion for the heuristic view classifier
//!
//! Everything here operates on plain numbers so each threshold can be
//! checked without building an image.

use crate::types::{cap_heuristic_confidence, ViewPosition};
use std::fmt;

/// Votes and confidence contributed by one image signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalScore {
    pub cc_votes: u32,
    pub mlo_votes: u32,
    pub confidence: f64,
}

impl SignalScore {
    pub const fn new(cc_votes: u32, mlo_votes: u32, confidence: f64) -> Self {
        Self {
            cc_votes,
            mlo_votes,
            confidence,
        }
    }
}

const NEUTRAL: SignalScore = SignalScore::new(1, 1, 0.3);

/// Scores the width / height ratio; CC views are close to square
pub fn score_aspect_ratio(aspect_ratio: f64) -> SignalScore {
    if (0.9..=1.1).contains(&aspect_ratio) {
        SignalScore::new(3, 0, 0.9)
    } else if (0.8..=1.2).contains(&aspect_ratio) {
        SignalScore::new(2, 0, 0.7)
    } else if (0.7..=1.3).contains(&aspect_ratio) {
        SignalScore::new(1, 1, 0.4)
    } else if aspect_ratio > 1.4 || aspect_ratio < 0.6 {
        SignalScore::new(0, 3, 0.8)
    } else {
        SignalScore::new(0, 2, 0.6)
    }
}

/// Scores left/right versus top/bottom brightness imbalance
///
/// CC views are more balanced left-to-right than top-to-bottom.
pub fn score_symmetry(horizontal_symmetry: f64, vertical_symmetry: f64) -> SignalScore {
    if vertical_symmetry == 0.0 {
        return NEUTRAL;
    }

    let ratio = horizontal_symmetry / vertical_symmetry;
    if ratio < 0.4 {
        SignalScore::new(3, 0, 0.8)
    } else if ratio < 0.6 {
        SignalScore::new(2, 0, 0.6)
    } else if ratio < 0.8 {
        SignalScore::new(1, 0, 0.4)
    } else if ratio > 2.0 {
        SignalScore::new(0, 3, 0.8)
    } else if ratio > 1.5 {
        SignalScore::new(0, 2, 0.7)
    } else {
        NEUTRAL
    }
}

/// Scores the fraction of edge pixels; MLO views carry more structure
pub fn score_edge_density(edge_density: f64) -> SignalScore {
    if edge_density > 0.20 {
        SignalScore::new(0, 3, 0.8)
    } else if edge_density > 0.15 {
        SignalScore::new(0, 2, 0.6)
    } else if edge_density > 0.10 {
        SignalScore::new(0, 1, 0.4)
    } else if edge_density > 0.06 {
        SignalScore::new(1, 1, 0.4)
    } else if edge_density > 0.03 {
        SignalScore::new(2, 0, 0.6)
    } else {
        SignalScore::new(3, 0, 0.7)
    }
}

/// Rung of the decision ladder that produced a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum DecisionTier {
    VeryHigh,
    High,
    Medium,
    /// Votes were inconclusive; the aspect ratio alone decided
    AspectRatioFallback,
}

impl DecisionTier {
    pub fn simple_name(&self) -> &'static str {
        match self {
            DecisionTier::VeryHigh => "very high confidence",
            DecisionTier::High => "high confidence",
            DecisionTier::Medium => "medium confidence",
            DecisionTier::AspectRatioFallback => "low confidence fallback",
        }
    }
}

impl fmt::Display for DecisionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Fused result of all signal scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDecision {
    pub view: ViewPosition,
    pub cc_score: u32,
    pub mlo_score: u32,
    /// Mean of the signal confidences before capping
    pub overall_confidence: f64,
    /// Confidence reported for the view, capped for the heuristic tier
    pub confidence: f64,
    pub tier: DecisionTier,
}

/// Mean of signal confidences
///
/// Vote tables are expressed in tenths; the mean is rounded to 1e-9 so
/// float drift cannot carry an exact 0.8 across the `> 0.8` rung.
pub fn mean_confidence(scores: &[SignalScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().map(|s| s.confidence).sum::<f64>() / scores.len() as f64;
    (mean * 1e9).round() / 1e9
}

/// View implied by the aspect ratio alone
pub fn aspect_ratio_fallback(aspect_ratio: f64) -> ViewPosition {
    if aspect_ratio > 1.3 || aspect_ratio < 0.7 {
        ViewPosition::Mlo
    } else {
        ViewPosition::Cc
    }
}

/// Combines signal scores through the decision ladder
///
/// Ladder (first satisfied rung wins):
/// - confidence > 0.8 and score gap > 3: very high
/// - confidence > 0.6 and score gap > 2: high
/// - confidence > 0.4 and score gap > 1: medium
/// - otherwise the aspect ratio decides
///
/// The first three rungs pick the view with more votes.
pub fn fuse(scores: &[SignalScore], aspect_ratio: f64) -> ViewDecision {
    let cc_score: u32 = scores.iter().map(|s| s.cc_votes).sum();
    let mlo_score: u32 = scores.iter().map(|s| s.mlo_votes).sum();
    let overall_confidence = mean_confidence(scores);
    let score_diff = cc_score.abs_diff(mlo_score);

    let tier = if overall_confidence > 0.8 && score_diff > 3 {
        DecisionTier::VeryHigh
    } else if overall_confidence > 0.6 && score_diff > 2 {
        DecisionTier::High
    } else if overall_confidence > 0.4 && score_diff > 1 {
        DecisionTier::Medium
    } else {
        DecisionTier::AspectRatioFallback
    };

    let view = match tier {
        DecisionTier::AspectRatioFallback => aspect_ratio_fallback(aspect_ratio),
        _ if mlo_score > cc_score => ViewPosition::Mlo,
        _ => ViewPosition::Cc,
    };

    ViewDecision {
        view,
        cc_score,
        mlo_score,
        overall_confidence,
        confidence: cap_heuristic_confidence(overall_confidence),
        tier,
    }
}
