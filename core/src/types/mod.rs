//! Core type definitions for mammogram triage
//!
//! This module provides the fundamental types used throughout the library:
//! - [`RawImage`]: Validated grayscale pixel matrix submitted for triage
//! - [`QualityVerdict`]: Outcome of the plausibility check
//! - [`ViewLabel`]: View position and laterality with confidence and provenance
//! - [`RegionOfInterest`]: Candidate finding with its bounding box
//! - [`TriageConfig`]: Thresholds for validation and region detection

mod config;
mod enums;
mod raw_image;
mod region;
mod verdict;
mod view;

pub use config::{QualityThresholds, RegionDetectorConfig, TriageConfig};
pub use enums::{FindingCategory, Laterality, Provenance, ViewPosition};
pub use raw_image::{GrayF32, RawImage};
pub use region::{
    bi_rads_tag, finding_description, severity_confidence, BoundingBox, RegionOfInterest,
    DEFAULT_SEVERITY_CONFIDENCE,
};
pub use verdict::{QualityVerdict, RejectionReason};
pub use view::{cap_heuristic_confidence, parse_view_code, ViewLabel, HEURISTIC_CONFIDENCE_CAP};
