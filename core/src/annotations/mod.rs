//! Reference annotations for dataset images
//!
//! The [`AnnotationIndex`] maps an image identifier to its ground-truth view,
//! laterality, breast-level assessment, and findings. It is built once with
//! an [`AnnotationLoader`] from the breast-level and finding-level CSV tables
//! and is read-only afterwards.

mod index;
mod loader;
mod parse;

pub use index::{AnnotationIndex, AnnotationRecord, Finding, UNASSESSED_TAG};
pub use loader::AnnotationLoader;
pub use parse::{first_finding_category, parse_bi_rads, source_id_from_path};
