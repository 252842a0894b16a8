pub mod analysis;
pub mod annotations;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod test_support;

pub use analysis::{
    HeuristicClassification, HeuristicViewClassifier, LateralityDetector, QualityValidator,
    RegionDetector, SideBasis, SideDecision, ViewFeatures,
};
pub use annotations::{
    parse_bi_rads, source_id_from_path, AnnotationIndex, AnnotationLoader, AnnotationRecord,
    Finding,
};
pub use cli::report::TextReport;
pub use error::{Result, TriageError};
pub use pipeline::{
    Assessment, ModelPrediction, ResolvedView, TriageOutcome, TriagePipeline, TriageReport,
    ViewModel,
};
pub use types::*;
