use crate::analysis::{
    HeuristicClassification, HeuristicViewClassifier, QualityValidator, RegionDetector, SideBasis,
};
use crate::annotations::{AnnotationIndex, AnnotationRecord};
use crate::error::{Result, TriageError};
use crate::types::{
    Laterality, Provenance, QualityVerdict, RawImage, RegionOfInterest, TriageConfig, ViewLabel,
    ViewPosition,
};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;

/// Output of an external trained view classifier
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ModelPrediction {
    pub view: ViewPosition,
    pub side: Laterality,
    pub confidence: f64,
    /// BI-RADS assessment, when the model produces one
    pub bi_rads: Option<u8>,
    /// Density grade, when the model produces one
    pub density: Option<String>,
}

/// Trained view classifier consulted when no annotation exists
///
/// Implementations wrap an external model; returning `None` is a miss and
/// sends the image to the heuristic tier.
pub trait ViewModel: Send + Sync {
    fn predict(&self, image: &RawImage) -> Option<ModelPrediction>;
}

/// View label together with the tier that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedView {
    FromAnnotation(ViewLabel),
    FromModel {
        label: ViewLabel,
        prediction: ModelPrediction,
    },
    FromHeuristic(HeuristicClassification),
}

impl ResolvedView {
    pub fn label(&self) -> ViewLabel {
        match self {
            ResolvedView::FromAnnotation(label) => *label,
            ResolvedView::FromModel { label, .. } => *label,
            ResolvedView::FromHeuristic(classification) => classification.label,
        }
    }

    pub fn provenance(&self) -> Provenance {
        self.label().provenance()
    }

    /// Rule that decided the side, for heuristic labels only
    pub fn side_basis(&self) -> Option<SideBasis> {
        match self {
            ResolvedView::FromHeuristic(classification) => Some(classification.side_basis),
            _ => None,
        }
    }

    pub fn prediction(&self) -> Option<&ModelPrediction> {
        match self {
            ResolvedView::FromModel { prediction, .. } => Some(prediction),
            _ => None,
        }
    }
}

/// Breast-level assessment passed through for downstream consumers
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Assessment {
    pub bi_rads: Option<u8>,
    pub density: Option<String>,
    pub provenance: Provenance,
}

impl Assessment {
    fn from_record(record: &AnnotationRecord) -> Option<Self> {
        if record.breast_bi_rads.is_none() && record.breast_density.is_none() {
            return None;
        }
        Some(Self {
            bi_rads: record.breast_bi_rads,
            density: record.breast_density.clone(),
            provenance: Provenance::Annotation,
        })
    }

    fn from_prediction(prediction: &ModelPrediction) -> Option<Self> {
        if prediction.bi_rads.is_none() && prediction.density.is_none() {
            return None;
        }
        Some(Self {
            bi_rads: prediction.bi_rads,
            density: prediction.density.clone(),
            provenance: Provenance::TrainedModel,
        })
    }
}

/// Everything triage determined about an accepted image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TriageReport {
    pub source_id: Option<String>,
    pub verdict: QualityVerdict,
    pub view: ViewLabel,
    /// Set when the side came from the brightness heuristic
    pub side_basis: Option<SideBasis>,
    pub regions: Vec<RegionOfInterest>,
    pub assessment: Option<Assessment>,
}

/// Result of triaging one image
///
/// A rejected image carries only its verdict; no view or region is ever
/// produced for it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(tag = "status", rename_all = "snake_case"))]
pub enum TriageOutcome {
    Rejected(QualityVerdict),
    Accepted(TriageReport),
}

impl TriageOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TriageOutcome::Accepted(_))
    }

    pub fn verdict(&self) -> &QualityVerdict {
        match self {
            TriageOutcome::Rejected(verdict) => verdict,
            TriageOutcome::Accepted(report) => &report.verdict,
        }
    }

    pub fn report(&self) -> Option<&TriageReport> {
        match self {
            TriageOutcome::Accepted(report) => Some(report),
            TriageOutcome::Rejected(_) => None,
        }
    }

    pub fn into_report(self) -> Option<TriageReport> {
        match self {
            TriageOutcome::Accepted(report) => Some(report),
            TriageOutcome::Rejected(_) => None,
        }
    }
}

/// Validate, classify, and annotate mammograms
///
/// Per image: the quality gate runs first; accepted images get a view label
/// from the first tier that answers (annotation index, trained model,
/// heuristics) and a region list (annotated findings, otherwise contour
/// heuristics).
///
/// The pipeline holds no mutable state and can be shared across threads.
///
/// # Example
///
/// ```
/// use mammotriage_core::{
///     AnnotationIndex, AnnotationRecord, Laterality, Provenance, RawImage, TriagePipeline,
///     ViewPosition,
/// };
/// use std::sync::Arc;
///
/// let mut index = AnnotationIndex::new();
/// index.insert("abc123", AnnotationRecord::with_view(ViewPosition::Cc, Laterality::Left));
/// let pipeline = TriagePipeline::new(Arc::new(index));
///
/// // vertical stripes pass the plausibility check
/// let pixels = (0..256)
///     .flat_map(|_| (0..256u32).map(|x| if (x / 16) % 2 == 0 { 0.3 } else { 0.7 }))
///     .collect();
/// let image = RawImage::new(256, 256, pixels).unwrap().with_source_id("abc123");
///
/// let report = pipeline.triage(&image).into_report().unwrap();
/// assert_eq!(report.view.code(), "CC_L");
/// assert_eq!(report.view.confidence(), 1.0);
/// assert_eq!(report.view.provenance(), Provenance::Annotation);
///
/// // a flat gray image is not a mammogram
/// let gray = RawImage::new(512, 512, vec![0.5; 512 * 512]).unwrap();
/// assert!(!pipeline.triage(&gray).is_accepted());
/// ```
#[derive(Clone)]
pub struct TriagePipeline {
    annotations: Arc<AnnotationIndex>,
    model: Option<Arc<dyn ViewModel>>,
    config: TriageConfig,
    validator: QualityValidator,
    classifier: HeuristicViewClassifier,
    regions: RegionDetector,
}

impl fmt::Debug for TriagePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriagePipeline")
            .field("annotations", &self.annotations.len())
            .field("model", &self.model.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl TriagePipeline {
    /// Creates a pipeline with default thresholds and no trained model
    pub fn new(annotations: Arc<AnnotationIndex>) -> Self {
        let config = TriageConfig::default();
        Self {
            annotations,
            model: None,
            config,
            validator: QualityValidator::new(config.quality),
            classifier: HeuristicViewClassifier::default(),
            regions: RegionDetector::new(config.regions),
        }
    }

    /// Builder: Consult a trained view model before the heuristics
    pub fn with_model(mut self, model: Arc<dyn ViewModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Builder: Replace thresholds
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::ConfigError`] if the configuration is inconsistent.
    pub fn with_config(mut self, config: TriageConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        self.validator = QualityValidator::new(config.quality);
        self.regions = RegionDetector::new(config.regions);
        Ok(self)
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }

    /// Runs the quality gate alone
    pub fn validate(&self, image: &RawImage) -> QualityVerdict {
        self.validator.validate(image)
    }

    /// Triages one image
    pub fn triage(&self, image: &RawImage) -> TriageOutcome {
        let verdict = self.validate(image);
        if !verdict.accepted {
            debug!(
                "Image {} rejected: {}",
                image.source_id().unwrap_or("<unnamed>"),
                verdict
            );
            return TriageOutcome::Rejected(verdict);
        }
        TriageOutcome::Accepted(self.analyze(image, verdict))
    }

    /// Triages a batch with all-or-nothing semantics
    ///
    /// Every image is validated before any is analysed. If one is rejected,
    /// no report is returned at all.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::BatchRejected`] identifying the first rejected image.
    pub fn triage_batch(&self, images: &[RawImage]) -> Result<Vec<TriageReport>> {
        let total = images.len();
        let mut verdicts = Vec::with_capacity(total);

        for (index, image) in images.iter().enumerate() {
            let verdict = self.validate(image);
            if let Some(reason) = verdict.reason {
                info!("Batch aborted at image {} of {}: {}", index + 1, total, reason);
                return Err(TriageError::BatchRejected {
                    index,
                    total,
                    reason,
                });
            }
            verdicts.push(verdict);
        }

        Ok(images
            .iter()
            .zip(verdicts)
            .map(|(image, verdict)| self.analyze(image, verdict))
            .collect())
    }

    /// Picks the view label from the most trusted tier that answers
    pub fn resolve_view(&self, image: &RawImage) -> ResolvedView {
        self.view_from_annotation(image)
            .or_else(|| self.view_from_model(image))
            .unwrap_or_else(|| self.view_from_heuristic(image))
    }

    /// Annotation tier: exact identifier match, no pixels inspected
    pub fn view_from_annotation(&self, image: &RawImage) -> Option<ResolvedView> {
        let label = self.annotations.lookup_view(image.source_id()?)?;
        debug!("View from annotation: {}", label);
        Some(ResolvedView::FromAnnotation(label))
    }

    /// Trained-model tier
    pub fn view_from_model(&self, image: &RawImage) -> Option<ResolvedView> {
        let prediction = self.model.as_ref()?.predict(image)?;
        let label = ViewLabel::predicted(prediction.view, prediction.side, prediction.confidence);
        debug!("View from model: {}", label);
        Some(ResolvedView::FromModel { label, prediction })
    }

    /// Heuristic tier, always answers
    pub fn view_from_heuristic(&self, image: &RawImage) -> ResolvedView {
        ResolvedView::FromHeuristic(self.classifier.classify_detailed(image))
    }

    fn analyze(&self, image: &RawImage, verdict: QualityVerdict) -> TriageReport {
        let record = image.source_id().and_then(|id| self.annotations.lookup(id));
        let resolved = self.resolve_view(image);

        // an annotated view skips the model, so ask it for severity here
        let prediction = match &resolved {
            ResolvedView::FromModel { prediction, .. } => Some(prediction.clone()),
            ResolvedView::FromAnnotation(_) if record.and_then(|r| r.breast_bi_rads).is_none() => {
                self.model.as_ref().and_then(|m| m.predict(image))
            }
            _ => None,
        };

        let severity = record
            .and_then(|r| r.breast_bi_rads)
            .or_else(|| prediction.as_ref().and_then(|p| p.bi_rads));
        let annotated = record.map(AnnotationRecord::regions).unwrap_or_default();
        let regions = self.regions.detect_regions(image, annotated, severity);

        let assessment = record
            .and_then(Assessment::from_record)
            .or_else(|| prediction.as_ref().and_then(Assessment::from_prediction));

        TriageReport {
            source_id: image.source_id().map(str::to_string),
            verdict,
            view: resolved.label(),
            side_basis: resolved.side_basis(),
            regions,
            assessment,
        }
    }
}
