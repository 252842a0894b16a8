use crate::types::{
    bi_rads_tag, finding_description, severity_confidence, BoundingBox, FindingCategory, Laterality,
    Provenance, RegionOfInterest, ViewLabel, ViewPosition,
};
use std::collections::HashMap;

/// Severity tag of annotated findings without a BI-RADS assessment
pub const UNASSESSED_TAG: &str = "not assessed";

/// One annotated finding in dataset coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Label as written in the dataset ("Suspicious Calcification")
    pub label: String,
    pub category: FindingCategory,
    pub bi_rads: Option<u8>,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Finding {
    pub fn new(label: impl Into<String>, bi_rads: Option<u8>, bbox: [f64; 4]) -> Self {
        let label = label.into();
        Self {
            category: FindingCategory::from_label(&label),
            label,
            bi_rads,
            xmin: bbox[0],
            ymin: bbox[1],
            xmax: bbox[2],
            ymax: bbox[3],
        }
    }

    /// Box in pixel coordinates, or `None` when the coordinates are unusable
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::clipped(self.xmin, self.ymin, self.xmax, self.ymax, u32::MAX, u32::MAX)
    }
}

/// Reference data for one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRecord {
    pub view_position: Option<ViewPosition>,
    pub laterality: Option<Laterality>,
    /// Breast-level BI-RADS assessment
    pub breast_bi_rads: Option<u8>,
    /// Breast density as written in the dataset ("DENSITY C")
    pub breast_density: Option<String>,
    pub findings: Vec<Finding>,
}

impl AnnotationRecord {
    /// Creates a record with a known view and side
    pub fn with_view(view_position: ViewPosition, laterality: Laterality) -> Self {
        Self {
            view_position: Some(view_position),
            laterality: Some(laterality),
            ..Self::default()
        }
    }

    /// Builder: Set the breast-level BI-RADS assessment
    pub fn with_breast_bi_rads(mut self, bi_rads: u8) -> Self {
        self.breast_bi_rads = Some(bi_rads);
        self
    }

    /// Builder: Add a finding
    pub fn with_finding(mut self, finding: Finding) -> Self {
        self.findings.push(finding);
        self
    }

    /// Ground-truth view label, when both view and side are known
    pub fn view_label(&self) -> Option<ViewLabel> {
        Some(ViewLabel::annotated(self.view_position?, self.laterality?))
    }

    /// Regions for all findings with usable boxes, numbered in dataset order
    pub fn regions(&self) -> Vec<RegionOfInterest> {
        self.findings
            .iter()
            .filter_map(|f| f.bbox().map(|bbox| (f, bbox)))
            .enumerate()
            .map(|(i, (finding, bbox))| RegionOfInterest {
                id: RegionOfInterest::region_id(i),
                category: finding.category,
                confidence: severity_confidence(finding.bi_rads),
                bbox,
                severity_tag: finding
                    .bi_rads
                    .map(bi_rads_tag)
                    .unwrap_or_else(|| UNASSESSED_TAG.to_string()),
                description: finding_description(finding.category, finding.bi_rads),
                provenance: Provenance::Annotation,
            })
            .collect()
    }
}

/// Exact-match lookup from image identifier to reference annotations
///
/// Built once, then shared read-only (typically behind an `Arc`). No pixel
/// data is ever inspected.
///
/// # Example
///
/// ```
/// use mammotriage_core::{AnnotationIndex, AnnotationRecord, Laterality, Provenance, ViewPosition};
///
/// let mut index = AnnotationIndex::new();
/// index.insert("abc123", AnnotationRecord::with_view(ViewPosition::Cc, Laterality::Left));
///
/// let label = index.lookup_view("abc123").unwrap();
/// assert_eq!(label.code(), "CC_L");
/// assert_eq!(label.confidence(), 1.0);
/// assert_eq!(label.provenance(), Provenance::Annotation);
///
/// assert!(index.lookup_view("unknown").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    records: HashMap<String, AnnotationRecord>,
}

impl AnnotationIndex {
    /// Creates an empty index; every lookup misses
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the record of an image
    pub fn insert(&mut self, source_id: impl Into<String>, record: AnnotationRecord) {
        self.records.insert(source_id.into(), record);
    }

    /// Returns the record of an image, creating an empty one if needed
    pub(crate) fn entry(&mut self, source_id: &str) -> &mut AnnotationRecord {
        self.records.entry(source_id.to_string()).or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of findings across all images
    pub fn finding_count(&self) -> usize {
        self.records.values().map(|r| r.findings.len()).sum()
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.records.contains_key(source_id)
    }

    pub fn lookup(&self, source_id: &str) -> Option<&AnnotationRecord> {
        self.records.get(source_id)
    }

    /// Ground-truth view label with confidence 1.0
    pub fn lookup_view(&self, source_id: &str) -> Option<ViewLabel> {
        self.lookup(source_id)?.view_label()
    }

    /// Annotated regions of an image; empty on a miss
    pub fn lookup_regions(&self, source_id: &str) -> Vec<RegionOfInterest> {
        self.lookup(source_id)
            .map(AnnotationRecord::regions)
            .unwrap_or_default()
    }
}

impl FromIterator<(String, AnnotationRecord)> for AnnotationIndex {
    fn from_iter<I: IntoIterator<Item = (String, AnnotationRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> AnnotationIndex {
        let record = AnnotationRecord::with_view(ViewPosition::Mlo, Laterality::Right)
            .with_breast_bi_rads(4)
            .with_finding(Finding::new("Mass", Some(4), [10.0, 20.0, 110.0, 90.0]))
            .with_finding(Finding::new(
                "Suspicious Calcification",
                Some(3),
                [f64::NAN, 0.0, 5.0, 5.0],
            ))
            .with_finding(Finding::new("Focal Asymmetry", None, [-5.0, 30.5, 50.9, 70.0]));

        [("img-1".to_string(), record)].into_iter().collect()
    }

    #[test]
    fn test_lookup_view_hit_and_miss() {
        let index = sample_index();
        let label = index.lookup_view("img-1").unwrap();
        assert_eq!(label.view(), ViewPosition::Mlo);
        assert_eq!(label.side(), Laterality::Right);
        assert_eq!(label.confidence(), 1.0);
        assert_eq!(label.provenance(), Provenance::Annotation);
        assert!(index.lookup_view("img-2").is_none());
        assert!(index.lookup_regions("img-2").is_empty());
    }

    #[test]
    fn test_record_without_side_has_no_view() {
        let mut index = AnnotationIndex::new();
        index.insert(
            "partial",
            AnnotationRecord {
                view_position: Some(ViewPosition::Cc),
                ..AnnotationRecord::default()
            },
        );
        assert!(index.contains("partial"));
        assert!(index.lookup_view("partial").is_none());
    }

    #[test]
    fn test_lookup_regions_skips_unusable_boxes() {
        let index = sample_index();
        let regions = index.lookup_regions("img-1");
        assert_eq!(regions.len(), 2);

        assert_eq!(regions[0].id, "region_1");
        assert_eq!(regions[0].category, FindingCategory::Mass);
        assert_eq!(regions[0].confidence, 0.85);
        assert_eq!(regions[0].bbox, BoundingBox::new(10, 20, 110, 90));
        assert_eq!(regions[0].severity_tag, "BI-RADS 4");
        assert_eq!(
            regions[0].description,
            "Suspicious mass, histological evaluation recommended"
        );

        assert_eq!(regions[1].id, "region_2");
        assert_eq!(regions[1].category, FindingCategory::Asymmetry);
        assert_eq!(regions[1].confidence, 0.6);
        assert_eq!(regions[1].bbox, BoundingBox::new(0, 30, 50, 70));
        assert_eq!(regions[1].severity_tag, UNASSESSED_TAG);
        assert!(regions.iter().all(|r| r.provenance == Provenance::Annotation));
    }

    #[test]
    fn test_counts() {
        let index = sample_index();
        assert_eq!(index.len(), 1);
        assert_eq!(index.finding_count(), 3);
        assert_eq!(index.lookup("img-1").unwrap().breast_bi_rads, Some(4));
        assert!(AnnotationIndex::new().is_empty());
    }
}
