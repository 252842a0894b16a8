use crate::pipeline::{TriageOutcome, TriageReport};
use std::fmt;
use std::path::Path;

/// Text report formatter for one triaged image
pub struct TextReport<'a> {
    path: &'a Path,
    outcome: &'a TriageOutcome,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(path: &'a Path, outcome: &'a TriageOutcome) -> Self {
        Self { path, outcome }
    }

    fn write_report(f: &mut fmt::Formatter<'_>, report: &TriageReport) -> fmt::Result {
        writeln!(f, "View:           {}", report.view.view().short_str())?;
        writeln!(f, "Laterality:     {}", report.view.side().simple_name())?;
        writeln!(f, "Confidence:     {:.2}", report.view.confidence())?;
        writeln!(f, "Provenance:     {}", report.view.provenance())?;
        if let Some(basis) = report.side_basis {
            writeln!(f, "Side Basis:     {}", basis)?;
        }

        if let Some(assessment) = &report.assessment {
            let bi_rads = assessment
                .bi_rads
                .map(|b| format!("BI-RADS {}", b))
                .unwrap_or_else(|| "BI-RADS unknown".to_string());
            writeln!(
                f,
                "Assessment:     {}, {} ({})",
                bi_rads,
                assessment.density.as_deref().unwrap_or("density unknown"),
                assessment.provenance
            )?;
        }

        writeln!(f, "Regions:        {}", report.regions.len())?;
        for region in &report.regions {
            writeln!(
                f,
                "  {}: {} {} {} ({:.2}, {})",
                region.id,
                region.category,
                region.bbox,
                region.severity_tag,
                region.confidence,
                region.provenance
            )?;
            writeln!(f, "    {}", region.description)?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Triage: {}", self.path.display());
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;

        let source_id = match self.outcome {
            TriageOutcome::Accepted(report) => report.source_id.as_deref(),
            TriageOutcome::Rejected(_) => None,
        };
        writeln!(f, "Source ID:      {}", source_id.unwrap_or("none"))?;
        writeln!(f, "Quality:        {}", self.outcome.verdict())?;

        if let TriageOutcome::Accepted(report) = self.outcome {
            Self::write_report(f, report)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SideBasis;
    use crate::types::{
        BoundingBox, FindingCategory, Laterality, Provenance, QualityVerdict, RegionOfInterest,
        RejectionReason, ViewLabel, ViewPosition,
    };

    fn verdict(reason: Option<RejectionReason>) -> QualityVerdict {
        QualityVerdict {
            accepted: reason.is_none(),
            reason,
            mean_intensity: 0.5,
            std_intensity: 0.2,
            histogram_entropy: 0.69,
            mean_gradient_magnitude: 0.19,
        }
    }

    #[test]
    fn test_text_report_accepted() {
        let outcome = TriageOutcome::Accepted(TriageReport {
            source_id: Some("abc123".to_string()),
            verdict: verdict(None),
            view: ViewLabel::heuristic(ViewPosition::Mlo, Laterality::Left, 0.8),
            side_basis: Some(SideBasis::BrightCentroid),
            regions: vec![RegionOfInterest {
                id: "region_1".to_string(),
                category: FindingCategory::Unknown,
                confidence: 0.5,
                bbox: BoundingBox::new(10, 20, 110, 90),
                severity_tag: "suspicious_mass".to_string(),
                description: "Region of interest detected".to_string(),
                provenance: Provenance::Heuristic,
            }],
            assessment: None,
        });

        let output = format!("{}", TextReport::new(Path::new("scan.png"), &outcome));
        assert!(output.starts_with("Triage: scan.png\n================\n"));
        assert!(output.contains("Source ID:      abc123"));
        assert!(output.contains("Quality:        accepted"));
        assert!(output.contains("View:           MLO"));
        assert!(output.contains("Laterality:     left"));
        assert!(output.contains("Confidence:     0.80"));
        assert!(output.contains("Provenance:     heuristic"));
        assert!(output.contains("Side Basis:     bright centroid"));
        assert!(output.contains("Regions:        1"));
        assert!(output.contains(
            "  region_1: unknown [10, 20] - [110, 90] suspicious_mass (0.50, heuristic)"
        ));
    }

    #[test]
    fn test_text_report_rejected() {
        let outcome = TriageOutcome::Rejected(verdict(Some(RejectionReason::InsufficientContrast)));
        let output = format!("{}", TextReport::new(Path::new("gray.png"), &outcome));
        assert!(output.contains("Quality:        rejected: insufficient contrast"));
        assert!(!output.contains("View:"));
        assert!(!output.contains("Regions:"));
    }
}
