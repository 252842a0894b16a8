use super::stats::{histogram_entropy, mean_and_std, mean_gradient_magnitude};
use crate::types::{QualityThresholds, QualityVerdict, RawImage, RejectionReason};
use log::trace;

/// Statistics the plausibility check is based on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStatistics {
    pub mean_intensity: f64,
    pub std_intensity: f64,
    pub histogram_entropy: f64,
    pub mean_gradient_magnitude: f64,
}

impl ImageStatistics {
    /// Computes all statistics over the full pixel matrix
    pub fn compute(image: &RawImage, histogram_bins: usize) -> Self {
        let (mean_intensity, std_intensity) = mean_and_std(image.pixels());
        Self {
            mean_intensity,
            std_intensity,
            histogram_entropy: histogram_entropy(image.pixels(), histogram_bins),
            mean_gradient_magnitude: mean_gradient_magnitude(image),
        }
    }
}

/// Applies the rejection rules in order and returns the first that fires
///
/// Rules:
/// 1. mean intensity outside the allowed band → intensity out of range
/// 2. standard deviation below minimum → insufficient contrast
/// 3. histogram entropy above maximum → distribution too uniform
/// 4. mean gradient outside the allowed band → gradient out of range
pub fn evaluate(
    stats: &ImageStatistics,
    thresholds: &QualityThresholds,
) -> Option<RejectionReason> {
    if stats.mean_intensity < thresholds.min_mean_intensity
        || stats.mean_intensity > thresholds.max_mean_intensity
    {
        return Some(RejectionReason::IntensityOutOfRange);
    }

    if stats.std_intensity < thresholds.min_std_intensity {
        return Some(RejectionReason::InsufficientContrast);
    }

    if stats.histogram_entropy > thresholds.max_histogram_entropy {
        return Some(RejectionReason::DistributionTooUniform);
    }

    if stats.mean_gradient_magnitude < thresholds.min_mean_gradient
        || stats.mean_gradient_magnitude > thresholds.max_mean_gradient
    {
        return Some(RejectionReason::GradientOutOfRange);
    }

    None
}

/// Statistical plausibility check for mammograms
///
/// This is the mandatory gate of the pipeline: no view or region
/// classification may run on an image it rejects.
///
/// # Example
///
/// ```
/// use mammotriage_core::{QualityValidator, RawImage, RejectionReason};
///
/// let gray = RawImage::new(512, 512, vec![0.5; 512 * 512]).unwrap();
/// let verdict = QualityValidator::default().validate(&gray);
///
/// assert!(!verdict.accepted);
/// assert_eq!(verdict.reason, Some(RejectionReason::InsufficientContrast));
/// assert_eq!(verdict.reason_str(), Some("insufficient contrast"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QualityValidator {
    thresholds: QualityThresholds,
}

impl QualityValidator {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Computes image statistics and decides whether the image is plausible
    pub fn validate(&self, image: &RawImage) -> QualityVerdict {
        let stats = ImageStatistics::compute(image, self.thresholds.histogram_bins);
        let reason = evaluate(&stats, &self.thresholds);

        trace!(
            "Validation: mean={:.3}, std={:.3}, entropy={:.3}, gradient={:.3} -> {}",
            stats.mean_intensity,
            stats.std_intensity,
            stats.histogram_entropy,
            stats.mean_gradient_magnitude,
            reason.map(|r| r.as_str()).unwrap_or("accepted")
        );

        QualityVerdict {
            accepted: reason.is_none(),
            reason,
            mean_intensity: stats.mean_intensity,
            std_intensity: stats.std_intensity,
            histogram_entropy: stats.histogram_entropy,
            mean_gradient_magnitude: stats.mean_gradient_magnitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::stripes;
    use rstest::rstest;

    fn stats(mean: f64, std: f64, entropy: f64, gradient: f64) -> ImageStatistics {
        ImageStatistics {
            mean_intensity: mean,
            std_intensity: std,
            histogram_entropy: entropy,
            mean_gradient_magnitude: gradient,
        }
    }

    #[rstest]
    #[case(0.19, 0.0, 5.0, 0.0)]
    #[case(0.76, 0.3, 1.0, 0.2)]
    #[case(0.0, 0.5, 0.5, 0.1)]
    #[case(0.9, 0.01, 3.9, 0.9)]
    fn test_intensity_rule_wins_regardless_of_other_statistics(
        #[case] mean: f64,
        #[case] std: f64,
        #[case] entropy: f64,
        #[case] gradient: f64,
    ) {
        assert_eq!(
            evaluate(&stats(mean, std, entropy, gradient), &QualityThresholds::default()),
            Some(RejectionReason::IntensityOutOfRange)
        );
    }

    #[rstest]
    #[case(stats(0.5, 0.05, 4.0, 0.9), Some(RejectionReason::InsufficientContrast))]
    #[case(stats(0.5, 0.2, 3.6, 0.9), Some(RejectionReason::DistributionTooUniform))]
    #[case(stats(0.5, 0.2, 2.0, 0.01), Some(RejectionReason::GradientOutOfRange))]
    #[case(stats(0.5, 0.2, 2.0, 0.41), Some(RejectionReason::GradientOutOfRange))]
    #[case(stats(0.5, 0.2, 2.0, 0.2), None)]
    #[case(stats(0.20, 0.10, 3.5, 0.05), None)]
    #[case(stats(0.75, 0.10, 3.5, 0.40), None)]
    fn test_rule_order(#[case] stats: ImageStatistics, #[case] expected: Option<RejectionReason>) {
        assert_eq!(evaluate(&stats, &QualityThresholds::default()), expected);
    }

    #[test]
    fn test_uniform_gray_is_insufficient_contrast() {
        let image = RawImage::new(512, 512, vec![0.5; 512 * 512]).unwrap();
        let verdict = QualityValidator::default().validate(&image);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, Some(RejectionReason::InsufficientContrast));
        assert!((verdict.mean_intensity - 0.5).abs() < 1e-9);
        assert_eq!(verdict.std_intensity, 0.0);
    }

    #[test]
    fn test_dark_image_is_intensity_out_of_range() {
        let image = stripes(128, 128, 32, 0.0, 0.2);
        let verdict = QualityValidator::default().validate(&image);
        assert_eq!(verdict.reason, Some(RejectionReason::IntensityOutOfRange));
    }

    #[test]
    fn test_ramp_is_too_uniform() {
        let pixels = (0..256)
            .flat_map(|_| (0..256).map(|x| x as f32 / 255.0))
            .collect();
        let image = RawImage::new(256, 256, pixels).unwrap();
        let verdict = QualityValidator::default().validate(&image);
        assert_eq!(verdict.reason, Some(RejectionReason::DistributionTooUniform));
        assert!(verdict.histogram_entropy > 3.5);
    }

    #[test]
    fn test_fine_stripes_have_too_much_gradient() {
        let image = stripes(256, 256, 4, 0.3, 0.7);
        let verdict = QualityValidator::default().validate(&image);
        assert_eq!(verdict.reason, Some(RejectionReason::GradientOutOfRange));
        assert!(verdict.mean_gradient_magnitude > 0.4);
    }

    #[test]
    fn test_single_edge_has_too_little_gradient() {
        let image = stripes(256, 256, 256, 0.3, 0.7);
        let verdict = QualityValidator::default().validate(&image);
        assert_eq!(verdict.reason, Some(RejectionReason::GradientOutOfRange));
        assert!(verdict.mean_gradient_magnitude < 0.05);
    }

    #[test]
    fn test_structured_image_is_accepted() {
        let image = stripes(256, 256, 32, 0.3, 0.7);
        let verdict = QualityValidator::default().validate(&image);
        assert!(verdict.accepted, "{}", verdict);
        assert!(verdict.reason.is_none());
        assert!((verdict.mean_gradient_magnitude - 0.2).abs() < 0.02);
    }

    #[test]
    fn test_custom_thresholds() {
        let image = RawImage::new(64, 64, vec![0.5; 64 * 64]).unwrap();
        let validator = QualityValidator::new(QualityThresholds {
            min_std_intensity: 0.0,
            min_mean_gradient: 0.0,
            ..QualityThresholds::default()
        });
        assert!(validator.validate(&image).accepted);
    }
}
