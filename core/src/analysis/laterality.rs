use super::stats::{mean_and_std, region_mean, HalfMeans};
use crate::types::{Laterality, RawImage};
use imageproc::filter::gaussian_blur_f32;
use log::trace;
use std::fmt;

/// Sigma matching a 15×15 Gaussian kernel
const BLUR_SIGMA: f32 = 2.6;

/// Pixels brighter than this fraction of the smoothed maximum form the
/// bright region
const BRIGHT_FRACTION: f32 = 0.8;

/// Centroid offsets (relative to the image center) that decide the side
const CENTROID_RIGHT_FACTOR: f64 = 1.15;
const CENTROID_LEFT_FACTOR: f64 = 0.85;

/// Minimum half-brightness difference relative to the image mean
const HALF_DIFFERENCE: f64 = 0.05;

/// Density margin for the central region and half comparison
const DENSITY_FACTOR: f64 = 1.05;

/// Which rule decided the side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum SideBasis {
    /// Centroid of the brightest smoothed region was off-center
    BrightCentroid,
    /// One image half was noticeably brighter
    HalfBrightness,
    /// Tissue concentrated in the central region
    CentralDensity,
    /// No rule fired
    Default,
}

impl SideBasis {
    pub fn simple_name(&self) -> &'static str {
        match self {
            SideBasis::BrightCentroid => "bright centroid",
            SideBasis::HalfBrightness => "half brightness",
            SideBasis::CentralDensity => "central density",
            SideBasis::Default => "default",
        }
    }
}

impl fmt::Display for SideBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Detected side together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideDecision {
    pub side: Laterality,
    pub basis: SideBasis,
}

impl SideDecision {
    fn new(side: Laterality, basis: SideBasis) -> Self {
        Self { side, basis }
    }
}

/// Brightness-distribution heuristic for breast laterality
///
/// The breast occupies the side of the image opposite its laterality, with
/// the nipple pointing towards the image center. Rules, first match wins:
///
/// 1. Smooth the image and take the centroid x of pixels above 80% of the
///    smoothed maximum. Right of `1.15 × center` → left breast; left of
///    `0.85 × center` → right breast.
/// 2. Compare half brightness relative to the image mean; a brighter left
///    half (by more than 5%) → right breast, a brighter right half → left.
/// 3. When the central 50% × 50% region is denser than `1.05 × mean`, a left
///    half brighter than `1.05 × right` → right breast, otherwise left.
/// 4. Left breast.
#[derive(Debug, Clone, Copy, Default)]
pub struct LateralityDetector;

impl LateralityDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect_side(&self, image: &RawImage) -> SideDecision {
        let decision = Self::from_bright_centroid(image)
            .or_else(|| Self::from_half_brightness(image))
            .or_else(|| Self::from_central_density(image))
            .unwrap_or(SideDecision::new(Laterality::Left, SideBasis::Default));

        trace!("Side: {} ({})", decision.side, decision.basis);
        decision
    }

    fn from_bright_centroid(image: &RawImage) -> Option<SideDecision> {
        let blurred = gaussian_blur_f32(&image.to_gray_f32(), BLUR_SIGMA);
        let max = blurred.pixels().map(|p| p.0[0]).fold(f32::NEG_INFINITY, f32::max);
        let threshold = max * BRIGHT_FRACTION;

        let (sum_x, count) = blurred
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > threshold)
            .fold((0.0f64, 0usize), |(sum, n), (x, _, _)| (sum + x as f64, n + 1));
        if count == 0 {
            return None;
        }

        let centroid_x = sum_x / count as f64;
        let center_x = (image.width() / 2) as f64;
        if centroid_x > center_x * CENTROID_RIGHT_FACTOR {
            Some(SideDecision::new(Laterality::Left, SideBasis::BrightCentroid))
        } else if centroid_x < center_x * CENTROID_LEFT_FACTOR {
            Some(SideDecision::new(Laterality::Right, SideBasis::BrightCentroid))
        } else {
            None
        }
    }

    fn from_half_brightness(image: &RawImage) -> Option<SideDecision> {
        let (mean, _) = mean_and_std(image.pixels());
        if mean <= 0.0 {
            return None;
        }

        let halves = HalfMeans::of(image);
        let relative = (halves.left - halves.right) / mean;
        if relative > HALF_DIFFERENCE {
            Some(SideDecision::new(Laterality::Right, SideBasis::HalfBrightness))
        } else if relative < -HALF_DIFFERENCE {
            Some(SideDecision::new(Laterality::Left, SideBasis::HalfBrightness))
        } else {
            None
        }
    }

    fn from_central_density(image: &RawImage) -> Option<SideDecision> {
        let (w, h) = (image.width(), image.height());
        let (mean, _) = mean_and_std(image.pixels());
        let central = region_mean(image, w / 4, h / 4, 3 * w / 4, 3 * h / 4);
        if central <= mean * DENSITY_FACTOR {
            return None;
        }

        let halves = HalfMeans::of(image);
        let side = if halves.left > halves.right * DENSITY_FACTOR {
            Laterality::Right
        } else {
            Laterality::Left
        };
        Some(SideDecision::new(side, SideBasis::CentralDensity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{disc, vertical_ramp};

    #[test]
    fn test_bright_region_on_right_is_left_breast() {
        let image = disc(400, 300, 0.3, 0.8, (320.0, 150.0), 40.0);
        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Left, SideBasis::BrightCentroid));
    }

    #[test]
    fn test_bright_region_on_left_is_right_breast() {
        let image = disc(400, 300, 0.3, 0.8, (80.0, 150.0), 40.0);
        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Right, SideBasis::BrightCentroid));
    }

    #[test]
    fn test_brighter_left_half_is_right_breast() {
        // centered highlight keeps the centroid rule silent
        let (width, height) = (400u32, 300u32);
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    let (dx, dy) = (x as f64 - 200.0, y as f64 - 150.0);
                    if dx * dx + dy * dy <= 400.0 {
                        0.9
                    } else if x < 200 {
                        0.5
                    } else {
                        0.4
                    }
                })
            })
            .collect();
        let image = RawImage::new(width, height, pixels).unwrap();

        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Right, SideBasis::HalfBrightness));
    }

    #[test]
    fn test_brighter_right_half_is_left_breast() {
        // centered highlight keeps the centroid rule silent
        let (width, height) = (400u32, 300u32);
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    let (dx, dy) = (x as f64 - 200.0, y as f64 - 150.0);
                    if dx * dx + dy * dy <= 400.0 {
                        0.9
                    } else if x < 200 {
                        0.4
                    } else {
                        0.5
                    }
                })
            })
            .collect();
        let image = RawImage::new(width, height, pixels).unwrap();

        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Left, SideBasis::HalfBrightness));
    }

    #[test]
    fn test_dense_center_with_denser_left_half_is_right() {
        // left half 1.0507x the right, yet only 4.9% of the mean apart
        let (width, height) = (400u32, 300u32);
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    if (160..240).contains(&x) && (110..190).contains(&y) {
                        0.8
                    } else if x < 200 {
                        0.3175
                    } else {
                        0.3
                    }
                })
            })
            .collect();
        let image = RawImage::new(width, height, pixels).unwrap();

        let halves = HalfMeans::of(&image);
        assert!(halves.left > halves.right * DENSITY_FACTOR);

        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Right, SideBasis::CentralDensity));
    }

    #[test]
    fn test_dense_center_without_side_bias_is_left() {
        let image = disc(400, 300, 0.3, 0.8, (200.0, 150.0), 40.0);
        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Left, SideBasis::CentralDensity));
    }

    #[test]
    fn test_no_rule_fires_defaults_to_left() {
        let image = vertical_ramp(400, 300, 0.2, 0.8);
        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision, SideDecision::new(Laterality::Left, SideBasis::Default));
    }

    #[test]
    fn test_black_image_defaults_to_left() {
        let image = RawImage::new(32, 32, vec![0.0; 1024]).unwrap();
        let decision = LateralityDetector::new().detect_side(&image);
        assert_eq!(decision.basis, SideBasis::Default);
        assert_eq!(decision.side, Laterality::Left);
    }
}
