use crate::types::{
    bi_rads_tag, finding_description, severity_confidence, BoundingBox, FindingCategory, Provenance,
    RawImage, RegionDetectorConfig, RegionOfInterest,
};
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::filter::gaussian_blur_f32;
use log::{debug, trace};

/// Sigma matching a 5×5 Gaussian kernel
const DENOISE_SIGMA: f32 = 1.1;

/// Sigma matching the 11×11 neighbourhood of the adaptive threshold
const NEIGHBOURHOOD_SIGMA: f32 = 2.0;

/// Offset subtracted from the neighbourhood mean
const THRESHOLD_OFFSET: i16 = 2;

/// Severity tag of heuristic regions without a severity hint
pub const SUSPICIOUS_MASS_TAG: &str = "suspicious_mass";

/// Locates candidate regions of interest
///
/// Annotated regions always win. Without them, dense blobs are found by
/// adaptive thresholding and filtered by area, shape, and position.
#[derive(Debug, Clone, Default)]
pub struct RegionDetector {
    config: RegionDetectorConfig,
}

impl RegionDetector {
    pub fn new(config: RegionDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegionDetectorConfig {
        &self.config
    }

    /// Returns annotated regions when there are any, otherwise heuristic ones
    ///
    /// Annotated boxes are clipped to the image; boxes left empty are
    /// dropped and the remaining regions renumbered.
    ///
    /// # Arguments
    ///
    /// * `image` - Accepted image to search
    /// * `annotation_regions` - Regions from the annotation index, may be empty
    /// * `severity` - BI-RADS hint used to grade heuristic regions
    pub fn detect_regions(
        &self,
        image: &RawImage,
        annotation_regions: Vec<RegionOfInterest>,
        severity: Option<u8>,
    ) -> Vec<RegionOfInterest> {
        let annotated: Vec<RegionOfInterest> = annotation_regions
            .into_iter()
            .filter_map(|region| {
                let bbox = region.bbox.clip_to(image.width(), image.height())?;
                Some(RegionOfInterest { bbox, ..region })
            })
            .enumerate()
            .map(|(i, region)| RegionOfInterest {
                id: RegionOfInterest::region_id(i),
                ..region
            })
            .collect();

        if !annotated.is_empty() {
            debug!("Using {} annotated region(s)", annotated.len());
            return annotated;
        }

        self.detect_heuristic(image, severity)
    }

    /// Contour-based region search
    pub fn detect_heuristic(
        &self,
        image: &RawImage,
        severity: Option<u8>,
    ) -> Vec<RegionOfInterest> {
        let binary = adaptive_threshold(&image.to_gray8());
        let contours = find_contours::<i32>(&binary);

        let boxes: Vec<BoundingBox> = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .filter_map(|c| self.accept_contour(c, image.width(), image.height()))
            .take(self.config.max_regions)
            .collect();

        debug!(
            "Heuristic regions: {} of {} contour(s) kept",
            boxes.len(),
            contours.len()
        );

        let confidence = match severity {
            Some(_) => severity_confidence(severity),
            None => self.config.default_confidence,
        };
        let severity_tag = severity
            .map(bi_rads_tag)
            .unwrap_or_else(|| SUSPICIOUS_MASS_TAG.to_string());
        let description = finding_description(FindingCategory::Unknown, severity);

        boxes
            .into_iter()
            .enumerate()
            .map(|(i, bbox)| RegionOfInterest {
                id: RegionOfInterest::region_id(i),
                category: FindingCategory::Unknown,
                confidence,
                bbox,
                severity_tag: severity_tag.clone(),
                description: description.clone(),
                provenance: Provenance::Heuristic,
            })
            .collect()
    }

    /// Applies the area, aspect, and position filters to one contour
    fn accept_contour(
        &self,
        contour: &Contour<i32>,
        width: u32,
        height: u32,
    ) -> Option<BoundingBox> {
        let area = polygon_area(contour);
        let max_area = width as f64 * height as f64 * self.config.max_area_fraction;
        if area <= self.config.min_area || area >= max_area {
            return None;
        }

        let bbox = contour_bounds(contour)?;
        let (w, h) = (bbox.width(), bbox.height());
        let aspect = w as f64 / h as f64;
        if aspect <= self.config.min_aspect_ratio || aspect >= self.config.max_aspect_ratio {
            trace!("Contour {} rejected: aspect {:.2}", bbox, aspect);
            return None;
        }

        let center_x = (bbox.xmin + w / 2) as f64;
        let center_y = (bbox.ymin + h / 2) as f64;
        let margin = self.config.border_margin;
        let (w_img, h_img) = (width as f64, height as f64);
        let central = center_x > w_img * margin
            && center_x < w_img * (1.0 - margin)
            && center_y > h_img * margin
            && center_y < h_img * (1.0 - margin);
        if !central {
            trace!("Contour {} rejected: off-center", bbox);
            return None;
        }

        Some(bbox)
    }
}

/// Binary map of pixels brighter than their Gaussian-weighted
/// neighbourhood minus a small offset
fn adaptive_threshold(gray: &GrayImage) -> GrayImage {
    let denoised = gaussian_blur_f32(gray, DENOISE_SIGMA);
    let local = gaussian_blur_f32(&denoised, NEIGHBOURHOOD_SIGMA);

    let mut binary = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in denoised.enumerate_pixels() {
        let threshold = local.get_pixel(x, y).0[0] as i16 - THRESHOLD_OFFSET;
        let value = if pixel.0[0] as i16 > threshold { 255 } else { 0 };
        binary.put_pixel(x, y, Luma([value]));
    }
    binary
}

/// Shoelace area of the polygon through the contour points
fn polygon_area(contour: &Contour<i32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice_area as f64 / 2.0).abs()
}

/// Upright pixel bounding box of the contour points, `max` exclusive
fn contour_bounds(contour: &Contour<i32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut xmin, mut ymin, mut xmax, mut ymax) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        xmin = xmin.min(p.x);
        ymin = ymin.min(p.y);
        xmax = xmax.max(p.x);
        ymax = ymax.max(p.y);
    }
    Some(BoundingBox::new(
        xmin.max(0) as u32,
        ymin.max(0) as u32,
        (xmax + 1).max(0) as u32,
        (ymax + 1).max(0) as u32,
    ))
}
