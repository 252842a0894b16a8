//! Pixel statistics shared by the validator and the heuristics

use crate::types::RawImage;
use imageproc::filter::filter3x3;

const K_SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const K_SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

/// Population mean and standard deviation of all pixels
pub fn mean_and_std(pixels: &[f32]) -> (f64, f64) {
    if pixels.is_empty() {
        return (0.0, 0.0);
    }
    let n = pixels.len() as f64;
    let mean = pixels.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = pixels
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

/// Mean intensity of the half-open rectangle `[x0, x1) × [y0, y1)`
///
/// An empty rectangle has mean 0.
pub fn region_mean(image: &RawImage, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
    let x1 = x1.min(image.width());
    let y1 = y1.min(image.height());
    if x0 >= x1 || y0 >= y1 {
        return 0.0;
    }

    let width = image.width() as usize;
    let pixels = image.pixels();
    let mut sum = 0.0;
    for y in y0..y1 {
        let row = &pixels[y as usize * width..(y as usize + 1) * width];
        sum += row[x0 as usize..x1 as usize]
            .iter()
            .map(|&v| v as f64)
            .sum::<f64>();
    }
    sum / ((x1 - x0) as f64 * (y1 - y0) as f64)
}

/// Mean intensity of each image half, split at `width / 2` and `height / 2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfMeans {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl HalfMeans {
    pub fn of(image: &RawImage) -> Self {
        let (w, h) = (image.width(), image.height());
        let (cx, cy) = (w / 2, h / 2);
        Self {
            left: region_mean(image, 0, 0, cx, h),
            right: region_mean(image, cx, 0, w, h),
            top: region_mean(image, 0, 0, w, cy),
            bottom: region_mean(image, 0, cy, w, h),
        }
    }
}

/// Shannon entropy (natural log) of an intensity histogram
///
/// Bins span the image's own `[min, max]` range; when every pixel has the
/// same value they all fall into one bin and the entropy is zero.
pub fn histogram_entropy(pixels: &[f32], bins: usize) -> f64 {
    if pixels.is_empty() || bins == 0 {
        return 0.0;
    }

    let (min, max) = pixels
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = (max - min) as f64;

    let mut counts = vec![0usize; bins];
    for &v in pixels {
        let bin = if span > 0.0 {
            (((v - min) as f64 / span) * bins as f64) as usize
        } else {
            0
        };
        counts[bin.min(bins - 1)] += 1;
    }

    let total = pixels.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.ln()
        })
        .sum()
}

/// Mean Sobel gradient magnitude on the normalized intensity scale
pub fn mean_gradient_magnitude(image: &RawImage) -> f64 {
    let gray = image.to_gray_f32();
    let gx: Vec<f32> = filter3x3(&gray, &K_SOBEL_X).into_raw();
    let gy: Vec<f32> = filter3x3(&gray, &K_SOBEL_Y).into_raw();

    let sum: f64 = gx
        .iter()
        .zip(gy.iter())
        .map(|(&x, &y)| ((x as f64).powi(2) + (y as f64).powi(2)).sqrt())
        .sum();
    sum / gx.len() as f64
}
