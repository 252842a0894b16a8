//! Synthetic images shared by unit tests

use crate::types::RawImage;

/// Vertical stripes alternating between two intensities
pub fn stripes(width: u32, height: u32, period: u32, low: f32, high: f32) -> RawImage {
    let half = (period / 2).max(1);
    let pixels = (0..height)
        .flat_map(|_| (0..width).map(move |x| if (x / half) % 2 == 0 { low } else { high }))
        .collect();
    RawImage::new(width, height, pixels).unwrap()
}

/// Brightness rising linearly from `from` at the top row to `to` at the bottom
pub fn vertical_ramp(width: u32, height: u32, from: f32, to: f32) -> RawImage {
    let step = (to - from) / (height.max(2) - 1) as f32;
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |_| from + step * y as f32))
        .collect();
    RawImage::new(width, height, pixels).unwrap()
}

/// Brightness rising linearly from `from` at the left column to `to` at the right
pub fn horizontal_ramp(width: u32, height: u32, from: f32, to: f32) -> RawImage {
    let step = (to - from) / (width.max(2) - 1) as f32;
    let pixels = (0..height)
        .flat_map(|_| (0..width).map(move |x| from + step * x as f32))
        .collect();
    RawImage::new(width, height, pixels).unwrap()
}

/// Uniform background with filled squares given as `(x, y, side)`
pub fn squares(
    width: u32,
    height: u32,
    background: f32,
    fill: f32,
    squares: &[(u32, u32, u32)],
) -> RawImage {
    let mut pixels = vec![background; (width * height) as usize];
    for &(x0, y0, side) in squares {
        for y in y0..(y0 + side).min(height) {
            for x in x0..(x0 + side).min(width) {
                pixels[(y * width + x) as usize] = fill;
            }
        }
    }
    RawImage::new(width, height, pixels).unwrap()
}

/// Uniform background with a bright filled disc
pub fn disc(
    width: u32,
    height: u32,
    background: f32,
    fill: f32,
    center: (f64, f64),
    radius: f64,
) -> RawImage {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let (dx, dy) = (x as f64 - center.0, y as f64 - center.1);
                if dx * dx + dy * dy <= radius * radius {
                    fill
                } else {
                    background
                }
            })
        })
        .collect();
    RawImage::new(width, height, pixels).unwrap()
}

/// Plausible mammogram stand-in: a grid of small bright squares with one
/// larger square at the center
///
/// The small squares supply enough texture to pass quality validation but
/// are too small to count as regions, so only the central square is found.
pub fn textured_blob() -> RawImage {
    let mut blobs: Vec<(u32, u32, u32)> = Vec::new();
    for gy in 0..13u32 {
        for gx in 0..13u32 {
            let (x, y) = (5 + gx * 30, 5 + gy * 30);
            let overlaps = |v: u32| v + 12 > 160 && v < 240;
            if !(overlaps(x) && overlaps(y)) {
                blobs.push((x, y, 12));
            }
        }
    }
    blobs.push((170, 170, 60));
    squares(400, 400, 0.3, 0.8, &blobs)
}
