use crate::error::{Result, TriageError};
use image::{GrayImage, ImageBuffer, Luma};

/// Grayscale image with intensities stored as `f32`
pub type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Decoded single-channel image submitted for triage
///
/// Pixels are stored row-major with intensities normalized to `[0, 1]`.
/// Construction rejects buffers that cannot be analysed, so every
/// `RawImage` has a non-zero area and only pixel values within `[0, 1]`.
///
/// # Example
///
/// ```
/// use mammotriage_core::RawImage;
///
/// let image = RawImage::from_u8(4, 2, vec![0, 64, 128, 255, 0, 64, 128, 255])
///     .unwrap()
///     .with_source_id("abc123");
///
/// assert_eq!(image.width(), 4);
/// assert_eq!(image.height(), 2);
/// assert_eq!(image.source_id(), Some("abc123"));
/// assert!(RawImage::new(0, 10, vec![]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<f32>,
    source_id: Option<String>,
}

impl RawImage {
    /// Creates an image from normalized intensities
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::MalformedInput`] if:
    /// - either dimension is zero
    /// - the buffer length differs from `width * height`
    /// - any pixel is NaN or infinite
    /// - any pixel lies outside `[0, 1]` (an unnormalized buffer)
    pub fn new(width: u32, height: u32, pixels: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TriageError::MalformedInput(format!(
                "zero-area image ({}x{})",
                width, height
            )));
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TriageError::MalformedInput(format!(
                "pixel buffer holds {} values, {}x{} requires {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }

        if let Some(pos) = pixels.iter().position(|v| !v.is_finite()) {
            return Err(TriageError::MalformedInput(format!(
                "non-finite pixel value at ({}, {})",
                pos % width as usize,
                pos / width as usize
            )));
        }

        if let Some(pos) = pixels.iter().position(|v| !(0.0..=1.0).contains(v)) {
            return Err(TriageError::MalformedInput(format!(
                "pixel value {} at ({}, {}) outside [0, 1]",
                pixels[pos],
                pos % width as usize,
                pos / width as usize
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
            source_id: None,
        })
    }

    /// Creates an image from 8-bit intensities
    pub fn from_u8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::new(
            width,
            height,
            pixels.into_iter().map(|v| v as f32 / 255.0).collect(),
        )
    }

    /// Creates an image from a decoded 8-bit grayscale buffer
    pub fn from_gray_image(image: &GrayImage) -> Result<Self> {
        Self::from_u8(image.width(), image.height(), image.as_raw().clone())
    }

    /// Attaches the identifier used for annotation lookup
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Identifier used for annotation lookup, if any
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Row-major normalized intensities
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Number of pixels (always non-zero)
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Intensity at (x, y)
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Copies the image into an `f32` grayscale buffer
    pub fn to_gray_f32(&self) -> GrayF32 {
        GrayF32::from_fn(self.width, self.height, |x, y| Luma([self.get(x, y)]))
    }

    /// Quantizes the image to 8 bits
    pub fn to_gray8(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([(self.get(x, y) * 255.0).round() as u8])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_area_is_malformed() {
        assert!(RawImage::new(0, 0, vec![]).unwrap_err().is_malformed_input());
        assert!(RawImage::new(5, 0, vec![]).unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_size_mismatch_is_malformed() {
        let err = RawImage::new(3, 3, vec![0.5; 8]).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("requires 9"));
    }

    #[test]
    fn test_non_finite_is_malformed() {
        let mut pixels = vec![0.5; 6];
        pixels[4] = f32::NAN;
        let err = RawImage::new(3, 2, pixels).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("(1, 1)"));

        let err = RawImage::new(2, 1, vec![0.1, f32::INFINITY]).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_u8_round_trip_through_gray8() {
        let raw: Vec<u8> = (0..=255).collect();
        let image = RawImage::from_u8(16, 16, raw.clone()).unwrap();
        assert_eq!(image.to_gray8().into_raw(), raw);
        assert_eq!(image.get(15, 0), 15.0 / 255.0);
    }

    #[test]
    fn test_to_gray8_keeps_extremes() {
        let image = RawImage::from_u8(3, 1, vec![0, 128, 255]).unwrap();
        assert_eq!(image.to_gray8().into_raw(), vec![0, 128, 255]);
    }

    #[test]
    fn test_unnormalized_buffer_is_malformed() {
        // 8-bit values passed as floats
        let pixels = (0..16u32)
            .flat_map(|_| (0..16u32).map(|x| if (x / 4) % 2 == 0 { 76.0 } else { 178.0 }))
            .collect();
        let err = RawImage::new(16, 16, pixels).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("76 at (0, 0)"));

        let err = RawImage::new(2, 2, vec![0.5, 0.5, -0.01, 0.5]).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("(0, 1)"));

        assert!(RawImage::new(2, 1, vec![0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_aspect_ratio() {
        let image = RawImage::new(4, 2, vec![0.0; 8]).unwrap();
        assert_eq!(image.aspect_ratio(), 2.0);
        assert!(image.source_id().is_none());
    }
}
