use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::MovieError;

/// Frames are always tightly packed RGBA8.
pub const BYTES_PER_PIXEL: usize = 4;

/// One decoded frame of the movie.
#[derive(PartialEq, Eq)]
pub struct Frame {
    /// Zero-based position of the frame inside its sequence.
    pub identifier: usize,
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels with a top-left origin.
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(identifier: usize, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL,
            "pixel buffer does not match frame dimensions"
        );
        Self {
            identifier,
            width,
            height,
            pixels,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Checks the frame against the fixed output texture size.
    pub fn ensure_size(&self, width: u32, height: u32) -> Result<(), MovieError> {
        if self.width == width && self.height == height {
            return Ok(());
        }
        Err(MovieError::SizeMismatch {
            identifier: self.identifier,
            width: self.width,
            height: self.height,
            expected_width: width,
            expected_height: height,
        })
    }
}

// Pixel buffers are large; keep Debug output readable in logs.
impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("identifier", &self.identifier)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Flattens a decoded image into RGBA8 bytes, returning `(pixels, width, height)`.
pub fn pixel_values(image: &DynamicImage) -> (Vec<u8>, u32, u32) {
    let (width, height) = image.dimensions();
    let rgba = image.to_rgba8();
    (rgba.into_raw(), width, height)
}

/// Reads and decodes the image at `path` into a [`Frame`].
pub fn decode_frame(identifier: usize, path: &Path) -> Result<Frame, MovieError> {
    let bytes = std::fs::read(path).map_err(|source| MovieError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| MovieError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let (pixels, width, height) = pixel_values(&image);
    tracing::trace!(
        identifier,
        width,
        height,
        path = %path.display(),
        "decoded frame"
    );
    Ok(Frame::new(identifier, width, height, pixels))
}
