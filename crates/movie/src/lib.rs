//! Frame sources for the Sleipnir preview.
//!
//! A [`FrameSource`] hands the renderer one decoded [`Frame`] per display
//! tick, cycling through a fixed list forever. [`ImageSequence`] is the
//! file-backed source used by the binary: it resolves `Horse01..Horse12`
//! style file names inside a directory and decodes them lazily.

mod frame;
mod sequence;

pub use frame::{decode_frame, pixel_values, Frame, BYTES_PER_PIXEL};
pub use sequence::{frame_names, resolve_frame_path, ImageSequence, FRAME_EXTENSIONS};

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("frame sequence is empty")]
    Empty,

    #[error("frame '{name}' not found in {}", dir.display())]
    MissingFrame { name: String, dir: PathBuf },

    #[error("failed to read frame at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode frame at {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("frame {identifier} is {width}x{height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        identifier: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

/// Produces the next image to display, in a fixed cyclic order.
pub trait FrameSource: Send {
    /// Returns the frame under the cursor and advances to the next one.
    ///
    /// Frames are shared so sources can cache them without copying pixels.
    fn next_frame(&mut self) -> Result<Arc<Frame>, MovieError>;

    /// Number of distinct frames in the cycle.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Boxed frame source handed across crate boundaries.
pub type BoxedFrameSource = Box<dyn FrameSource>;
