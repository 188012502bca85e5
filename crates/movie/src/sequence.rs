use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::frame::{decode_frame, Frame};
use crate::{FrameSource, MovieError};

/// Extensions probed, in order, when resolving a frame name to a file.
pub const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Builds the 1-based, zero-padded frame stems (`Horse01`, `Horse02`, ...).
pub fn frame_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|index| format!("{prefix}{index:02}")).collect()
}

/// Finds `<dir>/<stem>.<ext>` for the first extension that exists.
pub fn resolve_frame_path(directory: &Path, stem: &str) -> Option<PathBuf> {
    FRAME_EXTENSIONS
        .iter()
        .map(|ext| directory.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// File-backed frame source cycling through a numbered image sequence.
///
/// Paths are resolved when the sequence is opened; pixels are decoded the
/// first time a frame is requested and kept for later cycles.
#[derive(Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    cache: Vec<Option<Arc<Frame>>>,
    cursor: usize,
}

impl ImageSequence {
    pub fn open(directory: &Path, prefix: &str, count: usize) -> Result<Self, MovieError> {
        if count == 0 {
            return Err(MovieError::Empty);
        }

        let names = frame_names(prefix, count);
        debug!(dir = %directory.display(), ?names, "resolving frame sequence");

        let mut paths = Vec::with_capacity(names.len());
        for name in names {
            let path = resolve_frame_path(directory, &name).ok_or_else(|| {
                MovieError::MissingFrame {
                    name: name.clone(),
                    dir: directory.to_path_buf(),
                }
            })?;
            paths.push(path);
        }

        Ok(Self {
            cache: vec![None; paths.len()],
            paths,
            cursor: 0,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Index of the frame the next call to `next_frame` returns.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Decodes every frame up front, failing on the first bad file.
    pub fn preload(&mut self) -> Result<(), MovieError> {
        for index in 0..self.paths.len() {
            self.load(index)?;
        }
        debug!(frames = self.paths.len(), "preloaded frame sequence");
        Ok(())
    }

    fn load(&mut self, index: usize) -> Result<Arc<Frame>, MovieError> {
        if let Some(frame) = &self.cache[index] {
            return Ok(Arc::clone(frame));
        }
        let frame = Arc::new(decode_frame(index, &self.paths[index])?);
        self.cache[index] = Some(Arc::clone(&frame));
        Ok(frame)
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.paths.len();
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Arc<Frame>, MovieError> {
        let index = self.cursor;
        let result = self.load(index);
        self.advance();
        if result.is_err() {
            warn!(
                frame = index,
                path = %self.paths[index].display(),
                "skipping undecodable frame"
            );
        }
        result
    }

    fn len(&self) -> usize {
        self.paths.len()
    }
}
