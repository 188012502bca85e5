//! GPU player for image-sequence movies.
//!
//! Each display tick pulls the next frame from a [`FrameSource`], uploads its
//! pixels, runs a compute pass that writes them into one of a small ring of
//! output textures, and draws that texture on a full-window quad:
//!
//! ```text
//!   FrameSource ──▶ storage buffer ──▶ compute pass ──▶ ring texture
//!                                                          │
//!   surface ◀── present ◀── render pass (6-vertex quad) ◀──┘
//! ```
//!
//! At most [`INFLIGHT_FRAMES`] submissions are outstanding at any time; the
//! slot taken for a submission is returned from the GPU completion callback.
//!
//! [`FrameSource`]: movie::FrameSource

mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;

use movie::BoxedFrameSource;

pub use runtime::FrameScheduler;
pub use types::{
    AdapterProfile, GpuPowerPreference, RendererConfig, VsyncMode, INFLIGHT_FRAMES, TEXTURE_RING,
};

/// Entry point owning the configuration and the frame source it plays.
pub struct Renderer {
    config: RendererConfig,
    source: BoxedFrameSource,
}

impl Renderer {
    pub fn new(config: RendererConfig, source: BoxedFrameSource) -> Self {
        Self { config, source }
    }

    /// Opens the window and plays until it is closed.
    pub fn run(self) -> Result<()> {
        tracing::debug!(
            window_width = self.config.window_size.0,
            window_height = self.config.window_size.1,
            frame_width = self.config.frame_size.0,
            frame_height = self.config.frame_size.1,
            vsync = ?self.config.vsync,
            power = ?self.config.power,
            "launching player window"
        );
        window::run_window(self.config, self.source)
    }
}
