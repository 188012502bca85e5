//! GPU side of the player.
//!
//! - `context` owns the wgpu instance, surface, device and queue, and rebuilds
//!   the swapchain when the window resizes.
//! - `compute` uploads frame pixels and runs the pass-through kernel into one
//!   of the ring's output textures.
//! - `quad` draws the current output texture over the whole surface.
//! - `ring` rotates the output textures so a compute write never races a draw.
//! - `inflight` bounds how many submissions may be outstanding.
//! - `tick` decides, without touching the GPU, whether a tick draws a frame.
//! - `state` glues everything together behind the per-tick `render_frame` call.

mod compute;
mod context;
mod inflight;
mod quad;
mod ring;
mod shaders;
mod state;
mod tick;

pub(crate) use state::{GpuState, TickOutcome};
