use std::sync::Arc;

use tracing::warn;

use movie::{Frame, FrameSource};

use super::inflight::{InflightGate, InflightPermit};

/// Result of the CPU half of a tick, decided before any GPU work is encoded.
pub(crate) enum TickPlan {
    /// A slot is held and the frame matches the output textures.
    Ready {
        permit: InflightPermit,
        frame: Arc<Frame>,
    },
    /// The source had no usable frame; the slot was given back.
    Skipped,
    /// No slot freed up; the source was not consulted.
    Throttled,
}

/// Takes an in-flight slot, then pulls and size-checks the next frame.
///
/// `wait` runs at most once, only when every slot is taken. The slot is
/// released again whenever the tick ends up skipped.
pub(crate) fn prepare_tick<F>(
    gate: &InflightGate,
    source: &mut dyn FrameSource,
    frame_size: (u32, u32),
    wait: F,
) -> TickPlan
where
    F: FnOnce(),
{
    let Some(permit) = gate.acquire_with(wait) else {
        return TickPlan::Throttled;
    };

    let frame = match source.next_frame() {
        Ok(frame) => frame,
        Err(err) => {
            warn!(error = %err, "no frame available this tick");
            permit.release();
            return TickPlan::Skipped;
        }
    };
    if let Err(err) = frame.ensure_size(frame_size.0, frame_size.1) {
        warn!(error = %err, "dropping frame with unexpected dimensions");
        permit.release();
        return TickPlan::Skipped;
    }

    TickPlan::Ready { permit, frame }
}
