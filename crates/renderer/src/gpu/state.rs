use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;

use movie::FrameSource;

use crate::types::{AdapterProfile, RendererConfig, INFLIGHT_FRAMES, TEXTURE_RING};

use super::compute::{ComputeStage, FrameSlot};
use super::context::GpuContext;
use super::inflight::InflightGate;
use super::quad::QuadStage;
use super::ring::Ring;
use super::tick::{prepare_tick, TickPlan};

/// What happened on one display tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// A frame was computed, drawn, and presented.
    Presented { frame: usize },
    /// The source had no usable frame; nothing was submitted.
    Skipped,
    /// Every in-flight slot stayed busy; nothing was submitted.
    Throttled,
}

/// Owns every GPU object and encodes the per-tick work.
pub(crate) struct GpuState {
    context: GpuContext,
    compute: ComputeStage,
    quad: QuadStage,
    slots: Ring<FrameSlot>,
    gate: InflightGate,
    frame_size: (u32, u32),
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(
            target,
            initial_size,
            config.frame_size,
            config.power,
            config.vsync,
        )?;

        let quad = QuadStage::new(&context.device, context.surface_format);
        let compute = ComputeStage::new(&context.device, config.frame_size);
        let slots = Ring::new((0..TEXTURE_RING).map(|index| {
            compute.create_slot(&context.device, &quad.sample_layout, &quad.sampler, index)
        }));

        let gate = InflightGate::new(INFLIGHT_FRAMES);

        debug!(
            frame_width = config.frame_size.0,
            frame_height = config.frame_size.1,
            textures = slots.len(),
            inflight = gate.depth(),
            "GPU resources ready"
        );

        Ok(Self {
            context,
            compute,
            quad,
            slots,
            gate,
            frame_size: config.frame_size,
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Blocks until the GPU retires submitted work, firing completion callbacks.
    fn wait_for_gpu(&self) {
        if let Err(err) = self.context.device.poll(wgpu::PollType::Wait) {
            warn!(error = %err, "device poll failed while waiting for in-flight frames");
        }
    }

    /// Uploads the next frame, runs the compute pass, and draws the quad.
    pub(crate) fn render_frame(
        &mut self,
        source: &mut dyn FrameSource,
    ) -> Result<TickOutcome, wgpu::SurfaceError> {
        let (permit, frame) =
            match prepare_tick(&self.gate, source, self.frame_size, || self.wait_for_gpu()) {
                TickPlan::Ready { permit, frame } => (permit, frame),
                TickPlan::Skipped => return Ok(TickOutcome::Skipped),
                TickPlan::Throttled => return Ok(TickOutcome::Throttled),
            };

        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.compute.upload(&self.context.queue, &frame.pixels);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        self.compute.encode(&mut encoder, self.slots.front());
        let current = self.slots.advance();
        self.quad.encode(&mut encoder, &view, current);

        self.context.queue.submit(Some(encoder.finish()));
        self.context
            .queue
            .on_submitted_work_done(move || permit.release());
        output.present();

        tracing::trace!(
            frame = frame.identifier,
            texture = current.index,
            in_flight = self.gate.in_flight(),
            "presented frame"
        );
        Ok(TickOutcome::Presented {
            frame: frame.identifier,
        })
    }
}
