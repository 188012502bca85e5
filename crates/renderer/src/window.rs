use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use movie::BoxedFrameSource;

use crate::gpu::{GpuState, TickOutcome};
use crate::runtime::{FrameScheduler, FrameStats};
use crate::types::{AdapterProfile, RendererConfig};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Window plus the GPU resources drawing into it.
pub(crate) struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, config)?;
        Ok(Self { window, gpu })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        self.gpu.adapter_profile()
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }
}

/// Drives the event loop until the window closes.
pub(crate) fn run_window(config: RendererConfig, mut source: BoxedFrameSource) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.window_size.0, config.window_size.1);
    let mut builder = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size);
    if !config.show_window {
        builder = builder.with_visible(false);
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create player window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err:#}"))?;

    let profile = state.adapter_profile().clone();
    let mut interval = config.frame_interval;
    if interval.is_none() && profile.is_software() {
        interval = Some(std::time::Duration::from_secs_f32(1.0 / SOFTWARE_FPS_CAP));
        warn!(
            adapter = %profile.name,
            backend = ?profile.backend,
            cap = SOFTWARE_FPS_CAP,
            "software rasterizer detected; capping playback to {} FPS (override with --fps)",
            SOFTWARE_FPS_CAP
        );
    }
    let mut scheduler = FrameScheduler::new(interval);
    let mut stats = FrameStats::new(Instant::now());

    info!(
        frames = source.len(),
        adapter = %profile.name,
        interval_ms = scheduler.interval().map(|value| value.as_millis() as u64),
        "starting playback"
    );
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed
                            && matches!(event.logical_key, Key::Named(NamedKey::Escape))
                        {
                            elwt.exit();
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let _ = inner_size_writer.request_inner_size(state.size());
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        match state.gpu.render_frame(source.as_mut()) {
                            Ok(TickOutcome::Presented { .. }) => {
                                scheduler.mark_rendered(now);
                                stats.record_presented();
                            }
                            Ok(TickOutcome::Skipped) => {
                                scheduler.mark_rendered(now);
                                stats.record_skipped();
                            }
                            Ok(TickOutcome::Throttled) => stats.record_throttled(),
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.gpu.reconfigure();
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("surface out of memory; exiting playback");
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                warn!("surface timeout; retrying next frame");
                            }
                            Err(other) => {
                                warn!("surface error: {other:?}; retrying next frame");
                            }
                        }
                        if let Some(report) = stats.take_report(now) {
                            debug!(
                                presented = report.presented,
                                skipped = report.skipped,
                                throttled = report.throttled,
                                elapsed_ms = report.elapsed.as_millis() as u64,
                                "playback stats"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if scheduler.ready_for_frame(now) {
                    tracing::trace!("scheduler: issuing redraw now");
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    let ms = deadline.saturating_duration_since(now).as_millis();
                    tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}
