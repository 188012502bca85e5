use std::time::Duration;

/// Maximum number of command submissions allowed to be outstanding at once.
pub const INFLIGHT_FRAMES: usize = 3;

/// Number of output textures the compute pass rotates through.
pub const TEXTURE_RING: usize = 3;

/// Presentation pacing for the preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VsyncMode {
    /// Wait for vertical blank (FIFO).
    #[default]
    On,
    /// Prefer immediate or mailbox presentation when the surface offers it.
    Off,
}

/// Adapter selection hint forwarded to wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    Low,
    #[default]
    High,
}

/// Summary of the adapter wgpu picked, kept for logging and heuristics.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_2d: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || self.name.to_ascii_lowercase().contains("llvmpipe")
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Preview window size in physical pixels.
    pub window_size: (u32, u32),
    pub title: String,
    /// Fixed size of every movie frame and of the output textures.
    pub frame_size: (u32, u32),
    /// Minimum time between frames; `None` renders on every redraw.
    pub frame_interval: Option<Duration>,
    pub vsync: VsyncMode,
    pub power: GpuPowerPreference,
    pub show_window: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            window_size: (256, 256),
            title: "Sleipnir".to_string(),
            frame_size: (360, 230),
            frame_interval: None,
            vsync: VsyncMode::default(),
            power: GpuPowerPreference::default(),
            show_window: true,
        }
    }
}
