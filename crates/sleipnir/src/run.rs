use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use movie::{decode_frame, FrameSource, ImageSequence};
use renderer::{GpuPowerPreference, Renderer, RendererConfig, VsyncMode};
use sleipconfig::{PowerSetting, SleipnirConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{FramesArgs, MovieArgs, RunArgs};
use crate::paths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.movie.config.as_deref())?;
    apply_run_overrides(&mut config, &args);
    config
        .validate()
        .context("invalid settings after applying command-line overrides")?;

    let directory = frames_directory(&config);
    let mut sequence = open_sequence(&config, &directory)?;
    if config.movie.preload {
        sequence
            .preload()
            .with_context(|| format!("failed to preload frames from {}", directory.display()))?;
        tracing::info!(frames = sequence.len(), "preloaded all frames");
    }

    let renderer_config = renderer_config(&config);
    Renderer::new(renderer_config, Box::new(sequence)).run()
}

pub fn list_frames(args: FramesArgs) -> Result<()> {
    let mut config = load_config(args.movie.config.as_deref())?;
    apply_movie_overrides(&mut config, &args.movie);
    config.validate().context("invalid frame settings")?;

    let directory = frames_directory(&config);
    let sequence = open_sequence(&config, &directory)?;
    let (width, height) = (config.render.frame_width, config.render.frame_height);

    println!("Frames in {}:", directory.display());
    let mut failures = 0usize;
    for (index, path) in sequence.paths().iter().enumerate() {
        if !args.check {
            println!("  {:>3}  {}", index + 1, path.display());
            continue;
        }
        let outcome = decode_frame(index, path)
            .and_then(|frame| frame.ensure_size(width, height).map(|()| frame));
        match outcome {
            Ok(frame) => println!(
                "  {:>3}  {}  ok {}x{}",
                index + 1,
                path.display(),
                frame.width,
                frame.height
            ),
            Err(err) => {
                failures += 1;
                println!("  {:>3}  {}  FAILED: {err}", index + 1, path.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} frames failed to check", sequence.len());
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<SleipnirConfig> {
    match paths::locate_config(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            SleipnirConfig::load(&path)
                .with_context(|| format!("failed to load configuration {}", path.display()))
        }
        None => Ok(SleipnirConfig::default()),
    }
}

fn apply_movie_overrides(config: &mut SleipnirConfig, args: &MovieArgs) {
    if let Some(frames) = &args.frames {
        config.movie.frames = Some(frames.clone());
    }
    if let Some(prefix) = &args.prefix {
        config.movie.prefix = prefix.clone();
    }
    if let Some(count) = args.count {
        config.movie.count = count;
    }
    if let Some((width, height)) = args.frame_size {
        config.render.frame_width = width;
        config.render.frame_height = height;
    }
}

fn apply_run_overrides(config: &mut SleipnirConfig, args: &RunArgs) {
    apply_movie_overrides(config, &args.movie);
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(fps) = args.fps {
        // A command-line rate replaces whichever pacing the file chose.
        config.render.fps = Some(fps);
        config.render.frame_interval = None;
    }
    if args.no_vsync {
        config.render.vsync = false;
    }
    if let Some(power) = args.power {
        config.render.power = power;
    }
    if args.preload {
        config.movie.preload = true;
    }
    if args.hidden {
        config.window.visible = false;
    }
}

fn frames_directory(config: &SleipnirConfig) -> PathBuf {
    config
        .movie
        .frames
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
}

fn open_sequence(config: &SleipnirConfig, directory: &Path) -> Result<ImageSequence> {
    ImageSequence::open(directory, &config.movie.prefix, config.movie.count)
        .with_context(|| format!("failed to open frame sequence in {}", directory.display()))
}

fn renderer_config(config: &SleipnirConfig) -> RendererConfig {
    RendererConfig {
        window_size: (config.window.width, config.window.height),
        title: config.window.title.clone(),
        frame_size: (config.render.frame_width, config.render.frame_height),
        frame_interval: config.frame_interval(),
        vsync: if config.render.vsync {
            VsyncMode::On
        } else {
            VsyncMode::Off
        },
        power: match config.render.power {
            PowerSetting::Low => GpuPowerPreference::Low,
            PowerSetting::High => GpuPowerPreference::High,
        },
        show_window: config.window.visible,
    }
}
