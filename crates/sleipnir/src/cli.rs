use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sleipconfig::{PowerSetting, MIN_FPS};

#[derive(Parser, Debug)]
#[command(
    name = "sleipnir",
    author,
    version,
    about = "Plays a numbered image sequence through a GPU compute pass",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by playback and the `frames` subcommand.
#[derive(Args, Debug, Default)]
pub struct MovieArgs {
    /// Directory holding the numbered frames (defaults to the config value or `.`).
    #[arg(value_name = "FRAMES_DIR")]
    pub frames: Option<PathBuf>,

    /// Configuration file; also read from `SLEIPNIR_CONFIG`.
    #[arg(long, value_name = "FILE", env = "SLEIPNIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Frame file name prefix (`Horse` resolves `Horse01.png`, `Horse02.png`, ...).
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Number of frames in the cycle.
    #[arg(long, value_name = "N", value_parser = parse_count)]
    pub count: Option<usize>,

    /// Size every frame must have (e.g. `360x230`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub frame_size: Option<(u32, u32)>,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub movie: MovieArgs,

    /// Window size in physical pixels (e.g. `512x512`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Playback FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Present without waiting for vertical blank when the surface allows it.
    #[arg(long)]
    pub no_vsync: bool,

    /// GPU adapter preference: `low` or `high`.
    #[arg(long, value_name = "MODE", value_parser = parse_power)]
    pub power: Option<PowerSetting>,

    /// Decode every frame before the window opens.
    #[arg(long)]
    pub preload: bool,

    /// Create the window without showing it.
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the resolved frame files and exit.
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
pub struct FramesArgs {
    #[command(flatten)]
    pub movie: MovieArgs,

    /// Decode every frame and verify its size.
    #[arg(long)]
    pub check: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_power(value: &str) -> Result<PowerSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(PowerSetting::Low),
        "high" | "high-performance" | "discrete" => Ok(PowerSetting::High),
        "" => Err("power preference must not be empty".to_string()),
        other => Err(format!(
            "unknown power preference '{other}'; expected low or high"
        )),
    }
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid FPS '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err("FPS must be a non-negative number".into());
    }
    if fps != 0.0 && fps < MIN_FPS {
        return Err(format!("FPS must be 0 (uncapped) or at least {MIN_FPS}"));
    }
    Ok(fps)
}

pub fn parse_count(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("frame count must be greater than zero".into()),
        Ok(count) => Ok(count),
        Err(_) => Err(format!("invalid frame count '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("360x230").unwrap(), (360, 230));
        assert_eq!(parse_size(" 64 X 32 ").unwrap(), (64, 32));
        assert!(parse_size("360").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn parses_power_preferences() {
        assert_eq!(parse_power("LOW").unwrap(), PowerSetting::Low);
        assert_eq!(parse_power("discrete").unwrap(), PowerSetting::High);
        assert!(parse_power("turbo").is_err());
        assert!(parse_power("").is_err());
    }

    #[test]
    fn rejects_negative_fps_and_zero_count() {
        assert_eq!(parse_fps("0").unwrap(), 0.0);
        assert!(parse_fps("-1").is_err());
        assert!(parse_fps("NaN").is_err());
        assert!(parse_fps("1e-20").is_err());
        assert!(parse_fps("inf").is_err());
        assert_eq!(parse_fps("0.001").unwrap(), MIN_FPS);
        assert!(parse_count("0").is_err());
        assert_eq!(parse_count("12").unwrap(), 12);
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "sleipnir",
            "frames-dir",
            "--prefix",
            "Pony",
            "--count",
            "4",
            "--size",
            "512x512",
            "--fps",
            "24",
            "--no-vsync",
            "--power",
            "low",
            "--hidden",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        let run = cli.run;
        assert_eq!(run.movie.frames, Some(PathBuf::from("frames-dir")));
        assert_eq!(run.movie.prefix.as_deref(), Some("Pony"));
        assert_eq!(run.movie.count, Some(4));
        assert_eq!(run.size, Some((512, 512)));
        assert_eq!(run.fps, Some(24.0));
        assert!(run.no_vsync);
        assert_eq!(run.power, Some(PowerSetting::Low));
        assert!(run.hidden);
        assert!(!run.preload);
    }

    #[test]
    fn tiny_fps_is_rejected_at_the_command_line() {
        let err = Cli::try_parse_from(["sleipnir", "--fps", "1e-20"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn frames_subcommand_takes_its_own_directory() {
        let cli = Cli::try_parse_from(["sleipnir", "frames", "some/dir", "--check"]).unwrap();
        match cli.command {
            Some(Command::Frames(args)) => {
                assert!(args.check);
                assert_eq!(args.movie.frames, Some(PathBuf::from("some/dir")));
            }
            other => panic!("expected frames subcommand, got {other:?}"),
        }
    }
}
