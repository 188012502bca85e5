use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFIX: &str = "Horse";
pub const DEFAULT_FRAME_COUNT: usize = 12;
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (256, 256);
pub const DEFAULT_FRAME_SIZE: (u32, u32) = (360, 230);
pub const DEFAULT_TITLE: &str = "Sleipnir";
/// Slowest non-zero playback rate accepted; one frame every ~17 minutes.
pub const MIN_FPS: f32 = 1e-3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SleipnirConfig {
    #[serde(default)]
    pub movie: MovieSection,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MovieSection {
    /// Directory holding the numbered frame images.
    pub frames: Option<PathBuf>,
    pub prefix: String,
    pub count: usize,
    pub preload: bool,
}

impl Default for MovieSection {
    fn default() -> Self {
        Self {
            frames: None,
            prefix: DEFAULT_PREFIX.to_string(),
            count: DEFAULT_FRAME_COUNT,
            preload: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub visible: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_SIZE.0,
            height: DEFAULT_WINDOW_SIZE.1,
            title: DEFAULT_TITLE.to_string(),
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSection {
    pub frame_width: u32,
    pub frame_height: u32,
    pub fps: Option<f32>,
    #[serde(
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_interval: Option<Duration>,
    pub vsync: bool,
    pub power: PowerSetting,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_SIZE.0,
            frame_height: DEFAULT_FRAME_SIZE.1,
            fps: None,
            frame_interval: None,
            vsync: true,
            power: PowerSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    #[default]
    High,
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v / 1000.0)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl SleipnirConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SleipnirConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Minimum time between frames, or `None` to render every redraw.
    pub fn frame_interval(&self) -> Option<Duration> {
        if let Some(interval) = self.render.frame_interval {
            return (!interval.is_zero()).then_some(interval);
        }
        match self.render.fps {
            Some(fps) if fps > 0.0 => Duration::try_from_secs_f64(1.0 / f64::from(fps))
                .ok()
                .filter(|interval| !interval.is_zero()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.movie.prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("movie.prefix must not be empty".into()));
        }
        if self.movie.count == 0 {
            return Err(ConfigError::Invalid(
                "movie.count must be greater than zero".into(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        if self.render.frame_width == 0 || self.render.frame_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame size {}x{} must be non-zero",
                self.render.frame_width, self.render.frame_height
            )));
        }
        if let Some(fps) = self.render.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "render.fps must be a non-negative number (got {fps})"
                )));
            }
            if fps != 0.0 && fps < MIN_FPS {
                return Err(ConfigError::Invalid(format!(
                    "render.fps must be 0 or at least {MIN_FPS} (got {fps})"
                )));
            }
            if self.render.frame_interval.is_some() {
                return Err(ConfigError::Invalid(
                    "render.fps and render.frame_interval are mutually exclusive".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[movie]
frames = "assets/horse"
prefix = "Horse"
count = 12
preload = true

[window]
width = 512
height = 320
title = "Gallop"

[render]
frame_width = 360
frame_height = 230
fps = 30
vsync = false
power = "low"
"#;

    #[test]
    fn parses_sample_config() {
        let config = SleipnirConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.movie.frames, Some(PathBuf::from("assets/horse")));
        assert!(config.movie.preload);
        assert_eq!((config.window.width, config.window.height), (512, 320));
        assert_eq!(config.window.title, "Gallop");
        assert!(!config.render.vsync);
        assert_eq!(config.render.power, PowerSetting::Low);
        let interval = config.frame_interval().unwrap();
        assert!((interval.as_secs_f32() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = SleipnirConfig::from_toml_str("").unwrap();
        assert_eq!(config.movie.prefix, DEFAULT_PREFIX);
        assert_eq!(config.movie.count, DEFAULT_FRAME_COUNT);
        assert_eq!(
            (config.render.frame_width, config.render.frame_height),
            DEFAULT_FRAME_SIZE
        );
        assert!(config.render.vsync);
        assert_eq!(config.frame_interval(), None);
    }

    #[test]
    fn parses_human_readable_interval() {
        let config = SleipnirConfig::from_toml_str(
            r#"
[render]
frame_interval = "40ms"
"#,
        )
        .unwrap();
        assert_eq!(config.frame_interval(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn numeric_interval_is_milliseconds() {
        let config = SleipnirConfig::from_toml_str(
            r#"
[render]
frame_interval = 25
"#,
        )
        .unwrap();
        assert_eq!(config.frame_interval(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let config = SleipnirConfig::from_toml_str("[render]\nfps = 0\n").unwrap();
        assert_eq!(config.frame_interval(), None);
    }

    #[test]
    fn whole_fps_gives_exact_interval() {
        let config = SleipnirConfig::from_toml_str("[render]\nfps = 20\n").unwrap();
        assert_eq!(config.frame_interval(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn rejects_vanishingly_small_fps() {
        let err = SleipnirConfig::from_toml_str("[render]\nfps = 1e-20\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SleipnirConfig::from_toml_str("[render]\nfps = inf\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unvalidated_tiny_fps_does_not_panic() {
        let mut config = SleipnirConfig::default();
        config.render.fps = Some(1e-20);
        assert!(config.validate().is_err());
        assert_eq!(config.frame_interval(), None);

        config.render.fps = Some(MIN_FPS);
        assert!(config.validate().is_ok());
        assert!(config.frame_interval().is_some());
    }

    #[test]
    fn rejects_fps_with_interval() {
        let err = SleipnirConfig::from_toml_str(
            r#"
[render]
fps = 60
frame_interval = "16ms"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_frame_count() {
        let err = SleipnirConfig::from_toml_str("[movie]\ncount = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_frame_size() {
        let err = SleipnirConfig::from_toml_str("[render]\nframe_width = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_power_setting() {
        let err = SleipnirConfig::from_toml_str("[render]\npower = \"turbo\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SleipnirConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
