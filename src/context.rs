//! Runtime configuration and logger setup.
//!
//! The viewer has only a handful of knobs. They default to what the horror
//! viewer shipped with and can be overridden from the environment:
//!
//! - `NECRO_ASSET_ROOT`: directory (native) or origin-relative prefix (web) for model files
//! - `NECRO_PERFORMANCE_MODE`: `high`, `medium` or `low`
//! - `NECRO_CROSSFADE_SECS`: animation crossfade duration in seconds
//! - `NECRO_LOG`: log level filter (`error`, `warn`, `info`, `debug`, `trace`, `off`)

use std::{path::PathBuf, str::FromStr};

pub const ASSET_ROOT_VAR: &str = "NECRO_ASSET_ROOT";
pub const PERFORMANCE_MODE_VAR: &str = "NECRO_PERFORMANCE_MODE";
pub const CROSSFADE_VAR: &str = "NECRO_CROSSFADE_SECS";
pub const LOG_VAR: &str = "NECRO_LOG";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PerformanceMode {
    #[default]
    High,
    Medium,
    Low,
}

impl PerformanceMode {
    /// Soft shadow maps are only worth it on the high setting.
    pub fn shadows_enabled(&self) -> bool {
        matches!(self, PerformanceMode::High)
    }
}

impl FromStr for PerformanceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(anyhow::anyhow!("unknown performance mode {other:?}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub asset_root: PathBuf,
    pub performance_mode: PerformanceMode,
    pub crossfade_secs: f32,
    pub log_level: log::LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            performance_mode: PerformanceMode::default(),
            crossfade_secs: 0.3,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl Config {
    /// Defaults overlaid with whatever the process environment provides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(ASSET_ROOT_VAR) {
            config.asset_root = PathBuf::from(root);
        }
        if let Some(mode) = lookup(PERFORMANCE_MODE_VAR) {
            match mode.parse() {
                Ok(mode) => config.performance_mode = mode,
                Err(e) => log::warn!("Ignoring {PERFORMANCE_MODE_VAR}: {e}"),
            }
        }
        if let Some(secs) = lookup(CROSSFADE_VAR) {
            match secs.trim().parse::<f32>() {
                Ok(secs) if secs >= 0.0 && secs.is_finite() => config.crossfade_secs = secs,
                _ => log::warn!("Ignoring {CROSSFADE_VAR}: {secs:?} is not a non-negative number"),
            }
        }
        if let Some(level) = lookup(LOG_VAR) {
            match level.trim().parse() {
                Ok(level) => config.log_level = level,
                Err(_) => log::warn!("Ignoring {LOG_VAR}: unknown level {level:?}"),
            }
        }
        config
    }
}

/// Installs the platform logger. Safe to call more than once.
pub fn init_logging(level: log::LevelFilter) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .try_init()
        {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }
    #[cfg(target_arch = "wasm32")]
    {
        let level = level.to_level().unwrap_or(log::Level::Error);
        if let Err(e) = console_log::init_with_level(level) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }
}
