//! Logging setup.
//!
//! A preset picks the base levels for the `joblog::*` targets (`startup`,
//! `api`, `fetch`, `cache`, `parser`) and for the HTTP trace layer. `--log`
//! overrides adjust single targets on top of it. `RUST_LOG`, when set,
//! replaces both.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, requests and fetch outcomes
    #[default]
    Production,
    /// Adds cache activity
    Verbose,
    /// Adds parser diagnostics such as unmatched groups
    Debug,
    Trace,
    /// Warnings and errors only
    Quiet,
}

impl LogPreset {
    /// Pick a preset from the CLI flags. The quietest flag wins, then the
    /// most detailed one.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => Self::Quiet,
            (_, true, ..) => Self::Trace,
            (_, _, true, _) => Self::Debug,
            (_, _, _, true) => Self::Verbose,
            _ => Self::Production,
        }
    }

    fn directives(self) -> &'static str {
        match self {
            Self::Production => "joblog=info,joblog::cache=warn,joblog::parser=warn,tower_http=warn",
            Self::Verbose => "joblog=info,joblog::cache=debug,tower_http=info",
            Self::Debug => "joblog=debug,tower_http=debug",
            Self::Trace => "joblog=trace,tower_http=trace",
            Self::Quiet => "joblog=warn,tower_http=error",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target levels applied after the preset, in CLI order
    pub overrides: Vec<(String, Level)>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Build from the preset and the raw `--log` values. Each value holds
    /// comma-separated `target=level` pairs; malformed pairs are skipped.
    pub fn new(preset: LogPreset, log_overrides: &[String], format: LogFormat) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|value| value.split(','))
            .filter_map(parse_override)
            .collect();

        Self {
            preset,
            overrides,
            format,
        }
    }

    /// The filter for this configuration, unless `RUST_LOG` supplies one.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let mut directives = self.preset.directives().to_string();
        for (target, level) in &self.overrides {
            directives.push_str(&format!(",{target}={level}"));
        }
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// `parser=debug` becomes `joblog::parser` at DEBUG.
fn parse_override(pair: &str) -> Option<(String, Level)> {
    let (target, level) = pair.split_once('=')?;
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    let level = level.trim().parse::<Level>().ok()?;

    let target = if target.starts_with("joblog") {
        target.to_string()
    } else {
        format!("joblog::{target}")
    };
    Some((target, level))
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let registry = tracing_subscriber::registry().with(config.build_filter());
    match config.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}
