//! Command-line interface for gridwin.
//!
//! Flags here override the matching config file fields for a single run.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gridwin_config::Config;
use log::LevelFilter;

/// gridwin - a grid-addressed display window driven by JSON lines on stdin
#[derive(Parser, Debug)]
#[command(name = "gridwin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/gridwin/config.yaml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (overrides RUST_LOG and the config file)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<CliLogLevel>,

    /// Cell width in pixels
    #[arg(long, value_name = "PX")]
    pub cell_width: Option<u32>,

    /// Cell height in pixels
    #[arg(long, value_name = "PX")]
    pub cell_height: Option<u32>,

    /// Glyph size in pixels
    #[arg(long, value_name = "PX")]
    pub font_size: Option<f32>,

    /// Maximum number of pending draw commands
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Target time between frames
    #[arg(long, value_name = "MS")]
    pub frame_interval_ms: Option<u64>,

    /// Run without a window on a virtual surface of the given size
    #[arg(long, value_name = "WxH", value_parser = parse_surface_size)]
    pub headless: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            CliLogLevel::Off => LevelFilter::Off,
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<LevelFilter>,
    pub cell_width: Option<u32>,
    pub cell_height: Option<u32>,
    pub font_size: Option<f32>,
    pub queue_capacity: Option<usize>,
    pub frame_interval_ms: Option<u64>,
    /// Virtual surface size; `None` opens a window
    pub headless: Option<(u32, u32)>,
}

impl From<Cli> for RuntimeOptions {
    fn from(cli: Cli) -> Self {
        Self {
            config_path: cli.config,
            log_level: cli.log_level.map(CliLogLevel::to_level_filter),
            cell_width: cli.cell_width,
            cell_height: cli.cell_height,
            font_size: cli.font_size,
            queue_capacity: cli.queue_capacity,
            frame_interval_ms: cli.frame_interval_ms,
            headless: cli.headless,
        }
    }
}

impl RuntimeOptions {
    /// Overwrite config fields with the values given on the command line.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(width) = self.cell_width {
            config.cell_width = width;
        }
        if let Some(height) = self.cell_height {
            config.cell_height = height;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if let Some(interval) = self.frame_interval_ms {
            config.frame_interval_ms = interval;
        }
    }
}

/// Parse the process arguments. `--help` and `--version` exit inside clap.
pub fn process_cli() -> RuntimeOptions {
    RuntimeOptions::from(Cli::parse())
}

/// Parse `WIDTHxHEIGHT`, e.g. `640x480`.
fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width {width:?}: {e}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height {height:?}: {e}"))?;
    if width == 0 || height == 0 {
        return Err("surface size must be non-zero".to_string());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_surface_size() {
        assert_eq!(parse_surface_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_surface_size("10X20"), Ok((10, 20)));
        assert!(parse_surface_size("640").is_err());
        assert!(parse_surface_size("0x480").is_err());
        assert!(parse_surface_size("ax480").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "gridwin",
            "--cell-width",
            "8",
            "--queue-capacity",
            "4",
            "--headless",
            "80x48",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let options = RuntimeOptions::from(cli);
        assert_eq!(options.headless, Some((80, 48)));
        assert_eq!(options.log_level, Some(LevelFilter::Debug));

        let mut config = Config::default();
        options.apply_to(&mut config);
        assert_eq!(config.cell_width, 8);
        assert_eq!(config.cell_height, Config::default().cell_height);
        assert_eq!(config.queue_capacity, 4);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
