//! Logging bridge.
//!
//! Routes every `log::info!()` / `log::debug!()` etc. to a file in the temp
//! directory (`gridwin_debug.log`). stdout carries the event protocol and
//! must never see log output; when `RUST_LOG` is set, records are also
//! mirrored to stderr.
//!
//! Level precedence: `--log-level` > `RUST_LOG` > config `log_level` > info.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

struct LogBridge {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Set when the CLI or `RUST_LOG` picked the level, so the config can't override it.
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("gridwin_debug.log")
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );

        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Parse a `RUST_LOG` value. Only the level is honoured; for `target=level`
/// directives the last level wins.
fn parse_rust_log(value: &str) -> Option<LevelFilter> {
    value
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next()?;
            level.trim().parse::<LevelFilter>().ok()
        })
        .last()
}

/// Install the bridge as the process logger.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let env_level = rust_log.as_deref().and_then(parse_rust_log);
    let pinned = cli_level.or(env_level);
    let level = pinned.unwrap_or(LevelFilter::Info);

    let path = log_path();
    // Failing to open the file just leaves file logging off.
    let file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(&path)
        .ok();

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        file: Mutex::new(file),
        mirror_stderr: rust_log.is_some(),
    });

    if log::set_logger(bridge).is_ok() {
        log::set_max_level(level);
        LEVEL_PINNED.store(pinned.is_some(), Ordering::Relaxed);
        log::info!(
            "gridwin {} debug session started (level={}, log={})",
            crate::VERSION,
            level,
            path.display()
        );
    }
}

/// Apply the level from the config file unless the CLI or `RUST_LOG` chose one.
pub fn apply_config_level(level: LevelFilter) {
    if !LEVEL_PINNED.load(Ordering::Relaxed) {
        log::set_max_level(level);
        log::debug!("Log level set from config: {}", level);
    }
}
