//! Application module for gridwin
//!
//! This module contains the startup and run logic:
//! - `App`: loads configuration, fonts and the command pipeline, then runs
//!   either the windowed event loop or the headless frame loop
//! - `WindowApp`: the winit `ApplicationHandler` driving the windowed mode

use std::io::{self, BufReader};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Context, Result};
use gridwin_config::Config;
use gridwin_fonts::{FontManager, GlyphRasterizer, RasterizerOptions, SwashRasterizer};
use gridwin_render::{CellMetrics, Compositor};
use tokio::runtime::Runtime;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::cli::RuntimeOptions;
use crate::debug;
use crate::display::HeadlessDisplay;
use crate::events::EventEmitter;
use crate::queue;
use crate::reader;
use crate::scheduler::FrameScheduler;

pub mod handler;

pub use handler::WindowApp;

/// Main application entry point
pub struct App {
    config: Config,
    runtime: Arc<Runtime>,
    runtime_options: RuntimeOptions,
}

impl App {
    /// Load the configuration and apply command-line overrides.
    pub fn new(runtime: Arc<Runtime>, runtime_options: RuntimeOptions) -> Result<Self> {
        let mut config = match &runtime_options.config_path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load().context("Failed to load config")?,
        };
        runtime_options.apply_to(&mut config);
        config.validate().context("Invalid configuration")?;
        debug::apply_config_level(config.log_level.to_level_filter());

        log::info!(
            "Cell {}x{}px, font {}px, queue capacity {}, frame interval {}ms",
            config.cell_width,
            config.cell_height,
            config.font_size,
            config.queue_capacity,
            config.frame_interval_ms
        );

        Ok(Self {
            config,
            runtime,
            runtime_options,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until the controller closes the stream, sends `close`, or the
    /// window is closed.
    pub fn run(self, emitter: Arc<EventEmitter>) -> Result<()> {
        let rasterizer = load_rasterizer(&self.config)?;
        let compositor = Compositor::new(rasterizer);

        let (sender, command_queue) = queue::bounded(self.config.queue_capacity);
        let shutdown = Arc::new(AtomicBool::new(false));
        let metrics = CellMetrics::new(self.config.cell_width, self.config.cell_height);
        let interval = Duration::from_millis(self.config.frame_interval_ms);

        // The reader holds the only sender; it is dropped with the thread.
        reader::spawn_reader(
            BufReader::new(io::stdin()),
            sender,
            Arc::clone(&emitter),
            Arc::clone(&shutdown),
        )
        .context("Failed to start input reader")?;

        match self.runtime_options.headless {
            Some(surface) => {
                log::info!("Running headless on a {}x{} surface", surface.0, surface.1);
                let mut scheduler = FrameScheduler::new(
                    metrics,
                    surface,
                    compositor,
                    command_queue,
                    emitter,
                    shutdown,
                    interval,
                );
                scheduler.announce_size();
                let mut display = HeadlessDisplay::new(self.config.window_title.clone());
                scheduler.run_blocking(&mut display);
                Ok(())
            }
            None => {
                // The surface size is unknown until the window exists; the
                // first resize sizes the grid.
                let scheduler = FrameScheduler::new(
                    metrics,
                    (0, 0),
                    compositor,
                    command_queue,
                    Arc::clone(&emitter),
                    shutdown,
                    interval,
                );

                let event_loop = EventLoop::new().context("Failed to create event loop")?;
                // Use Wait for power-efficient event handling
                // Combined with WaitUntil in about_to_wait for frame pacing
                event_loop.set_control_flow(ControlFlow::Wait);

                let mut app = WindowApp::new(self.config, self.runtime, scheduler, emitter);
                event_loop.run_app(&mut app)?;
                app.into_result()
            }
        }
    }
}

/// Load the configured faces and wrap them in the glyph rasterizer.
fn load_rasterizer(config: &Config) -> Result<Arc<dyn GlyphRasterizer>> {
    let fonts = FontManager::new(
        config.font_family.as_deref(),
        config.font_family_bold.as_deref(),
    )
    .context("Failed to load fonts")?;

    let options = RasterizerOptions {
        size_px: config.font_size,
        cache_entries: config.glyph_cache_entries,
        antialias: config.font_antialias,
        hinting: config.font_hinting,
    };
    Ok(Arc::new(SwashRasterizer::new(Arc::new(fonts), options)))
}
