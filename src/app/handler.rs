//! winit event handling for the windowed mode.
//!
//! Window events are translated into outbound events as they arrive. The
//! frame loop runs from `about_to_wait` whenever the pacer says a tick is due,
//! so redraw requests need no handling of their own.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use anyhow::{Context, Result};
use gridwin_config::{Config, WindowState};
use gridwin_render::SurfacePresenter;
use tokio::runtime::Runtime;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

use crate::display::WindowDisplay;
use crate::events::EventEmitter;
use crate::input::{self, InputTracker};
use crate::scheduler::{FrameScheduler, TickOutcome};

pub struct WindowApp {
    config: Config,
    runtime: Arc<Runtime>,
    scheduler: FrameScheduler,
    emitter: Arc<EventEmitter>,
    input: InputTracker,
    /// Created on the first `resumed`
    display: Option<WindowDisplay>,
    /// Geometry to restore at startup and persist on exit
    window_state: WindowState,
    /// Fatal error that ended the event loop
    fatal: Option<anyhow::Error>,
}

impl WindowApp {
    pub fn new(
        config: Config,
        runtime: Arc<Runtime>,
        scheduler: FrameScheduler,
        emitter: Arc<EventEmitter>,
    ) -> Self {
        let window_state = if config.remember_window_geometry {
            WindowState::load()
        } else {
            WindowState {
                width: config.window_width,
                height: config.window_height,
                ..WindowState::default()
            }
        };

        Self {
            input: InputTracker::new(scheduler.grid().metrics()),
            config,
            runtime,
            scheduler,
            emitter,
            display: None,
            window_state,
            fatal: None,
        }
    }

    /// Outcome of the event loop once it has returned.
    pub fn into_result(self) -> Result<()> {
        match self.fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(
                self.window_state.width,
                self.window_state.height,
            ));
        if let Some((x, y)) = self.window_state.position() {
            attributes = attributes.with_position(PhysicalPosition::new(x, y));
        }

        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );
        let presenter = self
            .runtime
            .block_on(SurfacePresenter::new(Arc::clone(&window)))
            .context("Failed to initialize GPU surface")?;

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);
        self.track_size(size);
        if let Ok(position) = window.outer_position() {
            self.track_position(position);
        }

        // A fresh grid always announces itself, even when its size matches.
        if !self.scheduler.resize_surface(size.width, size.height) {
            self.scheduler.announce_size();
        }
        self.display = Some(WindowDisplay::new(window, presenter));
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("Fatal: {:#}", error);
        self.fatal = Some(error);
        self.scheduler.request_shutdown();
        event_loop.exit();
    }

    fn track_size(&mut self, size: PhysicalSize<u32>) {
        self.window_state.width = size.width;
        self.window_state.height = size.height;
    }

    fn track_position(&mut self, position: PhysicalPosition<i32>) {
        self.window_state.x = position.x;
        self.window_state.y = position.y;
    }

    fn save_window_state(&self) {
        if !self.config.remember_window_geometry {
            return;
        }
        if let Err(e) = self.window_state.save() {
            log::warn!("Failed to save window state: {}", e);
        } else {
            log::debug!("Saved window state {:?}", self.window_state);
        }
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.display.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested by window system");
                self.scheduler.request_shutdown();
            }
            WindowEvent::Resized(size) => {
                if let Some(display) = self.display.as_mut() {
                    display.resize(size.width, size.height);
                }
                self.track_size(size);
                self.scheduler.resize_surface(size.width, size.height);
            }
            WindowEvent::Moved(position) => self.track_position(position),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.set_modifiers(input::modifiers(modifiers.state()));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = self.input.key(&event.logical_key, event.state, event.repeat) {
                    self.emitter.emit(&key);
                }
                if event.state == ElementState::Pressed
                    && let Some(text) = &event.text
                {
                    for ch in input::text_events(text) {
                        self.emitter.emit(&ch);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(moved) = self.input.cursor_moved(position.x, position.y) {
                    self.emitter.emit(&moved);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(click) = self.input.mouse_click(button, state) {
                    self.emitter.emit(&click);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(display) = self.display.as_mut() else {
            // No window yet; still honour end-of-stream.
            if self.scheduler.shutdown_flag().load(Ordering::Acquire) {
                event_loop.exit();
            }
            return;
        };

        if self.scheduler.pacer().is_due(Instant::now())
            && self.scheduler.tick(display) == TickOutcome::Stop
        {
            event_loop.exit();
            return;
        }

        match self.scheduler.pacer().next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Poll),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Event loop exiting after {} ticks", self.scheduler.ticks());
        if self.display.is_some() {
            self.save_window_state();
        }
    }
}
