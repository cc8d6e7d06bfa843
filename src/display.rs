//! The "present" side of the frame loop.
//!
//! The scheduler hands every finished frame to a [`Display`]. The window
//! implementation uploads it to the GPU; the headless one just keeps it.

use std::sync::Arc;

use gridwin_render::{FrameBuffer, RenderError, SurfacePresenter};
use winit::window::Window;

pub trait Display {
    /// Show a completely composited frame.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), RenderError>;

    fn set_title(&mut self, title: &str);
}

/// A display with no window: remembers the last frame and title.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    title: String,
    last_frame: Option<FrameBuffer>,
    presented: u64,
}

impl HeadlessDisplay {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last_frame.as_ref()
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Display for HeadlessDisplay {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), RenderError> {
        match self.last_frame.as_mut() {
            Some(last) => last.clone_from(frame),
            None => self.last_frame = Some(frame.clone()),
        }
        self.presented += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        log::info!("Title set to {:?}", title);
        self.title = title.to_string();
    }
}

/// An on-screen window backed by a wgpu surface.
pub struct WindowDisplay {
    window: Arc<Window>,
    presenter: SurfacePresenter,
}

impl WindowDisplay {
    pub fn new(window: Arc<Window>, presenter: SurfacePresenter) -> Self {
        Self { window, presenter }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.presenter.resize(width, height);
    }
}

impl Display for WindowDisplay {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), RenderError> {
        self.window.pre_present_notify();
        self.presenter.present(frame)
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}
