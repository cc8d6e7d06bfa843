//! Frame scheduler.
//!
//! One tick is: drain the command queue, apply the commands to the grid,
//! composite, present. [`Pacer`] spaces ticks at a fixed interval. The
//! scheduler owns the grid, the compositor and the frame buffer outright, so
//! the grid is only ever mutated between composites, from this one place.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use gridwin_render::{CellMetrics, Compositor, FrameBuffer, Grid};

use crate::display::Display;
use crate::events::{EventEmitter, OutboundEvent};
use crate::protocol::DrawCommand;
use crate::queue::CommandQueue;

/// Default target interval between ticks.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Whether the loop should run another tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// Fixed-interval tick pacing.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    tick_started: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            tick_started: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the start of a tick.
    pub fn begin_tick(&mut self, now: Instant) {
        self.tick_started = Some(now);
    }

    /// When the next tick should start. Immediately if no tick has run yet.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tick_started.map(|started| started + self.interval)
    }

    /// Whether a tick is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_deadline().is_none_or(|deadline| now >= deadline)
    }

    /// Time left in the current interval. Zero once the tick overran.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_deadline()
            .map_or(Duration::ZERO, |deadline| deadline.saturating_duration_since(now))
    }

    /// Sleep out the rest of the current interval.
    pub fn sleep_remaining(&self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

/// Owns all per-frame state and runs ticks against a [`Display`].
pub struct FrameScheduler {
    grid: Grid,
    compositor: Compositor,
    frame: FrameBuffer,
    queue: CommandQueue,
    emitter: Arc<EventEmitter>,
    shutdown: Arc<AtomicBool>,
    pacer: Pacer,
    ticks: u64,
}

impl FrameScheduler {
    /// Create a scheduler for a surface of `surface_width x surface_height` pixels.
    pub fn new(
        metrics: CellMetrics,
        (surface_width, surface_height): (u32, u32),
        compositor: Compositor,
        queue: CommandQueue,
        emitter: Arc<EventEmitter>,
        shutdown: Arc<AtomicBool>,
        interval: Duration,
    ) -> Self {
        let background = compositor.background();
        Self {
            grid: Grid::for_surface(metrics, surface_width, surface_height),
            compositor,
            frame: FrameBuffer::new(surface_width, surface_height, background),
            queue,
            emitter,
            shutdown,
            pacer: Pacer::new(interval),
            ticks: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown
    }

    /// Ask the loop to stop after its current tick.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn size_event(&self) -> OutboundEvent {
        let metrics = self.grid.metrics();
        OutboundEvent::Size {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            col_width: metrics.width,
            row_height: metrics.height,
        }
    }

    /// Emit the current grid size.
    pub fn announce_size(&self) {
        self.emitter.emit(&self.size_event());
    }

    /// Track a new surface size.
    ///
    /// The frame buffer always follows the surface. The grid is rebuilt (and
    /// its content discarded) only when the number of columns or rows
    /// changes, in which case a `size` event is emitted and `true` returned.
    pub fn resize_surface(&mut self, width: u32, height: u32) -> bool {
        if (self.frame.width(), self.frame.height()) != (width, height) {
            let background = self.compositor.background();
            self.frame.resize(width, height, background);
        }

        let (cols, rows) = self.grid.metrics().grid_size(width, height);
        if (cols, rows) == (self.grid.cols(), self.grid.rows()) {
            return false;
        }
        log::info!("Surface {}x{} -> grid {}x{}", width, height, cols, rows);
        self.grid.resize(cols, rows);
        self.announce_size();
        true
    }

    /// Run one tick: drain, apply, composite, present.
    ///
    /// The shutdown flag is sampled before the drain, so everything enqueued
    /// before the flag was raised is still drawn by this final tick.
    pub fn tick(&mut self, display: &mut dyn Display) -> TickOutcome {
        let started = Instant::now();
        self.pacer.begin_tick(started);
        self.ticks += 1;

        let stop_requested = self.shutdown.load(Ordering::Acquire);

        let commands = self.queue.drain_all();
        let drained = commands.len();
        let mut closed = false;
        for command in commands {
            if self.apply(command, display).is_break() {
                closed = true;
                break;
            }
        }
        let drain_time = started.elapsed();

        let composite_started = Instant::now();
        let report = self.compositor.composite(&self.grid, &mut self.frame);
        for failure in report.failures {
            self.emitter.error(format_args!(
                "could not render cell ({}, {}): {}",
                failure.col, failure.row, failure.error
            ));
            // Reported once; the cell is not retried next frame.
            self.grid.clear_cell(failure.col as i32, failure.row as i32);
        }
        let composite_time = composite_started.elapsed();

        let present_started = Instant::now();
        if let Err(e) = display.present(&self.frame) {
            log::error!("Present failed: {}", e);
            self.emitter.error(e);
        }
        let present_time = present_started.elapsed();

        log::trace!(
            "tick {}: {} commands, {} cells, drain {:?}, composite {:?}, present {:?}, total {:?}",
            self.ticks,
            drained,
            report.drawn_cells,
            drain_time,
            composite_time,
            present_time,
            started.elapsed()
        );

        if closed || stop_requested {
            self.request_shutdown();
            log::info!(
                "Frame loop stopping after tick {} ({})",
                self.ticks,
                if closed { "close command" } else { "shutdown requested" }
            );
            TickOutcome::Stop
        } else {
            TickOutcome::Continue
        }
    }

    /// Tick and sleep until a tick reports [`TickOutcome::Stop`].
    pub fn run_blocking(&mut self, display: &mut dyn Display) {
        while self.tick(display) == TickOutcome::Continue {
            self.pacer.sleep_remaining();
        }
    }

    fn apply(&mut self, command: DrawCommand, display: &mut dyn Display) -> ControlFlow<()> {
        match command {
            DrawCommand::SetChar {
                col,
                row,
                ch,
                fg,
                bg,
                style,
            } => {
                self.grid.set_char(col, row, ch, fg, bg, style);
            }
            DrawCommand::SetImage { col, row, image } => {
                self.grid.place_image_tiled(&image, col, row);
            }
            DrawCommand::Clear => self.grid.clear(),
            DrawCommand::SetTitle { title } => display.set_title(&title),
            DrawCommand::Close => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_first_tick_is_due() {
        let pacer = Pacer::new(Duration::from_millis(30));
        assert!(pacer.is_due(Instant::now()));
        assert_eq!(pacer.remaining(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_pacer_remaining() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        let start = Instant::now();
        pacer.begin_tick(start);

        assert_eq!(pacer.remaining(start + Duration::from_millis(10)), Duration::from_millis(20));
        assert!(!pacer.is_due(start + Duration::from_millis(29)));
        assert!(pacer.is_due(start + Duration::from_millis(30)));
        assert_eq!(pacer.remaining(start + Duration::from_millis(45)), Duration::ZERO);
    }
}
