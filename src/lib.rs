// Library exports for the binary and the integration tests.
//
// Threading model: the stdin reader runs on its own thread and talks to the
// frame loop only through the bounded command queue and the shutdown flag.
// Everything the frame loop owns (grid, compositor, frame buffer) stays on
// the event loop thread; the compositor fans out per-cell work with rayon.
// The event emitter is the one piece of shared state and serializes writes
// behind a parking_lot::Mutex.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod cli;
pub mod debug;
pub mod display;
pub mod events;
pub mod input;
pub mod protocol;
pub mod queue;
pub mod reader;
pub mod scheduler;
