use std::sync::Arc;

use anyhow::Result;
use gridwin::app::App;
use gridwin::cli;
use gridwin::events::EventEmitter;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let runtime_options = cli::process_cli();

    // Routes all log::info!() etc. to <tmp>/gridwin_debug.log; stdout is
    // reserved for events.
    gridwin::debug::init_log_bridge(runtime_options.log_level);

    log::info!("Starting gridwin {}", gridwin::VERSION);

    let emitter = Arc::new(EventEmitter::stdout());

    let result = Builder::new_current_thread()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| App::new(Arc::new(runtime), runtime_options))
        .and_then(|app| app.run(Arc::clone(&emitter)));

    match result {
        Ok(()) => {
            log::info!("Exited cleanly");
            Ok(())
        }
        Err(ref e) => {
            log::error!("Fatal error: {e:#}");
            emitter.error(format_args!("{e:#}"));
            eprintln!("gridwin: error: {e:#}");
            // On Linux, provide a hint when the error looks like a missing display server
            #[cfg(target_os = "linux")]
            {
                let msg = format!("{e:?}").to_lowercase();
                if msg.contains("display") || msg.contains("wayland") || msg.contains("x server") {
                    eprintln!(
                        "gridwin: hint: no display server found; set DISPLAY (X11) or \
                         WAYLAND_DISPLAY (Wayland), or run with --headless WxH"
                    );
                }
            }
            result
        }
    }
}
