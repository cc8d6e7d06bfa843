//! The input reader task.
//!
//! Runs on its own OS thread: reads raw lines from the controller, decodes
//! them and pushes the commands onto the queue, blocking whenever the queue
//! is full. Decode errors are reported and the stream continues.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::events::EventEmitter;
use crate::protocol::decode_line;
use crate::queue::CommandSender;

/// Why the reader stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The controller closed its end of the stream.
    EndOfStream,
    /// The frame loop is gone; nothing would consume further commands.
    ConsumerGone,
    /// Reading failed with an I/O error.
    ReadFailed,
}

/// Start the reader on a named thread.
pub fn spawn_reader<R>(
    input: R,
    sender: CommandSender,
    emitter: Arc<EventEmitter>,
    shutdown: Arc<AtomicBool>,
) -> io::Result<JoinHandle<ReaderExit>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("gridwin-reader".to_string())
        .spawn(move || read_commands(input, &sender, &emitter, &shutdown))
}

/// Read until end-of-stream, then raise `shutdown`.
pub fn read_commands(
    mut input: impl BufRead,
    sender: &CommandSender,
    emitter: &EventEmitter,
    shutdown: &AtomicBool,
) -> ReaderExit {
    let mut line = Vec::new();
    let mut lines_read: u64 = 0;

    let exit = loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => break ReaderExit::EndOfStream,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                emitter.error(format_args!("could not read input: {e}"));
                break ReaderExit::ReadFailed;
            }
        }
        lines_read += 1;

        let trimmed = trim_line(&line);
        if trimmed.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match decode_line(trimmed) {
            Ok(command) => {
                log::trace!("line {}: {} command", lines_read, command.kind());
                if sender.enqueue(command).is_err() {
                    log::info!("Command queue closed, stopping reader");
                    break ReaderExit::ConsumerGone;
                }
            }
            Err(e) => {
                log::debug!("line {}: {}", lines_read, e);
                emitter.error(e);
            }
        }
    };

    log::info!("Reader finished after {} lines: {:?}", lines_read, exit);
    shutdown.store(true, Ordering::Release);
    exit
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_line() {
        assert_eq!(trim_line(b"abc\r\n"), b"abc");
        assert_eq!(trim_line(b"abc\n"), b"abc");
        assert_eq!(trim_line(b"abc"), b"abc");
        assert_eq!(trim_line(b"\n"), b"");
    }
}
