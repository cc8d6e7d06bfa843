//! Bounded FIFO between the input reader and the frame loop.
//!
//! Built on `std::sync::mpsc::sync_channel`: a full queue blocks the
//! producer, and the consumer drains without blocking once per tick.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};

use crate::protocol::DrawCommand;

/// Default number of pending commands before the producer blocks.
pub const DEFAULT_CAPACITY: usize = 100;

/// The consumer side has been dropped; nothing will ever drain the queue again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("command queue consumer has shut down")]
pub struct QueueClosed;

/// Outcome of a non-blocking enqueue.
#[derive(Debug)]
pub enum TryEnqueueError {
    /// The queue is at capacity; the command is handed back.
    Full(DrawCommand),
    Closed(DrawCommand),
}

/// Producer handle. Cloneable; each clone feeds the same queue.
#[derive(Clone)]
pub struct CommandSender {
    tx: SyncSender<DrawCommand>,
}

/// Consumer handle, owned by the frame loop.
pub struct CommandQueue {
    rx: Receiver<DrawCommand>,
    capacity: usize,
}

/// Create a queue holding at most `capacity` pending commands.
///
/// A capacity of zero is raised to one: a rendezvous channel would make
/// every enqueue wait for a drain in progress, which never happens here.
pub fn bounded(capacity: usize) -> (CommandSender, CommandQueue) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::sync_channel(capacity);
    (CommandSender { tx }, CommandQueue { rx, capacity })
}

impl CommandSender {
    /// Enqueue, blocking while the queue is full.
    pub fn enqueue(&self, command: DrawCommand) -> Result<(), QueueClosed> {
        self.tx.send(command).map_err(|_| QueueClosed)
    }

    /// Enqueue without blocking.
    pub fn try_enqueue(&self, command: DrawCommand) -> Result<(), TryEnqueueError> {
        self.tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(command) => TryEnqueueError::Full(command),
            TrySendError::Disconnected(command) => TryEnqueueError::Closed(command),
        })
    }
}

impl CommandQueue {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take every command queued right now, in arrival order.
    ///
    /// Never blocks. Commands enqueued while draining may or may not be
    /// included; they are picked up by the next drain either way.
    pub fn drain_all(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(command) => commands.push(command),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let (tx, queue) = bounded(8);
        tx.enqueue(DrawCommand::Clear).unwrap();
        tx.enqueue(DrawCommand::SetTitle {
            title: "a".to_string(),
        })
        .unwrap();
        tx.enqueue(DrawCommand::Close).unwrap();

        let kinds: Vec<_> = queue.drain_all().iter().map(DrawCommand::kind).collect();
        assert_eq!(kinds, ["clear", "title", "close"]);
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_full_queue_rejects_try_enqueue() {
        let (tx, queue) = bounded(2);
        tx.try_enqueue(DrawCommand::Clear).unwrap();
        tx.try_enqueue(DrawCommand::Clear).unwrap();
        assert!(matches!(
            tx.try_enqueue(DrawCommand::Close),
            Err(TryEnqueueError::Full(DrawCommand::Close))
        ));
        assert_eq!(queue.drain_all().len(), 2);
        assert!(tx.try_enqueue(DrawCommand::Close).is_ok());
    }

    #[test]
    fn test_enqueue_after_consumer_dropped() {
        let (tx, queue) = bounded(2);
        drop(queue);
        assert_eq!(tx.enqueue(DrawCommand::Clear), Err(QueueClosed));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (_tx, queue) = bounded(0);
        assert_eq!(queue.capacity(), 1);
    }
}
