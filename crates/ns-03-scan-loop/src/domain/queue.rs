//! # Commit Queue
//!
//! Bounded single-producer/single-consumer FIFO between the async producer
//! and the blocking commit consumer.
//!
//! A full queue suspends the producer until the consumer catches up, so
//! memory is bounded by `capacity` messages whatever the store latency.
//! Within a height, every `Record` precedes the `Seal` for that height.

use super::errors::ScanError;
use shared_types::{BlockHeight, SignatureRecord};
use tokio::sync::mpsc;

/// One unit of commit work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitMessage {
    /// Persist this record and check it for collisions.
    Record(SignatureRecord),
    /// Every record of this height has been sent.
    Seal(BlockHeight),
}

/// Create a commit queue holding at most `capacity` messages.
pub fn commit_queue(capacity: usize) -> (CommitSender, CommitReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (CommitSender { tx }, CommitReceiver { rx })
}

/// Producer half.
#[derive(Debug)]
pub struct CommitSender {
    tx: mpsc::Sender<CommitMessage>,
}

impl CommitSender {
    /// Enqueue a message, waiting while the queue is full.
    pub async fn send(&self, message: CommitMessage) -> Result<(), ScanError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| ScanError::ConsumerStopped)
    }

    /// Enqueue the records of a height followed by its seal.
    pub async fn send_height(
        &self,
        height: BlockHeight,
        records: Vec<SignatureRecord>,
    ) -> Result<(), ScanError> {
        for record in records {
            self.send(CommitMessage::Record(record)).await?;
        }
        self.send(CommitMessage::Seal(height)).await
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// Configured bound.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct CommitReceiver {
    rx: mpsc::Receiver<CommitMessage>,
}

impl CommitReceiver {
    /// Next message, blocking the current thread. `None` once the sender is
    /// gone and the queue is empty.
    ///
    /// Must not be called from an async context.
    pub fn blocking_recv(&mut self) -> Option<CommitMessage> {
        self.rx.blocking_recv()
    }

    /// Next message, for async consumers and tests.
    pub async fn recv(&mut self) -> Option<CommitMessage> {
        self.rx.recv().await
    }
}
