//! Bounded command handoff between the reader and processor tasks.
//!
//! Backed by an `embassy-sync` channel guarded by a critical-section
//! raw mutex, so it can live in a `static` on target or behind an `Arc`
//! on host without any heap allocation of its own.
//!
//! ```text
//! ┌──────────────┐  CommandPacket  ┌──────────────┐
//! │ Reader task  │───────────────▶│ Processor    │
//! │ (try_send)   │   N slots FIFO  │ (receive)    │
//! └──────────────┘                 └──────────────┘
//! ```
//!
//! Enqueue never blocks: serial bytes keep arriving, so a full queue
//! drops the new packet and counts it instead of stalling the reader.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::packet::CommandPacket;
use crate::error::QueueFull;

/// Default number of pending commands.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// Fixed-capacity FIFO of complete command packets.
pub struct CommandQueue<const N: usize = DEFAULT_QUEUE_DEPTH> {
    channel: Channel<CriticalSectionRawMutex, CommandPacket, N>,
    dropped: AtomicU32,
}

impl<const N: usize> CommandQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Hand a packet to the processor without blocking.
    pub fn enqueue(&self, packet: CommandPacket) -> Result<(), QueueFull> {
        self.channel.try_send(packet).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            QueueFull
        })
    }

    /// Wait until a packet is available.
    pub async fn dequeue(&self) -> CommandPacket {
        self.channel.receive().await
    }

    /// Block the calling thread until a packet is available.
    pub fn dequeue_blocking(&self) -> CommandPacket {
        futures_lite::future::block_on(self.dequeue())
    }

    pub fn try_dequeue(&self) -> Option<CommandPacket> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Packets dropped because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cmd(tag: u8) -> CommandPacket {
        CommandPacket::new(0x01, &[tag]).unwrap()
    }

    #[test]
    fn fifo_order_preserved() {
        let q: CommandQueue<4> = CommandQueue::new();
        for i in 0..3 {
            q.enqueue(cmd(i)).unwrap();
        }
        for i in 0..3 {
            assert_eq!(q.try_dequeue().unwrap().data[0], i);
        }
        assert!(q.try_dequeue().is_none());
    }

    #[test]
    fn overflow_reports_queue_full_and_keeps_first_n() {
        let q: CommandQueue = CommandQueue::new();
        let n = q.capacity();
        for i in 0..n {
            q.enqueue(cmd(i as u8)).unwrap();
        }
        assert_eq!(q.enqueue(cmd(0xEE)), Err(QueueFull));
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.len(), n);
        for i in 0..n {
            assert_eq!(q.try_dequeue().unwrap().data[0], i as u8);
        }
        assert!(q.is_empty());
    }

    #[test]
    fn blocking_dequeue_wakes_on_enqueue() {
        let q: Arc<CommandQueue<2>> = Arc::new(CommandQueue::new());
        let consumer = {
            let q = Arc::clone(&q);
            std::thread::spawn(move || q.dequeue_blocking())
        };
        std::thread::sleep(std::time::Duration::from_millis(20));
        q.enqueue(cmd(9)).unwrap();
        let got = consumer.join().unwrap();
        assert_eq!(got.data[0], 9);
    }
}
