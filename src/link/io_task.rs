//! Reader and processor tasks.
//!
//! Two threads share one [`LinkShared`] (queue, counters, stop flags):
//!
//! 1. **Reader** blocks on the byte source, drives the framer and
//!    enqueues complete commands. Never waits on the processor.
//! 2. **Processor** runs `futures_lite::future::block_on` over the queue's
//!    receive future; dispatches one command at a time, in arrival
//!    order, and writes the response.
//!
//! ```text
//!  ┌──────────────────────┐   CommandQueue   ┌──────────────────────────┐
//!  │  link-rx             │ ───────────────▶ │  link-proc               │
//!  │  ByteSource → Framer │   (10 slots)     │  Dispatcher → Responder  │
//!  └──────────────────────┘                  └──────────────────────────┘
//! ```
//!
//! When the source closes, the reader raises the shutdown signal; the
//! processor finishes whatever is already queued and then exits.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info, warn};

use super::dispatcher::Dispatcher;
use super::framer::CommandFramer;
use super::packet::CommandPacket;
use super::queue::CommandQueue;
use super::responder::Responder;
use super::transport::{ByteSink, ByteSource};
use crate::config::LinkConfig;
use crate::diagnostics::{LinkMetrics, LinkStats};
use crate::drivers::task_pin::{PROCESSOR_TASK, READER_TASK, spawn_on_core};
use crate::error::{Result, Status};
use crate::ports::Peripherals;

// ── Shared state ─────────────────────────────────────────────

/// The only state both tasks touch.
#[derive(Default)]
pub struct LinkShared {
    pub queue: CommandQueue,
    pub stats: LinkStats,
    shutdown: Signal<CriticalSectionRawMutex, ()>,
    stop_reader: AtomicBool,
}

impl LinkShared {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the processor to exit once the queue is empty.
    pub fn signal_shutdown(&self) {
        self.shutdown.signal(());
    }

    /// Ask the reader to exit at its next poll.
    pub fn stop_reader(&self) {
        self.stop_reader.store(true, Ordering::Release);
    }
}

// ── Reader ───────────────────────────────────────────────────

/// Why the reader returned.
#[derive(Debug)]
pub enum ReaderExit<E> {
    /// The byte source reported an error (link closed).
    Closed(E),
    /// [`LinkShared::stop_reader`] was called.
    Stopped,
}

/// Byte-stream side of the link.
pub struct Reader<S: ByteSource> {
    source: S,
    framer: CommandFramer,
    shared: Arc<LinkShared>,
    frame_timeout: Option<Duration>,
    last_byte: Instant,
}

impl<S: ByteSource> Reader<S> {
    pub fn new(source: S, shared: Arc<LinkShared>, frame_timeout: Option<Duration>) -> Self {
        Self {
            source,
            framer: CommandFramer::new(),
            shared,
            frame_timeout,
            last_byte: Instant::now(),
        }
    }

    /// Perform one read and feed the result to the framer.
    pub fn poll(&mut self) -> core::result::Result<(), S::Error> {
        let byte = self.source.read_byte()?;
        self.handle(byte, Instant::now());
        Ok(())
    }

    /// Read until the source closes or the reader is stopped.
    pub fn run(mut self) -> ReaderExit<S::Error> {
        info!("ZeroClaw link listener started");
        loop {
            if self.shared.stop_reader.load(Ordering::Acquire) {
                info!("RX: stop requested");
                return ReaderExit::Stopped;
            }
            if let Err(e) = self.poll() {
                info!("RX: byte source closed: {:?}", e);
                return ReaderExit::Closed(e);
            }
        }
    }

    fn handle(&mut self, byte: Option<u8>, now: Instant) {
        self.expire_partial_frame(now);

        let Some(byte) = byte else {
            return;
        };
        self.last_byte = now;

        let shared = &self.shared;
        self.framer.push(byte, |outcome| match outcome {
            Ok(cmd) => accept(shared, cmd),
            Err(e) => {
                warn!("RX: frame discarded: {}", e);
                shared.stats.record_frame_error(e);
            }
        });
    }

    fn expire_partial_frame(&mut self, now: Instant) {
        let Some(timeout) = self.frame_timeout else {
            return;
        };
        if self.framer.is_idle() || now.duration_since(self.last_byte) <= timeout {
            return;
        }
        warn!(
            "RX: partial frame timed out ({} bytes, {:?})",
            self.framer.buffered(),
            self.framer.phase()
        );
        self.shared.stats.record_frame_timeout();

        let shared = &self.shared;
        self.framer.expire(|outcome| match outcome {
            Ok(cmd) => accept(shared, cmd),
            Err(e) => shared.stats.record_frame_error(e),
        });
    }

}

fn accept(shared: &LinkShared, cmd: CommandPacket) {
    let cmd_type = cmd.cmd_type;
    shared.stats.record_frame_accepted();
    debug!("RX: command 0x{:02x} ({} bytes)", cmd_type, cmd.data_len());

    if shared.queue.enqueue(cmd).is_err() {
        warn!("RX: command queue full, dropping 0x{:02x}", cmd_type);
        shared.stats.record_queue_full();
    }
}

// ── Processor ────────────────────────────────────────────────

/// Command side of the link.
pub struct Processor<P: Peripherals, K: ByteSink> {
    dispatcher: Dispatcher<P>,
    responder: Responder<K>,
    shared: Arc<LinkShared>,
}

impl<P: Peripherals, K: ByteSink> Processor<P, K> {
    pub fn new(peripherals: P, sink: K, shared: Arc<LinkShared>) -> Self {
        Self {
            dispatcher: Dispatcher::new(peripherals),
            responder: Responder::new(sink),
            shared,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.dispatcher
    }

    pub fn responder(&self) -> &Responder<K> {
        &self.responder
    }

    /// Dispatch one command and transmit its response.
    pub fn process(&mut self, cmd: &CommandPacket) -> Result<usize> {
        let resp = self.dispatcher.dispatch(cmd);
        self.shared
            .stats
            .record_dispatch(resp.status == Status::Ok.code());

        let sent = self.responder.respond(&resp);
        self.shared.stats.record_response(sent.is_ok());
        sent
    }

    /// Process everything currently queued without waiting.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(cmd) = self.shared.queue.try_dequeue() {
            let _ = self.process(&cmd);
            handled += 1;
        }
        handled
    }

    /// Serve commands until shutdown is signalled and the queue is empty.
    pub async fn run(&mut self) {
        info!("ZeroClaw command processor started");
        let shared = Arc::clone(&self.shared);

        loop {
            // Queued work is preferred over a pending shutdown on each poll;
            // anything enqueued after shutdown won is handled by the drain
            // below.
            let next = futures_lite::future::or(async { Some(shared.queue.dequeue().await) }, async {
                shared.shutdown.wait().await;
                None
            })
            .await;

            let Some(cmd) = next else {
                break;
            };
            debug!("Processing command type 0x{:02x}", cmd.cmd_type);
            let _ = self.process(&cmd);
        }

        let late = self.drain();
        if late > 0 {
            debug!("Drained {} command(s) queued during shutdown", late);
        }
        info!("ZeroClaw command processor stopped");
    }
}

// ── Thread spawn ─────────────────────────────────────────────

/// Running link: both task handles plus the shared state.
pub struct LinkHandle<E> {
    reader: JoinHandle<ReaderExit<E>>,
    processor: JoinHandle<()>,
    shared: Arc<LinkShared>,
}

impl<E> LinkHandle<E> {
    pub fn shared(&self) -> &Arc<LinkShared> {
        &self.shared
    }

    pub fn stats(&self) -> LinkMetrics {
        self.shared.stats.snapshot()
    }

    /// Stop both tasks. The reader notices at its next poll, so a source
    /// blocked forever keeps it alive until data or an error arrives.
    pub fn stop(&self) {
        self.shared.stop_reader();
        self.shared.signal_shutdown();
    }

    /// Wait for the reader to exit, then for the processor to drain.
    pub fn join(self) -> std::thread::Result<ReaderExit<E>> {
        let exit = self.reader.join();
        self.shared.signal_shutdown();
        self.processor.join()?;
        exit
    }
}

/// Start the reader and processor threads.
pub fn spawn<S, P, K>(
    config: &LinkConfig,
    source: S,
    peripherals: P,
    sink: K,
) -> io::Result<LinkHandle<S::Error>>
where
    S: ByteSource + Send + 'static,
    S::Error: Send + 'static,
    P: Peripherals + Send + 'static,
    K: ByteSink + Send + 'static,
{
    let shared = Arc::new(LinkShared::new());

    let mut processor = Processor::new(peripherals, sink, Arc::clone(&shared));
    let processor = spawn_on_core(PROCESSOR_TASK, move || {
        futures_lite::future::block_on(processor.run());
    })?;

    let reader = Reader::new(source, Arc::clone(&shared), config.frame_timeout());
    let reader = {
        let shared_on_exit = Arc::clone(&shared);
        match spawn_on_core(READER_TASK, move || {
            let exit = reader.run();
            shared_on_exit.signal_shutdown();
            exit
        }) {
            Ok(handle) => handle,
            Err(e) => {
                shared.signal_shutdown();
                return Err(e);
            }
        }
    };

    info!(
        "ZeroClaw link ready (queue depth {}, frame timeout {:?})",
        shared.queue.capacity(),
        config.frame_timeout()
    );

    Ok(LinkHandle {
        reader,
        processor,
        shared,
    })
}

// ── Tests ────────────────────────────────────────────────────
