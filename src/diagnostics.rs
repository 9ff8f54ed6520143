//! Link diagnostics.
//!
//! Framing failures and queue drops never produce a response, so the
//! only way to observe them is through these counters. Both tasks update
//! them lock-free; [`LinkStats::snapshot`] takes a consistent-enough copy
//! for logging or for shipping to a host.

use core::sync::atomic::{AtomicU32, Ordering};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Shared atomic counters.
#[derive(Debug, Default)]
pub struct LinkStats {
    frames_accepted: AtomicU32,
    checksum_errors: AtomicU32,
    malformed_headers: AtomicU32,
    overflow_resets: AtomicU32,
    frame_timeouts: AtomicU32,
    queue_full_drops: AtomicU32,
    commands_dispatched: AtomicU32,
    dispatch_failures: AtomicU32,
    responses_sent: AtomicU32,
    tx_failures: AtomicU32,
}

fn bump(counter: &AtomicU32) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            frames_accepted: AtomicU32::new(0),
            checksum_errors: AtomicU32::new(0),
            malformed_headers: AtomicU32::new(0),
            overflow_resets: AtomicU32::new(0),
            frame_timeouts: AtomicU32::new(0),
            queue_full_drops: AtomicU32::new(0),
            commands_dispatched: AtomicU32::new(0),
            dispatch_failures: AtomicU32::new(0),
            responses_sent: AtomicU32::new(0),
            tx_failures: AtomicU32::new(0),
        }
    }

    pub fn record_frame_accepted(&self) {
        bump(&self.frames_accepted);
    }

    pub fn record_frame_error(&self, err: FrameError) {
        match err {
            FrameError::MalformedHeader { .. } => bump(&self.malformed_headers),
            FrameError::ChecksumError { .. } => bump(&self.checksum_errors),
            FrameError::Overflow => bump(&self.overflow_resets),
        }
    }

    pub fn record_frame_timeout(&self) {
        bump(&self.frame_timeouts);
    }

    pub fn record_queue_full(&self) {
        bump(&self.queue_full_drops);
    }

    /// One command went through the dispatcher; `ok` is its status.
    pub fn record_dispatch(&self, ok: bool) {
        bump(&self.commands_dispatched);
        if !ok {
            bump(&self.dispatch_failures);
        }
    }

    pub fn record_response(&self, sent: bool) {
        if sent {
            bump(&self.responses_sent);
        } else {
            bump(&self.tx_failures);
        }
    }

    pub fn snapshot(&self) -> LinkMetrics {
        let load = |c: &AtomicU32| c.load(Ordering::Relaxed);
        LinkMetrics {
            frames_accepted: load(&self.frames_accepted),
            checksum_errors: load(&self.checksum_errors),
            malformed_headers: load(&self.malformed_headers),
            overflow_resets: load(&self.overflow_resets),
            frame_timeouts: load(&self.frame_timeouts),
            queue_full_drops: load(&self.queue_full_drops),
            commands_dispatched: load(&self.commands_dispatched),
            dispatch_failures: load(&self.dispatch_failures),
            responses_sent: load(&self.responses_sent),
            tx_failures: load(&self.tx_failures),
        }
    }

    pub fn log_summary(&self) {
        let m = self.snapshot();
        info!(
            "LINK | rx ok={} crc={} hdr={} ovf={} tmo={} | queue drops={} | \
             cmds={} failed={} | tx ok={} err={}",
            m.frames_accepted,
            m.checksum_errors,
            m.malformed_headers,
            m.overflow_resets,
            m.frame_timeouts,
            m.queue_full_drops,
            m.commands_dispatched,
            m.dispatch_failures,
            m.responses_sent,
            m.tx_failures,
        );
    }
}

/// Point-in-time copy of [`LinkStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkMetrics {
    pub frames_accepted: u32,
    pub checksum_errors: u32,
    pub malformed_headers: u32,
    pub overflow_resets: u32,
    pub frame_timeouts: u32,
    pub queue_full_drops: u32,
    pub commands_dispatched: u32,
    pub dispatch_failures: u32,
    pub responses_sent: u32,
    pub tx_failures: u32,
}

impl LinkMetrics {
    /// Frames received but never dispatched, for any reason.
    pub fn discarded(&self) -> u32 {
        self.checksum_errors
            + self.malformed_headers
            + self.overflow_resets
            + self.frame_timeouts
            + self.queue_full_drops
    }
}
