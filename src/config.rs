//! Link configuration parameters
//!
//! All tunable parameters for the ZeroClaw link. Defaults are compiled
//! in; hosts may supply a JSON document, and the compact postcard form
//! is what a board would keep in flash.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// Board identity reported by DEVICE_INFO.
pub type BoardName = heapless::String<64>;

/// Board name baked in at build time (`ZEROCLAW_BOARD=...`).
pub const DEFAULT_BOARD: &str = match option_env!("ZEROCLAW_BOARD") {
    Some(board) => board,
    None => "zeroclaw-generic",
};

/// Longest accepted read deadline.
const MAX_FRAME_TIMEOUT_MS: u32 = 60_000;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Identity string returned by DEVICE_INFO
    pub board_name: BoardName,
    /// Discard a partial frame after this much silence (ms, 0 = never)
    pub frame_timeout_ms: u32,
    /// Status LED toggle period (ms, 0 = off)
    pub heartbeat_interval_ms: u32,
    /// Period of the diagnostics summary in the log (seconds, 0 = off)
    pub stats_log_interval_secs: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            board_name: board_name(DEFAULT_BOARD),
            frame_timeout_ms: 100,
            heartbeat_interval_ms: 1000,
            stats_log_interval_secs: 60,
        }
    }
}

/// Build a [`BoardName`], truncating at a character boundary.
pub fn board_name(name: &str) -> BoardName {
    let mut out = BoardName::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl LinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.board_name.is_empty() {
            return Err(LinkError::Config("board_name is empty"));
        }
        if self.frame_timeout_ms > MAX_FRAME_TIMEOUT_MS {
            return Err(LinkError::Config("frame_timeout_ms above 60000"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| LinkError::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_postcard(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| LinkError::Config("postcard encode failed"))
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| LinkError::Config("postcard decode failed"))?;
        config.validate()?;
        Ok(config)
    }

    /// Read deadline for a partial frame, if enabled.
    pub fn frame_timeout(&self) -> Option<Duration> {
        (self.frame_timeout_ms > 0).then(|| Duration::from_millis(self.frame_timeout_ms as u64))
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        (self.heartbeat_interval_ms > 0)
            .then(|| Duration::from_millis(self.heartbeat_interval_ms as u64))
    }
}
