//! ZeroClaw firmware library.
//!
//! Exposes the framing, queueing and dispatch engine for integration
//! testing and for host tools that speak the same protocol. ESP-IDF
//! specific code sits behind the `espidf` feature.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for ESP-IDF requires the `espidf` feature");

pub mod adapters;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod link;
pub mod ports;

pub use config::LinkConfig;
pub use error::{DeviceError, FrameError, LinkError, QueueFull, Status};
