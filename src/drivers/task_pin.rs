//! Core-pinned thread spawning for the link tasks.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::Builder::spawn`
//! creates a FreeRTOS task pinned to a specific CPU core with explicit
//! priority and stack size. On host builds, falls back to a plain named
//! thread.
//!
//! `esp_pthread_set_cfg()` applies to the *next* `pthread_create()` from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers for the ESP32 dual-core parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU), UART ISR and the reader.
    Pro = 0,
    /// Core 1 (APP_CPU), command processing.
    App = 1,
}

/// Placement of one link task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Thread name; must end in `\0` for the ESP-IDF pthread config.
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Serial receiver, runs ahead of the processor.
pub const READER_TASK: TaskSpec = TaskSpec {
    name: "link-rx\0",
    core: Core::Pro,
    priority: 8,
    stack_kb: 8,
};

/// Command processor; holds the response frame buffer.
pub const PROCESSOR_TASK: TaskSpec = TaskSpec {
    name: "link-proc\0",
    core: Core::App,
    priority: 7,
    stack_kb: 16,
};

/// Spawn a thread pinned to a specific core with explicit priority and stack.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core<T: Send + 'static>(
    spec: TaskSpec,
    f: impl FnOnce() -> T + Send + 'static,
) -> io::Result<JoinHandle<T>> {
    // SAFETY: the config struct is fully initialised by
    // esp_create_default_pthread_config and `spec.name` is 'static and
    // NUL-terminated, so the pointer outlives the spawn below.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = spec.priority as i32;
        cfg.stack_size = (spec.stack_kb * 1024) as _;
        cfg.thread_name = spec.name.as_ptr() as *const _;
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
}

/// Floor for host thread stacks.
#[cfg(not(target_os = "espidf"))]
const HOST_MIN_STACK: usize = 256 * 1024;

/// Host fallback; ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core<T: Send + 'static>(
    spec: TaskSpec,
    f: impl FnOnce() -> T + Send + 'static,
) -> io::Result<JoinHandle<T>> {
    log::debug!(
        "Spawning '{}' (host, no core pinning, stack={}KB)",
        spec.display_name(),
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size((spec.stack_kb * 1024).max(HOST_MIN_STACK))
        .spawn(f)
}
