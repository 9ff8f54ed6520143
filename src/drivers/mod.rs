//! Thread placement and the status LED.

pub mod status_led;
pub mod task_pin;
