//! Heartbeat LED driver.
//!
//! Toggles one GPIO line at a fixed period so an observer can tell the
//! firmware is alive. The main loop calls `tick()` with the elapsed time
//! since its previous call; the driver owns no timer of its own.
//!
//! Generic over [`StatefulOutputPin`], so the same code drives an
//! `esp_idf_hal::gpio::PinDriver` on target and a plain in-memory pin in
//! tests.

use embedded_hal::digital::StatefulOutputPin;

pub struct Heartbeat<P: StatefulOutputPin> {
    pin: P,
    period_ms: u32,
    phase_ms: u32,
    toggles: u32,
}

impl<P: StatefulOutputPin> Heartbeat<P> {
    /// `period_ms == 0` disables toggling; the pin is left as found.
    pub fn new(pin: P, period_ms: u32) -> Self {
        Self {
            pin,
            period_ms,
            phase_ms: 0,
            toggles: 0,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Number of toggles performed so far.
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn is_lit(&mut self) -> Result<bool, P::Error> {
        self.pin.is_set_high()
    }

    /// Advance by `elapsed_ms`, toggling once per whole period crossed.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<(), P::Error> {
        if self.period_ms == 0 {
            return Ok(());
        }

        self.phase_ms = self.phase_ms.saturating_add(elapsed_ms);
        while self.phase_ms >= self.period_ms {
            self.phase_ms -= self.period_ms;
            self.pin.toggle()?;
            self.toggles = self.toggles.wrapping_add(1);
        }
        Ok(())
    }

    pub fn into_pin(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    #[derive(Default)]
    struct MemPin {
        high: bool,
    }

    impl ErrorType for MemPin {
        type Error = Infallible;
    }

    impl OutputPin for MemPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for MemPin {
        fn is_set_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }
        fn is_set_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    #[test]
    fn toggles_once_per_period() {
        let mut hb = Heartbeat::new(MemPin::default(), 1000);
        hb.tick(999).unwrap();
        assert_eq!(hb.toggles(), 0);
        hb.tick(1).unwrap();
        assert_eq!(hb.toggles(), 1);
        assert!(hb.is_lit().unwrap());
        hb.tick(1000).unwrap();
        assert!(!hb.is_lit().unwrap());
    }

    #[test]
    fn long_gap_catches_up() {
        let mut hb = Heartbeat::new(MemPin::default(), 250);
        hb.tick(1000).unwrap();
        assert_eq!(hb.toggles(), 4);
        assert!(!hb.is_lit().unwrap());
    }

    #[test]
    fn zero_period_never_toggles() {
        let mut hb = Heartbeat::new(MemPin::default(), 0);
        hb.tick(10_000).unwrap();
        assert_eq!(hb.toggles(), 0);
        assert!(!hb.into_pin().high);
    }
}
