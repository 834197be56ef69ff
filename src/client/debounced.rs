//! Single-pin level latch with a one-shot "changed" flag.

use core::cell::Cell;

use crate::client::Client;
use crate::error::InvalidPin;
use crate::registers::PINS_PER_PORT;

/// Edge detector for one input pin (a push button, a switch).
///
/// There is no time-based filtering: every level flip the dispatcher
/// reports is latched. Bounce shows up as extra flips.
///
/// # Example
///
/// ```
/// use mcp23017_driver::{Client, DebouncedInput};
///
/// let button = DebouncedInput::new(2).unwrap();
/// button.process(0b0000_0100, 0b0000_0100);
/// assert!(button.changed());
/// assert!(!button.changed());
/// assert!(button.state());
/// ```
pub struct DebouncedInput {
    pin: u8,
    level: Cell<bool>,
    changed: Cell<bool>,
}

impl DebouncedInput {
    /// Watch input-port pin `pin` (0-7).
    pub fn new(pin: u8) -> Result<Self, InvalidPin> {
        if pin >= PINS_PER_PORT {
            return Err(InvalidPin);
        }
        Ok(Self {
            pin,
            level: Cell::new(false),
            changed: Cell::new(false),
        })
    }

    /// Pin index on the input port.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// `true` once after each observed level flip.
    pub fn changed(&self) -> bool {
        self.changed.replace(false)
    }

    /// Last observed level. No side effects.
    pub fn state(&self) -> bool {
        self.level.get()
    }

    fn bit(&self, state: u8) -> bool {
        state & (1 << self.pin) != 0
    }
}

impl Client for DebouncedInput {
    fn pin_mask(&self) -> u8 {
        1 << self.pin
    }

    fn process(&self, _pins: u8, state: u8) -> bool {
        let level = self.bit(state);
        if level != self.level.get() {
            self.level.set(level);
            self.changed.set(true);
        }
        true
    }

    fn baseline(&self, state: u8) {
        self.level.set(self.bit(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_pin() {
        assert!(DebouncedInput::new(8).is_err());
        assert!(DebouncedInput::new(7).is_ok());
    }

    #[test]
    fn changed_fires_once_per_flip() {
        let input = DebouncedInput::new(3).unwrap();
        assert!(!input.changed());

        input.process(0b1000, 0b1000);
        assert!(input.state());
        assert!(input.changed());
        assert!(!input.changed());

        input.process(0b1000, 0b0000);
        assert!(!input.state());
        assert!(input.changed());
        assert!(!input.changed());
    }

    #[test]
    fn same_level_is_not_a_change() {
        let input = DebouncedInput::new(0).unwrap();
        // Other pins moving must not register on this one.
        input.process(0b0001, 0b1110);
        assert!(!input.changed());
        assert!(!input.state());
    }

    #[test]
    fn two_flips_before_query_report_once() {
        let input = DebouncedInput::new(1).unwrap();
        input.process(0b10, 0b10);
        input.process(0b10, 0b00);
        assert!(input.changed());
        assert!(!input.changed());
        assert!(!input.state());
    }

    #[test]
    fn baseline_sets_level_silently() {
        let input = DebouncedInput::new(5).unwrap();
        input.baseline(0b0010_0000);
        assert!(input.state());
        assert!(!input.changed());

        input.process(0b0010_0000, 0);
        assert!(input.changed());
        assert!(!input.state());
    }

    #[test]
    fn always_reports_handled() {
        let input = DebouncedInput::new(0).unwrap();
        assert!(input.process(1, 1));
        assert!(input.process(1, 1));
    }
}
