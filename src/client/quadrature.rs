//! Table-driven quadrature decoder.
//!
//! The two encoder phases form a 2-bit pattern `(b << 1) | a`. With the
//! detent at `00`, one clockwise step walks
//! `00 -> 01 -> 11 -> 10 -> 00` and one counter-clockwise step walks the
//! reverse. The decoder follows that walk through seven states and only
//! emits a count on the final return to [`QuadratureState::Start`], so a
//! half step that bounces back never counts.

use core::cell::Cell;

use crate::client::Client;
use crate::error::InvalidPin;
use crate::registers::PINS_PER_PORT;

/// Decoder automaton state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QuadratureState {
    Start = 0,
    CwBegin = 1,
    CwNext = 2,
    CwFinal = 3,
    CcwBegin = 4,
    CcwNext = 5,
    CcwFinal = 6,
}

/// Rotation direction of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    fn delta(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// One cell of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    next: QuadratureState,
    emit: Option<Direction>,
}

const fn to(next: QuadratureState) -> Transition {
    Transition { next, emit: None }
}

const fn step(direction: Direction) -> Transition {
    Transition {
        next: QuadratureState::Start,
        emit: Some(direction),
    }
}

use QuadratureState::*;

/// `TABLE[state][pattern]`, patterns ordered `00, 01, 10, 11`.
const TABLE: [[Transition; 4]; 7] = [
    // Start
    [to(Start), to(CwBegin), to(CcwBegin), to(Start)],
    // CwBegin
    [to(Start), to(CwBegin), to(Start), to(CwNext)],
    // CwNext
    [to(Start), to(CwBegin), to(CwFinal), to(CwNext)],
    // CwFinal
    [step(Direction::Clockwise), to(Start), to(CwFinal), to(CwNext)],
    // CcwBegin
    [to(Start), to(Start), to(CcwBegin), to(CcwNext)],
    // CcwNext
    [to(Start), to(CcwFinal), to(CcwBegin), to(CcwNext)],
    // CcwFinal
    [step(Direction::CounterClockwise), to(CcwFinal), to(Start), to(CcwNext)],
];

/// Rotary encoder on two input-port pins.
///
/// # Example
///
/// ```
/// use mcp23017_driver::{Client, QuadratureDecoder};
///
/// let knob = QuadratureDecoder::new(0, 1).unwrap();
/// for state in [0b01, 0b11, 0b10, 0b00] {
///     knob.process(0b11, state);
/// }
/// assert_eq!(knob.count(), 1);
/// assert_eq!(knob.count(), 0);
/// ```
pub struct QuadratureDecoder {
    pin_a: u8,
    pin_b: u8,
    state: Cell<QuadratureState>,
    count: Cell<i32>,
}

impl QuadratureDecoder {
    /// Decode phases on input-port pins `pin_a` (pattern low bit) and
    /// `pin_b` (pattern high bit). Pins must be distinct and in 0-7.
    pub fn new(pin_a: u8, pin_b: u8) -> Result<Self, InvalidPin> {
        if pin_a >= PINS_PER_PORT || pin_b >= PINS_PER_PORT || pin_a == pin_b {
            return Err(InvalidPin);
        }
        Ok(Self {
            pin_a,
            pin_b,
            state: Cell::new(Start),
            count: Cell::new(0),
        })
    }

    /// Signed steps since the last call (clockwise positive). Clears the
    /// accumulator.
    pub fn count(&self) -> i32 {
        self.count.replace(0)
    }

    /// Current automaton state. No side effects.
    pub fn automaton_state(&self) -> QuadratureState {
        self.state.get()
    }

    fn pattern(&self, state: u8) -> usize {
        let a = (state >> self.pin_a) & 1;
        let b = (state >> self.pin_b) & 1;
        ((b << 1) | a) as usize
    }
}

impl Client for QuadratureDecoder {
    fn pin_mask(&self) -> u8 {
        (1 << self.pin_a) | (1 << self.pin_b)
    }

    fn process(&self, _pins: u8, state: u8) -> bool {
        let transition = TABLE[self.state.get() as usize][self.pattern(state)];
        self.state.set(transition.next);

        if let Some(direction) = transition.emit {
            self.count.set(self.count.get().wrapping_add(direction.delta()));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &QuadratureDecoder, patterns: &[u8]) {
        for &pattern in patterns {
            decoder.process(decoder.pin_mask(), pattern);
        }
    }

    #[test]
    fn clockwise_step_counts_plus_one() {
        let decoder = QuadratureDecoder::new(0, 1).unwrap();
        feed(&decoder, &[0b00, 0b01, 0b11, 0b10, 0b00]);
        assert_eq!(decoder.count(), 1);
        assert_eq!(decoder.automaton_state(), Start);
    }

    #[test]
    fn counter_clockwise_step_counts_minus_one() {
        let decoder = QuadratureDecoder::new(0, 1).unwrap();
        feed(&decoder, &[0b00, 0b10, 0b11, 0b01, 0b00]);
        assert_eq!(decoder.count(), -1);
    }

    #[test]
    fn aborted_step_counts_nothing() {
        let decoder = QuadratureDecoder::new(0, 1).unwrap();
        feed(&decoder, &[0b00, 0b01, 0b00]);
        assert_eq!(decoder.count(), 0);
        assert_eq!(decoder.automaton_state(), Start);
    }

    #[test]
    fn bounce_inside_a_step_still_counts_once() {
        let decoder = QuadratureDecoder::new(0, 1).unwrap();
        feed(&decoder, &[0b01, 0b11, 0b01, 0b11, 0b10, 0b11, 0b10, 0b00]);
        assert_eq!(decoder.count(), 1);
    }

    #[test]
    fn count_is_read_and_clear() {
        let decoder = QuadratureDecoder::new(0, 1).unwrap();
        for _ in 0..3 {
            feed(&decoder, &[0b01, 0b11, 0b10, 0b00]);
        }
        feed(&decoder, &[0b10, 0b11, 0b01, 0b00]);
        assert_eq!(decoder.count(), 2);
        assert_eq!(decoder.count(), 0);
    }

    #[test]
    fn only_final_to_start_emits() {
        let decoder = QuadratureDecoder::new(0, 1).unwrap();
        feed(&decoder, &[0b01, 0b11, 0b10]);
        assert_eq!(decoder.automaton_state(), CwFinal);
        assert_eq!(decoder.count(), 0);
    }

    #[test]
    fn illegal_jumps_fall_back_to_start() {
        // (prefix reaching a state, two-bit jump from it)
        let cases: [(&[u8], QuadratureState, u8); 7] = [
            (&[], Start, 0b11),
            (&[0b01], CwBegin, 0b10),
            (&[0b10], CcwBegin, 0b01),
            (&[0b01, 0b11], CwNext, 0b00),
            (&[0b10, 0b11], CcwNext, 0b00),
            (&[0b01, 0b11, 0b10], CwFinal, 0b01),
            (&[0b10, 0b11, 0b01], CcwFinal, 0b10),
        ];

        for (prefix, reached, jump) in cases {
            let decoder = QuadratureDecoder::new(0, 1).unwrap();
            feed(&decoder, prefix);
            assert_eq!(decoder.automaton_state(), reached);

            feed(&decoder, &[jump]);
            assert_eq!(decoder.automaton_state(), Start, "{reached:?} + {jump:#04b}");
            assert_eq!(decoder.count(), 0);
        }
    }

    #[test]
    fn counts_only_on_return_to_detent_from_final() {
        for (state, row) in TABLE.iter().enumerate() {
            for (pattern, cell) in row.iter().enumerate() {
                if cell.emit.is_some() {
                    assert_eq!(cell.next, Start);
                    assert_eq!(pattern, 0, "emit only on return to detent");
                    assert!(state == CwFinal as usize || state == CcwFinal as usize);
                }
            }
        }
    }

    #[test]
    fn uses_configured_pins() {
        // Phase A on pin 6, phase B on pin 2; unrelated bits set.
        let decoder = QuadratureDecoder::new(6, 2).unwrap();
        assert_eq!(decoder.pin_mask(), 0b0100_0100);
        feed(
            &decoder,
            &[0b0100_0001, 0b0100_0101, 0b0000_0101, 0b0000_0001],
        );
        assert_eq!(decoder.count(), 1);
    }

    #[test]
    fn rejects_bad_pins() {
        assert!(QuadratureDecoder::new(8, 1).is_err());
        assert!(QuadratureDecoder::new(1, 8).is_err());
        assert!(QuadratureDecoder::new(3, 3).is_err());
    }
}
