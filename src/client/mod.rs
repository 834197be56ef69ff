//! Logical devices fed by the interrupt dispatcher.
//!
//! A client owns a set of input-port pins (its mask) and a small state
//! machine. The dispatcher calls [`Client::process()`] with the subset of
//! its pins that changed plus the full port byte; the application later
//! drains the result through the client's own query methods.
//!
//! Clients keep their state in [`Cell`](core::cell::Cell)s so the dispatch
//! table can hold plain shared references while the application reads
//! results through the same references.

mod debounced;
mod quadrature;

pub use debounced::DebouncedInput;
pub use quadrature::{Direction, QuadratureDecoder, QuadratureState};

/// Event sink for pin changes on the expander's input port.
pub trait Client {
    /// Input-port bits this client listens to.
    fn pin_mask(&self) -> u8;

    /// Handle a change.
    ///
    /// * `pins` - the changed bits routed to this client (never zero)
    /// * `state` - the whole input-port byte as just read
    ///
    /// Returns `true` if the event was consumed.
    fn process(&self, pins: u8, state: u8) -> bool;

    /// Seed internal state from the port value captured when interrupts
    /// are armed, without producing an event.
    fn baseline(&self, _state: u8) {}
}
