//! Interrupt-context plumbing.
//!
//! The INT pin handler does one thing: [`PendingFlag::raise()`]. All bus
//! traffic happens later in [`PortExpander::process()`](crate::PortExpander::process),
//! which drains the flag with [`PendingFlag::take()`].
//!
//! Instead of a global "current expander" pointer, the flag is handed to
//! the platform's [`InterruptLine`] when the expander starts. The handler
//! gets its context from there.

use core::cell::Cell;

use critical_section::Mutex;

/// Controller pin edge that should trigger the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    Change,
}

/// One-bit mailbox between the interrupt handler and the foreground loop.
///
/// `raise()` is safe to call from interrupt context. `take()` reads and
/// clears inside a critical section so an edge landing between the read
/// and the clear is never lost.
pub struct PendingFlag {
    pending: Mutex<Cell<bool>>,
}

impl Default for PendingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingFlag {
    /// A cleared flag. `const` so it can live in a `static`.
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(false)),
        }
    }

    /// Mark an interrupt as pending. Call this from the INT pin handler.
    pub fn raise(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(true));
    }

    /// Read and clear the flag atomically.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).replace(false))
    }

    /// Peek without clearing.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }
}

/// Platform edge-interrupt primitive for the controller pin wired to the
/// expander's INT output.
///
/// Implementations arrange for `pending.raise()` to run whenever `edge` is
/// seen on the pin, until `detach()` is called.
pub trait InterruptLine<'a> {
    /// Start delivering edges to `pending`.
    fn attach(&mut self, edge: Edge, pending: &'a PendingFlag);

    /// Stop delivering edges.
    fn detach(&mut self);
}

/// Interrupt line for expanders built without event routing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterrupt;

impl<'a> InterruptLine<'a> for NoInterrupt {
    fn attach(&mut self, _edge: Edge, _pending: &'a PendingFlag) {}

    fn detach(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_flag() {
        let flag = PendingFlag::new();
        assert!(!flag.take());

        flag.raise();
        assert!(flag.is_pending());
        assert!(flag.take());
        assert!(!flag.is_pending());
        assert!(!flag.take());
    }

    #[test]
    fn repeated_raises_coalesce() {
        let flag = PendingFlag::new();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }
}
