//! Client registration table and change routing.
//!
//! Pure bookkeeping: no bus access happens here. The expander reads the
//! port and hands the changed-bit mask to [`DispatchTable::dispatch()`].

use heapless::Vec;

use crate::client::Client;
use crate::error::ExpanderError;
use crate::registers::MAX_CLIENTS;

/// One `(mask, client)` entry.
pub struct Registration<'a> {
    pub mask: u8,
    pub client: &'a dyn Client,
}

/// Ordered, bounded client table.
///
/// Registration order is the tie-break for overlapping masks: a changed
/// bit goes to the first client whose mask contains it and to no one
/// else.
pub struct DispatchTable<'a> {
    entries: Vec<Registration<'a>, MAX_CLIENTS>,
}

impl<'a> Default for DispatchTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DispatchTable<'a> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a client.
    ///
    /// # Errors
    /// * [`ExpanderError::InvalidMask`] if `mask` is zero
    /// * [`ExpanderError::CapacityExceeded`] if the table already holds
    ///   [`MAX_CLIENTS`] entries
    pub fn register<E>(&mut self, mask: u8, client: &'a dyn Client) -> Result<(), ExpanderError<E>> {
        if mask == 0 {
            return Err(ExpanderError::InvalidMask);
        }

        #[cfg(feature = "defmt")]
        {
            let overlap = self.interrupt_mask() & mask;
            if overlap != 0 {
                defmt::warn!(
                    "Client mask {=u8:#b} overlaps {=u8:#b}; earlier client wins",
                    mask,
                    overlap
                );
            }
        }

        self.entries
            .push(Registration { mask, client })
            .map_err(|_| ExpanderError::CapacityExceeded)
    }

    /// OR of every registered mask.
    pub fn interrupt_mask(&self) -> u8 {
        self.entries.iter().fold(0, |acc, entry| acc | entry.mask)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seed every client from the port value captured at arm time.
    pub fn baseline(&self, state: u8) {
        for entry in &self.entries {
            entry.client.baseline(state);
        }
    }

    /// Route `changed` bits to clients in registration order.
    ///
    /// Each client sees only the changed bits it claimed, together with the
    /// full port byte `state`. Stops as soon as every changed bit is
    /// claimed. Returns the bits that were delivered to some client.
    pub fn dispatch(&self, changed: u8, state: u8) -> u8 {
        let mut remaining = changed;

        for entry in &self.entries {
            if remaining == 0 {
                break;
            }
            let pins = entry.mask & remaining;
            if pins == 0 {
                continue;
            }
            remaining &= !pins;

            if !entry.client.process(pins, state) {
                #[cfg(feature = "defmt")]
                defmt::trace!("Client ignored pins {=u8:#b}", pins);
            }
        }

        changed & !remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::vec::Vec as StdVec;

    /// Records every `process()` call.
    struct Recorder {
        mask: u8,
        calls: RefCell<StdVec<(u8, u8)>>,
    }

    impl Recorder {
        fn new(mask: u8) -> Self {
            Self {
                mask,
                calls: RefCell::new(StdVec::new()),
            }
        }

        fn calls(&self) -> StdVec<(u8, u8)> {
            self.calls.borrow().clone()
        }
    }

    impl Client for Recorder {
        fn pin_mask(&self) -> u8 {
            self.mask
        }

        fn process(&self, pins: u8, state: u8) -> bool {
            self.calls.borrow_mut().push((pins, state));
            true
        }
    }

    #[test]
    fn interrupt_mask_is_or_of_masks() {
        let a = Recorder::new(0b0000_0100);
        let b = Recorder::new(0b0001_1000);
        let mut table = DispatchTable::new();
        table.register::<()>(a.mask, &a).unwrap();
        table.register::<()>(b.mask, &b).unwrap();
        assert_eq!(table.interrupt_mask(), 0b0001_1100);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn routes_only_matching_bits() {
        let a = Recorder::new(0b0000_0011);
        let b = Recorder::new(0b0011_0000);
        let mut table = DispatchTable::new();
        table.register::<()>(a.mask, &a).unwrap();
        table.register::<()>(b.mask, &b).unwrap();

        let delivered = table.dispatch(0b0001_0001, 0b1001_0001);
        assert_eq!(delivered, 0b0001_0001);
        assert_eq!(a.calls(), [(0b0000_0001, 0b1001_0001)]);
        assert_eq!(b.calls(), [(0b0001_0000, 0b1001_0001)]);
    }

    #[test]
    fn earliest_registration_claims_overlapping_bits() {
        let first = Recorder::new(0b0000_0110);
        let second = Recorder::new(0b0000_1100);
        let mut table = DispatchTable::new();
        table.register::<()>(first.mask, &first).unwrap();
        table.register::<()>(second.mask, &second).unwrap();

        table.dispatch(0b0000_1100, 0b0000_1100);
        assert_eq!(first.calls(), [(0b0000_0100, 0b0000_1100)]);
        assert_eq!(second.calls(), [(0b0000_1000, 0b0000_1100)]);

        // Only the shared bit changed: the later client never sees it.
        table.dispatch(0b0000_0100, 0b0000_1000);
        assert_eq!(first.calls().len(), 2);
        assert_eq!(second.calls().len(), 1);
    }

    #[test]
    fn unclaimed_bits_are_not_delivered() {
        let a = Recorder::new(0b0000_0001);
        let mut table = DispatchTable::new();
        table.register::<()>(a.mask, &a).unwrap();

        assert_eq!(table.dispatch(0b1000_0000, 0b1000_0000), 0);
        assert!(a.calls().is_empty());
    }

    #[test]
    fn stops_once_all_bits_claimed() {
        let a = Recorder::new(0b0000_0001);
        let b = Recorder::new(0b0000_0001);
        let c = Recorder::new(0b0000_0010);
        let mut table = DispatchTable::new();
        for client in [&a, &b, &c] {
            table.register::<()>(client.mask, client).unwrap();
        }

        table.dispatch(0b0000_0001, 0b0000_0001);
        assert_eq!(a.calls().len(), 1);
        assert!(b.calls().is_empty());
        assert!(c.calls().is_empty());
    }

    #[test]
    fn rejects_empty_mask() {
        let a = Recorder::new(0);
        let mut table = DispatchTable::new();
        assert_eq!(
            table.register::<()>(0, &a),
            Err(ExpanderError::InvalidMask)
        );
        assert!(table.is_empty());
    }

    #[test]
    fn reports_capacity_exceeded() {
        let a = Recorder::new(1);
        let mut table = DispatchTable::new();
        for _ in 0..MAX_CLIENTS {
            table.register::<()>(1, &a).unwrap();
        }
        assert_eq!(
            table.register::<()>(1, &a),
            Err(ExpanderError::CapacityExceeded)
        );
        assert_eq!(table.len(), MAX_CLIENTS);
    }
}
