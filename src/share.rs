// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-slot shared variables.
//!
//! A [`SharedState`] is the only channel between tasks: one value, last write wins, no queueing
//! and no change notification. Readers that need to know "is this new" pair a value slot with a
//! boolean handoff flag that the producer sets and the consumer clears.
//!
//! Slots are built in `const` context so a whole registry can live in a `static` and is fully
//! initialised before the scheduler starts.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

/// One `Copy` value guarded by a critical section.
pub struct SharedState<T: Copy> {
    slot: Mutex<Cell<T>>,
}

impl<T: Copy> SharedState<T> {
    /// Create a slot holding `init`.
    pub const fn new(init: T) -> Self {
        Self {
            slot: Mutex::new(Cell::new(init)),
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> T {
        critical_section::with(|cs| self.slot.borrow(cs).get())
    }

    /// Overwrite the value from task context.
    #[inline]
    pub fn put(&self, value: T) {
        critical_section::with(|cs| self.slot.borrow(cs).set(value));
    }

    /// Overwrite the value from inside a critical section an interrupt handler already holds.
    #[inline]
    pub fn put_from_interrupt(&self, cs: CriticalSection<'_>, value: T) {
        self.slot.borrow(cs).set(value);
    }

    /// Replace the value and return the previous one in a single critical section.
    #[inline]
    pub fn replace(&self, value: T) -> T {
        critical_section::with(|cs| self.slot.borrow(cs).replace(value))
    }
}

impl<T: Copy + Default> Default for SharedState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Copy + core::fmt::Debug> core::fmt::Debug for SharedState<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SharedState").field(&self.get()).finish()
    }
}
