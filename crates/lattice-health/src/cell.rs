//! Lock-free availability cell.
//!
//! State and both streak counters live in one `AtomicU64` so a reader can
//! never see a state paired with the wrong counters:
//!
//! ```text
//! bits 0..8    state
//! bits 8..36   consecutive successes (saturating)
//! bits 36..64  consecutive failures  (saturating)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use lattice_core::AvailabilityState;

const COUNTER_BITS: u32 = 28;
const COUNTER_MAX: u32 = (1 << COUNTER_BITS) - 1;
const SUCCESS_SHIFT: u32 = 8;
const FAILURE_SHIFT: u32 = SUCCESS_SHIFT + COUNTER_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    pub state: AvailabilityState,
    pub successes: u32,
    pub failures: u32,
}

impl AvailabilitySnapshot {
    pub fn new(state: AvailabilityState) -> Self {
        Self {
            state,
            successes: 0,
            failures: 0,
        }
    }

    fn pack(self) -> u64 {
        let successes = u64::from(self.successes.min(COUNTER_MAX));
        let failures = u64::from(self.failures.min(COUNTER_MAX));
        u64::from(self.state.to_bits()) | (successes << SUCCESS_SHIFT) | (failures << FAILURE_SHIFT)
    }

    fn unpack(raw: u64) -> Self {
        let mask = u64::from(COUNTER_MAX);
        Self {
            state: AvailabilityState::from_bits((raw & 0xff) as u8),
            successes: ((raw >> SUCCESS_SHIFT) & mask) as u32,
            failures: ((raw >> FAILURE_SHIFT) & mask) as u32,
        }
    }
}

#[derive(Debug)]
pub struct AvailabilityCell {
    raw: AtomicU64,
}

impl AvailabilityCell {
    pub fn new(state: AvailabilityState) -> Self {
        Self {
            raw: AtomicU64::new(AvailabilitySnapshot::new(state).pack()),
        }
    }

    pub fn load(&self) -> AvailabilitySnapshot {
        AvailabilitySnapshot::unpack(self.raw.load(Ordering::Acquire))
    }

    /// Compare-and-swap loop. Returns `(before, after)`.
    pub fn update(
        &self,
        f: impl Fn(AvailabilitySnapshot) -> AvailabilitySnapshot,
    ) -> (AvailabilitySnapshot, AvailabilitySnapshot) {
        let mut current = self.raw.load(Ordering::Acquire);
        loop {
            let before = AvailabilitySnapshot::unpack(current);
            let after = f(before);
            match self.raw.compare_exchange_weak(
                current,
                after.pack(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return (before, AvailabilitySnapshot::unpack(after.pack())),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for AvailabilityCell {
    fn default() -> Self {
        Self::new(AvailabilityState::Healthy)
    }
}
