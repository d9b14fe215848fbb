//! Clocks which map wall-clock time onto beacon chain slots.
//!
//! The execution layer stub only ever reads time through a `SlotClock`, so tests can drive it
//! with a `ManualSlotClock` and embedders with a `SystemTimeSlotClock`.
mod manual_slot_clock;
mod system_time_slot_clock;

use std::time::Duration;
use types::Epoch;

pub use crate::manual_slot_clock::ManualSlotClock;
pub use crate::system_time_slot_clock::SystemTimeSlotClock;
pub use types::Slot;

/// A source of the current slot and of slot start times.
///
/// Time is measured as a `Duration` since `UNIX_EPOCH`. Implementations may go backwards.
pub trait SlotClock: Send + Sync + Sized + Clone {
    /// Creates a clock whose `genesis_slot` starts `genesis_duration` after `UNIX_EPOCH`, with
    /// consecutive slots `slot_duration` apart.
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self;

    /// The present time, or `None` if it cannot be read.
    fn now_duration(&self) -> Option<Duration>;

    fn slot_duration(&self) -> Duration;

    fn genesis_slot(&self) -> Slot;

    fn genesis_duration(&self) -> Duration;

    /// The slot containing `now`, or `None` before genesis.
    fn slot_of(&self, now: Duration) -> Option<Slot> {
        let since_genesis = now.checked_sub(self.genesis_duration())?;
        let slots = since_genesis
            .as_millis()
            .checked_div(self.slot_duration().as_millis())?;
        Some(self.genesis_slot() + u64::try_from(slots).ok()?)
    }

    /// The start of `slot`, or `None` for slots before genesis.
    fn start_of(&self, slot: Slot) -> Option<Duration> {
        let slots_since_genesis: u32 = slot
            .as_u64()
            .checked_sub(self.genesis_slot().as_u64())?
            .try_into()
            .ok()?;
        self.genesis_duration()
            .checked_add(self.slot_duration().checked_mul(slots_since_genesis)?)
    }

    fn now(&self) -> Option<Slot> {
        self.slot_of(self.now_duration()?)
    }

    fn is_prior_to_genesis(&self) -> Option<bool> {
        Some(self.now_duration()? < self.genesis_duration())
    }

    /// The present slot, clamped to the genesis slot before genesis.
    fn now_or_genesis(&self) -> Option<Slot> {
        if self.is_prior_to_genesis()? {
            Some(self.genesis_slot())
        } else {
            self.now()
        }
    }

    /// Whole seconds since `UNIX_EPOCH` at the start of `slot`, as execution payloads carry it.
    fn timestamp_of(&self, slot: Slot) -> Option<u64> {
        self.start_of(slot).map(|start| start.as_secs())
    }

    /// The start of the first slot of `epoch`.
    fn start_of_epoch(&self, epoch: Epoch, slots_per_epoch: u64) -> Option<Duration> {
        self.start_of(epoch.start_slot(slots_per_epoch))
    }
}
