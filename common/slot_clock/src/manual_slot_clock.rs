use super::SlotClock;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use types::Slot;

/// Determines the present slot based upon a manually-set UNIX timestamp.
///
/// Clones share the same current time.
#[derive(Clone)]
pub struct ManualSlotClock {
    genesis_slot: Slot,
    /// Duration from UNIX epoch to genesis.
    genesis_duration: Duration,
    /// Duration from UNIX epoch to right now.
    current_time: Arc<RwLock<Duration>>,
    /// The length of each slot.
    slot_duration: Duration,
}

impl ManualSlotClock {
    /// Moves the clock to the start of `slot`. Slots prior to genesis are ignored.
    pub fn set_slot(&self, slot: u64) {
        if let Some(start) = self.start_of(Slot::new(slot)) {
            *self.current_time.write() = start;
        }
    }

    pub fn set_current_time(&self, duration: Duration) {
        *self.current_time.write() = duration;
    }

    pub fn advance_time(&self, duration: Duration) {
        let mut current_time = self.current_time.write();
        *current_time = current_time.saturating_add(duration);
    }

    pub fn advance_slot(&self) {
        if let Some(slot) = self.now() {
            self.set_slot(slot.as_u64().saturating_add(1))
        }
    }
}

impl SlotClock for ManualSlotClock {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self {
        if slot_duration.as_millis() == 0 {
            panic!("ManualSlotClock cannot have a < 1ms slot duration");
        }

        Self {
            genesis_slot,
            current_time: Arc::new(RwLock::new(genesis_duration)),
            genesis_duration,
            slot_duration,
        }
    }

    fn now_duration(&self) -> Option<Duration> {
        Some(*self.current_time.read())
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    fn genesis_slot(&self) -> Slot {
        self.genesis_slot
    }

    fn genesis_duration(&self) -> Duration {
        self.genesis_duration
    }
}
