use super::{ManualSlotClock, SlotClock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use types::Slot;

/// Determines the present slot based upon the present system time.
#[derive(Clone)]
pub struct SystemTimeSlotClock {
    clock: ManualSlotClock,
}

impl SlotClock for SystemTimeSlotClock {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self {
        Self {
            clock: ManualSlotClock::new(genesis_slot, genesis_duration, slot_duration),
        }
    }

    fn now_duration(&self) -> Option<Duration> {
        SystemTime::now().duration_since(UNIX_EPOCH).ok()
    }

    fn slot_duration(&self) -> Duration {
        self.clock.slot_duration()
    }

    fn genesis_slot(&self) -> Slot {
        self.clock.genesis_slot()
    }

    fn genesis_duration(&self) -> Duration {
        self.clock.genesis_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_now() {
        let prior_genesis = |milliseconds_prior: u64| {
            let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
            let genesis = now + Duration::from_millis(milliseconds_prior);
            SystemTimeSlotClock::new(Slot::new(0), genesis, Duration::from_secs(1))
        };

        assert_eq!(prior_genesis(5_000).now(), None);
        assert_eq!(prior_genesis(5_000).is_prior_to_genesis(), Some(true));
        assert_eq!(prior_genesis(5_000).now_or_genesis(), Some(Slot::new(0)));

        let genesis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let clock = SystemTimeSlotClock::new(
            Slot::new(0),
            genesis - Duration::from_secs(10),
            Duration::from_secs(1),
        );
        assert!(clock.now().unwrap() >= Slot::new(10));
        assert_eq!(clock.is_prior_to_genesis(), Some(false));
    }
}
