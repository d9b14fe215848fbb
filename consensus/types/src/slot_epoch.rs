//! The `Slot` and `Epoch` types are defined as new types over u64 to enforce type-safety between
//! the two types.
//!
//! `Slot` and `Epoch` have implementations which permit conversion, comparison and math operations
//! between each and `u64`, however specifically not between each other.
//!
//! All math operations on `Slot` and `Epoch` are saturating, they never wrap.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(#[serde(with = "serde_utils::quoted_u64")] u64);

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(#[serde(with = "serde_utils::quoted_u64")] u64);

macro_rules! impl_u64_newtype {
    ($type: ident) => {
        impl $type {
            pub const fn new(value: u64) -> Self {
                $type(value)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            pub const fn max_value() -> Self {
                $type(u64::MAX)
            }
        }

        impl From<u64> for $type {
            fn from(value: u64) -> Self {
                $type(value)
            }
        }

        impl From<$type> for u64 {
            fn from(value: $type) -> u64 {
                value.0
            }
        }

        impl Add<u64> for $type {
            type Output = $type;

            fn add(self, other: u64) -> $type {
                $type(self.0.saturating_add(other))
            }
        }

        impl Add<$type> for $type {
            type Output = $type;

            fn add(self, other: $type) -> $type {
                $type(self.0.saturating_add(other.0))
            }
        }

        impl AddAssign<u64> for $type {
            fn add_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_add(other);
            }
        }

        impl Sub<u64> for $type {
            type Output = $type;

            fn sub(self, other: u64) -> $type {
                $type(self.0.saturating_sub(other))
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $type {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($type), self.0)
            }
        }
    };
}

impl_u64_newtype!(Slot);
impl_u64_newtype!(Epoch);

impl Slot {
    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0.checked_div(slots_per_epoch).unwrap_or(0))
    }
}

impl Epoch {
    /// The first slot in the epoch.
    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0.saturating_mul(slots_per_epoch))
    }

    /// The last slot in the epoch.
    pub fn end_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::new(
            self.0
                .saturating_add(1)
                .saturating_mul(slots_per_epoch)
                .saturating_sub(1),
        )
    }
}
