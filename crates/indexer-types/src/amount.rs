//! Fixed-point monetary amounts.
//!
//! All amounts flowing through the pipeline are normalized to an 18-digit
//! fixed-point scale by the chain client, regardless of the chain's native
//! decimal count. Internally this is a signed 128-bit integer of raw units;
//! `Amount::SCALE` is the power-of-ten divisor for display purposes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Amount(pub i128);

impl Amount {
    pub const SCALE: u32 = 18;
    pub const ZERO: Amount = Amount(0);

    pub fn from_raw(raw: i128) -> Self {
        Amount(raw)
    }

    /// Normalize a chain-native raw integer amount (given the chain's own
    /// decimal count) into this platform's 18-digit fixed-point scale.
    pub fn normalize(native_raw: u128, native_decimals: u32) -> Self {
        let diff = Self::SCALE as i64 - native_decimals as i64;
        let raw = if diff >= 0 {
            (native_raw as i128) * 10i128.pow(diff as u32)
        } else {
            (native_raw as i128) / 10i128.pow((-diff) as u32)
        };
        Amount(raw)
    }

    pub fn is_non_negative(&self) -> bool {
        self.0 >= 0
    }

    /// Percent change from `self` (the prior value) to `new`, `0` if `self`
    /// is zero (per the balance-series delta contract).
    pub fn percent_change_to(&self, new: Amount) -> f64 {
        if self.0 == 0 {
            return 0.0;
        }
        ((new.0 - self.0) as f64 / self.0 as f64) * 100.0
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10i128.pow(Self::SCALE);
        let whole = self.0 / scale;
        let frac = (self.0 % scale).abs();
        write!(f, "{whole}.{frac:018}")
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}
