//! Parameter domains for the admission policy.

use crate::errors::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exact non-negative fraction in `[0, 1)`, used as the vacancy threshold.
///
/// Comparisons against it are done by cross-multiplication in integers; the
/// checked constructor guarantees `den > 0`, so no division ever occurs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ratio {
    num: u32,
    den: u32,
}

impl Ratio {
    /// Construct a ratio, requiring `den > 0` and `num / den < 1`.
    pub fn new_checked(num: u32, den: u32) -> Result<Self, CoreError> {
        if den == 0 || num >= den {
            return Err(CoreError::InvalidRatio);
        }
        Ok(Ratio { num, den })
    }

    /// Exact zero (every positive vacancy passes the threshold).
    pub const ZERO: Ratio = Ratio { num: 0, den: 1 };

    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn den(&self) -> u32 {
        self.den
    }

    /// True iff `lhs_num / lhs_den > self`, compared exactly in u64.
    pub fn exceeded_by(&self, lhs_num: u32, lhs_den: u32) -> bool {
        debug_assert!(lhs_den > 0, "caller must supply a positive denominator");
        (lhs_num as u64) * (self.den as u64) > (self.num as u64) * (lhs_den as u64)
    }
}

/// Parameters of the threshold-based admission policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdParams {
    /// Minimum number of active resources each visited group is topped up to.
    pub min_active_per_group: u32,
    /// A resource is available iff its vacancy ratio strictly exceeds this.
    pub vacancy_threshold: Ratio,
}
