use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RecurError, RecurResult};

/// Parameters of `T(n) = aT(n/b) + n^k`.
///
/// Only constructible through [`RecurrenceParams::new`], so every value in
/// circulation satisfies `a >= 1`, `b >= 2` and `k >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct RecurrenceParams {
    a: i64,
    b: i64,
    k: i64,
}

#[derive(Deserialize)]
struct RawParams {
    a: i64,
    b: i64,
    k: i64,
}

impl TryFrom<RawParams> for RecurrenceParams {
    type Error = RecurError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        Self::new(raw.a, raw.b, raw.k)
    }
}

impl RecurrenceParams {
    pub fn new(a: i64, b: i64, k: i64) -> RecurResult<Self> {
        if a <= 0 {
            return Err(RecurError::InvalidParameter(
                "parameter a must be greater than 0".into(),
            ));
        }
        if b <= 1 {
            return Err(RecurError::InvalidParameter(
                "parameter b must be greater than 1".into(),
            ));
        }
        if k < 0 {
            return Err(RecurError::InvalidParameter(
                "parameter k must be non-negative".into(),
            ));
        }
        Ok(Self { a, b, k })
    }

    /// Number of subproblems.
    pub fn a(&self) -> i64 {
        self.a
    }

    /// Factor by which the problem size shrinks.
    pub fn b(&self) -> i64 {
        self.b
    }

    /// Exponent of the non-recursive work `f(n) = n^k`.
    pub fn k(&self) -> i64 {
        self.k
    }

    /// `log_b(a)` as the ratio of natural logarithms.
    pub fn log_b_a(&self) -> f64 {
        (self.a as f64).ln() / (self.b as f64).ln()
    }
}

impl fmt::Display for RecurrenceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a={}, b={}, k={}", self.a, self.b, self.k)
    }
}
