//! A millisecond-since-epoch newtype with a validating constructor. Ported from
//! `bandicoot/internal/epoch.go`'s `Epoch`/`EpochFromTime`/`EpochFromInt64`; referenced by
//! the `days` operator (spec §4.9) and the Epoch scalar category (spec §4.3).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Epoch(i64);

impl Epoch {
    /// Accepts only values that look like a millisecond timestamp (13 decimal digits),
    /// matching the Go original's `math.Log10(t)+1 <= 13` guard. This rejects, for
    /// instance, second-resolution timestamps passed in by mistake.
    pub fn from_millis(millis: i64) -> Result<Self, ParseError> {
        let digits = if millis == 0 { 1 } else { (millis.unsigned_abs() as f64).log10() as u32 + 1 };
        if digits <= 13 {
            Ok(Epoch(millis))
        } else {
            Err(ParseError::Syntax(
                "epoch must be an int in milliseconds".to_string(),
                millis.to_string(),
            ))
        }
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Epoch(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plausible_millisecond_timestamp() {
        assert!(Epoch::from_millis(1_700_000_000_000).is_ok());
    }

    #[test]
    fn rejects_values_with_too_many_digits() {
        assert!(Epoch::from_millis(17_000_000_000_000_000).is_err());
    }

    #[test]
    fn from_system_time_round_trips_through_unix_epoch() {
        let epoch = Epoch::from_system_time(UNIX_EPOCH);
        assert_eq!(epoch.millis(), 0);
    }
}
