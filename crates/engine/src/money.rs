use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as integer minor units (cents).
///
/// The ledger stores every amount and balance as `i64` minor units; this
/// type is the typed view used at the edges (user input, display).
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount: MoneyCents = "12.5".parse().unwrap();
/// assert_eq!(amount.cents(), 1250);
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the amount if it is strictly positive, otherwise a
    /// validation error naming `label`.
    pub fn positive(self, label: &str) -> Result<Self, EngineError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(EngineError::Validation(format!("{label} must be > 0")))
        }
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

fn invalid(reason: &str) -> EngineError {
    EngineError::Validation(format!("invalid amount: {reason}"))
}

/// Parses up to two fractional digits into cents ("5" → 50, "05" → 5).
fn parse_fraction(frac: &str) -> Result<i64, EngineError> {
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a number"));
    }
    match frac.len() {
        0 => Ok(0),
        1 => Ok(i64::from(frac.as_bytes()[0] - b'0') * 10),
        2 => frac.parse::<i64>().map_err(|_| invalid("not a number")),
        _ => Err(invalid("too many decimals")),
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator, an optional leading `+`/`-`
    /// and at most two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed[1..].trim_start()),
            Some(b'+') => (false, trimmed[1..].trim_start()),
            _ => (false, trimmed),
        };
        if digits.is_empty() {
            return Err(invalid("empty"));
        }

        let normalized = digits.replace(',', ".");
        let (units_str, frac_str) = match normalized.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (normalized.as_str(), ""),
        };
        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }

        let units: i64 = units_str.parse().map_err(|_| invalid("too large"))?;
        let cents = parse_fraction(frac_str)?;
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| invalid("too large"))?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}
