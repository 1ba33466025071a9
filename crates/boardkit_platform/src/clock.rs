//! Clock frequencies attached to clock-carrying pins.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The frequency of a clock input, stored in Hertz.
///
/// Parses from strings like `"30MHz"`, `"12 MHz"`, `"100kHz"` or a bare number
/// of Hertz. Displays in the largest unit that keeps the value at or above one.
/// Serializes as a number of Hertz and deserializes from either form.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Clock(f64);

impl Clock {
    /// Creates a clock from a frequency in Hertz.
    pub fn hz(hz: f64) -> Self {
        Self(hz)
    }

    /// Creates a clock from a frequency in megahertz.
    pub fn mhz(mhz: f64) -> Self {
        Self(mhz * 1_000_000.0)
    }

    /// Returns the frequency in Hertz.
    pub fn frequency(&self) -> f64 {
        self.0
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Clock({self})")
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0;
        if hz >= 1e9 {
            write!(f, "{}GHz", hz / 1e9)
        } else if hz >= 1e6 {
            write!(f, "{}MHz", hz / 1e6)
        } else if hz >= 1e3 {
            write!(f, "{}kHz", hz / 1e3)
        } else {
            write!(f, "{hz}Hz")
        }
    }
}

/// A clock string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock frequency: '{input}'")]
pub struct ParseClockError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Clock {
    type Err = ParseClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseClockError {
            input: trimmed.to_string(),
        };

        let lower = trimmed.to_ascii_lowercase();
        let (number, scale) = [("ghz", 1e9), ("mhz", 1e6), ("khz", 1e3), ("hz", 1.0)]
            .into_iter()
            .find_map(|(suffix, scale)| lower.strip_suffix(suffix).map(|n| (n, scale)))
            .unwrap_or((lower.as_str(), 1.0));

        let value: f64 = number.trim().parse().map_err(|_| err())?;
        if !value.is_finite() || value <= 0.0 {
            return Err(err());
        }
        Ok(Clock(value * scale))
    }
}

impl<'de> Deserialize<'de> for Clock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ClockVisitor;

        impl Visitor<'_> for ClockVisitor {
            type Value = Clock;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a frequency such as \"30MHz\" or a number of Hertz")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Clock, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Clock, E> {
                if v.is_finite() && v > 0.0 {
                    Ok(Clock(v))
                } else {
                    Err(E::custom(format!("invalid clock frequency: '{v}'")))
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Clock, E> {
                self.visit_f64(v as f64)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Clock, E> {
                self.visit_f64(v as f64)
            }
        }

        deserializer.deserialize_any(ClockVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!("30MHz".parse::<Clock>().unwrap(), Clock::mhz(30.0));
        assert_eq!("12 mhz".parse::<Clock>().unwrap(), Clock::hz(12e6));
        assert_eq!("100kHz".parse::<Clock>().unwrap(), Clock::hz(100e3));
        assert_eq!("1GHz".parse::<Clock>().unwrap(), Clock::hz(1e9));
        assert_eq!("25000000".parse::<Clock>().unwrap(), Clock::hz(25e6));
    }

    #[test]
    fn rejects_nonsense_and_nonpositive() {
        assert!("fast".parse::<Clock>().is_err());
        assert!("0MHz".parse::<Clock>().is_err());
        assert!("-5Hz".parse::<Clock>().is_err());
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let clocks: Vec<Clock> = serde_json::from_str(r#"["30MHz", 12000000, 1.5e6]"#).unwrap();
        assert_eq!(clocks, vec![Clock::mhz(30.0), Clock::mhz(12.0), Clock::mhz(1.5)]);

        let err = serde_json::from_str::<Clock>(r#""fast""#).unwrap_err();
        assert!(err.to_string().contains("invalid clock frequency: 'fast'"));
        assert!(serde_json::from_str::<Clock>("0").is_err());
    }

    #[test]
    fn serializes_as_hertz() {
        assert_eq!(serde_json::to_string(&Clock::mhz(12.0)).unwrap(), "12000000.0");
    }

    #[test]
    fn display() {
        assert_eq!(Clock::mhz(30.0).to_string(), "30MHz");
        assert_eq!(Clock::hz(38_800.0).to_string(), "38.8kHz");
        assert_eq!(Clock::hz(500.0).to_string(), "500Hz");
    }
}
