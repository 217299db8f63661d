use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "KWD";
/// The currency's minor-unit precision is three decimal places (1 KWD = 1000 fils).
pub const MINOR_UNITS_PER_MAJOR: i64 = 1_000;

//--------------------------------------       Money         ---------------------------------------------------------
/// A fixed-point monetary amount, stored as a whole number of minor units.
///
/// On the wire (JSON from the store, API requests and responses) amounts are decimal numbers in major units, e.g.
/// `2.25`. Conversion rounds to the nearest minor unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from_minor(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl TryFrom<f64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(MoneyConversionError(value.to_string()));
        }
        let minor = (value * MINOR_UNITS_PER_MAJOR as f64).round();
        if minor > i64::MAX as f64 || minor < i64::MIN as f64 {
            return Err(MoneyConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(minor as i64))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / per, abs % per)
    }
}

impl Money {
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Self(major * MINOR_UNITS_PER_MAJOR)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_major(&self) -> f64 {
        self.0 as f64 / MINOR_UNITS_PER_MAJOR as f64
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `percent`% of this amount, rounded to the nearest minor unit.
    pub fn percent(&self, percent: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self((self.0 as f64 * percent / 100.0).round() as i64)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Numeric columns may come back as JSON numbers or, for high-precision types, as strings
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(f64),
            Text(String),
        }
        let value = match Wire::deserialize(deserializer)? {
            Wire::Number(v) => v,
            Wire::Text(s) => s.trim().parse::<f64>().map_err(de::Error::custom)?,
        };
        Money::try_from(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_uses_three_decimals() {
        assert_eq!(Money::from_minor(2_250).to_string(), "2.250");
        assert_eq!(Money::from_major(10).to_string(), "10.000");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.005");
    }

    #[test]
    fn conversion_from_decimal_rounds_to_minor_units() {
        assert_eq!(Money::try_from(1.75).unwrap(), Money::from_minor(1_750));
        assert_eq!(Money::try_from(0.1 + 0.2).unwrap(), Money::from_minor(300));
        assert_eq!(Money::try_from(2.0004).unwrap(), Money::from_minor(2_000));
        assert!(Money::try_from(f64::NAN).is_err());
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_minor(8_000);
        let b = Money::from_minor(1_600);
        assert_eq!(a - b + Money::from_major(1), Money::from_minor(7_400));
        assert_eq!(b * 3, Money::from_minor(4_800));
        assert_eq!(vec![a, b].into_iter().sum::<Money>(), Money::from_minor(9_600));
        assert_eq!(Money::from_major(10).percent(20.0), Money::from_major(2));
        assert!((-a).is_negative());
    }

    #[test]
    fn serde_wire_format() {
        let m: Money = serde_json::from_str("2.25").unwrap();
        assert_eq!(m, Money::from_minor(2_250));
        let m: Money = serde_json::from_str("\"3.5\"").unwrap();
        assert_eq!(m, Money::from_minor(3_500));
        assert_eq!(serde_json::to_string(&Money::from_minor(7_400)).unwrap(), "7.4");
    }
}
