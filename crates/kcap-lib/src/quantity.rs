//! Resource quantity normalization
//!
//! Converts Kubernetes quantity strings (`"250m"`, `"1.5"`, `"512Mi"`,
//! `"12345678n"`, `"1e3"`) into the two canonical integer units used
//! everywhere else: milli-cores for CPU and mebibytes for memory.
//!
//! Values are rounded up to the requested precision, matching how the API
//! server reports `MilliValue()`/`Value()`. Byte to mebibyte conversion
//! truncates.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;
use tracing::warn;

/// Bytes per mebibyte
pub const MEBIBYTE: i64 = 1024 * 1024;

/// Resource name of CPU in a resource list
pub const CPU: &str = "cpu";

/// Resource name of memory in a resource list
pub const MEMORY: &str = "memory";

/// Largest decimal exponent accepted before the value is out of range
const MAX_EXPONENT: u32 = 30;

/// Largest number of significant digits accepted in the numeric part
const MAX_DIGITS: usize = 30;

/// Errors from parsing a quantity string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    #[error("unknown suffix '{suffix}' in quantity '{quantity}'")]
    UnknownSuffix { quantity: String, suffix: String },

    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

/// A parsed quantity held as an exact fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fraction {
    negative: bool,
    numerator: u128,
    denominator: u128,
}

impl Fraction {
    /// Scale by `factor` and round up to an integer
    fn ceil_scaled(self, factor: u128, raw: &str) -> Result<i64, QuantityError> {
        let out_of_range = || QuantityError::OutOfRange(raw.to_string());

        let scaled = self.numerator.checked_mul(factor).ok_or_else(out_of_range)?;
        let quotient = scaled / self.denominator;
        let remainder = scaled % self.denominator;

        // Rounding up towards +inf means truncation for negative values
        let magnitude = if !self.negative && remainder != 0 {
            quotient + 1
        } else {
            quotient
        };

        let magnitude = i64::try_from(magnitude).map_err(|_| out_of_range())?;
        Ok(if self.negative { -magnitude } else { magnitude })
    }
}

/// Parse a quantity and return its value in thousandths, rounded up
pub fn parse_milli_value(raw: &str) -> Result<i64, QuantityError> {
    parse(raw)?.ceil_scaled(1000, raw)
}

/// Parse a quantity and return its value in whole units, rounded up
pub fn parse_value(raw: &str) -> Result<i64, QuantityError> {
    parse(raw)?.ceil_scaled(1, raw)
}

fn parse(raw: &str) -> Result<Fraction, QuantityError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }

    let invalid = || QuantityError::InvalidNumber(raw.to_string());

    let (negative, unsigned) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let number_end = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_end);

    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if frac_part.contains('.') {
        return Err(invalid());
    }

    let digits = format!("{int_part}{frac_part}");
    let significant = digits.trim_start_matches('0');
    if significant.len() > MAX_DIGITS {
        return Err(QuantityError::OutOfRange(raw.to_string()));
    }
    let mantissa: u128 = if significant.is_empty() {
        0
    } else {
        significant.parse().map_err(|_| invalid())?
    };

    let frac_scale = u32::try_from(frac_part.len())
        .ok()
        .filter(|len| *len <= MAX_EXPONENT)
        .ok_or_else(|| QuantityError::OutOfRange(raw.to_string()))?;

    let (multiplier, divisor) = suffix_factor(raw, suffix)?;

    let numerator = mantissa
        .checked_mul(multiplier)
        .ok_or_else(|| QuantityError::OutOfRange(raw.to_string()))?;
    let denominator = 10u128
        .pow(frac_scale)
        .checked_mul(divisor)
        .ok_or_else(|| QuantityError::OutOfRange(raw.to_string()))?;

    Ok(Fraction {
        negative: negative && numerator != 0,
        numerator,
        denominator,
    })
}

/// Multiplier and divisor for a quantity suffix
fn suffix_factor(raw: &str, suffix: &str) -> Result<(u128, u128), QuantityError> {
    let factor = match suffix {
        "" => (1, 1),
        "n" => (1, 1_000_000_000),
        "u" => (1, 1_000_000),
        "m" => (1, 1_000),
        "k" => (1_000, 1),
        "M" => (1_000_000, 1),
        "G" => (1_000_000_000, 1),
        "T" => (1_000_000_000_000, 1),
        "P" => (1_000_000_000_000_000, 1),
        "E" => (1_000_000_000_000_000_000, 1),
        "Ki" => (1 << 10, 1),
        "Mi" => (1 << 20, 1),
        "Gi" => (1 << 30, 1),
        "Ti" => (1 << 40, 1),
        "Pi" => (1 << 50, 1),
        "Ei" => (1 << 60, 1),
        _ => return exponent_factor(raw, suffix),
    };
    Ok(factor)
}

/// Factor for a decimal exponent suffix such as `e3` or `E-2`
fn exponent_factor(raw: &str, suffix: &str) -> Result<(u128, u128), QuantityError> {
    let unknown = || QuantityError::UnknownSuffix {
        quantity: raw.to_string(),
        suffix: suffix.to_string(),
    };

    let exponent = suffix
        .strip_prefix('e')
        .or_else(|| suffix.strip_prefix('E'))
        .ok_or_else(unknown)?;
    let exponent: i32 = exponent.parse().map_err(|_| unknown())?;

    if exponent.unsigned_abs() > MAX_EXPONENT {
        return Err(QuantityError::OutOfRange(raw.to_string()));
    }

    let power = 10u128.pow(exponent.unsigned_abs());
    if exponent >= 0 {
        Ok((power, 1))
    } else {
        Ok((1, power))
    }
}

/// CPU quantity in milli-cores; absent or invalid quantities count as 0
pub fn cpu_millis(quantity: Option<&Quantity>) -> i64 {
    normalize(quantity, parse_milli_value)
}

/// Memory quantity in bytes; absent or invalid quantities count as 0
pub fn memory_bytes(quantity: Option<&Quantity>) -> i64 {
    normalize(quantity, parse_value)
}

/// Memory quantity in mebibytes, truncated
pub fn memory_mebibytes(quantity: Option<&Quantity>) -> i64 {
    bytes_to_mebibytes(memory_bytes(quantity))
}

/// Truncating byte to mebibyte conversion
pub fn bytes_to_mebibytes(bytes: i64) -> i64 {
    bytes / MEBIBYTE
}

/// Look up a named resource in an optional resource list
pub fn resource<'a>(
    list: Option<&'a BTreeMap<String, Quantity>>,
    name: &str,
) -> Option<&'a Quantity> {
    list.and_then(|l| l.get(name))
}

fn normalize(
    quantity: Option<&Quantity>,
    parse_fn: fn(&str) -> Result<i64, QuantityError>,
) -> i64 {
    let Some(Quantity(raw)) = quantity else {
        return 0;
    };

    match parse_fn(raw) {
        Ok(value) => value.max(0),
        Err(e) => {
            warn!(quantity = %raw, error = %e, "Ignoring unparseable resource quantity");
            0
        }
    }
}
