//! Numeric parsing: `atol` and `atof`
//!
//! Python-flavored semantics: surrounding whitespace is ignored, base 0
//! auto-detects `0b`/`0o`/`0x` prefixes, underscores group digits, and
//! every failure names the offending input so callers can surface the
//! message directly.

use crate::error::{Result, StrZipError};
use crate::string::slice::StrSlice;

/// Parse an integer in the given base
///
/// `base` must be 0 or in `2..=36`. Base 0 detects the radix from a
/// `0b`/`0o`/`0x` prefix (case-insensitive) and falls back to decimal.
/// An explicit matching base also accepts its prefix. Underscores are
/// allowed between digits, and directly after a prefix, but never leading,
/// doubled, or trailing.
///
/// # Examples
///
/// ```rust
/// use strzip::{atol, StrSlice};
///
/// assert_eq!(atol(StrSlice::from_str("  -42  "), 10).unwrap(), -42);
/// assert_eq!(atol(StrSlice::from_str("0xFF"), 0).unwrap(), 255);
/// assert_eq!(atol(StrSlice::from_str("1_000_000"), 10).unwrap(), 1_000_000);
/// ```
pub fn atol(s: StrSlice<'_>, base: u32) -> Result<i64> {
    if base != 0 && !(2..=36).contains(&base) {
        return Err(StrZipError::parse(format!(
            "base must be 0 or in 2..=36, got {base}"
        )));
    }
    let stripped = s.strip();
    let bytes = stripped.as_bytes();
    let fail = || {
        StrZipError::parse(format!(
            "cannot parse '{stripped}' as an integer with base {base}"
        ))
    };
    if bytes.is_empty() {
        return Err(fail());
    }

    let mut pos = 0;
    let mut negative = false;
    match bytes[0] {
        b'+' => pos = 1,
        b'-' => {
            negative = true;
            pos = 1;
        }
        _ => {}
    }

    let mut radix = base;
    let mut has_prefix = false;
    if bytes.len() - pos >= 2 && bytes[pos] == b'0' {
        let detected = match bytes[pos + 1].to_ascii_lowercase() {
            b'b' => 2,
            b'o' => 8,
            b'x' => 16,
            _ => 0,
        };
        if detected != 0 && (base == 0 || base == detected) {
            radix = detected;
            has_prefix = true;
            pos += 2;
        }
    }
    if radix == 0 {
        radix = 10;
    }

    let mut magnitude: u64 = 0;
    let mut any_digit = false;
    // Underscores may follow a digit or the prefix itself, never each other.
    let mut underscore_ok = has_prefix;
    let mut trailing_underscore = false;
    for &byte in &bytes[pos..] {
        if byte == b'_' {
            if !underscore_ok {
                return Err(fail());
            }
            underscore_ok = false;
            trailing_underscore = true;
            continue;
        }
        let digit = (byte as char).to_digit(radix).ok_or_else(fail)?;
        magnitude = magnitude
            .checked_mul(radix as u64)
            .and_then(|m| m.checked_add(digit as u64))
            .ok_or_else(|| too_large(stripped))?;
        any_digit = true;
        underscore_ok = true;
        trailing_underscore = false;
    }
    if !any_digit || trailing_underscore {
        return Err(fail());
    }

    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(too_large(stripped));
        }
        Ok((magnitude as i128).wrapping_neg() as i64)
    } else {
        if magnitude > i64::MAX as u64 {
            return Err(too_large(stripped));
        }
        Ok(magnitude as i64)
    }
}

fn too_large(input: StrSlice<'_>) -> StrZipError {
    StrZipError::parse(format!("'{input}' is too large for a 64-bit integer"))
}

/// Parse a floating-point number
///
/// Grammar: optional sign, digits with an optional fraction, an optional
/// `e`/`E` exponent with its own sign, and an optional trailing `f`/`F`
/// unit suffix. `nan` and `inf` are recognized case-sensitively after the
/// sign. The whole input must be consumed.
///
/// # Examples
///
/// ```rust
/// use strzip::{atof, StrSlice};
///
/// assert_eq!(atof(StrSlice::from_str("2.25")).unwrap(), 2.25);
/// assert_eq!(atof(StrSlice::from_str("-1e3")).unwrap(), -1000.0);
/// assert_eq!(atof(StrSlice::from_str("4.5f")).unwrap(), 4.5);
/// ```
pub fn atof(s: StrSlice<'_>) -> Result<f64> {
    let stripped = s.strip();
    let bytes = stripped.as_bytes();
    let fail = || {
        StrZipError::parse(format!(
            "cannot parse '{stripped}' as a floating point value"
        ))
    };
    if bytes.is_empty() {
        return Err(fail());
    }

    let mut pos = 0;
    let mut sign = 1.0f64;
    match bytes[0] {
        b'+' => pos = 1,
        b'-' => {
            sign = -1.0;
            pos = 1;
        }
        _ => {}
    }

    match &bytes[pos..] {
        b"nan" => return Ok(f64::NAN),
        b"inf" => return Ok(sign * f64::INFINITY),
        _ => {}
    }

    let mut mantissa = 0.0f64;
    let mut any_digit = false;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        mantissa = mantissa * 10.0 + (bytes[pos] - b'0') as f64;
        any_digit = true;
        pos += 1;
    }

    let mut exponent: i32 = 0;
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            mantissa = mantissa * 10.0 + (bytes[pos] - b'0') as f64;
            exponent -= 1;
            any_digit = true;
            pos += 1;
        }
    }
    if !any_digit {
        return Err(fail());
    }

    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        let mut exp_sign = 1i32;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            if bytes[pos] == b'-' {
                exp_sign = -1;
            }
            pos += 1;
        }
        let mut exp_value = 0i32;
        let mut any_exp_digit = false;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            exp_value = exp_value
                .saturating_mul(10)
                .saturating_add((bytes[pos] - b'0') as i32);
            any_exp_digit = true;
            pos += 1;
        }
        if !any_exp_digit {
            return Err(fail());
        }
        exponent = exponent.saturating_add(exp_sign.saturating_mul(exp_value));
    }

    if pos < bytes.len() && (bytes[pos] == b'f' || bytes[pos] == b'F') {
        pos += 1;
    }
    if pos != bytes.len() {
        return Err(fail());
    }

    // Dividing by the positive power keeps short decimals like 2.25 exact.
    let value = if exponent >= 0 {
        mantissa * 10f64.powi(exponent)
    } else {
        mantissa / 10f64.powi(-exponent)
    };
    Ok(sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> StrSlice<'_> {
        StrSlice::from_str(text)
    }

    #[test]
    fn test_atol_decimal() {
        assert_eq!(atol(s("0"), 10).unwrap(), 0);
        assert_eq!(atol(s("42"), 10).unwrap(), 42);
        assert_eq!(atol(s("-42"), 10).unwrap(), -42);
        assert_eq!(atol(s("+42"), 10).unwrap(), 42);
        assert_eq!(atol(s("  17\t"), 10).unwrap(), 17);
    }

    #[test]
    fn test_atol_bases() {
        assert_eq!(atol(s("ff"), 16).unwrap(), 255);
        assert_eq!(atol(s("0xFF"), 16).unwrap(), 255);
        assert_eq!(atol(s("0XFF"), 16).unwrap(), 255);
        assert_eq!(atol(s("0b1010"), 2).unwrap(), 10);
        assert_eq!(atol(s("0o777"), 8).unwrap(), 511);
        assert_eq!(atol(s("z"), 36).unwrap(), 35);
        assert_eq!(atol(s("-0x10"), 16).unwrap(), -16);
    }

    #[test]
    fn test_atol_base_zero_detection() {
        assert_eq!(atol(s("0xFF"), 0).unwrap(), 255);
        assert_eq!(atol(s("0b11"), 0).unwrap(), 3);
        assert_eq!(atol(s("0o10"), 0).unwrap(), 8);
        assert_eq!(atol(s("123"), 0).unwrap(), 123);
        assert_eq!(atol(s("0"), 0).unwrap(), 0);
    }

    #[test]
    fn test_atol_underscores() {
        assert_eq!(atol(s("1_000_000"), 10).unwrap(), 1_000_000);
        assert_eq!(atol(s("0x_FF"), 16).unwrap(), 255);
        assert!(atol(s("_5"), 10).is_err());
        assert!(atol(s("5_"), 10).is_err());
        assert!(atol(s("1__0"), 10).is_err());
        assert!(atol(s("-_5"), 10).is_err());
    }

    #[test]
    fn test_atol_rejections() {
        assert!(atol(s(""), 10).is_err());
        assert!(atol(s("   "), 10).is_err());
        assert!(atol(s("hi"), 10).is_err());
        assert!(atol(s("12a"), 10).is_err());
        assert!(atol(s("0x"), 16).is_err());
        assert!(atol(s("-"), 10).is_err());
        assert!(atol(s("9"), 1).is_err());
        assert!(atol(s("9"), 37).is_err());
        // Prefix for a different base is not consumed
        assert!(atol(s("0x10"), 10).is_err());

        let err = atol(s("hi"), 10).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("'hi'") && msg.contains("10"), "{msg}");
    }

    #[test]
    fn test_atol_limits() {
        assert_eq!(
            atol(s("9223372036854775807"), 10).unwrap(),
            i64::MAX
        );
        assert_eq!(
            atol(s("-9223372036854775808"), 10).unwrap(),
            i64::MIN
        );
        let err = atol(s("9223372036854775808"), 10).unwrap_err();
        assert!(format!("{err}").contains("too large"));
        assert!(atol(s("-9223372036854775809"), 10).is_err());
    }

    #[test]
    fn test_atol_round_trips() {
        for value in [0i64, 1, -1, 255, -255, 65536, i64::MAX, i64::MIN + 1] {
            let text = value.to_string();
            assert_eq!(atol(s(&text), 10).unwrap(), value, "{text}");
        }
        for value in [0u32, 5, 255, 4096] {
            assert_eq!(
                atol(s(&format!("{value:#x}")), 16).unwrap(),
                value as i64
            );
            assert_eq!(
                atol(s(&format!("{value:#b}")), 2).unwrap(),
                value as i64
            );
        }
    }

    #[test]
    fn test_atof_basic() {
        assert_eq!(atof(s("2.25")).unwrap(), 2.25);
        assert_eq!(atof(s("0")).unwrap(), 0.0);
        assert_eq!(atof(s("-3.5")).unwrap(), -3.5);
        assert_eq!(atof(s("+0.5")).unwrap(), 0.5);
        assert_eq!(atof(s("10")).unwrap(), 10.0);
        assert_eq!(atof(s(" 1.5 ")).unwrap(), 1.5);
    }

    #[test]
    fn test_atof_exponents() {
        assert_eq!(atof(s("1e3")).unwrap(), 1000.0);
        assert_eq!(atof(s("1E3")).unwrap(), 1000.0);
        assert_eq!(atof(s("1e+3")).unwrap(), 1000.0);
        assert_eq!(atof(s("1e-3")).unwrap(), 0.001);
        assert_eq!(atof(s("2.5e2")).unwrap(), 250.0);
        assert_eq!(atof(s("-2.5e-1")).unwrap(), -0.25);
    }

    #[test]
    fn test_atof_specials_and_suffix() {
        assert!(atof(s("nan")).unwrap().is_nan());
        assert!(atof(s("-nan")).unwrap().is_nan());
        assert_eq!(atof(s("inf")).unwrap(), f64::INFINITY);
        assert_eq!(atof(s("-inf")).unwrap(), f64::NEG_INFINITY);
        // Case-sensitive
        assert!(atof(s("NaN")).is_err());
        assert!(atof(s("INF")).is_err());
        assert_eq!(atof(s("4.5f")).unwrap(), 4.5);
        assert_eq!(atof(s("4.5F")).unwrap(), 4.5);
    }

    #[test]
    fn test_atof_rejections() {
        assert!(atof(s("")).is_err());
        assert!(atof(s("abc")).is_err());
        assert!(atof(s(".")).is_err());
        assert!(atof(s("1e")).is_err());
        assert!(atof(s("1e+")).is_err());
        assert!(atof(s("1.5x")).is_err());
        assert!(atof(s("1.5ff")).is_err());
        assert!(atof(s("-")).is_err());
    }

    #[test]
    fn test_atof_extremes() {
        assert_eq!(atof(s("1e400")).unwrap(), f64::INFINITY);
        assert_eq!(atof(s("1e-400")).unwrap(), 0.0);
    }
}
