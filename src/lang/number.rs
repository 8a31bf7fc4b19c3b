//! Numeric literal parsing and the hidden 6-byte number form.
//!
//! Every floating-point literal in a tokenised line is followed by a
//! marker byte `0x0E` and five bytes holding the pre-computed value.
//! Small integers use the machine's integer form, everything else the
//! 40-bit floating-point form.

use crate::lang::Error;

/// Marker byte that precedes the 5-byte value.
pub const NUMBER_MARKER: u8 = 0x0e;

/// A block with value zero, used for `PRIVATE` and `DEF FN` parameters.
pub const EMPTY_BLOCK: [u8; 6] = [NUMBER_MARKER, 0, 0, 0, 0, 0];

/// Parse decimal text the way the machine's `VAL` would, giving NaN for
/// malformed text such as `1e` or `.`.
pub fn parse_decimal(text: &str) -> f64 {
    text.parse::<f64>().unwrap_or(std::f64::NAN)
}

/// Parse binary or hex digits with an optional fraction, such as `101.1`.
/// Text that holds no digits parses to zero.
pub fn parse_radix(text: &str, radix: u32, fraction: bool) -> f64 {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let mut value = leading_digits(whole, radix);
    if fraction {
        if let Some(frac) = parts.next() {
            let digits: String = frac.chars().take_while(|c| c.is_digit(radix)).collect();
            if !digits.is_empty() {
                let n = leading_digits(&digits, radix);
                value += n / (radix as f64).powi(digits.len() as i32);
            }
        }
    }
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn leading_digits(text: &str, radix: u32) -> f64 {
    let mut seen = false;
    let mut value = 0.0;
    for c in text.chars() {
        match c.to_digit(radix) {
            Some(d) => {
                seen = true;
                value = value * radix as f64 + d as f64;
            }
            None => break,
        }
    }
    if seen {
        value
    } else {
        std::f64::NAN
    }
}

/// True when the value takes the short integer form.
pub fn is_small_integer(value: f64) -> bool {
    value.fract() == 0.0 && value >= -65535.0 && value <= 65535.0
}

/// Encode a value in the 5-byte floating-point form: one exponent byte
/// biased by 0x80 and a 32-bit big-endian mantissa whose top bit holds
/// the sign.
pub fn float_to_zx(value: f64) -> Result<[u8; 5], Error> {
    if value.is_infinite() {
        return Err(error!(Overflow; "Number too big"));
    }
    let sign = value < 0.0;
    let mut x = value.abs();
    let mut out = [0u8; 5];
    if x == 0.0 {
        return Ok(out);
    }
    let mut exponent: i32 = 0x80;
    while x < 0.5 {
        x *= 2.0;
        exponent -= 1;
    }
    while x >= 1.0 {
        x *= 0.5;
        exponent += 1;
    }
    if !(0..=0xff).contains(&exponent) {
        return Err(error!(Overflow; "Number out of range"));
    }
    out[0] = exponent as u8;
    let mantissa = (x * 4294967296.0 + 0.5) as u64 as u32;
    out[1..].copy_from_slice(&mantissa.to_be_bytes());
    if !sign {
        out[1] &= 0x7f;
    }
    Ok(out)
}

/// The full 6-byte block that follows a number's text.
pub fn number_block(value: f64) -> Result<[u8; 6], Error> {
    let mut block = EMPTY_BLOCK;
    if is_small_integer(value) {
        let n = value as i64 as u16;
        block[2] = if value < 0.0 { 0xff } else { 0x00 };
        block[3..5].copy_from_slice(&n.to_le_bytes());
    } else {
        block[1..].copy_from_slice(&float_to_zx(value)?);
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_integers() {
        assert_eq!(number_block(1.0).unwrap(), [0x0e, 0, 0, 1, 0, 0]);
        assert_eq!(number_block(300.0).unwrap(), [0x0e, 0, 0, 0x2c, 0x01, 0]);
        assert_eq!(number_block(-1.0).unwrap(), [0x0e, 0, 0xff, 0xff, 0xff, 0]);
        assert_eq!(number_block(65535.0).unwrap(), [0x0e, 0, 0, 0xff, 0xff, 0]);
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(number_block(0.0).unwrap(), [0x0e, 0, 0, 0, 0, 0]);
        assert_eq!(number_block(-65535.0).unwrap(), [0x0e, 0, 0xff, 0x01, 0x00, 0]);
        assert_eq!(number_block(-65536.0).unwrap(), [0x0e, 0x91, 0x80, 0, 0, 0]);
        assert_eq!(number_block(-0.5).unwrap()[1..], float_to_zx(-0.5).unwrap());
        for n in -65535i32..=65535 {
            let block = number_block(n as f64).unwrap();
            assert_eq!(block[..2], [NUMBER_MARKER, 0], "{}", n);
            assert_eq!(block[2], if n < 0 { 0xff } else { 0 }, "{}", n);
            assert_eq!(u16::from_le_bytes([block[3], block[4]]), n as u16, "{}", n);
            assert_eq!(block[5], 0, "{}", n);
        }
    }

    #[test]
    fn test_floats() {
        assert_eq!(float_to_zx(0.5).unwrap(), [0x80, 0, 0, 0, 0]);
        assert_eq!(float_to_zx(1.5).unwrap(), [0x81, 0x40, 0, 0, 0]);
        assert_eq!(float_to_zx(-0.5).unwrap(), [0x80, 0x80, 0, 0, 0]);
        assert_eq!(float_to_zx(65536.0).unwrap(), [0x91, 0, 0, 0, 0]);
        assert_eq!(number_block(65536.0).unwrap(), [0x0e, 0x91, 0, 0, 0, 0]);
        assert!(float_to_zx(std::f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_decimal(".01"), 0.01);
        assert_eq!(parse_decimal("1e3"), 1000.0);
        assert!(parse_decimal("1e").is_nan());
        assert_eq!(parse_radix("101", 2, false), 5.0);
        assert_eq!(parse_radix("1.1", 2, true), 1.5);
        assert_eq!(parse_radix("ea", 16, false), 234.0);
        assert_eq!(parse_radix("", 16, false), 0.0);
    }
}
