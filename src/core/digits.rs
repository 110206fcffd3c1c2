//! Purpose: Digit alphabet, base validation and text scanning shared by rendering and parsing.
//! Exports: `MIN_BASE`, `MAX_BASE`, `check_base`, `digit_char`, `digit_value`, `chunk_for_base`,
//!          `normalize_foreign_hex`, `scan`, `Scanned`.
//! Role: Pure text logic; no foreign calls happen here.
//! Invariants: Digit values 10..=35 map to `a-z`, 36..=61 to `A-Z`.
//! Invariants: Scan offsets are byte offsets into the caller's original text.
use crate::core::error::{Error, ErrorKind};

pub const MIN_BASE: u32 = 2;
pub const MAX_BASE: u32 = 62;

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn check_base(base: u32) -> Result<(), Error> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        return Ok(());
    }
    Err(Error::new(ErrorKind::Usage)
        .with_message(format!("base {base} is out of range"))
        .with_hint(format!("use a base between {MIN_BASE} and {MAX_BASE}")))
}

/// Character for a digit value below 62.
pub fn digit_char(value: u32) -> char {
    ALPHABET[value as usize] as char
}

/// Value of `byte` as a digit in `base`, if it is one.
/// Letters are case-insensitive for bases up to 36.
pub fn digit_value(byte: u8, base: u32) -> Option<u32> {
    let value = match byte {
        b'0'..=b'9' => u32::from(byte - b'0'),
        b'a'..=b'z' => u32::from(byte - b'a') + 10,
        b'A'..=b'Z' if base <= 36 => u32::from(byte - b'A') + 10,
        b'A'..=b'Z' => u32::from(byte - b'A') + 36,
        _ => return None,
    };
    (value < base).then_some(value)
}

/// Largest power of `base` that fits in a `u32`, with its exponent.
pub fn chunk_for_base(base: u32) -> (u32, usize) {
    let mut power = base;
    let mut digits = 1;
    while let Some(next) = power.checked_mul(base) {
        power = next;
        digits += 1;
    }
    (power, digits)
}

/// Lower-cases foreign hex output and drops the whole-byte zero padding it carries.
pub fn normalize_foreign_hex(foreign: &str) -> String {
    let (sign, magnitude) = match foreign.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", foreign),
    };
    let trimmed = magnitude.trim_start_matches('0');
    if trimmed.is_empty() {
        return "0".to_string();
    }
    let mut out = String::with_capacity(sign.len() + trimmed.len());
    out.push_str(sign);
    out.extend(trimmed.chars().map(|ch| ch.to_ascii_lowercase()));
    out
}

/// Signed digit string recovered from text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scanned {
    pub negative: bool,
    pub base: u32,
    /// Digit values, most significant first.
    pub digits: Vec<u8>,
}

impl Scanned {
    /// Digits as ASCII using the canonical alphabet.
    pub fn ascii(&self) -> String {
        self.digits
            .iter()
            .map(|digit| digit_char(u32::from(*digit)))
            .collect()
    }
}

/// Scans an optionally signed integer literal.
///
/// `base == 0` picks the base from a prefix (`0x`, `0b`, `0o`, or a bare leading `0` for
/// octal) and allows `_` between digits.
pub fn scan(text: &str, base: u32) -> Result<Scanned, Error> {
    if base != 0 {
        check_base(base)?;
    }

    let bytes = text.as_bytes();
    let (negative, mut pos) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    let (base, prefixed, underscores) = if base == 0 {
        let (detected, prefix_len) = detect_prefix(&bytes[pos..]);
        pos += prefix_len;
        (detected, prefix_len > 0, true)
    } else {
        (base, false, false)
    };

    let mut digits = Vec::with_capacity(bytes.len().saturating_sub(pos));
    let mut prev_digit = prefixed;
    let mut last_underscore = None;
    for (idx, &byte) in bytes.iter().enumerate().skip(pos) {
        if byte == b'_' {
            if !underscores || !prev_digit {
                return Err(parse_error("misplaced '_' separator", idx));
            }
            prev_digit = false;
            last_underscore = Some(idx);
            continue;
        }
        match digit_value(byte, base) {
            Some(value) => {
                digits.push(value as u8);
                prev_digit = true;
                last_underscore = None;
            }
            None => {
                return Err(parse_error(
                    format!("invalid digit {:?} for base {base}", byte as char),
                    idx,
                ));
            }
        }
    }

    if let Some(idx) = last_underscore {
        return Err(parse_error("misplaced '_' separator", idx));
    }
    if digits.is_empty() {
        return Err(parse_error("no digits", bytes.len()));
    }

    Ok(Scanned {
        negative,
        base,
        digits,
    })
}

fn detect_prefix(body: &[u8]) -> (u32, usize) {
    match body {
        [b'0', b'x' | b'X', ..] => (16, 2),
        [b'0', b'b' | b'B', ..] => (2, 2),
        [b'0', b'o' | b'O', ..] => (8, 2),
        [b'0', _, ..] => (8, 1),
        _ => (10, 0),
    }
}

fn parse_error(message: impl Into<String>, offset: usize) -> Error {
    Error::new(ErrorKind::Parse)
        .with_message(message)
        .with_offset(offset as u64)
}

#[cfg(test)]
mod tests {
    use super::{
        chunk_for_base, check_base, digit_char, digit_value, normalize_foreign_hex, scan,
    };
    use crate::core::error::ErrorKind;

    #[test]
    fn alphabet_case_convention() {
        assert_eq!(digit_char(9), '9');
        assert_eq!(digit_char(10), 'a');
        assert_eq!(digit_char(35), 'z');
        assert_eq!(digit_char(36), 'A');
        assert_eq!(digit_char(61), 'Z');
    }

    #[test]
    fn digit_value_respects_base() {
        assert_eq!(digit_value(b'F', 16), Some(15));
        assert_eq!(digit_value(b'f', 16), Some(15));
        assert_eq!(digit_value(b'g', 16), None);
        assert_eq!(digit_value(b'A', 62), Some(36));
        assert_eq!(digit_value(b'a', 62), Some(10));
        assert_eq!(digit_value(b'2', 2), None);
        assert_eq!(digit_value(b'-', 10), None);
    }

    #[test]
    fn base_range_is_enforced() {
        assert!(check_base(2).is_ok());
        assert!(check_base(62).is_ok());
        assert_eq!(check_base(1).unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(check_base(63).unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn chunk_fits_in_u32() {
        assert_eq!(chunk_for_base(10), (1_000_000_000, 9));
        assert_eq!(chunk_for_base(2), (1 << 31, 31));
        let (power, digits) = chunk_for_base(62);
        assert_eq!(digits, 5);
        assert_eq!(power, 62u32.pow(5));
    }

    #[test]
    fn foreign_hex_is_normalized() {
        assert_eq!(normalize_foreign_hex("0A"), "a");
        assert_eq!(normalize_foreign_hex("-0FF1"), "-ff1");
        assert_eq!(normalize_foreign_hex("0"), "0");
        assert_eq!(normalize_foreign_hex("00"), "0");
        assert_eq!(normalize_foreign_hex("DEADBEEF"), "deadbeef");
    }

    #[test]
    fn scan_detects_prefixes() {
        let hex = scan("-0xFF_ff", 0).expect("hex");
        assert!(hex.negative);
        assert_eq!(hex.base, 16);
        assert_eq!(hex.ascii(), "ffff");

        assert_eq!(scan("0b101", 0).expect("bin").base, 2);
        assert_eq!(scan("0o17", 0).expect("oct").base, 8);
        assert_eq!(scan("017", 0).expect("oct").base, 8);
        assert_eq!(scan("0", 0).expect("zero").base, 10);
        assert_eq!(scan("+1_000", 0).expect("dec").ascii(), "1000");
    }

    #[test]
    fn scan_reports_offsets() {
        let err = scan("12x4", 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.offset(), Some(2));

        let err = scan("1_000", 10).unwrap_err();
        assert_eq!(err.offset(), Some(1));

        let err = scan("1__0", 0).unwrap_err();
        assert_eq!(err.offset(), Some(2));

        let err = scan("10_", 0).unwrap_err();
        assert_eq!(err.offset(), Some(2));

        let err = scan("-", 10).unwrap_err();
        assert_eq!(err.message(), Some("no digits"));

        let err = scan("0x", 0).unwrap_err();
        assert_eq!(err.message(), Some("no digits"));
    }

    #[test]
    fn scan_high_bases_are_case_sensitive() {
        let scanned = scan("aA", 62).expect("base 62");
        assert_eq!(scanned.digits, vec![10, 36]);
        let scanned = scan("aA", 36).expect("base 36");
        assert_eq!(scanned.digits, vec![10, 10]);
    }

    #[test]
    fn scan_rejects_bad_base() {
        assert_eq!(scan("1", 1).unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(scan("1", 63).unwrap_err().kind(), ErrorKind::Usage);
    }
}
