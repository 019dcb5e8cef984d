//! Numeric literal scanning: decimal, octal, hex, and float, with overflow
//! promotion to `BigInt` (`SPEC_FULL.md` §4.5).

use crate::token::TokenKind;

/// The result of scanning a numeric literal starting at the current
/// position. `chars_consumed` is measured in `char`s, not bytes, to match
/// the rest of the tokenizer's char-indexed cursor.
#[derive(Debug, PartialEq)]
pub struct NumberScan {
    pub kind: TokenKind,
    pub chars_consumed: usize,
    pub int_value: Option<i64>,
    /// Set when an octal literal (`0` followed by digits) contains an `8`
    /// or `9`, e.g. `0789` (`SPEC_FULL.md` §4.5, §8 edge case).
    pub bad_octal_digit: bool,
}

/// Scans a numeric literal from `chars[start..]`. The caller has already
/// established `chars[start]` is an ASCII digit.
pub fn scan_number(chars: &[char], start: usize) -> NumberScan {
    debug_assert!(chars[start].is_ascii_digit());

    if chars[start] == '0' && matches!(chars.get(start + 1), Some('x') | Some('X')) {
        return scan_hex(chars, start);
    }

    if chars[start] == '0'
        && chars
            .get(start + 1)
            .is_some_and(|c| c.is_ascii_digit())
    {
        return scan_octal(chars, start);
    }

    scan_decimal_or_float(chars, start)
}

fn scan_hex(chars: &[char], start: usize) -> NumberScan {
    let mut i = start + 2;
    let digits_start = i;
    while chars.get(i).is_some_and(|c| c.is_ascii_hexdigit()) {
        i += 1;
    }
    let text: String = chars[digits_start..i].iter().collect();
    let value = i64::from_str_radix(&text, 16).ok();
    NumberScan {
        kind: if value.is_some() { TokenKind::Int } else { TokenKind::BigInt },
        chars_consumed: i - start,
        int_value: value,
        bad_octal_digit: false,
    }
}

fn scan_octal(chars: &[char], start: usize) -> NumberScan {
    let mut i = start + 1;
    let mut bad = false;
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        if matches!(chars[i], '8' | '9') {
            bad = true;
        }
        i += 1;
    }
    let text: String = chars[start + 1..i].iter().collect();
    let value = if bad { None } else { i64::from_str_radix(&text, 8).ok() };
    NumberScan {
        kind: if value.is_some() { TokenKind::Int } else { TokenKind::BigInt },
        chars_consumed: i - start,
        int_value: value,
        bad_octal_digit: bad,
    }
}

fn scan_decimal_or_float(chars: &[char], start: usize) -> NumberScan {
    let mut i = start;
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }

    let mut is_float = false;

    // A `.` only joins the literal as a decimal point when it is not the
    // start of a `..`/`...` range operator and is followed by a digit (or
    // by nothing that would make it ambiguous, per `SPEC_FULL.md` §4.5
    // "number vs. range operator" note).
    if chars.get(i) == Some(&'.') && chars.get(i + 1) != Some(&'.') {
        if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            i += 1;
            while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
        }
    }

    if matches!(chars.get(i), Some('e') | Some('E')) {
        let mut j = i + 1;
        if matches!(chars.get(j), Some('+') | Some('-')) {
            j += 1;
        }
        if chars.get(j).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            i = j;
            while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
        }
    }

    if is_float {
        return NumberScan {
            kind: TokenKind::Float,
            chars_consumed: i - start,
            int_value: None,
            bad_octal_digit: false,
        };
    }

    let text: String = chars[start..i].iter().collect();
    let value = text.parse::<i64>().ok();
    NumberScan {
        kind: if value.is_some() { TokenKind::Int } else { TokenKind::BigInt },
        chars_consumed: i - start,
        int_value: value,
        bad_octal_digit: false,
    }
}
