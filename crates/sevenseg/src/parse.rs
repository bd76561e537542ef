//! Decimal parsing of `write` payloads.
//!
//! Follows the kernel's `kstrtol(.., 10, ..)` rules so `echo 5 > /dev/7segs`
//! behaves the same as on the C driver:
//!
//! - the text ends at the first NUL byte or at the end of the buffer;
//! - one optional leading `+` or `-`;
//! - at least one ASCII digit, and nothing but digits after the sign;
//! - a single trailing `\n` is ignored;
//! - values that do not fit in an `i64` are reported as overflow.

use thiserror_no_std::Error as ThisError;

/// Why a payload is not a decimal integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Not a decimal integer (empty, stray characters, sign only).
    #[error("not a decimal integer")]
    Invalid,
    /// A decimal integer that does not fit in an `i64`.
    #[error("integer overflows i64 (negative: {negative})")]
    Overflow {
        /// Sign of the value that overflowed.
        negative: bool,
    },
}

/// Parse `buf` as a base-10 integer.
pub fn parse_decimal(buf: &[u8]) -> Result<i64, ParseError> {
    let text = match buf.iter().position(|b| *b == 0) {
        Some(nul) => buf.get(..nul).unwrap_or_default(),
        None => buf,
    };
    let text = text.strip_suffix(b"\n").unwrap_or(text);

    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(ParseError::Invalid);
    }

    let mut value: i64 = 0;
    for byte in digits {
        if !byte.is_ascii_digit() {
            return Err(ParseError::Invalid);
        }
        let digit = i64::from(byte.saturating_sub(b'0'));
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        value = next.ok_or(ParseError::Overflow { negative })?;
    }
    Ok(value)
}
