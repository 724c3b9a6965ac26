//! Lenient number parsing for OCR table cells.
//!
//! Cells are read by their leading number and anything after it is ignored, so
//! `"18%"` reads as 18 and `"10 pcs"` as 10. A cell that does not start with a
//! number yields `None`, the non-numeric sentinel.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{LEADING_DECIMAL, LEADING_INTEGER};

// Beyond this many decimal shifts a non-zero Decimal has overflowed or reached zero.
const MAX_EXPONENT_STEPS: u32 = 64;

/// Parse the leading integer of a cell, truncating any suffix.
///
/// Fractions are truncated too: `"2.5"` reads as 2.
pub fn parse_leading_int(cell: &str) -> Option<i64> {
    let m = LEADING_INTEGER.find(cell.trim_start())?;
    m.as_str().trim_start_matches('+').parse().ok()
}

/// Parse the leading decimal number of a cell, ignoring any suffix.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent (`"1.5e3"`). Values outside the `Decimal` range yield `None`.
pub fn parse_leading_decimal(cell: &str) -> Option<Decimal> {
    let caps = LEADING_DECIMAL.captures(cell.trim_start())?;

    let negative = caps.get(1).is_some_and(|s| s.as_str() == "-");
    let mut mantissa = caps[2].trim_end_matches('.').to_string();
    if mantissa.starts_with('.') {
        mantissa.insert(0, '0');
    }

    let mut value = Decimal::from_str(&mantissa).ok()?;

    if let Some(exp) = caps.get(3) {
        let exp: i32 = exp.as_str().trim_start_matches('+').parse().ok()?;
        value = shift_decimal(value, exp)?;
    }

    if negative {
        value.set_sign_negative(true);
    }
    Some(value)
}

fn shift_decimal(mut value: Decimal, exp: i32) -> Option<Decimal> {
    if value.is_zero() {
        return Some(value);
    }
    let steps = exp.unsigned_abs().min(MAX_EXPONENT_STEPS);
    for _ in 0..steps {
        value = if exp > 0 {
            value.checked_mul(Decimal::TEN)?
        } else {
            value.checked_div(Decimal::TEN)?
        };
    }
    Some(value)
}
