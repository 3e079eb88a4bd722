//! The number sub-parser.
//!
//! The lexer greedily consumes anything number-shaped (see
//! [`crate::lexer`]); this module is the actual grammar check:
//!
//! ```text
//! number   → integer fraction exponent
//! integer  → "-"? digits
//! fraction → ε | "." digits
//! exponent → ε | ("e"|"E") ("+"|"-")? digits
//! ```
//!
//! Unlike strict JSON, a leading zero followed by more digits is permitted
//! (`0123` is a valid integer part here).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    InvalidDigits,
    IllegalMinusSign,
    DanglingDecimal,
    DanglingExpIndicator,
}

pub fn parse_number(text: &str) -> Result<f64, NumberError> {
    let bytes = text.as_bytes();
    let mut i = 0;

    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return Err(if digits_start == 1 {
            NumberError::IllegalMinusSign
        } else {
            NumberError::InvalidDigits
        });
    }

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return Err(NumberError::DanglingDecimal);
        }
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return Err(NumberError::DanglingExpIndicator);
        }
    }

    if i != bytes.len() {
        return Err(NumberError::InvalidDigits);
    }

    text.parse::<f64>().map_err(|_| NumberError::InvalidDigits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integer() {
        assert_eq!(parse_number("30"), Ok(30.0));
    }

    #[test]
    fn leading_zeros_are_permitted() {
        assert_eq!(parse_number("0123"), Ok(123.0));
    }

    #[test]
    fn parses_fraction_and_exponent() {
        assert_eq!(parse_number("1.5e-3"), Ok(1.5e-3));
    }

    #[test]
    fn bare_minus_is_illegal() {
        assert_eq!(parse_number("-"), Err(NumberError::IllegalMinusSign));
    }

    #[test]
    fn dangling_decimal_point() {
        assert_eq!(parse_number("1."), Err(NumberError::DanglingDecimal));
    }

    #[test]
    fn dangling_exponent_indicator() {
        assert_eq!(parse_number("1e"), Err(NumberError::DanglingExpIndicator));
    }

    #[test]
    fn trailing_garbage_is_invalid_digits() {
        assert_eq!(parse_number("12abc"), Err(NumberError::InvalidDigits));
    }

    #[test]
    fn round_trips_through_canonical_form() {
        let value = parse_number("2.5").unwrap();
        let reserialized = format!("{value}");
        assert_eq!(parse_number(&reserialized), Ok(value));
    }
}
