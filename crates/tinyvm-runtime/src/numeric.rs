//! Numeric helpers shared by both interpreters' arithmetic, comparison,
//! and conversion opcodes.

/// Integer division/remainder opcodes fault on divide-by-zero rather
/// than leaving the behavior to the host language's panic-on-div-by-zero
/// default. See the open-question decision in the design ledger.
pub fn checked_div_i32(a: i32, b: i32) -> Option<i32> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_div(b))
    }
}

/// See [`checked_div_i32`].
pub fn checked_div_i64(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_div(b))
    }
}

/// Format an `i32` as a decimal string, used by `ITOS`.
pub fn itos(v: i32) -> String {
    v.to_string()
}

/// Format an `i64` as a decimal string, used by `LTOS`.
pub fn ltos(v: i64) -> String {
    v.to_string()
}

/// Format an `f32` with `precision` decimal digits; `0xFF` selects the
/// default of 3 digits.
pub fn ftos(v: f32, precision: u8) -> String {
    let digits = if precision == 0xFF { 3 } else { precision as usize };
    format!("{:.*}", digits, v)
}

/// See [`ftos`].
pub fn dtos(v: f64, precision: u8) -> String {
    let digits = if precision == 0xFF { 3 } else { precision as usize };
    format!("{:.*}", digits, v)
}

/// Parse a decimal integer, falling back to `fallback` on failure.
pub fn stoi(text: &str, fallback: i32) -> i32 {
    text.trim().parse().unwrap_or(fallback)
}

/// See [`stoi`].
pub fn stol(text: &str, fallback: i64) -> i64 {
    text.trim().parse().unwrap_or(fallback)
}

/// See [`stoi`].
pub fn stof(text: &str, fallback: f32) -> f32 {
    text.trim().parse().unwrap_or(fallback)
}

/// See [`stoi`].
pub fn stod(text: &str, fallback: f64) -> f64 {
    text.trim().parse().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stoi_falls_back_on_garbage_input() {
        assert_eq!(stoi("not a number", -1), -1);
        assert_eq!(stoi("42", -1), 42);
    }

    #[test]
    fn ftos_defaults_to_three_digits() {
        assert_eq!(ftos(1.5, 0xFF), "1.500");
    }

    #[test]
    fn division_by_zero_has_no_result() {
        assert_eq!(checked_div_i32(4, 0), None);
        assert_eq!(checked_div_i32(4, 2), Some(2));
    }
}
