use rust_decimal::Decimal;

use crate::types::{round_vnd, Money};

/// Whole VND with dot thousands separators: `1948508` -> `1.948.508`.
pub fn format_vnd(amount: Money) -> String {
    let rounded = round_vnd(amount);
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits);
    if rounded < Decimal::ZERO {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Like `format_vnd`, but losses are shown in parentheses.
pub fn format_vnd_signed(amount: Money) -> String {
    let rounded = round_vnd(amount);
    if rounded < Decimal::ZERO {
        format!("({})", format_vnd(rounded.abs()))
    } else {
        format_vnd(rounded)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_groups_thousands() {
        assert_eq!(format_vnd(dec!(1948508)), "1.948.508");
        assert_eq!(format_vnd(dec!(999)), "999");
        assert_eq!(format_vnd(dec!(1000)), "1.000");
        assert_eq!(format_vnd(dec!(0)), "0");
    }

    #[test]
    fn test_rounds_to_whole_dong() {
        assert_eq!(format_vnd(dec!(1948883.76)), "1.948.884");
        assert_eq!(format_vnd(dec!(0.5)), "1");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_vnd(dec!(-5162400)), "-5.162.400");
        assert_eq!(format_vnd_signed(dec!(-5162400)), "(5.162.400)");
        assert_eq!(format_vnd_signed(dec!(5162400)), "5.162.400");
    }
}
