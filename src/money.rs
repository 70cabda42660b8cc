//! Rounding and serialization helpers for monetary values.
//!
//! All arithmetic stays in `Decimal`; values are only rounded when they leave
//! the program (JSON output, terminal rendering).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;

/// Round to cents, halves away from zero.
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `value / denominator * 100`, or zero when the denominator is zero.
/// Saturates at the `Decimal` bounds instead of overflowing.
pub(crate) fn percentage_of(value: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    value
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if value < Decimal::ZERO {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Sum that stops at the `Decimal` bounds instead of overflowing.
pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Format with thousand separators, two decimals and the configured symbol.
/// e.g. `-1234.5` with `"$"` gives `"-$1,234.50"`.
pub(crate) fn format_money(val: Decimal, symbol: &str) -> String {
    let formatted = format!("{:.2}", round_money(val).abs());
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let with_commas = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    let sign = if val < Decimal::ZERO && round_money(val) != Decimal::ZERO {
        "-"
    } else {
        ""
    };
    format!("{sign}{symbol}{with_commas}.{dec_part}")
}

fn to_json_number(value: Decimal, dp: u32) -> f64 {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

pub(crate) fn serialize<S: Serializer>(value: &Decimal, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(to_json_number(*value, 2))
}

pub(crate) fn serialize_one_dp<S: Serializer>(value: &Decimal, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(to_json_number(*value, 1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_percentage_of_zero_denominator() {
        assert_eq!(percentage_of(dec!(50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percentage_of(dec!(50), dec!(200)), dec!(25));
    }

    #[test]
    fn test_percentage_of_tiny_denominator_saturates() {
        let tiny = dec!(0.0000000000000000000000000001);
        assert_eq!(percentage_of(dec!(1000), tiny), Decimal::MAX);
        assert_eq!(percentage_of(dec!(-1000), tiny), Decimal::MIN);
        assert_eq!(percentage_of(Decimal::MAX, dec!(1)), Decimal::MAX);
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([dec!(1.5), dec!(2.25)]), dec!(3.75));
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::MAX]), Decimal::MAX);
        assert_eq!(saturating_sum(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn test_format_money_separators() {
        assert_eq!(format_money(dec!(1234567.89), "$"), "$1,234,567.89");
        assert_eq!(format_money(dec!(999.99), "$"), "$999.99");
        assert_eq!(format_money(dec!(10000000), "$"), "$10,000,000.00");
    }

    #[test]
    fn test_format_money_sign_and_symbol() {
        assert_eq!(format_money(dec!(-42.5), "$"), "-$42.50");
        assert_eq!(format_money(dec!(-99999.01), "€"), "-€99,999.01");
        assert_eq!(format_money(dec!(-0.001), "$"), "$0.00");
        assert_eq!(format_money(Decimal::ZERO, "£"), "£0.00");
    }

    #[test]
    fn test_format_money_rounds_to_cents() {
        assert_eq!(format_money(dec!(1.5), "$"), "$1.50");
        assert_eq!(format_money(dec!(14.705882), "$"), "$14.71");
    }

    #[test]
    fn test_serialize_rounds_to_cents() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize")]
            amount: Decimal,
            #[serde(serialize_with = "serialize_one_dp")]
            pct: Decimal,
        }
        let json = serde_json::to_string(&Wrapper {
            amount: dec!(83.333333),
            pct: dec!(37.55),
        })
        .unwrap();
        assert_eq!(json, r#"{"amount":83.33,"pct":37.6}"#);
    }
}
