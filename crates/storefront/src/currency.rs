//! Price display formatting.
//!
//! The catalog source prices in USD; the storefront displays INR. The
//! conversion is a fixed approximate rate applied at render time, purely a
//! presentation concern, never part of cart or favorites state.

use rust_decimal::Decimal;

/// Approximate USD to INR conversion rate.
fn usd_to_inr_rate() -> Decimal {
    Decimal::new(8350, 2)
}

/// Convert a USD amount to INR.
#[must_use]
pub fn convert_to_inr(usd_amount: Decimal) -> Decimal {
    usd_amount * usd_to_inr_rate()
}

/// Format an INR amount with the rupee sign and en-IN digit grouping
/// (last three digits, then groups of two: ₹1,23,456.78).
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let fixed = format!("{rounded:.2}");

    let (sign, unsigned) = fixed
        .strip_prefix('-')
        .map_or(("", fixed.as_str()), |rest| ("-", rest));
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    format!("{sign}\u{20b9}{}.{fraction}", group_indian(integer))
}

/// Format a USD amount string for display in INR.
///
/// Malformed amounts degrade to zero rather than erroring.
#[must_use]
pub fn format_price_from_usd(usd_amount: &str) -> String {
    let amount: Decimal = usd_amount.trim().parse().unwrap_or(Decimal::ZERO);
    format_inr(convert_to_inr(amount))
}

/// Group integer digits en-IN style.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, back) = rest.split_at(rest.len() - 2);
        groups.push(back);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_at_fixed_rate() {
        assert_eq!(convert_to_inr(Decimal::ONE), Decimal::new(8350, 2));
    }

    #[test]
    fn test_formats_small_amount() {
        assert_eq!(format_inr(Decimal::new(4250, 2)), "₹42.50");
    }

    #[test]
    fn test_en_in_grouping() {
        assert_eq!(format_inr(Decimal::from(1000)), "₹1,000.00");
        assert_eq!(format_inr(Decimal::new(12345678, 2)), "₹1,23,456.78");
        assert_eq!(format_inr(Decimal::from(10_000_000)), "₹1,00,00,000.00");
    }

    #[test]
    fn test_usd_string_end_to_end() {
        // 50 USD * 83.50 = 4175.00 INR
        assert_eq!(format_price_from_usd("50"), "₹4,175.00");
    }

    #[test]
    fn test_malformed_usd_amount_degrades_to_zero() {
        assert_eq!(format_price_from_usd("oops"), "₹0.00");
        assert_eq!(format_price_from_usd(""), "₹0.00");
    }

    #[test]
    fn test_negative_amount_keeps_sign_outside() {
        assert_eq!(format_inr(Decimal::from(-1500)), "-₹1,500.00");
    }
}
