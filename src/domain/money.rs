//! Prices are integer cents of a single currency.

pub const CURRENCY_SYMBOL: &str = "€";

/// `1840` -> `"18.40"`.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// `1840` -> `"€18.40"`.
pub fn format_price(cents: i64) -> String {
    format!("{CURRENCY_SYMBOL}{}", format_amount(cents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_amount(1840), "18.40");
        assert_eq!(format_amount(590), "5.90");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(-60), "-0.60");
    }

    #[test]
    fn prefixes_currency_symbol() {
        assert_eq!(format_price(350), "€3.50");
    }
}
