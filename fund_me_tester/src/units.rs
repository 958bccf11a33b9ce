//!
//! The native currency unit conversions.
//!

use web3::types::U256;

/// The number of decimals of the native currency.
pub const ETHER_DECIMALS: usize = 18;

///
/// Parses a decimal ether amount, e.g. `0.5`, into wei.
///
pub fn parse_ether(value: &str) -> anyhow::Result<U256> {
    parse_units(value, ETHER_DECIMALS)
}

///
/// Parses a decimal amount with the given number of decimals into the smallest unit.
///
pub fn parse_units(value: &str, decimals: usize) -> anyhow::Result<U256> {
    let value = value.trim();
    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (value, ""),
    };

    if integer.is_empty() && fraction.is_empty() {
        anyhow::bail!("Empty amount");
    }
    if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Invalid amount `{value}`: only non-negative decimal numbers are allowed");
    }
    if fraction.len() > decimals {
        anyhow::bail!("Invalid amount `{value}`: more than {decimals} fractional digits");
    }

    let digits = format!("{integer}{fraction:0<decimals$}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(digits).map_err(|error| anyhow::anyhow!("Invalid amount `{value}`: {error:?}"))
}

///
/// Formats a wei amount as a decimal ether string.
///
pub fn format_ether(value: U256) -> String {
    format_units(value, ETHER_DECIMALS)
}

///
/// Formats an amount in the smallest unit as a decimal string.
///
pub fn format_units(value: U256, decimals: usize) -> String {
    let digits = value.to_string();
    let digits = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{integer}.0")
    } else {
        format!("{integer}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use web3::types::U256;

    #[test]
    fn parses_half_an_ether() {
        let value = super::parse_ether("0.5").expect("Valid amount");
        assert_eq!(value, U256::exp10(17) * 5);
    }

    #[test]
    fn parses_zero() {
        assert_eq!(super::parse_ether("0").expect("Valid amount"), U256::zero());
        assert_eq!(super::parse_ether("0.0").expect("Valid amount"), U256::zero());
    }

    #[test]
    fn parses_whole_amounts() {
        let value = super::parse_ether("10000").expect("Valid amount");
        assert_eq!(value, U256::exp10(22));
    }

    #[test]
    fn rejects_excessive_precision() {
        assert!(super::parse_ether("1.0000000000000000001").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(super::parse_ether("-1").is_err());
        assert!(super::parse_ether("0x10").is_err());
        assert!(super::parse_ether("").is_err());
    }

    #[test]
    fn formats_ether() {
        assert_eq!(super::format_ether(U256::exp10(17) * 5), "0.5");
        assert_eq!(super::format_ether(U256::exp10(18) * 3), "3.0");
        assert_eq!(super::format_ether(U256::zero()), "0.0");
        assert_eq!(super::format_ether(U256::from(1)), "0.000000000000000001");
    }
}
