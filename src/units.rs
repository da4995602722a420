use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::Balance;

/// Fractional digits of one whole token, in base units (1 token = 10^18).
pub const DECIMALS: u32 = 18;

const ONE_TOKEN: Balance = 10u128.pow(DECIMALS);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount `{0}` is not a valid decimal number")]
    Malformed(String),
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Amount has more than 18 fractional digits")]
    TooPrecise,
    #[error("Amount does not fit into base units")]
    Overflow,
}

/// Converts a token quantity such as `2.5` into base units.
pub fn parse_units(amount: &str) -> Result<Balance, UnitsError> {
    let value = Decimal::from_str(amount.trim())
        .map_err(|_| UnitsError::Malformed(amount.to_owned()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::NegativeAmount);
    }
    let scale = value.scale();
    if scale > DECIMALS {
        return Err(UnitsError::TooPrecise);
    }
    value
        .mantissa()
        .unsigned_abs()
        .checked_mul(10u128.pow(DECIMALS - scale))
        .ok_or(UnitsError::Overflow)
}

/// Renders base units as a token quantity, without trailing zeros.
pub fn format_units(amount: Balance) -> String {
    let whole = amount / ONE_TOKEN;
    let fraction = amount % ONE_TOKEN;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
