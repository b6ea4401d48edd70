//! Exact conversion between scaled backing integers and host decimals

use crate::common::constants::{MAX_DECIMAL_WIDTH, MAX_HOST_DECIMAL_SCALE};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// 10^exponent for exponents up to the widest decimal
pub fn pow10(exponent: u32) -> DuckBridgeResult<i128> {
    10i128
        .checked_pow(exponent)
        .ok_or_else(|| crate::overflow_err!("10^{} does not fit in 128 bits", exponent))
}

/// Decode a backing integer of up to 64 bits; always exact
pub fn decimal_from_i64(value: i64, scale: u8) -> DuckBridgeResult<Decimal> {
    Decimal::try_from_i128_with_scale(i128::from(value), u32::from(scale))
        .map_err(|e| DuckBridgeError::Overflow(format!("Decimal {}e-{}: {}", value, scale, e)))
}

/// Decode a 128-bit backing integer: integer division by 10^scale, then the
/// remainder added back as a separate fractional term. Fractional digits
/// beyond the host's 28 are truncated.
pub fn decimal_from_i128(value: i128, scale: u8) -> DuckBridgeResult<Decimal> {
    let divisor = pow10(u32::from(scale))?;
    let integral = value / divisor;
    let mut remainder = value % divisor;

    let integral = Decimal::try_from_i128_with_scale(integral, 0).map_err(|_| {
        crate::overflow_err!(
            "Decimal integral part {} exceeds the host decimal range",
            integral
        )
    })?;

    let mut fraction_scale = u32::from(scale);
    if fraction_scale > MAX_HOST_DECIMAL_SCALE {
        remainder /= pow10(fraction_scale - MAX_HOST_DECIMAL_SCALE)?;
        fraction_scale = MAX_HOST_DECIMAL_SCALE;
    }
    let fraction = Decimal::try_from_i128_with_scale(remainder, fraction_scale)
        .map_err(|e| DuckBridgeError::Overflow(format!("Decimal fraction: {}", e)))?;

    integral
        .checked_add(fraction)
        .ok_or_else(|| crate::overflow_err!("Decimal {}e-{} overflows", value, scale))
}

/// Encode a host decimal as a backing integer at `scale`, rounding half away
/// from zero, and check it fits `width` digits
pub fn scaled_from_decimal(value: &Decimal, width: u8, scale: u8) -> DuckBridgeResult<i128> {
    let rounded = value.round_dp_with_strategy(u32::from(scale), RoundingStrategy::MidpointAwayFromZero);
    let missing = u32::from(scale).saturating_sub(rounded.scale());
    let scaled = rounded
        .mantissa()
        .checked_mul(pow10(missing)?)
        .ok_or_else(|| crate::overflow_err!("Decimal {} overflows at scale {}", value, scale))?;
    check_width(scaled, width, scale)?;
    Ok(scaled)
}

/// Encode an integer as a backing integer at `scale`
pub fn scaled_from_integer(value: i128, width: u8, scale: u8) -> DuckBridgeResult<i128> {
    let scaled = value
        .checked_mul(pow10(u32::from(scale))?)
        .ok_or_else(|| crate::overflow_err!("Integer {} overflows at scale {}", value, scale))?;
    check_width(scaled, width, scale)?;
    Ok(scaled)
}

fn check_width(scaled: i128, width: u8, scale: u8) -> DuckBridgeResult<()> {
    let width = width.min(MAX_DECIMAL_WIDTH);
    let limit = pow10(u32::from(width))?;
    if scaled.unsigned_abs() >= limit.unsigned_abs() {
        return Err(crate::overflow_err!(
            "Value {}e-{} does not fit DECIMAL({},{})",
            scaled,
            scale,
            width,
            scale
        ));
    }
    Ok(())
}

/// Render a backing integer exactly, the way the engine prints decimals
pub fn format_scaled(value: i128, scale: u8) -> String {
    let digits = value.unsigned_abs().to_string();
    let sign = if value < 0 { "-" } else { "" };
    let scale = usize::from(scale);
    if scale == 0 {
        return format!("{}{}", sign, digits);
    }
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (integral, fraction) = padded.split_at(padded.len() - scale);
    format!("{}{}.{}", sign, integral, fraction)
}

/// Convert a backing integer to the nearest double
pub fn f64_from_scaled(value: i128, scale: u8) -> f64 {
    value as f64 / 10f64.powi(i32::from(scale))
}
