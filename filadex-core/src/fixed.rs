//! Fixed-point scaling for physical material properties.
//!
//! Vendors report decimals like density `"1.24"` or cost `"24.99"`. Storing
//! those as floats invites drift when the values round-trip through several
//! JSON artifacts, so each field is scaled by a fixed factor and kept as an
//! integer. The factor per field must match across all vendors feeding the
//! same merged document.

/// Two-decimal fields: cost, density, diameter, flow ratio.
pub const SCALE_CENTI: i64 = 100;

/// One-decimal fields: max volumetric speed.
pub const SCALE_DECI: i64 = 10;

/// Three-decimal fields: pressure advance (typical values around 0.02).
pub const SCALE_MILLI: i64 = 1000;

/// Whole-number fields: temperatures.
pub const SCALE_UNIT: i64 = 1;

/// Scale a decimal string to a fixed-point integer, truncating toward zero.
///
/// `"12.345"` at scale 100 becomes `1234`. Returns `None` when the input is
/// not a finite decimal number.
pub fn scale_decimal(raw: &str, scale: i64) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((value * scale as f64).trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_two_decimals() {
        assert_eq!(scale_decimal("12.345", SCALE_CENTI), Some(1234));
        assert_eq!(scale_decimal("24.99", SCALE_CENTI), Some(2499));
        assert_eq!(scale_decimal("1.24", SCALE_CENTI), Some(124));
    }

    #[test]
    fn test_scale_one_decimal() {
        assert_eq!(scale_decimal("21.5", SCALE_DECI), Some(215));
        assert_eq!(scale_decimal("12", SCALE_DECI), Some(120));
    }

    #[test]
    fn test_scale_unit_truncates() {
        assert_eq!(scale_decimal("230", SCALE_UNIT), Some(230));
        assert_eq!(scale_decimal("230.9", SCALE_UNIT), Some(230));
    }

    #[test]
    fn test_scale_trims_whitespace() {
        assert_eq!(scale_decimal(" 1.75 ", SCALE_CENTI), Some(175));
    }

    #[test]
    fn test_scale_rejects_garbage() {
        assert_eq!(scale_decimal("n/a", SCALE_CENTI), None);
        assert_eq!(scale_decimal("", SCALE_CENTI), None);
        assert_eq!(scale_decimal("NaN", SCALE_CENTI), None);
        assert_eq!(scale_decimal("inf", SCALE_CENTI), None);
    }

    #[test]
    fn test_scale_negative_truncates_toward_zero() {
        assert_eq!(scale_decimal("-0.019", SCALE_MILLI), Some(-19));
    }
}
