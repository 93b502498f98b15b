use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::types::{Rate, RateConvention};
use crate::FinCalcResult;

const ROOT_THRESHOLD: Decimal = dec!(0.0000000000000001);
const MAX_ROOT_ITERATIONS: u32 = 100;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
/// `None` when the result overflows the 96-bit mantissa.
pub fn checked_compound(rate: Rate, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result.checked_mul(factor)?;
    }
    Some(result)
}

/// Positive real n-th root by Newton-Raphson.
pub fn nth_root(value: Decimal, n: u32) -> FinCalcResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(FinCalcError::input(
            "value",
            "n-th root is only defined here for positive values",
        ));
    }
    if n == 0 {
        return Err(FinCalcError::input("n", "root degree must be > 0"));
    }
    if n == 1 || value == Decimal::ONE {
        return Ok(value);
    }

    let degree = Decimal::from(n);
    let mut x = Decimal::ONE + (value - Decimal::ONE) / degree;
    let mut delta = Decimal::ZERO;

    for _ in 0..MAX_ROOT_ITERATIONS {
        let Some(x_pow) = checked_compound(x - Decimal::ONE, n - 1) else {
            // too large to raise, so the root lies below
            x = (x + Decimal::ONE) / Decimal::TWO;
            continue;
        };
        if x_pow.is_zero() {
            break;
        }
        let next = ((degree - Decimal::ONE) * x + value / x_pow) / degree;
        delta = (next - x).abs();
        x = next;
        if delta < ROOT_THRESHOLD {
            return Ok(x);
        }
    }

    Err(FinCalcError::ConvergenceFailure {
        function: format!("nth_root(n = {n})"),
        iterations: MAX_ROOT_ITERATIONS,
        last_delta: delta,
    })
}

/// Per-period rate for `periods_per_year` periods under the given convention.
pub fn periodic_rate(
    annual_rate: Rate,
    periods_per_year: u32,
    convention: RateConvention,
) -> FinCalcResult<Rate> {
    if annual_rate <= dec!(-1) {
        return Err(FinCalcError::input(
            "annual_rate",
            "annual rate must be greater than -100%",
        ));
    }
    if periods_per_year == 0 {
        return Err(FinCalcError::input(
            "periods_per_year",
            "must be at least one period per year",
        ));
    }
    match convention {
        RateConvention::Nominal => Ok(annual_rate / Decimal::from(periods_per_year)),
        RateConvention::Effective => {
            Ok(nth_root(Decimal::ONE + annual_rate, periods_per_year)? - Decimal::ONE)
        }
    }
}

/// Present value of 1 per period for `n` periods, paid in arrears:
/// `(1 - (1 + r)^-n) / r`, or `n` when the rate is zero.
pub fn pv_annuity_factor(rate: Rate, n: u32) -> Option<Decimal> {
    if rate.is_zero() {
        return Some(Decimal::from(n));
    }
    let growth = checked_compound(rate, n)?;
    if growth.is_zero() {
        return None;
    }
    (Decimal::ONE - Decimal::ONE.checked_div(growth)?).checked_div(rate)
}

/// Future value of 1 per period for `n` periods, paid in advance:
/// `((1 + r)^n - 1) / r * (1 + r)`, or `n` when the rate is zero.
pub fn fv_annuity_due_factor(rate: Rate, n: u32) -> Option<Decimal> {
    if rate.is_zero() {
        return Some(Decimal::from(n));
    }
    let growth = checked_compound(rate, n)?;
    (growth - Decimal::ONE)
        .checked_div(rate)?
        .checked_mul(Decimal::ONE + rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_matches_manual() {
        assert_eq!(checked_compound(dec!(0.10), 2), Some(dec!(1.21)));
        assert_eq!(checked_compound(dec!(0.05), 0), Some(Decimal::ONE));
    }

    #[test]
    fn test_checked_compound_overflow() {
        assert!(checked_compound(dec!(1.0), 200).is_none());
        assert_eq!(checked_compound(dec!(0.10), 2), Some(dec!(1.21)));
    }

    #[test]
    fn test_nth_root_recovers_power() {
        let root = nth_root(dec!(1.12), 12).unwrap();
        let back = checked_compound(root - Decimal::ONE, 12).unwrap();
        assert!((back - dec!(1.12)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_nth_root_of_large_value() {
        // the first Newton iterate, 1 + 531440 / 12, overflows at the 11th power
        let root = nth_root(dec!(531_441), 12).unwrap();
        assert!((root - dec!(3)).abs() < dec!(0.000000000001), "root = {root}");
    }

    #[test]
    fn test_nth_root_below_one() {
        let root = nth_root(dec!(0.81), 2).unwrap();
        assert!((root - dec!(0.9)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_nth_root_rejects_non_positive() {
        assert!(nth_root(Decimal::ZERO, 12).is_err());
    }

    #[test]
    fn test_periodic_rate_conventions() {
        let nominal = periodic_rate(dec!(0.12), 12, RateConvention::Nominal).unwrap();
        assert_eq!(nominal, dec!(0.01));

        let effective = periodic_rate(dec!(0.12), 12, RateConvention::Effective).unwrap();
        // (1.12)^(1/12) - 1 ≈ 0.0094888
        assert!((effective - dec!(0.0094888)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_pv_annuity_factor() {
        // 100/month for 12 months at 0.5% ≈ 1161.89
        let f = pv_annuity_factor(dec!(0.005), 12).unwrap();
        assert!((dec!(100) * f - dec!(1161.89)).abs() < dec!(0.01));
        assert_eq!(pv_annuity_factor(Decimal::ZERO, 7), Some(dec!(7)));
    }

    #[test]
    fn test_fv_annuity_due_factor() {
        // 1 at the start of each of 2 periods at 10%: 1.1 + 1.21
        assert_eq!(fv_annuity_due_factor(dec!(0.10), 2), Some(dec!(2.31)));
        assert_eq!(fv_annuity_due_factor(Decimal::ZERO, 5), Some(dec!(5)));
    }
}
