use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::DealEvalError;
use crate::types::{Money, Rate};
use crate::DealEvalResult;

/// Bracket for the IRR search: −99.99% to +1000% per period.
const IRR_LOWER_BOUND: Decimal = dec!(-0.9999);
const IRR_UPPER_BOUND: Decimal = dec!(10);
const BRACKET_TOLERANCE: Decimal = dec!(0.000000000000000001);
const MAX_IRR_ITERATIONS: u32 = 200;

/// Net Present Value of a series of cash flows (index 0 = today).
pub fn npv(rate: Rate, cash_flows: &[Money]) -> DealEvalResult<Money> {
    if rate <= dec!(-1) {
        return Err(DealEvalError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;

    // Horner from the last period back: cf_0 + (cf_1 + (cf_2 + ...) / (1+r)) / (1+r)
    for (t, cf) in cash_flows.iter().enumerate().rev() {
        let discounted = result
            .checked_div(one_plus_r)
            .ok_or_else(|| DealEvalError::DivisionByZero {
                context: format!("NPV discount at period {t}"),
            })?;
        result = discounted
            .checked_add(*cf)
            .ok_or_else(|| DealEvalError::FinancialImpossibility(format!(
                "NPV overflowed at period {t}"
            )))?;
    }

    Ok(result)
}

/// A value with the same sign as NPV(rate) that stays bounded for every
/// rate in the IRR bracket.
///
/// For non-negative rates this is NPV itself. Below zero the discount factor
/// explodes, so the flows are compounded forward to the final period instead:
/// `Σ cf_t (1+r)^(n−t)`, which is NPV scaled by the positive `(1+r)^n`.
fn npv_sign_proxy(rate: Rate, cash_flows: &[Money]) -> DealEvalResult<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    let step = |acc: Decimal, cf: &Money| {
        let carried = if rate >= Decimal::ZERO {
            acc.checked_div(one_plus_r)
        } else {
            acc.checked_mul(one_plus_r)
        };
        carried
            .and_then(|c| c.checked_add(*cf))
            .ok_or_else(|| DealEvalError::overflow("IRR present value"))
    };

    if rate >= Decimal::ZERO {
        cash_flows.iter().rev().try_fold(Decimal::ZERO, step)
    } else {
        cash_flows.iter().try_fold(Decimal::ZERO, step)
    }
}

/// Internal Rate of Return by bracketed bisection.
///
/// Returns the periodic rate (0.08 = 8%) at which NPV is zero. Sequences
/// without a sign change have no IRR and yield `FinancialImpossibility`.
pub fn irr(cash_flows: &[Money]) -> DealEvalResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(DealEvalError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_outflow = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    let has_inflow = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    if !has_outflow || !has_inflow {
        return Err(DealEvalError::FinancialImpossibility(
            "IRR is undefined for cash flows without a sign change".into(),
        ));
    }

    let mut lo = IRR_LOWER_BOUND;
    let mut hi = IRR_UPPER_BOUND;
    let mut f_lo = npv_sign_proxy(lo, cash_flows)?;
    let f_hi = npv_sign_proxy(hi, cash_flows)?;

    if f_lo.is_zero() {
        return Ok(lo);
    }
    if f_hi.is_zero() {
        return Ok(hi);
    }
    if f_lo.is_sign_negative() == f_hi.is_sign_negative() {
        return Err(DealEvalError::FinancialImpossibility(
            "No IRR between -99.99% and 1000%".into(),
        ));
    }

    for _ in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = npv_sign_proxy(mid, cash_flows)?;

        if f_mid.is_zero() || hi - lo < BRACKET_TOLERANCE {
            return Ok(mid);
        }

        if f_mid.is_sign_negative() == f_lo.is_sign_negative() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Err(DealEvalError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: hi - lo,
    })
}

/// Level payment that retires `principal` over `periods` at `periodic_rate`:
/// P * r(1+r)^n / ((1+r)^n - 1). Zero rate falls back to straight line.
pub fn level_payment(principal: Money, periodic_rate: Rate, periods: u32) -> DealEvalResult<Money> {
    if periods == 0 {
        return Err(DealEvalError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let growth = compound(Decimal::ONE, periodic_rate, periods)?;
    let denominator = growth - Decimal::ONE;

    if denominator.is_zero() {
        return Err(DealEvalError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| DealEvalError::overflow("Level payment"))
}

/// `base * (1 + rate)^periods` by repeated multiplication.
///
/// Errors instead of panicking when the result leaves the `Decimal` range.
pub fn compound(base: Money, rate: Rate, periods: u32) -> DealEvalResult<Money> {
    let factor = Decimal::ONE + rate;
    (0..periods).try_fold(base, |acc, period| {
        acc.checked_mul(factor).ok_or_else(|| {
            DealEvalError::overflow(format!("Compounding at {rate} over {} periods", period + 1))
        })
    })
}
