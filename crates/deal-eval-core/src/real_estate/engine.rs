use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::DealEvalError;
use crate::real_estate::amortization::AmortizationSchedule;
use crate::time_value;
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Multiple, Pct};
use crate::DealEvalResult;

pub const MAX_HOLD_PERIOD_YEARS: u32 = 30;
pub const MAX_AMORTIZATION_YEARS: u32 = 50;
/// Ceiling on the loan rate and on both annual growth rates, in percent.
pub const MAX_ANNUAL_RATE_PCT: Decimal = dec!(100);

const METHODOLOGY: &str = "Rental Property Hold-Period Projection (Levered Cash Flow)";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Acquisition, income and growth terms for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentInput {
    /// Free-text identifier (address, ZIP). Never used numerically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Acquisition price
    pub purchase_price: Money,
    /// In-place monthly rent
    pub monthly_rent: Money,
    /// Equity contribution as a percentage of price (20 = 20%)
    pub down_payment_pct: Pct,
    /// Monthly operating expenses, held flat over the hold period
    pub monthly_expenses: Money,
    /// Annual property value growth (3 = 3%)
    #[serde(default)]
    pub appreciation_rate_pct: Pct,
    /// Annual rent growth (2 = 2%)
    #[serde(default)]
    pub rent_growth_rate_pct: Pct,
    /// Projection length in years (1-30)
    pub hold_period_years: u32,
}

/// Financing terms applied identically to every property in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedFinancing {
    /// Annual nominal mortgage rate (5.5 = 5.5%)
    pub loan_rate_pct: Pct,
    /// Amortization term in years; may exceed the hold period
    pub amortization_years: u32,
    /// Share of gross rent lost to vacancy (5 = 5%)
    pub vacancy_rate_pct: Pct,
}

impl Default for SharedFinancing {
    fn default() -> Self {
        Self {
            loan_rate_pct: dec!(5.5),
            amortization_years: 30,
            vacancy_rate_pct: dec!(5),
        }
    }
}

/// One projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleYear {
    pub year: u32,
    /// Gross scheduled rent after compounded growth
    pub gross_rent: Money,
    pub vacancy_loss: Money,
    /// Gross rent less vacancy
    pub effective_rent: Money,
    pub operating_expenses: Money,
    /// Net operating income
    pub noi: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    /// Zero once the amortization term has run out
    pub debt_service: Money,
    /// NOI less debt service
    pub cash_flow: Money,
    /// Cash flow / initial equity * 100; `None` with zero equity
    pub roi_pct: Option<Pct>,
    pub property_value: Money,
    pub loan_balance: Money,
    /// Down payment + cumulative principal + appreciation gain
    pub cumulative_equity: Money,
}

/// Engine output for one property. Percentages are expressed as value * 100.
///
/// `None` on a return metric means the figure is undefined (no IRR root, or
/// no equity to measure against), which is distinct from a zero return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Headline ROI: mean of the yearly ROI percentages
    pub roi_pct: Option<Pct>,
    /// Year-1 NOI / purchase price * 100
    pub cap_rate_pct: Pct,
    /// Year-1 cash flow / equity * 100
    pub cash_on_cash_pct: Option<Pct>,
    /// IRR over operating cash flows only
    pub irr_operational_pct: Option<Pct>,
    /// IRR with net sale proceeds added to the final year
    pub irr_total_pct: Option<Pct>,
    /// (Σ cash flow + sale proceeds) / equity
    pub equity_multiple: Option<Multiple>,
    pub equity_invested: Money,
    pub loan_amount: Money,
    pub monthly_payment: Money,
    /// Year-1 NOI / year-1 debt service; `None` without debt
    pub dscr_year1: Option<Multiple>,
    pub exit_property_value: Money,
    pub exit_loan_balance: Money,
    /// Exit value less the loan balance repaid at sale
    pub sale_proceeds: Money,
    pub total_cash_flow: Money,
    pub cash_flows: Vec<Money>,
    pub annual_rents: Vec<Money>,
    /// Empty when equity is zero
    pub annual_roi_pct: Vec<Pct>,
    pub schedule: Vec<ScheduleYear>,
}

#[derive(Serialize)]
struct Assumptions<'a> {
    property: &'a InvestmentInput,
    financing: &'a SharedFinancing,
    headline_roi: &'static str,
    operating_expenses: &'static str,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project one property over its hold period and derive summary metrics.
///
/// Pure: identical inputs always give an identical record.
pub fn compute_metrics(
    input: &InvestmentInput,
    financing: &SharedFinancing,
) -> DealEvalResult<MetricsRecord> {
    let mut warnings = Vec::new();
    project(input, financing, &mut warnings)
}

/// Same projection wrapped in the standard envelope with warnings and metadata.
pub fn evaluate_property(
    input: &InvestmentInput,
    financing: &SharedFinancing,
) -> DealEvalResult<ComputationOutput<MetricsRecord>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let record = project(input, financing, &mut warnings)?;

    let assumptions = Assumptions {
        property: input,
        financing,
        headline_roi: "mean of yearly ROI over the hold period",
        operating_expenses: "flat, no escalation",
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        METHODOLOGY,
        &assumptions,
        warnings,
        elapsed,
        record,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(
    input: &InvestmentInput,
    financing: &SharedFinancing,
    warnings: &mut Vec<String>,
) -> DealEvalResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(invalid("purchase_price", "Purchase price must be positive"));
    }

    if input.down_payment_pct < Decimal::ZERO || input.down_payment_pct > dec!(100) {
        return Err(invalid(
            "down_payment_pct",
            "Down payment must be between 0% and 100%",
        ));
    }

    if input.hold_period_years == 0 || input.hold_period_years > MAX_HOLD_PERIOD_YEARS {
        return Err(invalid(
            "hold_period_years",
            "Hold period must be between 1 and 30 years",
        ));
    }

    if financing.amortization_years == 0 || financing.amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(invalid(
            "amortization_years",
            "Amortization term must be between 1 and 50 years",
        ));
    }

    if input.monthly_rent < Decimal::ZERO {
        return Err(invalid("monthly_rent", "Monthly rent cannot be negative"));
    }

    if input.monthly_expenses < Decimal::ZERO {
        return Err(invalid(
            "monthly_expenses",
            "Monthly expenses cannot be negative",
        ));
    }

    if financing.loan_rate_pct < Decimal::ZERO || financing.loan_rate_pct > MAX_ANNUAL_RATE_PCT {
        return Err(invalid(
            "loan_rate_pct",
            "Loan rate must be between 0% and 100%",
        ));
    }

    if financing.vacancy_rate_pct < Decimal::ZERO || financing.vacancy_rate_pct > dec!(100) {
        return Err(invalid(
            "vacancy_rate_pct",
            "Vacancy rate must be between 0% and 100%",
        ));
    }

    if input.appreciation_rate_pct <= dec!(-100) || input.appreciation_rate_pct > MAX_ANNUAL_RATE_PCT {
        return Err(invalid(
            "appreciation_rate_pct",
            "Appreciation rate must be greater than -100% and at most 100%",
        ));
    }

    if input.rent_growth_rate_pct <= dec!(-100) || input.rent_growth_rate_pct > MAX_ANNUAL_RATE_PCT {
        return Err(invalid(
            "rent_growth_rate_pct",
            "Rent growth rate must be greater than -100% and at most 100%",
        ));
    }

    // --- Warnings for unusual inputs ---
    if financing.vacancy_rate_pct > dec!(15) {
        warnings.push(format!(
            "Vacancy rate {:.1}% exceeds 15% — above typical market norms",
            financing.vacancy_rate_pct
        ));
    }

    if input.down_payment_pct < dec!(20) {
        warnings.push(format!(
            "Equity contribution of {:.1}% is below 20% — high leverage",
            input.down_payment_pct
        ));
    }

    if input.hold_period_years > financing.amortization_years {
        warnings.push(format!(
            "Hold period of {} years exceeds the {}-year amortization term — no debt service after year {}",
            input.hold_period_years, financing.amortization_years, financing.amortization_years
        ));
    }

    Ok(())
}

fn invalid(field: &str, reason: &str) -> DealEvalError {
    DealEvalError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn project(
    input: &InvestmentInput,
    financing: &SharedFinancing,
    warnings: &mut Vec<String>,
) -> DealEvalResult<MetricsRecord> {
    validate_input(input, financing, warnings)?;

    let price = input.purchase_price;
    let hold = input.hold_period_years;
    let equity = checked(price.checked_mul(pct_to_rate(input.down_payment_pct)), "Equity")?;
    let loan_amount = price - equity;

    let ledger = AmortizationSchedule::build(
        loan_amount,
        financing.loan_rate_pct,
        financing.amortization_years,
        hold,
    )?;

    debug!(
        %price, %equity, %loan_amount, monthly_payment = %ledger.monthly_payment, hold,
        "projecting rental property"
    );

    let schedule = build_schedule(input, financing, equity, &ledger)?;
    summarize(input, equity, &ledger, schedule, warnings)
}

fn build_schedule(
    input: &InvestmentInput,
    financing: &SharedFinancing,
    equity: Money,
    ledger: &AmortizationSchedule,
) -> DealEvalResult<Vec<ScheduleYear>> {
    let price = input.purchase_price;
    let rent_growth = Decimal::ONE + pct_to_rate(input.rent_growth_rate_pct);
    let appreciation = Decimal::ONE + pct_to_rate(input.appreciation_rate_pct);
    let vacancy = pct_to_rate(financing.vacancy_rate_pct);
    let operating_expenses = checked(input.monthly_expenses.checked_mul(dec!(12)), "Annual expenses")?;

    let mut schedule = Vec::with_capacity(input.hold_period_years as usize);
    let mut gross_rent = checked(input.monthly_rent.checked_mul(dec!(12)), "Annual rent")?;
    let mut property_value = price;
    let mut cumulative_principal = Decimal::ZERO;

    for year in 1..=input.hold_period_years {
        if year > 1 {
            gross_rent = checked(gross_rent.checked_mul(rent_growth), "Gross rent")?;
        }
        property_value = checked(property_value.checked_mul(appreciation), "Property value")?;

        let vacancy_loss = gross_rent * vacancy;
        let effective_rent = gross_rent - vacancy_loss;
        let noi = effective_rent - operating_expenses;

        let (interest_paid, principal_paid, debt_service) = match ledger.year(year) {
            Some(row) => (row.interest_paid, row.principal_paid, row.debt_service),
            None => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };
        cumulative_principal += principal_paid;

        let cash_flow = checked(noi.checked_sub(debt_service), "Cash flow")?;
        let cumulative_equity = checked(
            equity
                .checked_add(cumulative_principal)
                .and_then(|e| e.checked_add(property_value - price)),
            "Cumulative equity",
        )?;

        schedule.push(ScheduleYear {
            year,
            gross_rent,
            vacancy_loss,
            effective_rent,
            operating_expenses,
            noi,
            interest_paid,
            principal_paid,
            debt_service,
            cash_flow,
            roi_pct: ratio_pct(cash_flow, equity, "Annual ROI")?,
            property_value,
            loan_balance: ledger.balance_after(year),
            cumulative_equity,
        });
    }

    Ok(schedule)
}

fn summarize(
    input: &InvestmentInput,
    equity: Money,
    ledger: &AmortizationSchedule,
    schedule: Vec<ScheduleYear>,
    warnings: &mut Vec<String>,
) -> DealEvalResult<MetricsRecord> {
    let (first, last) = match (schedule.first(), schedule.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(DealEvalError::InsufficientData(
                "Projection produced no years".into(),
            ))
        }
    };

    let cap_rate_pct = ratio_pct(first.noi, input.purchase_price, "Cap rate")?.ok_or_else(|| {
        DealEvalError::DivisionByZero {
            context: "cap rate".into(),
        }
    })?;
    let cash_on_cash_pct = ratio_pct(first.cash_flow, equity, "Cash-on-cash")?;
    let dscr_year1 = if first.debt_service.is_zero() {
        None
    } else {
        Some(checked(first.noi.checked_div(first.debt_service), "DSCR")?)
    };

    if let Some(dscr) = dscr_year1 {
        if dscr < dec!(1.2) {
            warnings.push(format!(
                "Year-1 DSCR of {dscr:.2} is below 1.20x — lender covenant risk"
            ));
        }
    }
    if first.cash_flow < Decimal::ZERO {
        warnings.push("Year-1 cash flow is negative — property does not carry its debt".into());
    }

    let exit_property_value = last.property_value;
    let exit_loan_balance = ledger.balance_after(input.hold_period_years);
    let sale_proceeds = exit_property_value - exit_loan_balance;

    let cash_flows: Vec<Money> = schedule.iter().map(|y| y.cash_flow).collect();
    let annual_rents: Vec<Money> = schedule.iter().map(|y| y.gross_rent).collect();
    let annual_roi_pct: Vec<Pct> = schedule.iter().filter_map(|y| y.roi_pct).collect();
    let total_cash_flow = checked_sum(&cash_flows, "Total cash flow")?;

    let roi_pct = if annual_roi_pct.is_empty() {
        None
    } else {
        let sum = checked_sum(&annual_roi_pct, "Headline ROI")?;
        Some(sum / Decimal::from(annual_roi_pct.len() as u32))
    };

    let irr_operational_pct = solve_irr_pct("Operational", equity, &cash_flows, Decimal::ZERO, warnings);
    let irr_total_pct = solve_irr_pct("Total", equity, &cash_flows, sale_proceeds, warnings);

    let equity_multiple = if equity.is_zero() {
        None
    } else {
        let total_return = checked(total_cash_flow.checked_add(sale_proceeds), "Total return")?;
        Some(checked(total_return.checked_div(equity), "Equity multiple")?)
    };

    debug!(
        %cap_rate_pct,
        irr_operational = ?irr_operational_pct,
        irr_total = ?irr_total_pct,
        equity_multiple = ?equity_multiple,
        "rental projection summarized"
    );

    Ok(MetricsRecord {
        roi_pct,
        cap_rate_pct,
        cash_on_cash_pct,
        irr_operational_pct,
        irr_total_pct,
        equity_multiple,
        equity_invested: equity,
        loan_amount: ledger.loan_amount,
        monthly_payment: ledger.monthly_payment,
        dscr_year1,
        exit_property_value,
        exit_loan_balance,
        sale_proceeds,
        total_cash_flow,
        cash_flows,
        annual_rents,
        annual_roi_pct,
        schedule,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn checked(value: Option<Decimal>, context: &str) -> DealEvalResult<Decimal> {
    value.ok_or_else(|| DealEvalError::overflow(context))
}

fn checked_sum(values: &[Decimal], context: &str) -> DealEvalResult<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| DealEvalError::overflow(context))
}

/// `numerator / denominator * 100`; `Ok(None)` when the denominator is zero.
fn ratio_pct(numerator: Money, denominator: Money, context: &str) -> DealEvalResult<Option<Pct>> {
    if denominator.is_zero() {
        return Ok(None);
    }
    numerator
        .checked_div(denominator)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(Some)
        .ok_or_else(|| DealEvalError::overflow(context))
}

/// IRR of `[-equity, cf_1, ..., cf_n + terminal]` as a percentage.
fn solve_irr_pct(
    variant: &str,
    equity: Money,
    cash_flows: &[Money],
    terminal: Money,
    warnings: &mut Vec<String>,
) -> Option<Pct> {
    if equity.is_zero() {
        warnings.push(format!("{variant} IRR undefined — no equity invested"));
        return None;
    }

    let mut flows = Vec::with_capacity(cash_flows.len() + 1);
    flows.push(-equity);
    flows.extend_from_slice(cash_flows);
    if let Some(last) = flows.last_mut() {
        match last.checked_add(terminal) {
            Some(total) => *last = total,
            None => {
                warnings.push(format!("{variant} IRR undefined — final-year flow out of range"));
                return None;
            }
        }
    }

    match time_value::irr(&flows) {
        Ok(rate) => Some(rate * Decimal::ONE_HUNDRED),
        Err(e) => {
            warn!(variant, error = %e, "IRR undefined");
            warnings.push(format!("{variant} IRR undefined — {e}"));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Single-family rental from the default comparison form.
    fn sample_input() -> InvestmentInput {
        InvestmentInput {
            label: Some("12 Elm St, 30301".into()),
            purchase_price: dec!(300000),
            monthly_rent: dec!(2000),
            down_payment_pct: dec!(20),
            monthly_expenses: dec!(300),
            appreciation_rate_pct: dec!(3),
            rent_growth_rate_pct: dec!(2),
            hold_period_years: 10,
        }
    }

    fn sample_financing() -> SharedFinancing {
        SharedFinancing::default()
    }

    // --- Schedule ---

    #[test]
    fn test_schedule_length_matches_hold() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        assert_eq!(out.schedule.len(), 10);
        assert_eq!(out.cash_flows.len(), 10);
        assert_eq!(out.annual_rents.len(), 10);
        assert_eq!(out.annual_roi_pct.len(), 10);
    }

    #[test]
    fn test_year_one_income() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let y1 = &out.schedule[0];

        // Gross = 24000, vacancy 5% = 1200, expenses = 3600
        assert_eq!(y1.gross_rent, dec!(24000));
        assert_eq!(y1.vacancy_loss, dec!(1200));
        assert_eq!(y1.effective_rent, dec!(22800));
        assert_eq!(y1.operating_expenses, dec!(3600));
        assert_eq!(y1.noi, dec!(19200));
        assert_eq!(y1.cash_flow, y1.noi - y1.debt_service);
    }

    #[test]
    fn test_rent_compounds() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        // 24000 * 1.02^2
        assert_eq!(out.annual_rents[2], dec!(24969.6));
    }

    #[test]
    fn test_flat_rent_without_growth() {
        let mut input = sample_input();
        input.rent_growth_rate_pct = Decimal::ZERO;
        let out = compute_metrics(&input, &sample_financing()).unwrap();
        assert!(out.annual_rents.iter().all(|r| *r == dec!(24000)));
    }

    #[test]
    fn test_expenses_flat() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        assert!(out
            .schedule
            .iter()
            .all(|y| y.operating_expenses == dec!(3600)));
    }

    #[test]
    fn test_property_value_appreciates_from_year_one() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        assert_eq!(out.schedule[0].property_value, dec!(309000));
        assert_eq!(out.schedule[1].property_value, dec!(318270));
    }

    #[test]
    fn test_cumulative_equity() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let y2 = &out.schedule[1];
        let principal: Decimal = out.schedule[..2].iter().map(|y| y.principal_paid).sum();
        assert_eq!(
            y2.cumulative_equity,
            dec!(60000) + principal + (y2.property_value - dec!(300000))
        );
    }

    #[test]
    fn test_year_roi() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let y1 = &out.schedule[0];
        assert_eq!(y1.roi_pct, Some(y1.cash_flow / dec!(60000) * dec!(100)));
    }

    // --- Summary metrics ---

    #[test]
    fn test_cap_rate() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        // 19200 / 300000 * 100 = 6.4
        assert_eq!(out.cap_rate_pct, dec!(6.4));
    }

    #[test]
    fn test_cash_on_cash() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let expected = out.cash_flows[0] / dec!(60000) * dec!(100);
        assert_eq!(out.cash_on_cash_pct, Some(expected));
    }

    #[test]
    fn test_headline_roi_is_mean_of_yearly() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let sum: Decimal = out.annual_roi_pct.iter().copied().sum();
        assert_eq!(out.roi_pct, Some(sum / dec!(10)));
    }

    #[test]
    fn test_sale_proceeds_and_equity_multiple() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        assert_eq!(
            out.sale_proceeds,
            out.exit_property_value - out.exit_loan_balance
        );
        let expected = (out.total_cash_flow + out.sale_proceeds) / dec!(60000);
        assert_eq!(out.equity_multiple, Some(expected));
        assert!(expected > Decimal::ONE);
    }

    #[test]
    fn test_irr_variants_defined() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let op = out.irr_operational_pct.unwrap();
        let total = out.irr_total_pct.unwrap();
        assert!(total > op, "sale should lift IRR: {total} vs {op}");
    }

    #[test]
    fn test_dscr() {
        let out = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let y1 = &out.schedule[0];
        assert_eq!(out.dscr_year1, Some(y1.noi / y1.debt_service));
    }

    // --- Degenerate inputs ---

    #[test]
    fn test_full_cash_purchase() {
        let mut input = sample_input();
        input.down_payment_pct = dec!(100);
        let out = compute_metrics(&input, &sample_financing()).unwrap();

        assert_eq!(out.loan_amount, Decimal::ZERO);
        assert_eq!(out.dscr_year1, None);
        for y in &out.schedule {
            assert_eq!(y.debt_service, Decimal::ZERO);
            assert_eq!(y.cash_flow, y.noi);
        }
    }

    #[test]
    fn test_full_financing_has_undefined_returns() {
        let mut input = sample_input();
        input.down_payment_pct = Decimal::ZERO;
        let result = evaluate_property(&input, &sample_financing()).unwrap();
        let out = &result.result;

        assert_eq!(out.equity_invested, Decimal::ZERO);
        assert_eq!(out.loan_amount, dec!(300000));
        assert_eq!(out.cash_on_cash_pct, None);
        assert_eq!(out.irr_operational_pct, None);
        assert_eq!(out.irr_total_pct, None);
        assert_eq!(out.equity_multiple, None);
        assert_eq!(out.roi_pct, None);
        assert!(out.annual_roi_pct.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("no equity")));
    }

    #[test]
    fn test_hold_longer_than_amortization() {
        let mut input = sample_input();
        input.hold_period_years = 20;
        let financing = SharedFinancing {
            amortization_years: 15,
            ..sample_financing()
        };
        let result = evaluate_property(&input, &financing).unwrap();
        let out = &result.result;

        assert!(out.schedule[14].debt_service > Decimal::ZERO);
        for y in &out.schedule[15..] {
            assert_eq!(y.debt_service, Decimal::ZERO);
            assert_eq!(y.cash_flow, y.noi);
            assert_eq!(y.loan_balance, Decimal::ZERO);
        }
        assert_eq!(out.exit_loan_balance, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("amortization term")));
    }

    #[test]
    fn test_zero_appreciation_keeps_value_flat() {
        let mut input = sample_input();
        input.appreciation_rate_pct = Decimal::ZERO;
        let out = compute_metrics(&input, &sample_financing()).unwrap();
        assert!(out
            .schedule
            .iter()
            .all(|y| y.property_value == dec!(300000)));
    }

    #[test]
    fn test_deterministic() {
        let a = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        let b = compute_metrics(&sample_input(), &sample_financing()).unwrap();
        assert_eq!(a, b);
    }

    // --- Warnings ---

    #[test]
    fn test_low_dscr_warning() {
        let result = evaluate_property(&sample_input(), &sample_financing()).unwrap();
        // NOI 19200 against ~16352 debt service is ~1.17x
        assert!(result.warnings.iter().any(|w| w.contains("DSCR")));
    }

    #[test]
    fn test_high_vacancy_warning() {
        let financing = SharedFinancing {
            vacancy_rate_pct: dec!(18),
            ..sample_financing()
        };
        let result = evaluate_property(&sample_input(), &financing).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("exceeds 15%")));
    }

    #[test]
    fn test_negative_cash_flow_warning() {
        let mut input = sample_input();
        input.monthly_rent = dec!(1200);
        let result = evaluate_property(&input, &sample_financing()).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("negative")));
    }

    #[test]
    fn test_methodology_string() {
        let result = evaluate_property(&sample_input(), &sample_financing()).unwrap();
        assert_eq!(result.methodology, METHODOLOGY);
        assert_eq!(
            result.assumptions["headline_roi"],
            "mean of yearly ROI over the hold period"
        );
    }

    // --- Validation errors ---

    #[test]
    fn test_zero_price_error() {
        let mut input = sample_input();
        input.purchase_price = Decimal::ZERO;
        match compute_metrics(&input, &sample_financing()).unwrap_err() {
            DealEvalError::InvalidInput { field, .. } => assert_eq!(field, "purchase_price"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_down_payment_out_of_range() {
        let mut input = sample_input();
        input.down_payment_pct = dec!(101);
        assert!(compute_metrics(&input, &sample_financing()).is_err());
        input.down_payment_pct = dec!(-1);
        assert!(compute_metrics(&input, &sample_financing()).is_err());
    }

    #[test]
    fn test_hold_period_bounds() {
        let mut input = sample_input();
        input.hold_period_years = 0;
        match compute_metrics(&input, &sample_financing()).unwrap_err() {
            DealEvalError::InvalidInput { field, .. } => assert_eq!(field, "hold_period_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        input.hold_period_years = 31;
        assert!(compute_metrics(&input, &sample_financing()).is_err());
    }

    #[test]
    fn test_zero_amortization_error() {
        let financing = SharedFinancing {
            amortization_years: 0,
            ..sample_financing()
        };
        match compute_metrics(&sample_input(), &financing).unwrap_err() {
            DealEvalError::InvalidInput { field, .. } => assert_eq!(field, "amortization_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_rent_error() {
        let mut input = sample_input();
        input.monthly_rent = dec!(-1);
        assert!(compute_metrics(&input, &sample_financing()).is_err());
    }

    #[test]
    fn test_vacancy_out_of_range() {
        let financing = SharedFinancing {
            vacancy_rate_pct: dec!(120),
            ..sample_financing()
        };
        assert!(compute_metrics(&sample_input(), &financing).is_err());
    }

    // --- Range limits ---

    fn rejected_field(input: &InvestmentInput, financing: &SharedFinancing) -> String {
        match compute_metrics(input, financing).unwrap_err() {
            DealEvalError::InvalidInput { field, .. } => field,
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_loan_rate_above_ceiling_rejected() {
        let financing = SharedFinancing {
            loan_rate_pct: dec!(500),
            ..sample_financing()
        };
        assert_eq!(rejected_field(&sample_input(), &financing), "loan_rate_pct");
    }

    #[test]
    fn test_amortization_above_ceiling_rejected() {
        let financing = SharedFinancing {
            amortization_years: 2000,
            ..sample_financing()
        };
        assert_eq!(rejected_field(&sample_input(), &financing), "amortization_years");
    }

    #[test]
    fn test_growth_above_ceiling_rejected() {
        let mut input = sample_input();
        input.hold_period_years = 30;
        input.appreciation_rate_pct = dec!(1000);
        assert_eq!(rejected_field(&input, &sample_financing()), "appreciation_rate_pct");

        let mut input = sample_input();
        input.rent_growth_rate_pct = dec!(1000);
        assert_eq!(rejected_field(&input, &sample_financing()), "rent_growth_rate_pct");
    }

    #[test]
    fn test_ceiling_values_still_project() {
        let mut input = sample_input();
        input.hold_period_years = 30;
        input.appreciation_rate_pct = MAX_ANNUAL_RATE_PCT;
        input.rent_growth_rate_pct = MAX_ANNUAL_RATE_PCT;
        let financing = SharedFinancing {
            loan_rate_pct: MAX_ANNUAL_RATE_PCT,
            amortization_years: MAX_AMORTIZATION_YEARS,
            vacancy_rate_pct: dec!(5),
        };
        let out = compute_metrics(&input, &financing).unwrap();
        assert_eq!(out.schedule.len(), 30);
        // 300k doubling for 30 years
        assert_eq!(out.exit_property_value, dec!(300000) * dec!(1073741824));
    }

    #[test]
    fn test_price_overflow_is_error() {
        let mut input = sample_input();
        input.purchase_price = Decimal::MAX / dec!(2);
        input.hold_period_years = 30;
        let result = compute_metrics(&input, &sample_financing());
        assert!(matches!(
            result,
            Err(DealEvalError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_rent_overflow_is_error() {
        let mut input = sample_input();
        input.monthly_rent = Decimal::MAX / dec!(10);
        let result = compute_metrics(&input, &sample_financing());
        assert!(matches!(
            result,
            Err(DealEvalError::FinancialImpossibility(_))
        ));
    }
}
