use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DealEvalError;
use crate::time_value::level_payment;
use crate::types::{pct_to_rate, Money, Pct};
use crate::DealEvalResult;

/// Decimal places kept on every ledger amount. Keeps sums exact so the
/// principal column reconciles to the loan amount without drift.
const LEDGER_DP: u32 = 10;

/// One year of the mortgage ledger, aggregated from twelve monthly rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    /// Year index, 1-based
    pub year: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
    /// Interest + principal due in the year
    pub debt_service: Money,
    /// Outstanding balance after the last payment of the year
    pub closing_balance: Money,
}

/// Fixed-rate, fully amortizing mortgage ledger covering
/// `min(projection years, amortization years)` years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub amortization_years: u32,
    pub years: Vec<AmortizationYear>,
}

impl AmortizationSchedule {
    /// Build the ledger month by month.
    ///
    /// Interest is charged on the opening balance at `annual_rate_pct / 12`
    /// and the remainder of the level payment reduces principal. The last
    /// month of the term retires whatever balance is left.
    pub fn build(
        loan_amount: Money,
        annual_rate_pct: Pct,
        amortization_years: u32,
        projection_years: u32,
    ) -> DealEvalResult<Self> {
        if amortization_years == 0 {
            return Err(DealEvalError::InvalidInput {
                field: "amortization_years".into(),
                reason: "Amortization term must be at least 1 year".into(),
            });
        }
        if loan_amount < Decimal::ZERO {
            return Err(DealEvalError::InvalidInput {
                field: "loan_amount".into(),
                reason: "Loan amount cannot be negative".into(),
            });
        }

        let monthly_rate = pct_to_rate(annual_rate_pct) / dec!(12);
        let total_months =
            amortization_years
                .checked_mul(12)
                .ok_or_else(|| DealEvalError::InvalidInput {
                    field: "amortization_years".into(),
                    reason: "Amortization term is too long to schedule monthly".into(),
                })?;
        let monthly_payment = if loan_amount.is_zero() {
            Decimal::ZERO
        } else {
            level_payment(loan_amount, monthly_rate, total_months)?.round_dp(LEDGER_DP)
        };

        let covered_years = projection_years.min(amortization_years);
        let mut years = Vec::with_capacity(covered_years as usize);
        let mut balance = loan_amount;

        for year in 1..=covered_years {
            let mut interest_paid = Decimal::ZERO;
            let mut principal_paid = Decimal::ZERO;

            for month in 1..=12 {
                let month_index = (year - 1) * 12 + month;
                let interest = balance
                    .checked_mul(monthly_rate)
                    .ok_or_else(|| DealEvalError::overflow("Monthly interest"))?
                    .round_dp(LEDGER_DP);
                let principal = if month_index == total_months {
                    balance
                } else {
                    (monthly_payment - interest).min(balance)
                };

                balance -= principal;
                interest_paid = interest_paid
                    .checked_add(interest)
                    .ok_or_else(|| DealEvalError::overflow("Annual interest"))?;
                principal_paid += principal;
            }

            years.push(AmortizationYear {
                year,
                interest_paid,
                principal_paid,
                debt_service: interest_paid
                    .checked_add(principal_paid)
                    .ok_or_else(|| DealEvalError::overflow("Annual debt service"))?,
                closing_balance: balance,
            });
        }

        Ok(Self {
            loan_amount,
            monthly_payment,
            amortization_years,
            years,
        })
    }

    /// Ledger row for a 1-based year, `None` once the term has run out.
    pub fn year(&self, year: u32) -> Option<&AmortizationYear> {
        if year == 0 {
            return None;
        }
        self.years.get(year as usize - 1)
    }

    /// Outstanding balance at the end of `year`. Zero after the term.
    pub fn balance_after(&self, year: u32) -> Money {
        if year == 0 {
            return self.loan_amount;
        }
        match self.year(year) {
            Some(row) => row.closing_balance,
            None if year > self.amortization_years => Decimal::ZERO,
            // Beyond the projected window but inside the term
            None => self
                .years
                .last()
                .map(|row| row.closing_balance)
                .unwrap_or(self.loan_amount),
        }
    }

    /// Sum of principal repaid across the ledger.
    pub fn total_principal(&self) -> Money {
        self.years.iter().map(|y| y.principal_paid).sum()
    }

    /// Sum of interest paid across the ledger.
    pub fn total_interest(&self) -> Money {
        self.years.iter().map(|y| y.interest_paid).sum()
    }
}
