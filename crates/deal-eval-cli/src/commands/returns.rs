use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use deal_eval_core::time_value;

/// Arguments for IRR / NPV of an arbitrary cash-flow series
#[derive(Args)]
pub struct IrrArgs {
    /// Periodic cash flows, index 0 = today (comma-separated, e.g. "-100,30,30,130")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,

    /// Discount rate (%) for an NPV alongside the IRR
    #[arg(long)]
    pub discount_rate_pct: Option<Decimal>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (irr_pct, irr_note) = match time_value::irr(&args.cash_flows) {
        Ok(rate) => (Some(rate * dec!(100)), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let npv = match args.discount_rate_pct {
        Some(pct) => Some(time_value::npv(pct / dec!(100), &args.cash_flows)?),
        None => None,
    };

    let warnings: Vec<String> = irr_note.into_iter().collect();

    Ok(json!({
        "result": {
            "irr_pct": irr_pct,
            "npv": npv,
            "periods": args.cash_flows.len(),
        },
        "methodology": "IRR by bracketed bisection",
        "warnings": warnings,
    }))
}
