use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use deal_eval_core::real_estate::engine::{self, InvestmentInput, SharedFinancing};
use deal_eval_core::real_estate::labels::SeriesEncoding;

use crate::input;

/// Single-property request file: `{ "property": {...}, "financing": {...} }`
#[derive(Debug, Deserialize)]
pub struct PropertyRequest {
    pub property: InvestmentInput,
    #[serde(default)]
    pub financing: SharedFinancing,
}

/// Arguments describing one property and its financing
#[derive(Args)]
pub struct PropertyArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Address or other label carried through to the output
    #[arg(long)]
    pub label: Option<String>,

    /// Acquisition price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// In-place rent per month
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Equity contribution as % of price
    #[arg(long, default_value = "20")]
    pub down_payment_pct: Decimal,

    /// Operating expenses per month
    #[arg(long, default_value = "300")]
    pub monthly_expenses: Decimal,

    /// Annual appreciation (%)
    #[arg(long, default_value = "3")]
    pub appreciation_rate_pct: Decimal,

    /// Annual rent growth (%)
    #[arg(long, default_value = "2")]
    pub rent_growth_rate_pct: Decimal,

    /// Hold period in years (1-30)
    #[arg(long, default_value_t = 10)]
    pub hold_period_years: u32,

    /// Annual loan interest rate (%)
    #[arg(long, default_value = "5.5")]
    pub loan_rate_pct: Decimal,

    /// Amortization term in years
    #[arg(long, default_value_t = 30)]
    pub amortization_years: u32,

    /// Economic vacancy (%)
    #[arg(long, default_value = "5")]
    pub vacancy_rate_pct: Decimal,
}

/// Arguments for the label-keyed metrics view
#[derive(Args)]
pub struct LabelsArgs {
    #[command(flatten)]
    pub property: PropertyArgs,

    /// Render sequences as bracketed text, e.g. "[100.0, 200.0]"
    #[arg(long)]
    pub text_series: bool,
}

impl PropertyArgs {
    fn into_request(self) -> Result<PropertyRequest, Box<dyn std::error::Error>> {
        if let Some(request) = input::load_request(self.input.as_deref())? {
            return Ok(request);
        }
        self.into_flag_request()
    }

    fn into_flag_request(self) -> Result<PropertyRequest, Box<dyn std::error::Error>> {
        let purchase_price = self
            .purchase_price
            .ok_or("--purchase-price is required (or provide --input)")?;
        let monthly_rent = self
            .monthly_rent
            .ok_or("--monthly-rent is required (or provide --input)")?;

        Ok(PropertyRequest {
            property: InvestmentInput {
                label: self.label,
                purchase_price,
                monthly_rent,
                down_payment_pct: self.down_payment_pct,
                monthly_expenses: self.monthly_expenses,
                appreciation_rate_pct: self.appreciation_rate_pct,
                rent_growth_rate_pct: self.rent_growth_rate_pct,
                hold_period_years: self.hold_period_years,
            },
            financing: SharedFinancing {
                loan_rate_pct: self.loan_rate_pct,
                amortization_years: self.amortization_years,
                vacancy_rate_pct: self.vacancy_rate_pct,
            },
        })
    }
}

pub fn run_evaluate(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.into_request()?;
    let result = engine::evaluate_property(&request.property, &request.financing)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_labels(args: LabelsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let encoding = if args.text_series {
        SeriesEncoding::Text
    } else {
        SeriesEncoding::Numeric
    };
    let request = args.property.into_request()?;
    let record = engine::compute_metrics(&request.property, &request.financing)?;
    Ok(record.to_labeled_json(encoding)?)
}
