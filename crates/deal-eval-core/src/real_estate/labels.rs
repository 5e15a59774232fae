//! Label-keyed view of a [`MetricsRecord`] for presentation collaborators.
//!
//! Reports, charts and comparison tables look metrics up by stable display
//! labels instead of field names. Sequences are numeric inside the engine;
//! the bracketed text form (`"[100.0, 200.0]"`) exists only at this boundary.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

use crate::error::DealEvalError;
use crate::real_estate::engine::MetricsRecord;
use crate::DealEvalResult;

pub const ROI_PCT: &str = "ROI (%)";
pub const CAP_RATE_PCT: &str = "Cap Rate (%)";
pub const CASH_ON_CASH_PCT: &str = "Cash-on-Cash Return (%)";
pub const IRR_OPERATIONAL_PCT: &str = "IRR (Operational) (%)";
pub const IRR_TOTAL_PCT: &str = "IRR (Total incl. Sale) (%)";
pub const EQUITY_MULTIPLE: &str = "equity_multiple";
pub const MULTI_YEAR_CASH_FLOW: &str = "Multi-Year Cash Flow";
pub const ANNUAL_RENTS: &str = "Annual Rents $ (by year)";
pub const ANNUAL_ROI_PCT: &str = "Annual ROI % (by year)";

pub const EQUITY_INVESTED: &str = "Equity Invested";
pub const LOAN_AMOUNT: &str = "Loan Amount";
pub const MONTHLY_PAYMENT: &str = "Monthly Payment";
pub const DSCR_YEAR_ONE: &str = "DSCR (Year 1)";
pub const SALE_PROCEEDS: &str = "Sale Proceeds";
pub const EXIT_PROPERTY_VALUE: &str = "Property Value at Exit";

/// Headline scalars, in display order.
pub const HEADLINE_LABELS: [&str; 6] = [
    ROI_PCT,
    CAP_RATE_PCT,
    CASH_ON_CASH_PCT,
    IRR_OPERATIONAL_PCT,
    IRR_TOTAL_PCT,
    EQUITY_MULTIPLE,
];

pub const SCALAR_LABELS: [&str; 12] = [
    ROI_PCT,
    CAP_RATE_PCT,
    CASH_ON_CASH_PCT,
    IRR_OPERATIONAL_PCT,
    IRR_TOTAL_PCT,
    EQUITY_MULTIPLE,
    EQUITY_INVESTED,
    LOAN_AMOUNT,
    MONTHLY_PAYMENT,
    DSCR_YEAR_ONE,
    SALE_PROCEEDS,
    EXIT_PROPERTY_VALUE,
];

pub const SERIES_LABELS: [&str; 3] = [MULTI_YEAR_CASH_FLOW, ANNUAL_RENTS, ANNUAL_ROI_PCT];

/// Decimal places used when a series is rendered as text.
const SERIES_TEXT_DP: u32 = 2;

/// A single labelled value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(Decimal),
    Series(Vec<Decimal>),
    /// Series already rendered as bracketed text
    Text(String),
    /// Metric exists but has no defined value (serialized as `null`)
    Undefined,
}

impl MetricValue {
    fn from_option(value: Option<Decimal>) -> Self {
        value.map(MetricValue::Scalar).unwrap_or(MetricValue::Undefined)
    }
}

/// How sequences are emitted in a labelled map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesEncoding {
    #[default]
    Numeric,
    Text,
}

impl MetricsRecord {
    /// Look a metric up by display label. Unknown labels give `None`.
    pub fn get(&self, label: &str) -> Option<MetricValue> {
        let value = match label {
            ROI_PCT => MetricValue::from_option(self.roi_pct),
            CAP_RATE_PCT => MetricValue::Scalar(self.cap_rate_pct),
            CASH_ON_CASH_PCT => MetricValue::from_option(self.cash_on_cash_pct),
            IRR_OPERATIONAL_PCT => MetricValue::from_option(self.irr_operational_pct),
            IRR_TOTAL_PCT => MetricValue::from_option(self.irr_total_pct),
            EQUITY_MULTIPLE => MetricValue::from_option(self.equity_multiple),
            EQUITY_INVESTED => MetricValue::Scalar(self.equity_invested),
            LOAN_AMOUNT => MetricValue::Scalar(self.loan_amount),
            MONTHLY_PAYMENT => MetricValue::Scalar(self.monthly_payment),
            DSCR_YEAR_ONE => MetricValue::from_option(self.dscr_year1),
            SALE_PROCEEDS => MetricValue::Scalar(self.sale_proceeds),
            EXIT_PROPERTY_VALUE => MetricValue::Scalar(self.exit_property_value),
            MULTI_YEAR_CASH_FLOW => MetricValue::Series(self.cash_flows.clone()),
            ANNUAL_RENTS => MetricValue::Series(self.annual_rents.clone()),
            ANNUAL_ROI_PCT => MetricValue::Series(self.annual_roi_pct.clone()),
            _ => return None,
        };
        Some(value)
    }

    /// Every labelled metric, keyed by display label.
    pub fn to_labeled_map(&self, encoding: SeriesEncoding) -> BTreeMap<String, MetricValue> {
        SCALAR_LABELS
            .iter()
            .chain(SERIES_LABELS.iter())
            .filter_map(|label| {
                let value = match (self.get(label)?, encoding) {
                    (MetricValue::Series(values), SeriesEncoding::Text) => {
                        MetricValue::Text(format_series(&values))
                    }
                    (value, _) => value,
                };
                Some((label.to_string(), value))
            })
            .collect()
    }

    pub fn to_labeled_json(&self, encoding: SeriesEncoding) -> DealEvalResult<Value> {
        Ok(serde_json::to_value(self.to_labeled_map(encoding))?)
    }
}

/// Render a series as `"[100.0, 200.5]"`, rounded to cents.
pub fn format_series(values: &[Decimal]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| {
            let s = v.round_dp(SERIES_TEXT_DP).normalize().to_string();
            if s.contains('.') {
                s
            } else {
                format!("{s}.0")
            }
        })
        .collect();
    format!("[{}]", items.join(", "))
}

/// Parse a bracketed text series. Brackets are optional; empty items are skipped.
pub fn parse_series(text: &str) -> DealEvalResult<Vec<Decimal>> {
    text.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            parse_decimal(item)
                .ok_or_else(|| DealEvalError::SeriesParse(format!("'{item}' is not a number")))
        })
        .collect()
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

/// Consumer-side view over a loosely typed label map.
///
/// Missing labels fall back to defaults (0 or an empty series) so a
/// partially populated map never fails a report. An explicit `null` is kept
/// as undefined.
#[derive(Debug, Clone, Default)]
pub struct LabeledMetrics {
    entries: Map<String, Value>,
}

impl LabeledMetrics {
    pub fn from_json(value: Value) -> DealEvalResult<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(DealEvalError::InvalidInput {
                field: "metrics".into(),
                reason: format!("expected a JSON object of labelled metrics, got {other}"),
            }),
        }
    }

    pub fn from_record(record: &MetricsRecord, encoding: SeriesEncoding) -> DealEvalResult<Self> {
        Self::from_json(record.to_labeled_json(encoding)?)
    }

    /// Scalar by label: missing → `Some(0)`, `null` → `None` (undefined).
    pub fn scalar(&self, label: &str) -> Option<Decimal> {
        match self.entries.get(label) {
            None => Some(Decimal::ZERO),
            Some(Value::Null) => None,
            Some(value) => {
                let parsed = value_to_decimal(value);
                if parsed.is_none() {
                    warn!(label, %value, "labelled metric is not a number");
                }
                parsed
            }
        }
    }

    /// Series by label: missing → empty; JSON arrays and bracketed text both accepted.
    pub fn series(&self, label: &str) -> DealEvalResult<Vec<Decimal>> {
        match self.entries.get(label) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(text)) => parse_series(text),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    value_to_decimal(item).ok_or_else(|| {
                        DealEvalError::SeriesParse(format!("'{item}' in {label} is not a number"))
                    })
                })
                .collect(),
            Some(other) => Err(DealEvalError::SeriesParse(format!(
                "{label} is neither a list nor bracketed text: {other}"
            ))),
        }
    }

    /// Non-numeric annotation (e.g. a grade) attached under `label`.
    pub fn text(&self, label: &str) -> Option<&str> {
        self.entries.get(label).and_then(Value::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }
}
