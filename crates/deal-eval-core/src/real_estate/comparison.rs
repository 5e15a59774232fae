use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

use crate::real_estate::engine::{evaluate_property, InvestmentInput, MetricsRecord, SharedFinancing};
use crate::real_estate::labels::{MetricValue, HEADLINE_LABELS};
use crate::types::{with_metadata, ComputationOutput, Money};

pub const PROPERTY_ANNOTATION: &str = "Property";
pub const ADDRESS_ANNOTATION: &str = "Address";

/// Two properties evaluated under one set of financing terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub property_a: InvestmentInput,
    pub property_b: InvestmentInput,
    #[serde(default)]
    pub financing: SharedFinancing,
}

/// A metrics record plus free-text commentary.
///
/// Numbers are read-only through this wrapper; only annotations can be added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedMetrics {
    metrics: MetricsRecord,
    annotations: BTreeMap<String, String>,
}

impl AnnotatedMetrics {
    pub fn new(metrics: MetricsRecord) -> Self {
        Self {
            metrics,
            annotations: BTreeMap::new(),
        }
    }

    pub fn metrics(&self) -> &MetricsRecord {
        &self.metrics
    }

    /// Attach or replace a note such as a verdict or grade.
    pub fn annotate(&mut self, key: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.annotations.insert(key.into(), text.into());
        self
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    pub fn into_metrics(self) -> MetricsRecord {
        self.metrics
    }
}

/// Result for one side of a comparison. A rejected input on one side never
/// affects the other.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PropertyOutcome {
    Evaluated {
        metrics: AnnotatedMetrics,
        warnings: Vec<String>,
    },
    Invalid {
        reason: String,
    },
}

impl PropertyOutcome {
    pub fn metrics(&self) -> Option<&MetricsRecord> {
        match self {
            PropertyOutcome::Evaluated { metrics, .. } => Some(metrics.metrics()),
            PropertyOutcome::Invalid { .. } => None,
        }
    }

    pub fn annotated(&self) -> Option<&AnnotatedMetrics> {
        match self {
            PropertyOutcome::Evaluated { metrics, .. } => Some(metrics),
            PropertyOutcome::Invalid { .. } => None,
        }
    }

    pub fn annotated_mut(&mut self) -> Option<&mut AnnotatedMetrics> {
        match self {
            PropertyOutcome::Evaluated { metrics, .. } => Some(metrics),
            PropertyOutcome::Invalid { .. } => None,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self, PropertyOutcome::Evaluated { .. })
    }

    /// Display text for a labelled headline metric.
    fn display(&self, label: &str) -> String {
        match self.metrics().and_then(|m| m.get(label)) {
            Some(MetricValue::Scalar(v)) => format!("{:.2}", v),
            Some(MetricValue::Undefined) => "n/a".into(),
            Some(_) => "-".into(),
            None if !self.is_evaluated() => "invalid".into(),
            None => "-".into(),
        }
    }
}

/// One presentation row: `"6.40 vs 6.55"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub property_a: String,
    pub property_b: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutput {
    pub property_a: PropertyOutcome,
    pub property_b: PropertyOutcome,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonOutput {
    /// Headline rows, rebuilt from the current outcomes.
    pub fn build_rows(property_a: &PropertyOutcome, property_b: &PropertyOutcome) -> Vec<ComparisonRow> {
        HEADLINE_LABELS
            .iter()
            .map(|label| {
                let a = property_a.display(label);
                let b = property_b.display(label);
                ComparisonRow {
                    label: label.to_string(),
                    summary: format!("{a} vs {b}"),
                    property_a: a,
                    property_b: b,
                }
            })
            .collect()
    }

    /// Cash-flow series padded with zeros to the longer hold period.
    pub fn aligned_cash_flows(&self) -> (Vec<Money>, Vec<Money>) {
        let a = self
            .property_a
            .metrics()
            .map(|m| m.cash_flows.as_slice())
            .unwrap_or_default();
        let b = self
            .property_b
            .metrics()
            .map(|m| m.cash_flows.as_slice())
            .unwrap_or_default();
        align_series(a, b)
    }
}

/// Pad the shorter of two year-indexed series with zeros.
pub fn align_series(a: &[Decimal], b: &[Decimal]) -> (Vec<Decimal>, Vec<Decimal>) {
    let len = a.len().max(b.len());
    let pad = |s: &[Decimal]| {
        let mut v = s.to_vec();
        v.resize(len, Decimal::ZERO);
        v
    };
    (pad(a), pad(b))
}

/// Evaluate both properties independently and line their headline metrics up.
///
/// Never fails as a whole: a validation failure is recorded on that side only.
pub fn compare_properties(input: &ComparisonInput) -> ComputationOutput<ComparisonOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let property_a = evaluate_side("A", &input.property_a, &input.financing, &mut warnings);
    let property_b = evaluate_side("B", &input.property_b, &input.financing, &mut warnings);
    let rows = ComparisonOutput::build_rows(&property_a, &property_b);

    let output = ComparisonOutput {
        property_a,
        property_b,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Side-by-Side Rental Property Comparison",
        input,
        warnings,
        elapsed,
        output,
    )
}

fn evaluate_side(
    side: &str,
    input: &InvestmentInput,
    financing: &SharedFinancing,
    warnings: &mut Vec<String>,
) -> PropertyOutcome {
    match evaluate_property(input, financing) {
        Ok(out) => {
            debug!(side, "property evaluated");
            warnings.extend(out.warnings.iter().map(|w| format!("Property {side}: {w}")));

            let mut metrics = AnnotatedMetrics::new(out.result);
            metrics.annotate(PROPERTY_ANNOTATION, side);
            if let Some(label) = input.label.as_deref().filter(|l| !l.trim().is_empty()) {
                metrics.annotate(ADDRESS_ANNOTATION, label);
            }

            PropertyOutcome::Evaluated {
                metrics,
                warnings: out.warnings,
            }
        }
        Err(e) => {
            warn!(side, error = %e, "property rejected");
            warnings.push(format!("Property {side}: {e}"));
            PropertyOutcome::Invalid {
                reason: e.to_string(),
            }
        }
    }
}
