use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Used inside the math helpers.
pub type Rate = Decimal;

/// Rates expressed as percentages (5.5 = 5.5%). Used at the input/output surface.
pub type Pct = Decimal;

/// Multiples (e.g., 2.1x equity multiple)
pub type Multiple = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Convert a percentage (5.5) into a decimal rate (0.055).
pub fn pct_to_rate(pct: Pct) -> Rate {
    pct / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pct_to_rate() {
        assert_eq!(pct_to_rate(dec!(5.5)), dec!(0.055));
        assert_eq!(pct_to_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_envelope_carries_warnings() {
        let out = with_metadata("Test", &dec!(1), vec!["w".into()], 7, dec!(2));
        assert_eq!(out.result, dec!(2));
        assert_eq!(out.warnings, vec!["w".to_string()]);
        assert_eq!(out.metadata.computation_time_us, 7);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
