use clap::Args;
use serde_json::Value;

use deal_eval_core::real_estate::comparison::{self, ComparisonInput};

use crate::input;

/// Arguments for a side-by-side comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON/YAML file with property_a, property_b and financing
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compare_input: ComparisonInput = input::load_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for comparison")?;
    let result = comparison::compare_properties(&compare_input);
    Ok(serde_json::to_value(result)?)
}
