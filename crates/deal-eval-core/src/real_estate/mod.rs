pub mod amortization;
pub mod comparison;
pub mod engine;
pub mod labels;

pub use comparison::{compare_properties, AnnotatedMetrics, ComparisonInput, ComparisonOutput, PropertyOutcome};
pub use engine::{compute_metrics, evaluate_property, InvestmentInput, MetricsRecord, ScheduleYear, SharedFinancing};
pub use labels::{LabeledMetrics, MetricValue, SeriesEncoding};
