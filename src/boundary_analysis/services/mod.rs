mod cycle_detector;
mod edge_classifier;
mod graph_builder;
mod ignore_filter;
mod policy_builder;
mod policy_engine;
mod requirement_reconciler;
mod result_aggregator;

pub use cycle_detector::CycleDetector;
pub use edge_classifier::EdgeClassifier;
pub use graph_builder::{GraphBuilder, PackageGraph};
pub use ignore_filter::IgnoreFilter;
pub use policy_builder::PolicyBuilder;
pub use policy_engine::{PolicyAnalysis, PolicyEngine};
pub use requirement_reconciler::{RequirementDelta, RequirementReconciler};
pub use result_aggregator::{ReportEntry, ReportSection, ResultAggregator};
