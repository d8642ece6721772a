pub mod aggregation_service;
pub mod capacity_service;

pub use aggregation_service::{aggregate, AggregationInput, AggregationReport, Aggregator};
pub use capacity_service::CapacityService;
