pub mod chart_request;
pub mod dashboard;
pub mod data_source;
pub mod filter_projector;
pub mod orchestrator;
pub mod query_builder;
pub mod rally_api;
pub mod scope_resolver;
pub mod summary_metrics;
pub mod taxonomy_loader;
