pub mod dashboard;
pub mod filters;
pub mod metrics;
pub mod query;
pub mod warehouse;
