//! SeaORM entities for the monitoring tables.
//!
//! The schema itself is owned by the API service; these definitions only mirror it.

pub mod dashboard_config;
pub mod monitored_service;
pub mod monitoring_log;
