//! Data access for the monitoring tables.
//!
//! Each sub-module holds the raw SeaORM queries for one area; everything is
//! re-exported under `crate::db::services::`.

pub mod service_monitor_service;
pub mod settings_service;

pub use service_monitor_service::*;
pub use settings_service::*;
