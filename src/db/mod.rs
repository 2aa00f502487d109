pub mod entities;
pub mod enums;
pub mod models;
pub mod services;
pub mod store;

pub use store::{DbStore, MonitorStore, StoreError};
