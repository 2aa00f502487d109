use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::db::entities::monitored_service;
use crate::db::enums::{IntervalType, Protocol, ServiceKind, ServiceStatus};

/// A monitored service as seen by the scheduler and the checkers.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredService {
    pub id: i32,
    pub name: String,
    /// IP, hostname or full URL depending on the service type.
    pub address: String,
    pub port: Option<i32>,
    pub protocol: Protocol,
    pub kind: ServiceKind,
    pub interval_type: IntervalType,
    pub interval_value: i32,
    pub interval_unit: Option<String>,
    pub last_status: ServiceStatus,
    pub success_count: i32,
    pub failure_count: i32,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
    pub display_order: Option<i32>,
    pub collection: Option<String>,
    pub comment: Option<String>,
}

impl MonitoredService {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        address: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            port: None,
            protocol,
            kind: ServiceKind::Servers,
            interval_type: IntervalType::Minutes,
            interval_value: 1,
            interval_unit: None,
            last_status: ServiceStatus::Unknown,
            success_count: 0,
            failure_count: 0,
            updated_at: None,
            is_active: true,
            display_order: None,
            collection: None,
            comment: None,
        }
    }

    pub fn with_port(mut self, port: i32) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_kind(mut self, kind: ServiceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_interval(mut self, interval_type: IntervalType, interval_value: i32) -> Self {
        self.interval_type = interval_type;
        self.interval_value = interval_value;
        self
    }
}

impl From<monitored_service::Model> for MonitoredService {
    fn from(model: monitored_service::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.ip_address,
            port: model.port,
            protocol: Protocol::from(model.protocol.as_str()),
            kind: ServiceKind::from(model.service_type.as_deref().unwrap_or("servers")),
            interval_type: IntervalType::from(model.interval_type.as_deref().unwrap_or("seconds")),
            interval_value: model.interval_value.unwrap_or(60),
            interval_unit: model.interval_unit,
            last_status: ServiceStatus::from(model.last_status.as_deref().unwrap_or("unknown")),
            success_count: model.success_count.unwrap_or(0),
            failure_count: model.failure_count.unwrap_or(0),
            updated_at: model.updated_at,
            is_active: model.is_active.unwrap_or(true),
            display_order: model.display_order,
            collection: model.collection,
            comment: model.comment,
        }
    }
}

/// One row for `monitoring_logs`; `checked_at` is left to the database default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLogEntry {
    pub service_id: i32,
    pub status: String,
    pub message: String,
}

/// A service created by a population job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewService {
    pub name: String,
    pub address: String,
    pub port: Option<i32>,
    pub protocol: String,
    pub check_interval_sec: i32,
    pub interval_type: String,
    pub interval_value: i32,
    pub interval_unit: String,
    pub last_status: String,
    pub comment: Option<String>,
}

/// A system listed by the cloud inventory, mirrored as a `Server Cloud` service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudSystem {
    pub name: String,
    pub address: String,
    pub port: Option<i32>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted(i32),
    Updated(i32),
}
