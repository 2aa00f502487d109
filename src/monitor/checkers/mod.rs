//! Health checkers and the dispatch from a service to the checker that applies to it.

pub mod cloud;
pub mod command;
pub mod dataset;
pub mod network;
pub mod ocean;
pub mod partner;
pub mod wms;

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::config::MonitorConfig;
use crate::db::enums::{Protocol, ServiceKind, ServiceStatus};
use crate::db::models::MonitoredService;
use crate::db::store::MonitorStore;
use command::CommandRunner;
use partner::PartnerClient;

pub const EXTERNAL_CONTEXT: &str = "External service";
pub const EXTERNAL_MESSAGE: &str = "Status is reported by the service itself";

/// How the recorder should apply an outcome to the service row.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// Status replaced, counters bumped by one for `up`/`down`, timestamp set to now.
    Generic,
    /// Status and timestamp taken from the partner, counters untouched.
    Adopted { updated_at: DateTime<Utc> },
    /// Status, counters and comment taken from the partner.
    Overwritten {
        success_count: i32,
        failure_count: i32,
        comment: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub status: ServiceStatus,
    pub message: String,
    /// What was run or asked, shown as the `Command:` line of the log entry.
    pub context: String,
    pub update: StatusUpdate,
}

impl CheckOutcome {
    pub fn new(status: ServiceStatus, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            context: context.into(),
            update: StatusUpdate::Generic,
        }
    }

    pub fn with_update(mut self, update: StatusUpdate) -> Self {
        self.update = update;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStrategy {
    Network,
    External,
    Ocean,
    Cloud,
    DatasetHealth,
    Wms,
    Unsupported(String),
}

impl CheckStrategy {
    /// Kind first, then the external protocol, then the ocean address, then the protocol.
    pub fn for_service(service: &MonitoredService, ocean_marker: &str) -> Self {
        match service.kind {
            ServiceKind::ServerCloud => return CheckStrategy::Cloud,
            ServiceKind::Datasets => return CheckStrategy::DatasetHealth,
            ServiceKind::Thredds => return CheckStrategy::Wms,
            _ => {}
        }
        if service.protocol == Protocol::External {
            return CheckStrategy::External;
        }
        if !ocean_marker.is_empty() && service.address.contains(ocean_marker) {
            return CheckStrategy::Ocean;
        }
        match &service.protocol {
            Protocol::Ping | Protocol::Http | Protocol::Https | Protocol::Tcp => CheckStrategy::Network,
            Protocol::Wms => CheckStrategy::Wms,
            Protocol::Api => CheckStrategy::Cloud,
            other => CheckStrategy::Unsupported(other.to_string()),
        }
    }
}

/// Runs the checker that applies to a service. Checkers never fail; every
/// problem is folded into the returned outcome.
#[derive(Clone)]
pub struct HealthChecker {
    store: Arc<dyn MonitorStore>,
    runner: Arc<dyn CommandRunner>,
    partner: PartnerClient,
    config: Arc<MonitorConfig>,
}

impl HealthChecker {
    pub fn new(
        store: Arc<dyn MonitorStore>,
        runner: Arc<dyn CommandRunner>,
        partner: PartnerClient,
        config: Arc<MonitorConfig>,
    ) -> Self {
        Self {
            store,
            runner,
            partner,
            config,
        }
    }

    pub fn partner(&self) -> &PartnerClient {
        &self.partner
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn strategy(&self, service: &MonitoredService) -> CheckStrategy {
        CheckStrategy::for_service(service, self.config.ocean_address_marker())
    }

    pub async fn check(&self, service: &MonitoredService) -> CheckOutcome {
        let strategy = self.strategy(service);
        debug!(service_id = service.id, ?strategy, "Dispatching check.");
        match strategy {
            CheckStrategy::Network => network::check_network(self.runner.as_ref(), service).await,
            CheckStrategy::External => {
                CheckOutcome::new(ServiceStatus::Unknown, EXTERNAL_MESSAGE, EXTERNAL_CONTEXT)
            }
            CheckStrategy::Ocean => {
                let today = Local::now().date_naive();
                ocean::check_ocean(&self.partner, &self.config, service, today).await
            }
            CheckStrategy::Cloud => {
                cloud::check_cloud(self.store.as_ref(), &self.partner, &self.config, service).await
            }
            CheckStrategy::DatasetHealth => {
                dataset::check_dataset(&self.partner, &self.config, service).await
            }
            CheckStrategy::Wms => wms::check_wms(&self.partner, service, self.config.wms_timeout()).await,
            CheckStrategy::Unsupported(protocol) => CheckOutcome::new(
                ServiceStatus::Down,
                format!("Unsupported protocol: {protocol}"),
                "",
            ),
        }
    }
}
