//! Population jobs: ocean-portal datasets not yet monitored are registered, and the
//! cloud inventory is mirrored into `Server Cloud` services.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::db::models::{NewService, Upserted};
use crate::db::store::{MonitorStore, StoreError};
use crate::monitor::checkers::cloud::{CLOUD_TIMEOUT, parse_cloud_record};
use crate::monitor::checkers::ocean::{self, Cadence, OceanCatalogue};
use crate::monitor::checkers::partner::{PartnerClient, PartnerError, extract_items};

#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    #[error("Failed to fetch partner data: {0}")]
    Fetch(#[from] PartnerError),
    #[error("Failed to register services: {0}")]
    Store(#[from] StoreError),
    #[error("No cloud monitoring token cached under '{0}'")]
    MissingToken(String),
}

/// Tracks when the population job last ran, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct OceanPopulation {
    interval: Duration,
    last_run: Option<Instant>,
}

impl OceanPopulation {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn mark_run(&mut self, at: Instant) {
        self.last_run = Some(at);
    }
}

pub fn service_name(dataset: &ocean::OceanDataset) -> String {
    format!("{}: {}", dataset.id, dataset.short_name)
}

/// Services to insert for datasets whose name is not in `existing`.
/// Datasets with neither a daily nor a monthly cadence are skipped.
pub fn plan_new_services(
    catalogue: &OceanCatalogue,
    existing: &HashSet<String>,
    address: &str,
    today: NaiveDate,
) -> Vec<NewService> {
    catalogue
        .datasets
        .iter()
        .filter_map(|dataset| {
            let name = service_name(dataset);
            if existing.contains(&name) {
                return None;
            }
            let (check_interval_sec, interval_type, interval_value, interval_unit) = match ocean::classify(dataset) {
                Cadence::Daily => (1, "daily", 1, "days"),
                Cadence::Monthly => (60, "specific_day", 4, "months"),
                Cadence::Unclassified => {
                    debug!(dataset_id = dataset.id, "Skipping ocean dataset without a known frequency.");
                    return None;
                }
            };
            let verdict = ocean::assess(dataset, catalogue.task(dataset.id), today);
            Some(NewService {
                name,
                address: address.to_string(),
                port: Some(80),
                protocol: "http".to_string(),
                check_interval_sec,
                interval_type: interval_type.to_string(),
                interval_value,
                interval_unit: interval_unit.to_string(),
                last_status: verdict.status.to_string(),
                comment: Some(verdict.message),
            })
        })
        .collect()
}

/// Fetches the ocean catalogue and inserts the missing services. Returns how many were added.
pub async fn populate_ocean_services(
    store: &dyn MonitorStore,
    partner: &PartnerClient,
    config: &MonitorConfig,
    today: NaiveDate,
) -> Result<usize, PopulationError> {
    let catalogue = OceanCatalogue::fetch(partner, config).await?;
    let names: Vec<String> = catalogue.datasets.iter().map(service_name).collect();
    let existing: HashSet<String> = store.existing_service_names(&names).await?.into_iter().collect();

    let planned = plan_new_services(&catalogue, &existing, config.ocean_address_marker(), today);
    let mut inserted = 0;
    for service in planned {
        let name = service.name.clone();
        let id = store.insert_service(service).await?;
        info!(service_id = id, name = %name, "Registered ocean task service.");
        inserted += 1;
    }
    Ok(inserted)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloudSyncSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Mirrors every cloud-inventory system into a `Server Cloud` service, matched by name.
/// Uses the token cached in `dashboard_configs`; it never authenticates itself.
pub async fn populate_cloud_services(
    store: &dyn MonitorStore,
    partner: &PartnerClient,
    config: &MonitorConfig,
) -> Result<CloudSyncSummary, PopulationError> {
    let token = store
        .get_config(&config.cloud_token_key)
        .await?
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| PopulationError::MissingToken(config.cloud_token_key.clone()))?;

    let url = format!("{}/api/collections/systems/records", config.cloud_api_base);
    let response = partner
        .get(&url, &[], Some(&token), CLOUD_TIMEOUT, config.cloud_accept_invalid_certs)
        .await?;
    let value: serde_json::Value = serde_json::from_str(&response.body).map_err(PartnerError::from)?;
    let records = extract_items(value)?;

    let mut summary = CloudSyncSummary::default();
    for record in &records {
        let Some(system) = parse_cloud_record(record) else {
            summary.skipped += 1;
            continue;
        };
        match store.upsert_cloud_service(&system).await? {
            Upserted::Inserted(id) => {
                info!(service_id = id, name = %system.name, "Registered cloud service.");
                summary.inserted += 1;
            }
            Upserted::Updated(id) => {
                debug!(service_id = id, name = %system.name, "Refreshed cloud service.");
                summary.updated += 1;
            }
        }
    }
    Ok(summary)
}
