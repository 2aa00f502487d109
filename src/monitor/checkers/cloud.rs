//! Status adopted from the cloud-inventory API, looked up by service name.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::partner::{PartnerClient, extract_items};
use super::{CheckOutcome, StatusUpdate};
use crate::config::MonitorConfig;
use crate::db::enums::ServiceStatus;
use crate::db::models::{CloudSystem, MonitoredService};
use crate::db::store::MonitorStore;

pub const CLOUD_CONTEXT: &str = "Cloud monitoring API check";
pub const CLOUD_TIMEOUT: Duration = Duration::from_secs(15);

/// Accepts RFC 3339 as well as the `2026-03-10 08:30:00.000Z` layout the inventory emits.
pub fn parse_partner_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.fZ", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn name_filter(name: &str) -> String {
    format!("(name='{}')", name.replace('\'', "\\'"))
}

fn unknown(message: impl Into<String>) -> CheckOutcome {
    CheckOutcome::new(ServiceStatus::Unknown, message, CLOUD_CONTEXT)
}

/// Turns the matched records into an outcome; anything but exactly one record is `unknown`.
pub fn outcome_from_records(name: &str, records: &[Value]) -> CheckOutcome {
    let record = match records {
        [record] => record,
        [] => return unknown(format!("No cloud inventory record named '{name}'")),
        _ => {
            return unknown(format!(
                "{} cloud inventory records named '{name}'",
                records.len()
            ));
        }
    };

    let Some(status) = record.get("status").and_then(Value::as_str) else {
        return unknown(format!("Cloud inventory record '{name}' has no status"));
    };
    let updated_at = record
        .get("updated")
        .and_then(Value::as_str)
        .and_then(parse_partner_timestamp)
        .unwrap_or_else(|| {
            debug!(name, "Cloud record has no usable 'updated' timestamp; using now.");
            Utc::now()
        });

    CheckOutcome::new(
        ServiceStatus::from(status),
        format!("Cloud inventory reports '{status}' (updated {updated_at})"),
        CLOUD_CONTEXT,
    )
    .with_update(StatusUpdate::Adopted { updated_at })
}

fn record_port(record: &Value) -> Option<i32> {
    let port = match record.get("port")? {
        Value::Number(n) => n.as_i64().and_then(|p| i32::try_from(p).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    port.filter(|port| *port != 0)
}

/// Reads one inventory record; records without a name are skipped.
pub fn parse_cloud_record(record: &Value) -> Option<CloudSystem> {
    let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::trim);
    let name = text("name").filter(|name| !name.is_empty())?;
    Some(CloudSystem {
        name: name.to_string(),
        address: text("host").unwrap_or_default().to_string(),
        port: record_port(record),
        status: text("status").filter(|s| !s.is_empty()).unwrap_or("unknown").to_string(),
        created_at: text("created").and_then(parse_partner_timestamp),
        updated_at: text("updated").and_then(parse_partner_timestamp).unwrap_or_else(Utc::now),
    })
}

pub async fn check_cloud(
    store: &dyn MonitorStore,
    partner: &PartnerClient,
    config: &MonitorConfig,
    service: &MonitoredService,
) -> CheckOutcome {
    let token = match store.get_config(&config.cloud_token_key).await {
        Ok(Some(token)) if !token.trim().is_empty() => token,
        Ok(_) => return unknown("Cloud monitoring token is not configured"),
        Err(e) => {
            warn!(service_id = service.id, error = %e, "Failed to read the cloud monitoring token.");
            return unknown(format!("Failed to read cloud monitoring token: {e}"));
        }
    };

    let url = format!("{}/api/collections/systems/records", config.cloud_api_base);
    let filter = name_filter(&service.name);
    let response = partner
        .get(
            &url,
            &[("filter", filter.as_str())],
            Some(token.trim()),
            CLOUD_TIMEOUT,
            config.cloud_accept_invalid_certs,
        )
        .await;

    let records = response.and_then(|response| {
        let value: Value = serde_json::from_str(&response.body)?;
        extract_items(value)
    });
    match records {
        Ok(records) => outcome_from_records(&service.name, &records),
        Err(e) => {
            warn!(service_id = service.id, error = %e, "Cloud inventory lookup failed.");
            unknown(format!("Cloud inventory lookup failed: {e}"))
        }
    }
}
