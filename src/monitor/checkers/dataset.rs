//! Dataset services mirror the health the partner reports for the task of the same name.

use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use super::partner::{PartnerClient, extract_items};
use super::{CheckOutcome, StatusUpdate};
use crate::config::MonitorConfig;
use crate::db::enums::ServiceStatus;
use crate::db::models::MonitoredService;

pub const DATASET_CONTEXT: &str = "Dataset health API check";
pub const DATASET_TIMEOUT: Duration = Duration::from_secs(30);
pub const DELETED_TASK_COMMENT: &str = "Task deleted on partner side";

/// Maps the partner health grade to a status, with the comment to store alongside.
pub fn map_health(health: &str) -> (ServiceStatus, Option<&'static str>) {
    match health {
        "Excellent" => (ServiceStatus::Up, None),
        "Good" | "Fair" => (ServiceStatus::Degraded, None),
        "Deleted" => (ServiceStatus::Down, Some(DELETED_TASK_COMMENT)),
        _ => (ServiceStatus::Down, None),
    }
}

fn counter(record: &Value, keys: &[&str], current: i32) -> i32 {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_i64))
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(current)
}

pub fn outcome_from_records(service: &MonitoredService, records: &[Value]) -> CheckOutcome {
    let Some(record) = records
        .iter()
        .find(|r| r.get("task_name").and_then(Value::as_str) == Some(service.name.as_str()))
    else {
        return CheckOutcome::new(
            ServiceStatus::Unknown,
            format!("No partner task named '{}'", service.name),
            DATASET_CONTEXT,
        );
    };

    let health = record.get("health").and_then(Value::as_str).unwrap_or_default();
    let (status, comment) = map_health(health);
    let success_count = counter(record, &["success_count"], service.success_count);
    let failure_count = counter(record, &["failure_count", "fail_count"], service.failure_count);

    CheckOutcome::new(
        status,
        format!("Partner health '{health}' (success {success_count}, failure {failure_count})"),
        DATASET_CONTEXT,
    )
    .with_update(StatusUpdate::Overwritten {
        success_count,
        failure_count,
        comment: comment.map(str::to_string),
    })
}

pub async fn check_dataset(
    partner: &PartnerClient,
    config: &MonitorConfig,
    service: &MonitoredService,
) -> CheckOutcome {
    let records = partner
        .get_json(&config.dataset_health_url, DATASET_TIMEOUT)
        .await
        .and_then(extract_items);
    match records {
        Ok(records) => outcome_from_records(service, &records),
        Err(e) => {
            warn!(service_id = service.id, error = %e, "Dataset health lookup failed.");
            CheckOutcome::new(
                ServiceStatus::Unknown,
                format!("Dataset health lookup failed: {e}"),
                DATASET_CONTEXT,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{Protocol, ServiceKind};
    use serde_json::json;

    fn service() -> MonitoredService {
        let mut service = MonitoredService::new(21, "download_sst_daily", "", Protocol::Api)
            .with_kind(ServiceKind::Datasets);
        service.success_count = 4;
        service.failure_count = 2;
        service
    }

    #[test]
    fn test_health_grades() {
        assert_eq!(map_health("Excellent"), (ServiceStatus::Up, None));
        assert_eq!(map_health("Good"), (ServiceStatus::Degraded, None));
        assert_eq!(map_health("Fair"), (ServiceStatus::Degraded, None));
        assert_eq!(map_health("Deleted"), (ServiceStatus::Down, Some(DELETED_TASK_COMMENT)));
        assert_eq!(map_health("Poor"), (ServiceStatus::Down, None));
        assert_eq!(map_health("excellent"), (ServiceStatus::Down, None));
    }

    #[test]
    fn test_counters_are_overwritten_from_the_partner() {
        let records = vec![
            json!({"task_name": "other", "health": "Excellent"}),
            json!({"task_name": "download_sst_daily", "health": "Fair", "success_count": 40, "fail_count": 3}),
        ];
        let outcome = outcome_from_records(&service(), &records);
        assert_eq!(outcome.status, ServiceStatus::Degraded);
        assert_eq!(
            outcome.update,
            StatusUpdate::Overwritten {
                success_count: 40,
                failure_count: 3,
                comment: None
            }
        );
    }

    #[test]
    fn test_missing_counters_keep_current_values() {
        let records = vec![json!({"task_name": "download_sst_daily", "health": "Deleted"})];
        let outcome = outcome_from_records(&service(), &records);
        assert_eq!(outcome.status, ServiceStatus::Down);
        assert_eq!(
            outcome.update,
            StatusUpdate::Overwritten {
                success_count: 4,
                failure_count: 2,
                comment: Some(DELETED_TASK_COMMENT.to_string())
            }
        );
    }

    #[test]
    fn test_unmatched_task_is_unknown() {
        let records = vec![json!({"task_name": "download_sst_monthly", "health": "Excellent"})];
        let outcome = outcome_from_records(&service(), &records);
        assert_eq!(outcome.status, ServiceStatus::Unknown);
        assert_eq!(outcome.update, StatusUpdate::Generic);
    }
}
