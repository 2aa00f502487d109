//! Persists check outcomes: one log row per check plus the rolling status of the service.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::db::models::NewLogEntry;
use crate::db::store::MonitorStore;
use crate::monitor::checkers::{CheckOutcome, StatusUpdate};

/// Characters of probe output kept in a log entry.
pub const MESSAGE_LIMIT: usize = 450;
/// Characters of the command line (or URL) kept in a log entry.
pub const CONTEXT_LIMIT: usize = 200;

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn truncate_message(message: &str) -> &str {
    truncate_chars(message, MESSAGE_LIMIT)
}

pub fn format_log_message(context: &str, message: &str) -> String {
    format!(
        "Command: {}\nResult: {}",
        truncate_chars(context, CONTEXT_LIMIT),
        truncate_message(message)
    )
}

/// Appends the log entry, then applies the outcome's status update. Both writes are
/// attempted independently and their failures are only logged.
pub async fn record_outcome(
    store: &dyn MonitorStore,
    service_id: i32,
    outcome: &CheckOutcome,
    now: DateTime<Utc>,
) {
    let status = outcome.status.as_str();
    let entry = NewLogEntry {
        service_id,
        status: status.to_string(),
        message: format_log_message(&outcome.context, &outcome.message),
    };
    if let Err(e) = store.append_log(entry).await {
        error!(service_id, error = %e, "Failed to append monitoring log.");
    }

    let result = match &outcome.update {
        StatusUpdate::Generic => {
            let (success_delta, failure_delta) = outcome.status.counter_deltas();
            store
                .update_service_status(service_id, status, success_delta, failure_delta, now)
                .await
        }
        StatusUpdate::Adopted { updated_at } => {
            store
                .update_service_status(service_id, status, 0, 0, *updated_at)
                .await
        }
        StatusUpdate::Overwritten {
            success_count,
            failure_count,
            comment,
        } => {
            store
                .overwrite_service_counters(
                    service_id,
                    status,
                    *success_count,
                    *failure_count,
                    comment.clone(),
                )
                .await
        }
    };
    match result {
        Ok(()) => info!(service_id, status, "Recorded check result."),
        Err(e) => error!(service_id, status, error = %e, "Failed to update service status."),
    }
}
