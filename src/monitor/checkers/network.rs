//! ping / http / https / tcp probes driven through external commands.

use std::time::Duration;
use tracing::{debug, warn};

use super::CheckOutcome;
use super::command::{CommandOutput, CommandRunner, ProbeCommand, ProbeError};
use crate::db::enums::{Protocol, ServiceStatus};
use crate::db::models::MonitoredService;

pub const PROBE_ATTEMPTS: u32 = 3;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Builds the probe for a network service, or explains why none can be built.
pub fn build_probe_command(service: &MonitoredService) -> Result<ProbeCommand, String> {
    let host = service.address.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err("Service has no address".to_string());
    }

    match &service.protocol {
        Protocol::Ping => Ok(ProbeCommand::new("ping", ["-c", "2", host])),
        Protocol::Http => Ok(ProbeCommand::new("curl", ["-Is", probe_url("http", 80, host, service.port).as_str()])),
        Protocol::Https => Ok(ProbeCommand::new("curl", ["-Is", probe_url("https", 443, host, service.port).as_str()])),
        Protocol::Tcp => match service.port {
            Some(port) => Ok(ProbeCommand::new("nc", ["-zv".to_string(), host.to_string(), port.to_string()])),
            None => Err("TCP probe requires a port".to_string()),
        },
        other => Err(format!("Unsupported protocol: {other}")),
    }
}

fn probe_url(scheme: &str, default_port: i32, host: &str, port: Option<i32>) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        return host.to_string();
    }
    match port {
        Some(port) if port != default_port => format!("{scheme}://{host}:{port}"),
        _ => format!("{scheme}://{host}"),
    }
}

fn attempt_message(output: &CommandOutput) -> String {
    let text = if output.stdout.trim().is_empty() {
        output.stderr.trim()
    } else {
        output.stdout.trim()
    };
    if text.is_empty() && !output.success() {
        "Command failed".to_string()
    } else {
        text.to_string()
    }
}

/// Runs the probe up to [`PROBE_ATTEMPTS`] times, stopping at the first success.
pub async fn check_network(runner: &dyn CommandRunner, service: &MonitoredService) -> CheckOutcome {
    let command = match build_probe_command(service) {
        Ok(command) => command,
        Err(reason) => {
            warn!(service_id = service.id, reason = %reason, "Cannot probe service.");
            return CheckOutcome::new(ServiceStatus::Down, reason, "");
        }
    };

    let mut status = ServiceStatus::Down;
    let mut message = String::new();

    for attempt in 1..=PROBE_ATTEMPTS {
        match runner.run(&command, PROBE_TIMEOUT).await {
            Ok(output) if output.success() => {
                status = ServiceStatus::Up;
                message = attempt_message(&output);
                break;
            }
            Ok(output) => message = attempt_message(&output),
            Err(ProbeError::Timeout) => message = "Timeout occurred".to_string(),
            Err(e) => message = e.to_string(),
        }
        debug!(service_id = service.id, attempt, command = %command, "Probe attempt failed.");
        if attempt < PROBE_ATTEMPTS {
            tokio::time::sleep(RETRY_PAUSE).await;
        }
    }

    CheckOutcome::new(status, message, command.to_string())
}
