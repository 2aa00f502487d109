use std::fmt;

/// Status vocabulary shared by every checker and by the `last_status` column.
///
/// `Other` carries partner-reported values that are stored verbatim (the cloud
/// inventory passthrough); no local checker produces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    Up,
    Down,
    Degraded,
    Unknown,
    Other(String),
}

impl ServiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Up => "up",
            ServiceStatus::Down => "down",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Other(raw) => raw.as_str(),
        }
    }

    /// Counter deltas applied by the generic recorder: `(success, failure)`.
    pub fn counter_deltas(&self) -> (i32, i32) {
        match self {
            ServiceStatus::Up => (1, 0),
            ServiceStatus::Down => (0, 1),
            _ => (0, 0),
        }
    }
}

impl From<&str> for ServiceStatus {
    fn from(value: &str) -> Self {
        match value {
            "up" => ServiceStatus::Up,
            "down" => ServiceStatus::Down,
            "degraded" => ServiceStatus::Degraded,
            "unknown" | "" => ServiceStatus::Unknown,
            other => ServiceStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalType {
    Seconds,
    Minutes,
    Hours,
    Daily,
    Weekly,
    Monthly,
    SpecificDay,
    Unrecognized(String),
}

impl From<&str> for IntervalType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "seconds" => IntervalType::Seconds,
            "minutes" => IntervalType::Minutes,
            "hours" => IntervalType::Hours,
            "daily" => IntervalType::Daily,
            "weekly" => IntervalType::Weekly,
            "monthly" => IntervalType::Monthly,
            "specific_day" => IntervalType::SpecificDay,
            _ => IntervalType::Unrecognized(value.to_string()),
        }
    }
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntervalType::Seconds => "seconds",
            IntervalType::Minutes => "minutes",
            IntervalType::Hours => "hours",
            IntervalType::Daily => "daily",
            IntervalType::Weekly => "weekly",
            IntervalType::Monthly => "monthly",
            IntervalType::SpecificDay => "specific_day",
            IntervalType::Unrecognized(raw) => raw.as_str(),
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    Ping,
    Http,
    Https,
    Tcp,
    External,
    Api,
    Wms,
    Other(String),
}

impl From<&str> for Protocol {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ping" => Protocol::Ping,
            "http" => Protocol::Http,
            "https" => Protocol::Https,
            "tcp" => Protocol::Tcp,
            "external" => Protocol::External,
            "api" => Protocol::Api,
            "wms" => Protocol::Wms,
            _ => Protocol::Other(value.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Ping => "ping",
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Tcp => "tcp",
            Protocol::External => "external",
            Protocol::Api => "api",
            Protocol::Wms => "wms",
            Protocol::Other(raw) => raw.as_str(),
        };
        f.write_str(s)
    }
}

/// The `type` column. Drives checker selection ahead of the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceKind {
    Servers,
    Datasets,
    Thredds,
    ServerCloud,
    Uncategorized,
    Other(String),
}

impl From<&str> for ServiceKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "servers" => ServiceKind::Servers,
            "datasets" => ServiceKind::Datasets,
            "thredds" => ServiceKind::Thredds,
            "server cloud" => ServiceKind::ServerCloud,
            "uncategorized" => ServiceKind::Uncategorized,
            _ => ServiceKind::Other(value.to_string()),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceKind::Servers => "servers",
            ServiceKind::Datasets => "datasets",
            ServiceKind::Thredds => "thredds",
            ServiceKind::ServerCloud => "Server Cloud",
            ServiceKind::Uncategorized => "uncategorized",
            ServiceKind::Other(raw) => raw.as_str(),
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_known_values() {
        for raw in ["up", "down", "degraded", "unknown"] {
            assert_eq!(ServiceStatus::from(raw).as_str(), raw);
        }
        assert_eq!(ServiceStatus::from(""), ServiceStatus::Unknown);
    }

    #[test]
    fn test_partner_status_is_kept_verbatim() {
        let status = ServiceStatus::from("paused");
        assert_eq!(status, ServiceStatus::Other("paused".to_string()));
        assert_eq!(status.to_string(), "paused");
        assert_eq!(status.counter_deltas(), (0, 0));
    }

    #[test]
    fn test_counter_deltas_only_move_for_up_and_down() {
        assert_eq!(ServiceStatus::Up.counter_deltas(), (1, 0));
        assert_eq!(ServiceStatus::Down.counter_deltas(), (0, 1));
        assert_eq!(ServiceStatus::Degraded.counter_deltas(), (0, 0));
        assert_eq!(ServiceStatus::Unknown.counter_deltas(), (0, 0));
    }

    #[test]
    fn test_kind_matches_server_cloud_label() {
        assert_eq!(ServiceKind::from("Server Cloud"), ServiceKind::ServerCloud);
        assert_eq!(ServiceKind::ServerCloud.to_string(), "Server Cloud");
        assert_eq!(Protocol::from("HTTPS"), Protocol::Https);
    }

    #[test]
    fn test_labels_are_matched_case_insensitively() {
        assert_eq!(IntervalType::from("Minutes"), IntervalType::Minutes);
        assert_eq!(IntervalType::from(" SPECIFIC_DAY "), IntervalType::SpecificDay);
        assert_eq!(IntervalType::from("fortnightly"), IntervalType::Unrecognized("fortnightly".to_string()));
        assert_eq!(ServiceKind::from("server cloud"), ServiceKind::ServerCloud);
        assert_eq!(ServiceKind::from("Datasets"), ServiceKind::Datasets);
        assert_eq!(ServiceKind::from("Custom"), ServiceKind::Other("Custom".to_string()));
    }
}
