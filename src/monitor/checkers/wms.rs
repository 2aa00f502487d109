//! Tile/map services: fetch the capabilities document and judge its shape.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::time::Duration;
use tracing::debug;

use super::CheckOutcome;
use super::partner::PartnerClient;
use crate::db::enums::ServiceStatus;
use crate::db::models::MonitoredService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilitiesBody {
    /// Well-formed XML with a `*Capabilities` element.
    Capabilities,
    /// Well-formed XML without one.
    OtherXml,
    Json,
    Unrecognised,
}

impl CapabilitiesBody {
    pub fn status(self) -> ServiceStatus {
        match self {
            CapabilitiesBody::Capabilities | CapabilitiesBody::Json => ServiceStatus::Up,
            CapabilitiesBody::OtherXml => ServiceStatus::Degraded,
            CapabilitiesBody::Unrecognised => ServiceStatus::Down,
        }
    }
}

pub fn capabilities_url(service: &MonitoredService) -> String {
    let address = service.address.trim();
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("https://{address}")
    }
}

/// Walks the whole document so truncated or malformed XML is rejected.
fn scan_xml(body: &str) -> Option<bool> {
    let mut reader = Reader::from_str(body);
    let mut depth = 0usize;
    let mut elements = 0usize;
    let mut has_marker = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                elements += 1;
                has_marker |= e.local_name().as_ref().ends_with(b"Capabilities");
            }
            Ok(Event::Empty(e)) => {
                elements += 1;
                has_marker |= e.local_name().as_ref().ends_with(b"Capabilities");
            }
            Ok(Event::End(_)) => depth = depth.checked_sub(1)?,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    (depth == 0 && elements > 0).then_some(has_marker)
}

pub fn classify_body(body: &str) -> CapabilitiesBody {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return match scan_xml(trimmed) {
            Some(true) => CapabilitiesBody::Capabilities,
            Some(false) => CapabilitiesBody::OtherXml,
            None => CapabilitiesBody::Unrecognised,
        };
    }
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return CapabilitiesBody::Json;
    }
    CapabilitiesBody::Unrecognised
}

pub fn describe(body: CapabilitiesBody, http_status: u16) -> String {
    let shape = match body {
        CapabilitiesBody::Capabilities => "Capabilities document received",
        CapabilitiesBody::Json => "JSON capabilities received",
        CapabilitiesBody::OtherXml => "XML received without a Capabilities element",
        CapabilitiesBody::Unrecognised => "Response is neither XML nor JSON",
    };
    format!("{shape} (HTTP {http_status})")
}

/// The verdict follows the body's shape; the HTTP status is only reported.
pub async fn check_wms(partner: &PartnerClient, service: &MonitoredService, timeout: Duration) -> CheckOutcome {
    let url = capabilities_url(service);
    let context = format!("GET {url}");
    match partner.get_any_status(&url, timeout, false).await {
        Ok(response) => {
            let body = classify_body(&response.body);
            debug!(
                service_id = service.id,
                ?body,
                http_status = response.status,
                content_type = ?response.content_type,
                "Classified capabilities response."
            );
            CheckOutcome::new(body.status(), describe(body, response.status), context)
        }
        Err(e) => CheckOutcome::new(ServiceStatus::Down, e.to_string(), context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::Protocol;

    #[test]
    fn test_capabilities_document_is_up() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
            <WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms">
              <Service><Name>WMS</Name></Service>
            </WMS_Capabilities>"#;
        assert_eq!(classify_body(body), CapabilitiesBody::Capabilities);
        assert_eq!(classify_body(body).status(), ServiceStatus::Up);
    }

    #[test]
    fn test_namespaced_capabilities_element() {
        let body = r#"<wmts:Capabilities xmlns:wmts="http://www.opengis.net/wmts/1.0"/>"#;
        assert_eq!(classify_body(body), CapabilitiesBody::Capabilities);
    }

    #[test]
    fn test_other_xml_is_degraded() {
        let body = "<ServiceExceptionReport><ServiceException>bad layer</ServiceException></ServiceExceptionReport>";
        assert_eq!(classify_body(body), CapabilitiesBody::OtherXml);
        assert_eq!(classify_body(body).status(), ServiceStatus::Degraded);
    }

    #[test]
    fn test_json_is_up() {
        assert_eq!(classify_body(r#"{"layers": []}"#), CapabilitiesBody::Json);
    }

    #[test]
    fn test_malformed_or_plain_bodies_are_down() {
        assert_eq!(classify_body("<WMS_Capabilities><Layer>"), CapabilitiesBody::Unrecognised);
        assert_eq!(classify_body("Service Unavailable"), CapabilitiesBody::Unrecognised);
        assert_eq!(classify_body(""), CapabilitiesBody::Unrecognised);
    }

    #[test]
    fn test_description_reports_http_status() {
        assert_eq!(
            describe(CapabilitiesBody::OtherXml, 400),
            "XML received without a Capabilities element (HTTP 400)"
        );
    }

    #[test]
    fn test_scheme_less_address_gets_https() {
        let service = MonitoredService::new(1, "tiles", "maps.example.org/wms?request=GetCapabilities", Protocol::Wms);
        assert_eq!(capabilities_url(&service), "https://maps.example.org/wms?request=GetCapabilities");
        let service = MonitoredService::new(1, "tiles", "http://maps.example.org/wms", Protocol::Wms);
        assert_eq!(capabilities_url(&service), "http://maps.example.org/wms");
    }
}
