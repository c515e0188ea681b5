//! Classification of control plane responses

use reqwest::{Response, StatusCode, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::DeployError;

const INVALID_APPLICATION_PACKAGE: &str = "INVALID_APPLICATION_PACKAGE";

/// Turn a response into an error unless it is a 200.
///
/// `host` is the host the request was sent to and `service_description`
/// names the service in the error text. The successful response is handed
/// back so the caller can read its body.
pub async fn check_response(
    host: &str,
    response: Response,
    service_description: &str,
) -> Result<Response, DeployError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    debug!("{} answered {} with {} bytes", service_description, status, body.len());
    Err(classify(host, status, &body, service_description))
}

/// Host and port of a request URL, as shown in error messages
pub fn url_host(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Map a non-200 status and its body to the matching error
pub fn classify(host: &str, status: StatusCode, body: &[u8], service_description: &str) -> DeployError {
    if status.is_client_error() {
        DeployError::InvalidPackage {
            status: status.to_string(),
            message: extract_error(body),
        }
    } else {
        DeployError::Service {
            service: service_description.to_lowercase(),
            host: host.to_string(),
            status: status.to_string(),
            body: to_pretty_json(body),
        }
    }
}

/// Return the error message in a JSON body, or the entire body if no message
/// can be extracted.
pub fn extract_error(body: &[u8]) -> String {
    let package_message = serde_json::from_slice::<Map<String, Value>>(body)
        .ok()
        .filter(|response| {
            response.get("error-code").and_then(Value::as_str) == Some(INVALID_APPLICATION_PACKAGE)
        })
        .and_then(|response| response.get("message").and_then(Value::as_str).map(str::to_owned));

    match package_message {
        Some(message) => message.replace(": ", ":\n"),
        None => to_pretty_json(body),
    }
}

/// Indent a JSON body by four spaces, or return it verbatim when it is not JSON
pub fn to_pretty_json(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return String::from_utf8_lossy(body).into_owned();
    };

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    match serde::Serialize::serialize(&value, &mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}
