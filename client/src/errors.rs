//! Error types for the deploy client

use thiserror::Error;

use deploy_models::ParseError;

use crate::target::TargetType;

/// Main error type for deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{operation} is not supported with {target_type} target")]
    UnsupportedOperation {
        operation: &'static str,
        target_type: TargetType,
    },

    #[error("{0}: missing zone")]
    MissingZone(String),

    #[error("{0}: missing certificate in package")]
    MissingCertificate(String),

    #[error("target unavailable: {0}")]
    TargetUnavailable(String),

    #[error("invalid application package ({status})\n{message}")]
    InvalidPackage { status: String, message: String },

    #[error("error from {service} at {host} ({status}):\n{body}")]
    Service {
        service: String,
        host: String,
        status: String,
        body: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request to {service} failed: {source}")]
    Transport {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("package error: {0}")]
    Package(String),

    #[error("configuration error: {0}")]
    Config(String),
}
