//! Deployment targets
//!
//! A target knows where its deploy service lives and how requests to it are
//! authenticated. Self-hosted config servers are served by [`custom::CustomTarget`],
//! cloud controllers by [`cloud::CloudTarget`].

pub mod cloud;
pub mod custom;
pub mod signer;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};

use deploy_models::Deployment;

use crate::errors::DeployError;
use crate::http::client::HttpClient;

/// Kind of control plane a target talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// Config server on the local machine
    Local,
    /// Self-hosted config server at a custom URL
    Custom,
    /// Public cloud controller
    Cloud,
    /// Hosted controller
    Hosted,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Local => "local",
            TargetType::Custom => "custom",
            TargetType::Cloud => "cloud",
            TargetType::Hosted => "hosted",
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, TargetType::Cloud | TargetType::Hosted)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(TargetType::Local),
            "custom" => Ok(TargetType::Custom),
            "cloud" => Ok(TargetType::Cloud),
            "hosted" => Ok(TargetType::Hosted),
            _ => Err(DeployError::Config(format!("invalid target type: {}", s))),
        }
    }
}

impl serde::Serialize for TargetType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for TargetType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A resolved service endpoint
#[derive(Debug, Clone)]
pub struct Service {
    /// Base URL without trailing slash
    pub base_url: String,
    description: String,
    client: HttpClient,
}

impl Service {
    pub fn new(base_url: &str, description: impl Into<String>, client: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            description: description.into(),
            client,
        }
    }

    /// Human readable name, e.g. "Deploy service"
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The same endpoint under another name
    pub fn renamed(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    /// Send a request to this service
    pub async fn execute(&self, request: Request, timeout: Duration) -> Result<Response, DeployError> {
        self.client.execute(request, timeout, &self.description).await
    }
}

/// A deployment target
#[async_trait]
pub trait Target: Send + Sync {
    /// The control plane dialect of this target
    fn target_type(&self) -> TargetType;

    /// The deployment this target deploys to
    fn deployment(&self) -> &Deployment;

    /// Resolve the deploy service.
    ///
    /// A non-zero `timeout` lets the target wait that long for the service
    /// to become available.
    async fn deploy_service(&self, timeout: Duration) -> Result<Service, DeployError>;

    /// Add authentication material to a request, keyed by `key_id`
    fn sign_request(&self, request: &mut Request, key_id: &str) -> Result<(), DeployError>;
}
