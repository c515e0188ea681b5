//! HTTP client implementation

use std::time::Duration;

use reqwest::{Client, Request, Response};
use tracing::{debug, warn};

use crate::errors::DeployError;
use crate::utils::version_info;

/// HTTP transport shared by all targets
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, DeployError> {
        let client = Client::builder()
            .user_agent(format!("vespa-deploy/{}", version_info().version))
            .build()
            .map_err(|e| DeployError::Config(format!("unable to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send a request with the given timeout.
    ///
    /// `description` names the service in errors, e.g. "Deploy service".
    pub async fn execute(
        &self,
        mut request: Request,
        timeout: Duration,
        description: &str,
    ) -> Result<Response, DeployError> {
        debug!("{} {}", request.method(), request.url());
        *request.timeout_mut() = Some(timeout);

        self.client.execute(request).await.map_err(|source| {
            warn!("{} request failed: {}", description, source);
            DeployError::Transport {
                service: description.to_lowercase(),
                source,
            }
        })
    }

    /// Make a GET request, returning whatever response the server gives
    pub async fn get(
        &self,
        url: &str,
        timeout: Duration,
        description: &str,
    ) -> Result<Response, DeployError> {
        let url = reqwest::Url::parse(url)?;
        self.execute(Request::new(reqwest::Method::GET, url), timeout, description)
            .await
    }
}
