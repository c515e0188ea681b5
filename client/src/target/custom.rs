//! Self-hosted config server target

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Request, StatusCode};
use tracing::{debug, info};

use deploy_models::Deployment;

use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::target::{Service, Target, TargetType};

/// Config server address of a local installation
pub const LOCAL_CONFIG_SERVER_URL: &str = "http://127.0.0.1:19071";

const DEPLOY_SERVICE: &str = "Deploy service";
const STATUS_PATH: &str = "/status.html";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A config server reachable at a fixed URL
pub struct CustomTarget {
    target_type: TargetType,
    base_url: String,
    deployment: Deployment,
    client: HttpClient,
}

impl CustomTarget {
    /// Target the config server at `base_url`
    pub fn new(base_url: &str, client: HttpClient) -> Self {
        Self {
            target_type: TargetType::Custom,
            base_url: base_url.trim_end_matches('/').to_string(),
            deployment: Deployment::default(),
            client,
        }
    }

    /// Target the config server of a local installation
    pub fn local(client: HttpClient) -> Self {
        Self {
            target_type: TargetType::Local,
            ..Self::new(LOCAL_CONFIG_SERVER_URL, client)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn wait_for_status(&self, timeout: Duration) -> Result<(), DeployError> {
        let url = format!("{}{}", self.base_url, STATUS_PATH);
        let deadline = Instant::now() + timeout;
        info!("Waiting up to {:?} for {} to become available", timeout, self.base_url);

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.client.get(&url, remaining.max(POLL_INTERVAL), DEPLOY_SERVICE).await {
                Ok(response) if response.status() == StatusCode::OK => return Ok(()),
                Ok(response) => debug!("{} answered {}", url, response.status()),
                Err(e) => debug!("{} not reachable: {}", url, e),
            }

            if Instant::now() + POLL_INTERVAL > deadline {
                return Err(DeployError::TargetUnavailable(format!(
                    "{} at {} did not become available within {:?}",
                    DEPLOY_SERVICE.to_lowercase(),
                    self.base_url,
                    timeout
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Target for CustomTarget {
    fn target_type(&self) -> TargetType {
        self.target_type
    }

    fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    async fn deploy_service(&self, timeout: Duration) -> Result<Service, DeployError> {
        if !timeout.is_zero() {
            self.wait_for_status(timeout).await?;
        }
        Ok(Service::new(&self.base_url, DEPLOY_SERVICE, self.client.clone()))
    }

    fn sign_request(&self, _request: &mut Request, _key_id: &str) -> Result<(), DeployError> {
        Ok(())
    }
}
