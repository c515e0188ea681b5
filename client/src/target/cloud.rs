//! Cloud and hosted controller target

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Request;

use deploy_models::Deployment;

use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::target::signer::RequestSigner;
use crate::target::{Service, Target, TargetType};

const DEPLOY_SERVICE: &str = "Deploy service";

/// A multi-tenant controller, addressed through the system's API URL
pub struct CloudTarget {
    target_type: TargetType,
    deployment: Deployment,
    signer: Option<RequestSigner>,
    client: HttpClient,
}

impl CloudTarget {
    /// Create a target of type `cloud` or `hosted`
    pub fn new(
        target_type: TargetType,
        deployment: Deployment,
        signer: Option<RequestSigner>,
        client: HttpClient,
    ) -> Result<Self, DeployError> {
        if !target_type.is_cloud() {
            return Err(DeployError::Config(format!(
                "{} is not a cloud target type",
                target_type
            )));
        }
        Ok(Self {
            target_type,
            deployment,
            signer,
            client,
        })
    }
}

#[async_trait]
impl Target for CloudTarget {
    fn target_type(&self) -> TargetType {
        self.target_type
    }

    fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    async fn deploy_service(&self, _timeout: Duration) -> Result<Service, DeployError> {
        let url = &self.deployment.system.url;
        if url.is_empty() {
            return Err(DeployError::TargetUnavailable(format!(
                "no API URL known for system {:?}",
                self.deployment.system.name
            )));
        }
        Ok(Service::new(url, DEPLOY_SERVICE, self.client.clone()))
    }

    fn sign_request(&self, request: &mut Request, key_id: &str) -> Result<(), DeployError> {
        match &self.signer {
            Some(signer) => signer.sign(request, key_id),
            None => Err(DeployError::Signing(format!(
                "no API key configured for {} target",
                self.target_type
            ))),
        }
    }
}
