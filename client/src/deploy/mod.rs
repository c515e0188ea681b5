//! Deploy operations
//!
//! Self-hosted config servers deploy through sessions: a package is uploaded
//! to a new session, the session is prepared and finally activated. Cloud
//! controllers take the package in a single request and answer with a run.

pub mod response;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request, Url};
use tracing::{debug, info};

use deploy_models::PrepareResult;

use crate::deploy::response::UploadResponse;
use crate::errors::DeployError;
use crate::http::multipart::MultipartBody;
use crate::http::response::{check_response, url_host};
use crate::package::ApplicationPackage;
use crate::target::{Service, Target, TargetType};

/// Timeout of session management requests
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout of requests carrying a package
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const SESSION_PATH: &str = "/application/v2/tenant/default/session";
const PREPARE_AND_ACTIVATE_PATH: &str = "/application/v2/tenant/default/prepareandactivate";
const SUBMIT_SERVICE: &str = "Submit service";

/// Everything a deploy operation needs
#[derive(Clone)]
pub struct DeploymentOptions {
    pub target: Arc<dyn Target>,
    pub application_package: Arc<dyn ApplicationPackage>,

    /// How long to wait for the target's deploy service to become available
    pub timeout: Duration,
}

impl DeploymentOptions {
    pub fn new(
        target: Arc<dyn Target>,
        application_package: Arc<dyn ApplicationPackage>,
        timeout: Duration,
    ) -> Self {
        Self {
            target,
            application_package,
            timeout,
        }
    }

    /// Whether this deploys to a cloud or hosted controller
    pub fn is_cloud(&self) -> bool {
        self.target.target_type().is_cloud()
    }

    /// Resolve `path` against the target's deploy service
    pub async fn resolve_url(&self, path: &str) -> Result<Url, DeployError> {
        let service = self.deploy_service(Duration::ZERO).await?;
        Ok(Url::parse(&format!("{}{}", service.base_url, path))?)
    }

    async fn deploy_service(&self, timeout: Duration) -> Result<Service, DeployError> {
        self.target.deploy_service(timeout).await.map_err(|e| match e {
            DeployError::TargetUnavailable(_) => e,
            other => DeployError::TargetUnavailable(other.to_string()),
        })
    }

    fn check_certificate(&self) -> Result<(), DeployError> {
        if self.target.target_type() == TargetType::Cloud && !self.application_package.has_certificate() {
            return Err(DeployError::MissingCertificate(self.to_string()));
        }
        Ok(())
    }

    fn ensure_self_hosted(&self, operation: &'static str) -> Result<(), DeployError> {
        if self.is_cloud() {
            return Err(DeployError::UnsupportedOperation {
                operation,
                target_type: self.target.target_type(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for DeploymentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.target.deployment(), self.target.target_type())
    }
}

/// Upload the package to a new session and prepare it
pub async fn prepare(options: &DeploymentOptions) -> Result<PrepareResult, DeployError> {
    options.ensure_self_hosted("prepare")?;

    let session_url = options.resolve_url(SESSION_PATH).await?;
    let result = upload_application_package(session_url, options).await?;
    info!("Uploaded package to session {}", result.id);

    let prepare_url = options
        .resolve_url(&format!("{}/{}/prepared", SESSION_PATH, result.id))
        .await?;
    put_session(options, prepare_url).await?;
    info!("Prepared session {}", result.id);

    Ok(result)
}

/// Activate a session from a past prepare
pub async fn activate(session_id: i64, options: &DeploymentOptions) -> Result<(), DeployError> {
    options.ensure_self_hosted("activate")?;

    let url = options
        .resolve_url(&format!("{}/{}/active", SESSION_PATH, session_id))
        .await?;
    put_session(options, url).await?;
    info!("Activated session {}", session_id);
    Ok(())
}

/// Prepare and activate the package in one request
pub async fn deploy(options: &DeploymentOptions) -> Result<PrepareResult, DeployError> {
    let path = if options.is_cloud() {
        options.check_certificate()?;
        let deployment = options.target.deployment();
        if deployment.zone.is_incomplete() {
            return Err(DeployError::MissingZone(options.to_string()));
        }
        let application = &deployment.application;
        format!(
            "/application/v4/tenant/{}/application/{}/instance/{}/deploy/{}-{}",
            application.tenant,
            application.application,
            application.instance,
            deployment.zone.environment,
            deployment.zone.region
        )
    } else {
        PREPARE_AND_ACTIVATE_PATH.to_string()
    };

    let url = options.resolve_url(&path).await?;
    let result = upload_application_package(url, options).await?;
    info!("Deployed {} with id {}", options, result.id);
    Ok(result)
}

/// Submit the package and its tests to the controller's deployment pipeline
pub async fn submit(options: &DeploymentOptions) -> Result<(), DeployError> {
    if !options.is_cloud() {
        return Err(DeployError::UnsupportedOperation {
            operation: "submit",
            target_type: options.target.target_type(),
        });
    }
    options.check_certificate()?;

    let application = &options.target.deployment().application;
    let path = format!(
        "/application/v4/tenant/{}/application/{}/submit",
        application.tenant, application.application
    );
    let url = options.resolve_url(&path).await?;

    let application_zip = options.application_package.zip(false)?;
    let test_zip = options.application_package.zip(true)?;
    let mut body = MultipartBody::new();
    body.add_field("submitOptions", b"{}")
        .add_file("applicationZip", "application.zip", &application_zip)
        .add_file("applicationTestZip", "application-test.zip", &test_zip);
    let content_type = body.content_type();

    let host = url_host(&url);
    let mut request = Request::new(Method::POST, url);
    request.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .map_err(|e| DeployError::Package(format!("invalid content type: {}", e)))?,
    );
    *request.body_mut() = Some(body.finish().into());

    let key_id = application.serialized_form();
    options.target.sign_request(&mut request, &key_id)?;

    let service = options
        .deploy_service(Duration::ZERO)
        .await?
        .renamed(SUBMIT_SERVICE);
    let response = service.execute(request, UPLOAD_TIMEOUT).await?;
    check_response(&host, response, SUBMIT_SERVICE).await?;
    info!("Submitted {}", application);
    Ok(())
}

/// Upload the package to `url` and reconcile the control plane's answer
pub async fn upload_application_package(
    url: Url,
    options: &DeploymentOptions,
) -> Result<PrepareResult, DeployError> {
    let zip = options.application_package.zip(false)?;
    debug!("Uploading {} bytes to {}", zip.len(), url);

    let host = url_host(&url);
    let mut request = Request::new(Method::POST, url);
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    *request.body_mut() = Some(zip.into());

    let service = options.deploy_service(options.timeout).await?;

    let key_id = options.target.deployment().application.serialized_form();
    options.target.sign_request(&mut request, &key_id)?;

    let response = service.execute(request, UPLOAD_TIMEOUT).await?;
    let response = check_response(&host, response, service.description()).await?;

    let body = response.bytes().await.map_err(|source| DeployError::Transport {
        service: service.description().to_lowercase(),
        source,
    })?;
    UploadResponse::decode(&body).into_result()
}

async fn put_session(options: &DeploymentOptions, url: Url) -> Result<(), DeployError> {
    let host = url_host(&url);
    let request = Request::new(Method::PUT, url);
    let service = options.deploy_service(Duration::ZERO).await?;
    let response = service.execute(request, SESSION_TIMEOUT).await?;
    check_response(&host, response, service.description()).await?;
    Ok(())
}
