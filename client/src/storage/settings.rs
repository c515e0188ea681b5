//! Settings file management

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use deploy_models::{ApplicationId, Deployment, System, ZoneId};

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::http::client::HttpClient;
use crate::logs::LogLevel;
use crate::package::{ApplicationPackage, ArchivePackage};
use crate::target::cloud::CloudTarget;
use crate::target::custom::CustomTarget;
use crate::target::signer::RequestSigner;
use crate::target::{Target, TargetType};

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Where to deploy
    #[serde(default)]
    pub target: TargetSettings,

    /// Application to deploy, `tenant.application.instance`
    #[serde(default)]
    pub application: ApplicationId,

    /// Zone to deploy to, `environment.region`. Cloud targets fall back to
    /// the system's default zone.
    #[serde(default)]
    pub zone: Option<ZoneId>,

    /// Name of the cloud system
    #[serde(default = "default_system")]
    pub system: String,

    /// PEM file with the private API key used to sign cloud requests
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,

    /// Zipped application package
    #[serde(default = "default_package")]
    pub package: PathBuf,

    /// Zipped test package, required for submissions
    #[serde(default)]
    pub test_package: Option<PathBuf>,

    /// Seconds to wait for the deploy service to become available
    #[serde(default)]
    pub wait_secs: u64,
}

fn default_system() -> String {
    "public".to_string()
}

fn default_package() -> PathBuf {
    PathBuf::from("application.zip")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            target: TargetSettings::default(),
            application: ApplicationId::default(),
            zone: None,
            system: default_system(),
            api_key_file: None,
            package: default_package(),
            test_package: None,
            wait_secs: 0,
        }
    }
}

/// Target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSettings {
    /// One of `local`, `custom`, `cloud` and `hosted`
    #[serde(rename = "type", default = "default_target_type")]
    pub target_type: TargetType,

    /// Config server URL of a custom target
    #[serde(default)]
    pub url: Option<String>,
}

fn default_target_type() -> TargetType {
    TargetType::Local
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            target_type: default_target_type(),
            url: None,
        }
    }
}

impl Settings {
    /// Read settings from `file`, or use the defaults if it does not exist
    pub async fn load(file: &File) -> Result<Self, DeployError> {
        if !file.exists().await {
            debug!("No settings at {}, using defaults", file.path().display());
            return Ok(Self::default());
        }
        file.read_json().await
    }

    /// How long to wait for the deploy service
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// The deployment cloud targets deploy to
    pub fn deployment(&self) -> Result<Deployment, DeployError> {
        let system = System::by_name(&self.system)?;
        let zone = self
            .zone
            .clone()
            .unwrap_or_else(|| system.default_zone.clone());
        Ok(Deployment {
            system,
            application: self.application.clone(),
            zone,
        })
    }

    /// Build the configured target
    pub async fn build_target(&self, client: HttpClient) -> Result<Arc<dyn Target>, DeployError> {
        let target: Arc<dyn Target> = match self.target.target_type {
            TargetType::Local => Arc::new(CustomTarget::local(client)),
            TargetType::Custom => {
                let url = self.target.url.as_deref().ok_or_else(|| {
                    DeployError::Config("custom target requires a URL".to_string())
                })?;
                Arc::new(CustomTarget::new(url, client))
            }
            target_type @ (TargetType::Cloud | TargetType::Hosted) => {
                let signer = self.build_signer().await?;
                Arc::new(CloudTarget::new(target_type, self.deployment()?, signer, client)?)
            }
        };
        Ok(target)
    }

    async fn build_signer(&self) -> Result<Option<RequestSigner>, DeployError> {
        let Some(key_file) = &self.api_key_file else {
            return Ok(None);
        };
        let private_key = File::new(key_file).read_secret().await?;
        RequestSigner::new(private_key).map(Some)
    }

    /// Load the configured package archives
    pub async fn build_package(&self) -> Result<Arc<dyn ApplicationPackage>, DeployError> {
        let test = self.test_package.as_ref().map(File::new);
        let package = ArchivePackage::load(&File::new(&self.package), test.as_ref()).await?;
        Ok(Arc::new(package))
    }
}
