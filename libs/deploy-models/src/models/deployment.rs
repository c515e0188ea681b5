//! Deployment models

use std::fmt;

use crate::errors::ParseError;
use crate::models::application::{ApplicationId, ZoneId};

/// A cloud system hosting deployments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct System {
    /// Short name, e.g. `public`
    pub name: String,

    /// Base URL of the controller API
    pub url: String,

    /// Base URL of the web console
    pub console_url: String,

    /// Zone used when none is given
    pub default_zone: ZoneId,
}

impl System {
    pub fn public() -> Self {
        Self {
            name: "public".to_string(),
            url: "https://api.vespa-external.aws.oath.cloud:4443".to_string(),
            console_url: "https://console.vespa.oath.cloud".to_string(),
            default_zone: ZoneId::new("dev", "aws-us-east-1c"),
        }
    }

    pub fn public_cd() -> Self {
        Self {
            name: "publiccd".to_string(),
            url: "https://api.vespa-external-cd.aws.oath.cloud:4443".to_string(),
            console_url: "https://console-cd.vespa.oath.cloud".to_string(),
            default_zone: ZoneId::new("dev", "aws-us-east-1c"),
        }
    }

    pub fn main() -> Self {
        Self {
            name: "main".to_string(),
            url: "https://api.vespa.ouryahoo.com:4443".to_string(),
            console_url: "https://console.vespa.ouryahoo.com".to_string(),
            default_zone: ZoneId::new("dev", "us-east-1"),
        }
    }

    pub fn cd() -> Self {
        Self {
            name: "cd".to_string(),
            url: "https://api-cd.vespa.ouryahoo.com:4443".to_string(),
            console_url: "https://console-cd.vespa.ouryahoo.com".to_string(),
            default_zone: ZoneId::new("dev", "cd-us-west-1"),
        }
    }

    /// Look up one of the known systems by name
    pub fn by_name(name: &str) -> Result<Self, ParseError> {
        match name {
            "public" => Ok(Self::public()),
            "publiccd" => Ok(Self::public_cd()),
            "main" => Ok(Self::main()),
            "cd" => Ok(Self::cd()),
            _ => Err(ParseError::UnknownSystem(name.to_string())),
        }
    }
}

/// One logical deployment: an application instance in a zone of a system
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployment {
    pub system: System,
    pub application: ApplicationId,
    pub zone: ZoneId,
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deployment of {} in {}", self.application, self.zone)
    }
}
