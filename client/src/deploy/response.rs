//! Upload response decoding
//!
//! Config servers answer an upload with a session id encoded as a string,
//! controllers with an integer run id. Both carry an optional log.

use serde::Deserialize;
use tracing::warn;

use deploy_models::{LogLinePrepareResponse, PrepareResult};

use crate::errors::DeployError;

/// Body of a successful upload, as sent by either control plane
#[derive(Debug, Default, Deserialize)]
pub struct UploadResponse {
    /// Config server session
    #[serde(rename = "session-id")]
    pub session_id: Option<String>,

    /// Controller run
    pub run: Option<i64>,

    pub log: Option<Vec<LogLinePrepareResponse>>,
}

/// The handle an upload response identifies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadHandle<'a> {
    Run(i64),
    Session(&'a str),
    Unknown,
}

impl UploadResponse {
    /// Decode the first JSON value of a body.
    ///
    /// Anything that does not decode is treated as an empty response.
    pub fn decode(body: &[u8]) -> Self {
        let mut values = serde_json::Deserializer::from_slice(body).into_iter::<UploadResponse>();
        match values.next() {
            Some(Ok(response)) => response,
            Some(Err(e)) => {
                warn!("Ignoring undecodable upload response: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// A nonzero run wins over a session id
    pub fn handle(&self) -> UploadHandle<'_> {
        match (self.run, self.session_id.as_deref()) {
            (Some(run), _) if run != 0 => UploadHandle::Run(run),
            (_, Some(session_id)) => UploadHandle::Session(session_id),
            _ => UploadHandle::Unknown,
        }
    }

    pub fn into_result(self) -> Result<PrepareResult, DeployError> {
        let id = match self.handle() {
            UploadHandle::Run(run) => run,
            UploadHandle::Session(session_id) => session_id.parse::<i64>().map_err(|e| {
                DeployError::MalformedResponse(format!("invalid session id {:?}: {}", session_id, e))
            })?,
            UploadHandle::Unknown => 0,
        };
        Ok(PrepareResult {
            id,
            log_lines: self.log.unwrap_or_default(),
        })
    }
}
