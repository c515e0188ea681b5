//! Application packages
//!
//! The deploy operations only need a package's zipped bytes and whether it
//! carries a client certificate.

use tracing::{debug, warn};

use crate::errors::DeployError;
use crate::filesys::file::File;

/// Entry holding the data plane client certificate inside a package
pub const CERTIFICATE_ENTRY: &str = "security/clients.pem";

/// A zipped application package
pub trait ApplicationPackage: Send + Sync {
    /// Zipped contents of the application, or of its tests when `test` is set
    fn zip(&self, test: bool) -> Result<Vec<u8>, DeployError>;

    /// Whether the package carries a client certificate
    fn has_certificate(&self) -> bool;
}

/// A package read from pre-built zip archives
#[derive(Debug, Clone)]
pub struct ArchivePackage {
    application: Vec<u8>,
    test: Option<Vec<u8>>,
}

impl ArchivePackage {
    pub fn new(application: Vec<u8>, test: Option<Vec<u8>>) -> Self {
        Self { application, test }
    }

    /// Load the application archive and, if given, the test archive
    pub async fn load(application: &File, test: Option<&File>) -> Result<Self, DeployError> {
        let application_zip = application.read_bytes().await?;
        debug!("Loaded {} ({} bytes)", application.path().display(), application_zip.len());

        let test_zip = match test {
            Some(file) => Some(file.read_bytes().await?),
            None => None,
        };
        Ok(Self::new(application_zip, test_zip))
    }
}

impl ApplicationPackage for ArchivePackage {
    fn zip(&self, test: bool) -> Result<Vec<u8>, DeployError> {
        if !test {
            return Ok(self.application.clone());
        }
        self.test
            .clone()
            .ok_or_else(|| DeployError::Package("no test package given".to_string()))
    }

    fn has_certificate(&self) -> bool {
        match entry_names(&self.application) {
            Some(names) => names.iter().any(|name| *name == CERTIFICATE_ENTRY.as_bytes()),
            None => {
                warn!("Application package is not a readable zip archive");
                false
            }
        }
    }
}

const END_OF_CENTRAL_DIRECTORY: [u8; 4] = *b"PK\x05\x06";
const CENTRAL_DIRECTORY_HEADER: [u8; 4] = *b"PK\x01\x02";
const END_OF_CENTRAL_DIRECTORY_LEN: usize = 22;
const CENTRAL_DIRECTORY_HEADER_LEN: usize = 46;

/// Names of the entries listed in the archive's central directory
fn entry_names(archive: &[u8]) -> Option<Vec<&[u8]>> {
    // The end record sits at the very end, followed only by a comment of up to 64 KiB
    let last = archive.len().checked_sub(END_OF_CENTRAL_DIRECTORY_LEN)?;
    let first = last.saturating_sub(u16::MAX as usize);
    let end = (first..=last)
        .rev()
        .find(|&offset| archive[offset..].starts_with(&END_OF_CENTRAL_DIRECTORY))?;

    let entries = read_u16(archive, end + 10)? as usize;
    let mut offset = read_u32(archive, end + 16)? as usize;

    let mut names = Vec::with_capacity(entries);
    for _ in 0..entries {
        if !archive.get(offset..)?.starts_with(&CENTRAL_DIRECTORY_HEADER) {
            return None;
        }
        let name_len = read_u16(archive, offset + 28)? as usize;
        let extra_len = read_u16(archive, offset + 30)? as usize;
        let comment_len = read_u16(archive, offset + 32)? as usize;

        let name_start = offset + CENTRAL_DIRECTORY_HEADER_LEN;
        names.push(archive.get(name_start..name_start + name_len)?);
        offset = name_start + name_len + extra_len + comment_len;
    }
    Some(names)
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
