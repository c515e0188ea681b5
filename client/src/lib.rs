//! Vespa deploy client
//!
//! Uploads application packages to self-hosted config servers and to cloud
//! controllers, and reconciles their answers into one result type.

pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod package;
pub mod storage;
pub mod target;
pub mod utils;

pub use deploy::{activate, deploy, prepare, submit, DeploymentOptions};
pub use errors::DeployError;
