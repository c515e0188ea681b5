//! Deploy models
//!
//! Value types shared by the deploy client: application and zone identities,
//! deployment coordinates and the results returned by the control plane.

pub mod errors;
pub mod models;

pub use errors::ParseError;
pub use models::application::{ApplicationId, ZoneId};
pub use models::deployment::{Deployment, System};
pub use models::prepare::{LogLinePrepareResponse, PrepareResult};
