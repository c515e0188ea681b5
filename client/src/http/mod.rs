//! HTTP transport, request encoding and response classification

pub mod client;
pub mod multipart;
pub mod response;
