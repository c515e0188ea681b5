//! Deploy models

pub mod application;
pub mod deployment;
pub mod prepare;
