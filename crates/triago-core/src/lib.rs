//! Core types, configuration, and error handling for the Triago platform.
//!
//! This crate provides the shared foundation used by all other Triago crates:
//! - [`TriagoError`] — unified error type using `thiserror`
//! - [`TriagoConfig`] — configuration loaded from `.triago.toml`
//! - Entity records read from the historical snapshot: [`Issue`],
//!   [`Developer`], [`Feature`], [`Project`]
//! - Shared enums: [`Severity`], [`IssueStatus`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{ReportConfig, SnapshotConfig, TriagoConfig};
pub use error::TriagoError;
pub use types::{
    Developer, DeveloperId, Feature, FeatureId, Issue, IssueId, IssueStatus, OutputFormat, Project,
    ProjectId, Severity,
};

/// A convenience `Result` type for Triago operations.
pub type Result<T> = std::result::Result<T, TriagoError>;
