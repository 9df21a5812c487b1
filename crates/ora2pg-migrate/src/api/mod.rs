//! REST client for the migration server.
//!
//! [`ApiClient`] covers auth, projects, discovery, migration control,
//! settings, data type rules, DDL generation, validation and pipelines. It
//! doubles as the production [`crate::grid::MappingBackend`] and
//! [`crate::progress::ProgressSource`].

mod client;
mod types;

pub use client::ApiClient;
pub use types::*;
