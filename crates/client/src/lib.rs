//! `client` crate — HTTP access to the dashboard API and the execution engine.
//!
//! Endpoints used, relative to [`ClientConfig::base_url`]:
//!   GET    /modules/engine/primitives
//!   POST   /workflows
//!   GET    /workflows/{id}
//!   POST   /workflows/{id}/run

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpClient;
