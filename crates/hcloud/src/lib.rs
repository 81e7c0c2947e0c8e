//! Minimal Hetzner Cloud API client for floating IP failover.
//!
//! Implements [`failover::CloudApi`] on top of the public REST API:
//! - `GET /servers?name=` to resolve this node
//! - `GET /floating_ips` (all pages) to list the inventory
//! - `POST /floating_ips/{id}/actions/assign` to move a floating IP
//!
//! Every request carries the API token as a bearer token. Error responses
//! are mapped to [`common::Error::Api`] with the provider's error code.

pub mod client;
pub mod types;

pub use client::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, HcloudClient, Token};
