//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by linkbot:
//! - Chat services (e.g., Slack)
//! - Backend lookup clients (issue tracker, service records, static links)
//! - The SSO-aware HTTP session shared by the backend clients
//! - Prometheus metrics
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod backend;
pub mod chat;
pub mod metrics;
pub mod saml;
