//! Core components, types, and utilities for linkbot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Shared logging state for the runtime control plane.
//! - Common types and result handling.

pub mod config;
pub mod logging;
pub mod types;
