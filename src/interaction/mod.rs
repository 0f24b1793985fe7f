//! Event handling and user interactions for linkbot.
//!
//! This module provides functionality for handling chat events:
//! - Matching inbound messages against the bot registry and replying with links
//! - Dispatching slash commands into the runtime control plane

pub mod link_event;
pub mod slash_command;
