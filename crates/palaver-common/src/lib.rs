//! Palaver Common - Shared utilities and types
//!
//! This crate provides the common error type, configuration structs,
//! constants, and chat message types used across all Palaver components.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::RelayConfig;
pub use constants::*;
pub use error::{PalaverError, Result};
pub use types::{ChatHistory, ChatMessage, MessageRole};
