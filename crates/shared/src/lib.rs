//! Shared types, errors, and configuration for Remesa.
//!
//! This crate provides common types used across all other crates:
//! - Money type with decimal precision
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Access token issuance

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{AccessToken, Claims, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
