//! # kse-core
//!
//! Core types, errors, and configuration for k8s-secret-editor.
//!
//! This crate provides shared functionality used across the workspace:
//!
//! - **Errors**: The session-level error taxonomy (config, editor, store, I/O)
//! - **Configuration**: Resolution of editor and kubeconfig settings
//! - **Types**: Secret identifiers and zeroizing byte buffers
//! - **Utilities**: Environment and path helpers, build metadata

pub mod build;
pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use build::BuildInfo;
pub use config::Config;
pub use error::{ConfigError, EditorError, Error, Result, StoreError};
pub use secret::SecretBytes;
pub use types::{SecretData, SecretRef};
