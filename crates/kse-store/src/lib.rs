//! Remote secret store bindings for k8s-secret-editor.
//!
//! Provides the [`SecretStore`] trait and two implementations:
//! - [`KubeSecretStore`]: Kubernetes core/v1 Secrets over the REST API
//! - [`MemorySecretStore`]: an in-process store with the same semantics

pub mod kube;
pub mod kubeconfig;
pub mod memory;
pub mod store;

pub use kube::KubeSecretStore;
pub use kubeconfig::{ClusterAuth, Credentials, Kubeconfig};
pub use memory::MemorySecretStore;
pub use store::SecretStore;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, kse_core::StoreError>;
