//! The secret store abstraction.

use async_trait::async_trait;
use kse_core::{SecretBytes, SecretData, SecretRef};

use crate::Result;

/// Async trait for remote key-value secret stores.
///
/// Objects are addressed by namespace and name and hold a key to bytes
/// mapping. Listing results carry no ordering guarantee.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List all namespaces visible to the caller.
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// List the names of all secret objects in a namespace.
    async fn list_names(&self, namespace: &str) -> Result<Vec<String>>;

    /// Fetch the full key set of one object.
    async fn fetch(&self, secret: &SecretRef) -> Result<SecretData>;

    /// Set a single key on an object, leaving every other key untouched.
    ///
    /// Implemented as read-modify-write: the current object is fetched, the
    /// key is set in the local copy, and the whole object is submitted back
    /// carrying the version token from the read. A concurrent modification
    /// in between surfaces as `StoreError::Conflict`; nothing is retried.
    async fn patch(&self, secret: &SecretRef, key: &str, value: &SecretBytes) -> Result<()>;
}
