//! In-memory secret store.
//!
//! Mirrors the Kubernetes binding's semantics (full-object updates guarded
//! by a per-object version) without any network. Used by tests and by the
//! integration suite.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kse_core::{SecretBytes, SecretData, SecretRef, StoreError};
use parking_lot::RwLock;
use tracing::debug;

use crate::store::SecretStore;
use crate::Result;

#[derive(Clone)]
struct StoredObject {
    data: SecretData,
    version: u64,
}

/// A process-local secret store.
#[derive(Default)]
pub struct MemorySecretStore {
    namespaces: RwLock<BTreeSet<String>>,
    objects: RwLock<HashMap<SecretRef, StoredObject>>,
    patch_calls: AtomicUsize,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) an object, creating its namespace if needed.
    pub fn insert<K, V>(&self, secret: SecretRef, data: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<SecretBytes>,
    {
        let data: SecretData = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.namespaces.write().insert(secret.namespace.clone());

        let mut objects = self.objects.write();
        let version = objects.get(&secret).map(|o| o.version + 1).unwrap_or(1);
        objects.insert(secret, StoredObject { data, version });
    }

    /// Add an empty namespace.
    pub fn add_namespace(&self, namespace: impl Into<String>) {
        self.namespaces.write().insert(namespace.into());
    }

    /// Remove an object entirely.
    pub fn remove(&self, secret: &SecretRef) {
        self.objects.write().remove(secret);
    }

    /// Read an object together with its current version token.
    pub fn fetch_versioned(&self, secret: &SecretRef) -> Result<(SecretData, u64)> {
        self.objects
            .read()
            .get(secret)
            .map(|o| (o.data.clone(), o.version))
            .ok_or_else(|| StoreError::not_found("secret", secret.to_string()))
    }

    /// Replace an object's data if its version still matches.
    pub fn update(&self, secret: &SecretRef, data: SecretData, expected_version: u64) -> Result<()> {
        let mut objects = self.objects.write();
        let current = objects
            .get_mut(secret)
            .ok_or_else(|| StoreError::not_found("secret", secret.to_string()))?;

        if current.version != expected_version {
            return Err(StoreError::Conflict(format!(
                "secret '{secret}' was modified concurrently (version {} != {expected_version})",
                current.version
            )));
        }

        current.data = data;
        current.version += 1;
        Ok(())
    }

    /// Number of times [`SecretStore::patch`] has been called.
    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(self.namespaces.read().iter().cloned().collect())
    }

    async fn list_names(&self, namespace: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .keys()
            .filter(|r| r.namespace == namespace)
            .map(|r| r.name.clone())
            .collect())
    }

    async fn fetch(&self, secret: &SecretRef) -> Result<SecretData> {
        self.fetch_versioned(secret).map(|(data, _)| data)
    }

    async fn patch(&self, secret: &SecretRef, key: &str, value: &SecretBytes) -> Result<()> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);

        let (mut data, version) = self.fetch_versioned(secret)?;
        data.insert(key.to_string(), value.clone());
        debug!(secret = %secret, key, version, "updating secret in memory");
        self.update(secret, data, version)
    }
}
