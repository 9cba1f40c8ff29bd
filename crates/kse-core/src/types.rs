//! Identifiers and data shapes shared between the store and the session.

use crate::secret::SecretBytes;
use std::collections::HashMap;
use std::fmt;

/// Key to value mapping of a single secret object.
///
/// Always a full snapshot of the object; no ordering is implied.
pub type SecretData = HashMap<String, SecretBytes>;

/// Identifies a secret object by namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl SecretRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
