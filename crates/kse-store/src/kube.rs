//! Kubernetes Secrets over the core/v1 REST API.
//!
//! Secret objects are fetched and updated as whole JSON documents so that
//! fields this tool does not know about (labels, annotations, type,
//! immutable, ...) round-trip untouched. `data` values are base64 on the wire.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use kse_core::{ConfigError, SecretBytes, SecretData, SecretRef, StoreError};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::kubeconfig::{ClusterAuth, Credentials, Kubeconfig};
use crate::store::SecretStore;
use crate::Result;

/// How each request authenticates, apart from TLS client certificates.
enum RequestAuth {
    None,
    Bearer(SecretBytes),
    Basic {
        username: String,
        password: SecretBytes,
    },
}

/// Secret store backed by a Kubernetes API server.
pub struct KubeSecretStore {
    /// HTTP client.
    client: Client,

    /// API server base URL, without a trailing slash.
    server: String,

    /// Per-request credentials.
    auth: RequestAuth,
}

/// Minimal shape of a `*List` response.
#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    metadata: ObjectMeta,
}

#[derive(Debug, Deserialize)]
struct ObjectMeta {
    name: String,
}

/// The parts of a Secret object this tool reads.
#[derive(Debug, Deserialize)]
struct SecretObject {
    #[serde(default)]
    data: Option<HashMap<String, String>>,
}

/// `metav1.Status`, returned as the body of failed requests.
#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

impl KubeSecretStore {
    /// Create a store for the cluster described by `auth`.
    pub fn new(auth: ClusterAuth) -> std::result::Result<Self, ConfigError> {
        let mut builder = Client::builder();

        if let Some(ca) = &auth.ca_pem {
            let cert = reqwest::Certificate::from_pem(ca).map_err(|e| {
                ConfigError::Invalid(format!("invalid certificate authority: {e}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }
        if auth.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let request_auth = match auth.credentials {
            Credentials::None => RequestAuth::None,
            Credentials::Token(token) => RequestAuth::Bearer(token),
            Credentials::Basic { username, password } => RequestAuth::Basic { username, password },
            Credentials::ClientCertificate(pem) => {
                let identity = reqwest::Identity::from_pem(pem.expose_secret()).map_err(|e| {
                    ConfigError::Invalid(format!("invalid client certificate: {e}"))
                })?;
                builder = builder.identity(identity);
                RequestAuth::None
            }
        };

        let client = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            server: auth.server.trim_end_matches('/').to_string(),
            auth: request_auth,
        })
    }

    /// Create a store from a kubeconfig file, using its current context.
    pub fn from_kubeconfig(path: &Path) -> std::result::Result<Self, ConfigError> {
        let auth = Kubeconfig::load(path)?.cluster_auth()?;
        debug!(server = %auth.server, "connecting to cluster");
        Self::new(auth)
    }

    fn namespaces_url(&self) -> String {
        format!("{}/api/v1/namespaces", self.server)
    }

    fn secrets_url(&self, namespace: &str) -> String {
        format!("{}/api/v1/namespaces/{}/secrets", self.server, namespace)
    }

    fn secret_url(&self, secret: &SecretRef) -> String {
        format!("{}/{}", self.secrets_url(&secret.namespace), secret.name)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            RequestAuth::None => request,
            RequestAuth::Bearer(token) => {
                request.bearer_auth(String::from_utf8_lossy(token.expose_secret()))
            }
            RequestAuth::Basic { username, password } => request.basic_auth(
                username,
                Some(String::from_utf8_lossy(password.expose_secret())),
            ),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorize(request)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))
    }

    async fn list(&self, url: String, kind: &'static str, name: &str) -> Result<Vec<String>> {
        debug!(url = %url, "listing {kind}");
        let response = check(self.send(self.client.get(&url)).await?, kind, name).await?;
        let list: ObjectList = decode_json(response).await?;
        Ok(list.items.into_iter().map(|i| i.metadata.name).collect())
    }

    async fn get_raw(&self, secret: &SecretRef) -> Result<serde_json::Value> {
        let response = self.send(self.client.get(self.secret_url(secret))).await?;
        let response = check(response, "secret", &secret.to_string()).await?;
        decode_json(response).await
    }
}

/// Map a non-success response onto a store error.
async fn check(response: Response, kind: &'static str, name: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<Status>(&body)
            .map(|s| s.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body),
        Err(_) => String::new(),
    };

    Err(match status.as_u16() {
        401 => StoreError::Unauthorized(message),
        403 => StoreError::Forbidden(message),
        404 => StoreError::not_found(kind, name),
        409 => StoreError::Conflict(message),
        code => StoreError::api(code, message),
    })
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| StoreError::transport(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| StoreError::decode(e.to_string()))
}

fn decode_data(data: HashMap<String, String>) -> Result<SecretData> {
    let engine = base64::engine::general_purpose::STANDARD;
    data.into_iter()
        .map(|(key, value)| {
            engine
                .decode(value.as_bytes())
                .map(|bytes| (key.clone(), SecretBytes::new(bytes)))
                .map_err(|e| StoreError::decode(format!("key '{key}': invalid base64: {e}")))
        })
        .collect()
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.list(self.namespaces_url(), "namespaces", "").await
    }

    async fn list_names(&self, namespace: &str) -> Result<Vec<String>> {
        self.list(self.secrets_url(namespace), "namespace", namespace)
            .await
    }

    async fn fetch(&self, secret: &SecretRef) -> Result<SecretData> {
        debug!(secret = %secret, "fetching secret");
        let object: SecretObject = serde_json::from_value(self.get_raw(secret).await?)
            .map_err(|e| StoreError::decode(e.to_string()))?;
        decode_data(object.data.unwrap_or_default())
    }

    async fn patch(&self, secret: &SecretRef, key: &str, value: &SecretBytes) -> Result<()> {
        let mut object = self.get_raw(secret).await?;

        let root = object
            .as_object_mut()
            .ok_or_else(|| StoreError::decode("secret is not a JSON object"))?;
        let data = root
            .entry("data")
            .or_insert_with(|| serde_json::Value::Object(Default::default()));
        if data.is_null() {
            *data = serde_json::Value::Object(Default::default());
        }
        let data = data
            .as_object_mut()
            .ok_or_else(|| StoreError::decode("secret data is not a JSON object"))?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(value.expose_secret());
        data.insert(key.to_string(), serde_json::Value::String(encoded));

        // The object still carries metadata.resourceVersion from the read,
        // so the API server rejects the update with 409 if it changed since.
        let response = self
            .send(self.client.put(self.secret_url(secret)).json(&object))
            .await?;
        check(response, "secret", &secret.to_string()).await?;

        info!(secret = %secret, key, "secret updated");
        Ok(())
    }
}
