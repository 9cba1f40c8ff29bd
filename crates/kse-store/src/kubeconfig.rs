//! Kubeconfig loading.
//!
//! Supports the subset of the kubeconfig format needed to reach a cluster
//! directly: the current context, its cluster endpoint and CA, and static
//! credentials (bearer token, client certificate, or basic auth). Exec and
//! auth-provider plugins are rejected.

use std::path::{Path, PathBuf};

use base64::Engine;
use kse_core::{ConfigError, SecretBytes};
use serde::Deserialize;
use tracing::debug;

/// Parsed kubeconfig file.
#[derive(Debug, Deserialize)]
pub struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,

    #[serde(default)]
    contexts: Vec<NamedContext>,

    #[serde(default)]
    users: Vec<NamedUser>,

    #[serde(rename = "current-context", default)]
    current_context: Option<String>,

    /// Directory the file was loaded from; relative paths resolve against it.
    #[serde(skip)]
    base_dir: PathBuf,

    #[serde(skip)]
    source: PathBuf,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: Cluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    server: String,
    #[serde(default)]
    certificate_authority: Option<PathBuf>,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: Context,
}

#[derive(Debug, Deserialize)]
struct Context {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct User {
    #[serde(default)]
    token: Option<String>,
    #[serde(rename = "tokenFile", default)]
    token_file: Option<PathBuf>,
    #[serde(default)]
    client_certificate: Option<PathBuf>,
    #[serde(default)]
    client_certificate_data: Option<String>,
    #[serde(default)]
    client_key: Option<PathBuf>,
    #[serde(default)]
    client_key_data: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    exec: Option<serde_yaml::Value>,
    #[serde(rename = "auth-provider", default)]
    auth_provider: Option<serde_yaml::Value>,
}

/// Credentials presented to the API server.
#[derive(Debug)]
pub enum Credentials {
    None,
    Token(SecretBytes),
    Basic {
        username: String,
        password: SecretBytes,
    },
    /// PEM-encoded certificate chain followed by the private key.
    ClientCertificate(SecretBytes),
}

/// Everything needed to connect to the cluster selected by the current context.
#[derive(Debug)]
pub struct ClusterAuth {
    pub server: String,
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub credentials: Credentials,
}

impl Kubeconfig {
    /// Load and parse a kubeconfig file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::kubeconfig(path, e.to_string()))?;
        let mut config = Self::parse(&content)
            .map_err(|reason| ConfigError::kubeconfig(path, reason))?;

        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.source = path.to_path_buf();
        debug!(path = %path.display(), "loaded kubeconfig");
        Ok(config)
    }

    /// Parse kubeconfig YAML.
    pub fn parse(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("parse error: {e}"))
    }

    /// Resolve the current context into connection settings.
    pub fn cluster_auth(&self) -> Result<ClusterAuth, ConfigError> {
        let context_name = self
            .current_context
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| self.error("current-context is not set"))?;

        let context = self
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.context)
            .ok_or_else(|| self.error(format!("context '{context_name}' not found")))?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| self.error(format!("cluster '{}' not found", context.cluster)))?;

        let user = match context.user.as_deref() {
            Some(name) => Some(
                self.users
                    .iter()
                    .find(|u| u.name == name)
                    .map(|u| &u.user)
                    .ok_or_else(|| self.error(format!("user '{name}' not found")))?,
            ),
            None => None,
        };

        let ca_pem = match (&cluster.certificate_authority_data, &cluster.certificate_authority) {
            (Some(data), _) => Some(self.decode("certificate-authority-data", data)?),
            (None, Some(file)) => Some(self.read_file(file)?),
            (None, None) => None,
        };

        let credentials = match user {
            Some(user) => self.credentials(user)?,
            None => Credentials::None,
        };

        Ok(ClusterAuth {
            server: cluster.server.trim_end_matches('/').to_string(),
            ca_pem,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
            credentials,
        })
    }

    fn credentials(&self, user: &User) -> Result<Credentials, ConfigError> {
        if user.exec.is_some() || user.auth_provider.is_some() {
            return Err(self.error("exec and auth-provider credential plugins are not supported"));
        }

        if let Some(token) = user.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Credentials::Token(SecretBytes::from(token)));
        }
        if let Some(file) = &user.token_file {
            let token = self.read_file(file)?;
            let trimmed = String::from_utf8_lossy(&token).trim().to_string();
            return Ok(Credentials::Token(SecretBytes::from(trimmed.as_str())));
        }

        let cert = match (&user.client_certificate_data, &user.client_certificate) {
            (Some(data), _) => Some(self.decode("client-certificate-data", data)?),
            (None, Some(file)) => Some(self.read_file(file)?),
            (None, None) => None,
        };
        let key = match (&user.client_key_data, &user.client_key) {
            (Some(data), _) => Some(self.decode("client-key-data", data)?),
            (None, Some(file)) => Some(self.read_file(file)?),
            (None, None) => None,
        };
        match (cert, key) {
            (Some(mut cert), Some(key)) => {
                if !cert.ends_with(b"\n") {
                    cert.push(b'\n');
                }
                cert.extend_from_slice(&key);
                return Ok(Credentials::ClientCertificate(SecretBytes::new(cert)));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(self.error("client certificate and key must be set together"));
            }
            (None, None) => {}
        }

        if let (Some(username), Some(password)) = (&user.username, &user.password) {
            return Ok(Credentials::Basic {
                username: username.clone(),
                password: SecretBytes::from(password.as_str()),
            });
        }

        Ok(Credentials::None)
    }

    fn decode(&self, field: &str, data: &str) -> Result<Vec<u8>, ConfigError> {
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| self.error(format!("{field}: invalid base64: {e}")))
    }

    fn read_file(&self, file: &Path) -> Result<Vec<u8>, ConfigError> {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base_dir.join(file)
        };
        std::fs::read(&path).map_err(|e| self.error(format!("{}: {e}", path.display())))
    }

    fn error(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::kubeconfig(&self.source, reason)
    }
}
