use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{TravealError, TravealResult};
use crate::types::{AnonymizationLevel, KdfMethod, TagScheme};

/// Default environment variable holding the master secret
pub const DEFAULT_MASTER_KEY_ENV: &str = "TRAVEAL_ENCRYPTION_KEY";

/// Top-level configuration (loaded from traveal.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravealConfig {
    pub crypto: CryptoConfig,
    pub anonymization: AnonymizationConfig,
    pub logging: LoggingConfig,
}

/// Envelope, KDF and hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// KDF used when the caller does not pick one (default: scrypt)
    pub default_method: KdfMethod,
    /// PBKDF2 iterations for the secure hash service (default: 100000)
    pub hash_iterations: u32,
    /// Envelope tag construction for new envelopes: "legacy" or "hmac"
    pub tag_scheme: TagScheme,
    /// Environment variable consulted for the master secret
    pub master_key_env: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            default_method: KdfMethod::Scrypt,
            hash_iterations: 100_000,
            tag_scheme: TagScheme::Legacy,
            master_key_env: DEFAULT_MASTER_KEY_ENV.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizationConfig {
    /// Level applied when the caller does not pick one
    pub default_level: AnonymizationLevel,
    /// Location noise bound in thousandths of a degree (default: 100 = 0.1)
    pub noise_units: u32,
    /// Record fields replaced by envelopes before export
    pub sensitive_fields: Vec<String>,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            default_level: AnonymizationLevel::Medium,
            noise_units: 100,
            sensitive_fields: [
                "email",
                "phone",
                "name",
                "address",
                "device_id",
                "ip_address",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl TravealConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> TravealResult<Self> {
        if !path.exists() {
            tracing::warn!(
                "config file not found: {}  (using defaults)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> TravealResult<Self> {
        toml::from_str(content).map_err(|e| TravealError::Config(format!("parsing config: {e}")))
    }

    /// Resolve the master secret using this config's environment variable.
    pub fn master_secret(&self, explicit: Option<SecretString>) -> TravealResult<SecretString> {
        resolve_master_secret(explicit, &self.crypto.master_key_env)
    }
}

/// Resolve the master secret: an explicit non-empty value wins, then the
/// named environment variable. Never falls back to a default.
pub fn resolve_master_secret(
    explicit: Option<SecretString>,
    env_var: &str,
) -> TravealResult<SecretString> {
    if let Some(secret) = explicit {
        if !secret.expose_secret().is_empty() {
            return Ok(secret);
        }
    }

    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        _ => Err(TravealError::MissingSecret),
    }
}
