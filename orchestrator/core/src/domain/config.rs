// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Orchestrator Configuration Types
//
// Defines the configuration manifest for the content orchestrator:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Per-provider credentials, endpoints and model ids
// - Provider preference order
// - Per-call timeout and generation defaults
//
// Credentials are resolved once into `ProviderCredentials` and injected into
// the orchestrator; nothing reads the environment after startup.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::llm::ProviderId;

pub const API_VERSION: &str = "quill.dev/v1";
pub const KIND: &str = "OrchestratorConfig";

/// Top-level configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// API version (must be "quill.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "OrchestratorConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: OrchestratorSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSpec {
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Order in which available providers are tried
    #[serde(default = "default_preference_order")]
    pub preference_order: Vec<ProviderId>,

    /// Upper bound on any single provider call
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub perplexity: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::Gemini => &self.gemini,
            ProviderId::OpenAI => &self.openai,
            ProviderId::Perplexity => &self.perplexity,
        }
    }

    pub fn get_mut(&mut self, id: ProviderId) -> &mut ProviderSettings {
        match id {
            ProviderId::Gemini => &mut self.gemini,
            ProviderId::OpenAI => &mut self.openai,
            ProviderId::Perplexity => &mut self.perplexity,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the API base URL (proxies, tests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Chat model id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Image model id (image-capable providers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_model: Option<String>,
}

/// Resolved provider credentials. Presence of a key enables the provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
}

impl ProviderCredentials {
    pub fn get(&self, id: ProviderId) -> Option<&str> {
        match id {
            ProviderId::Gemini => self.gemini_api_key.as_deref(),
            ProviderId::OpenAI => self.openai_api_key.as_deref(),
            ProviderId::Perplexity => self.perplexity_api_key.as_deref(),
        }
    }

    /// Providers with a non-empty credential
    pub fn configured(&self) -> HashSet<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|k| !k.trim().is_empty()))
            .collect()
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderCredentials")
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .finish()
    }
}

fn default_preference_order() -> Vec<ProviderId> {
    vec![ProviderId::Gemini, ProviderId::OpenAI, ProviderId::Perplexity]
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

/// Environment variable carrying each provider's key when the manifest omits it
pub fn credential_env_var(id: ProviderId) -> &'static str {
    match id {
        ProviderId::Gemini => "GEMINI_API_KEY",
        ProviderId::OpenAI => "OPENAI_API_KEY",
        ProviderId::Perplexity => "PERPLEXITY_API_KEY",
    }
}

impl Default for OrchestratorSpec {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            preference_order: default_preference_order(),
            request_timeout: default_request_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "quill".to_string(),
                labels: None,
            },
            spec: OrchestratorSpec::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. QUILL_CONFIG_PATH environment variable
    /// 2. ./quill-config.yaml (working directory)
    /// 3. ~/.quill/config.yaml (user home)
    /// 4. /etc/quill/config.yaml (system, Unix) or C:\ProgramData\Quill\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("QUILL_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./quill-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".quill").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/quill/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Quill\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        // Explicit CLI path (fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides(env);
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides(env);
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides(env);
            Ok(config)
        }
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    ///
    /// Provider keys from the environment only fill in keys the manifest
    /// leaves unset.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::ALL {
            let var = credential_env_var(id);
            let settings = self.spec.providers.get_mut(id);
            if settings.api_key.is_none() {
                if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                    tracing::debug!("Environment override: {} credential from {}", id, var);
                    settings.api_key = Some(key);
                }
            }
        }

        if let Some(val) = lookup("QUILL_REQUEST_TIMEOUT") {
            match humantime::parse_duration(&val) {
                Ok(timeout) => {
                    tracing::info!("Environment override: QUILL_REQUEST_TIMEOUT={}", val);
                    self.spec.request_timeout = timeout;
                }
                Err(e) => {
                    tracing::warn!(
                        "Invalid value for QUILL_REQUEST_TIMEOUT: '{}' ({}). Ignoring.",
                        val,
                        e
                    );
                }
            }
        }
    }

    /// Resolve every provider key, following "env:VAR_NAME" indirection.
    /// An indirection to an unset variable leaves that provider disabled.
    pub fn credentials(&self) -> ProviderCredentials {
        self.credentials_with(|key| std::env::var(key).ok())
    }

    pub fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> ProviderCredentials {
        let resolve = |id: ProviderId| -> Option<String> {
            let raw = self.spec.providers.get(id).api_key.as_ref()?;
            let key = match raw.strip_prefix("env:") {
                Some(var_name) => match lookup(var_name) {
                    Some(value) => value,
                    None => {
                        tracing::warn!(
                            "Environment variable not set for {} credential: {}",
                            id,
                            var_name
                        );
                        return None;
                    }
                },
                None => raw.clone(),
            };
            Some(key).filter(|k| !k.trim().is_empty())
        };

        ProviderCredentials {
            gemini_api_key: resolve(ProviderId::Gemini),
            openai_api_key: resolve(ProviderId::OpenAI),
            perplexity_api_key: resolve(ProviderId::Perplexity),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.preference_order.is_empty() {
            anyhow::bail!("spec.preference_order cannot be empty");
        }

        let mut seen = HashSet::new();
        for id in &self.spec.preference_order {
            if !seen.insert(id) {
                anyhow::bail!("Provider '{}' listed twice in spec.preference_order", id);
            }
        }

        if self.spec.request_timeout.is_zero() {
            anyhow::bail!("spec.request_timeout must be greater than zero");
        }

        if !(0.0..=2.0).contains(&self.spec.temperature) {
            anyhow::bail!("spec.temperature must be between 0.0 and 2.0");
        }

        for id in ProviderId::ALL {
            if let Some(url) = &self.spec.providers.get(id).base_url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("Invalid base_url for provider '{}': {}", id, url);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_manifest() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.api_version, API_VERSION);
        assert_eq!(config.kind, KIND);
        assert_eq!(config.spec.preference_order.len(), 3);
        assert_eq!(config.spec.request_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
        assert!(config.credentials_with(no_env).configured().is_empty());
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
apiVersion: quill.dev/v1
kind: OrchestratorConfig
metadata:
  name: travel-cms
spec:
  providers:
    openai:
      api_key: sk-test
      model: gpt-4o-mini
    perplexity:
      api_key: env:PPLX_KEY
  preference_order: [openai, perplexity]
  request_timeout: 45s
"#;
        let config = OrchestratorConfig::from_yaml_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.spec.request_timeout, Duration::from_secs(45));
        assert_eq!(
            config.spec.preference_order,
            vec![ProviderId::OpenAI, ProviderId::Perplexity]
        );
        assert_eq!(config.spec.providers.openai.model.as_deref(), Some("gpt-4o-mini"));

        let creds = config.credentials_with(|k| (k == "PPLX_KEY").then(|| "pplx-1".to_string()));
        assert_eq!(creds.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(creds.perplexity_api_key.as_deref(), Some("pplx-1"));
        assert!(creds.gemini_api_key.is_none());
    }

    #[test]
    fn test_env_indirection_to_unset_variable_disables_provider() {
        let mut config = OrchestratorConfig::default();
        config.spec.providers.gemini.api_key = Some("env:MISSING_VAR".to_string());
        let creds = config.credentials_with(no_env);
        assert!(creds.configured().is_empty());
    }

    #[test]
    fn test_env_overrides_fill_missing_keys_only() {
        let mut config = OrchestratorConfig::default();
        config.spec.providers.openai.api_key = Some("from-file".to_string());
        config.apply_env_overrides(|k| match k {
            "OPENAI_API_KEY" => Some("from-env".to_string()),
            "GEMINI_API_KEY" => Some("gem".to_string()),
            "QUILL_REQUEST_TIMEOUT" => Some("2m".to_string()),
            _ => None,
        });
        assert_eq!(config.spec.providers.openai.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.spec.providers.gemini.api_key.as_deref(), Some("gem"));
        assert_eq!(config.spec.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_validation() {
        let mut config = OrchestratorConfig::default();

        config.api_version = "wrong/v1".to_string();
        assert!(config.validate().is_err());
        config.api_version = API_VERSION.to_string();

        config.spec.preference_order = vec![ProviderId::Gemini, ProviderId::Gemini];
        assert!(config.validate().is_err());
        config.spec.preference_order = vec![];
        assert!(config.validate().is_err());
        config.spec.preference_order = vec![ProviderId::OpenAI];

        config.spec.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
        config.spec.request_timeout = Duration::from_secs(5);

        config.spec.providers.openai.base_url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());
        config.spec.providers.openai.base_url = None;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = ProviderCredentials {
            openai_api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
