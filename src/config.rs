//! Configuration file loading with environment variable overrides.
//!
//! [`Config`] mirrors the TOML file. [`Config::resolve`] folds in the
//! environment once at startup and produces [`Settings`], the immutable value
//! the rest of the service is built from.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codec::MaskEncoding;
use crate::model::{ProviderConfig, ProviderId};
use crate::params::{validate_strength, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_STRENGTH};

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Per-provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fallback card text.
    #[serde(default)]
    pub card: CardConfig,
}

/// API key configuration.
#[derive(Default, Deserialize)]
pub struct KeysConfig {
    /// `OpenAI` API key.
    pub openai: Option<String>,
    /// Stability AI API key.
    pub stability: Option<String>,
}

impl fmt::Debug for KeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysConfig")
            .field("openai", &self.openai.as_ref().map(|_| "<redacted>"))
            .field("stability", &self.stability.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for each provider.
#[derive(Debug, Default, Deserialize)]
pub struct ProvidersConfig {
    /// `OpenAI` masked edit.
    #[serde(default)]
    pub openai: ProviderSettings,
    /// Stability strength transform.
    #[serde(default)]
    pub stability: ProviderSettings,
}

/// Settings shared by all providers, plus the shape-specific knobs.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderSettings {
    /// Lower is tried first. Defaults to the built-in order.
    pub priority: Option<u32>,
    /// Skip this provider even when a key is present.
    #[serde(default)]
    pub bypass: bool,
    /// Endpoint override.
    pub endpoint: Option<String>,
    /// Model override (masked edit only).
    pub model: Option<String>,
    /// Mask color convention (masked edit only).
    pub mask_encoding: Option<MaskEncoding>,
    /// Image strength (strength transform only).
    pub strength: Option<f32>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port. `PORT` overrides.
    pub port: u16,
    /// Upload ceiling in bytes.
    pub max_upload_bytes: usize,
    /// Per provider-attempt timeout.
    pub provider_timeout_secs: u64,
    /// CORS origins; empty allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            provider_timeout_secs: 60,
            allowed_origins: Vec::new(),
        }
    }
}

/// Text on the fallback card.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Line drawn under the caption.
    pub subtitle: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self { subtitle: "Fat Hacks 2025".to_string() }
    }
}

/// One provider after env overrides are applied.
#[derive(Clone)]
pub struct ResolvedProvider {
    /// Identity, enablement, priority and bypass.
    pub config: ProviderConfig,
    /// Credential, if any.
    pub api_key: Option<String>,
    /// Endpoint override.
    pub endpoint: Option<String>,
    /// Model override.
    pub model: Option<String>,
    /// Mask color convention.
    pub mask_encoding: MaskEncoding,
    /// Image strength.
    pub strength: f32,
}

impl fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("config", &self.config)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("mask_encoding", &self.mask_encoding)
            .field("strength", &self.strength)
            .finish()
    }
}

/// Immutable, fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Providers sorted by priority.
    pub providers: Vec<ResolvedProvider>,
    /// Server settings with `PORT` applied.
    pub server: ServerConfig,
    /// Fallback card text.
    pub card: CardConfig,
}

impl Settings {
    /// The read-only provider plan, in the order providers are tried.
    #[must_use]
    pub fn provider_plan(&self) -> Vec<ProviderConfig> {
        self.providers.iter().map(|p| p.config).collect()
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    fn settings_for(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::OpenAi => &self.providers.openai,
            ProviderId::Stability => &self.providers.stability,
        }
    }

    fn file_key(&self, id: ProviderId) -> Option<&String> {
        match id {
            ProviderId::OpenAi => self.keys.openai.as_ref(),
            ProviderId::Stability => self.keys.stability.as_ref(),
        }
    }

    /// Resolve against the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn resolve(&self) -> Result<Settings, String> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup.
    ///
    /// Keys prefer the environment over the file, and empty values count as
    /// absent. A truthy `BYPASS_*` variable turns bypass on; it never turns a
    /// file-level bypass off.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn resolve_with<F>(&self, env: F) -> Result<Settings, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut providers = Vec::with_capacity(ProviderId::ALL.len());
        for (index, id) in ProviderId::ALL.into_iter().enumerate() {
            let settings = self.settings_for(id);
            let api_key = env(id.key_env_var())
                .or_else(|| self.file_key(id).cloned())
                .filter(|k| !k.trim().is_empty());
            let bypass = settings.bypass || env(id.bypass_env_var()).is_some_and(|v| is_truthy(&v));
            let strength = settings.strength.unwrap_or(DEFAULT_STRENGTH);
            validate_strength(strength).map_err(|e| format!("providers.{id}: {e}"))?;

            providers.push(ResolvedProvider {
                config: ProviderConfig {
                    id,
                    enabled: api_key.is_some(),
                    priority: settings.priority.unwrap_or(u32::try_from(index).unwrap_or(u32::MAX)),
                    bypass,
                },
                api_key,
                endpoint: settings.endpoint.clone(),
                model: settings.model.clone(),
                mask_encoding: settings.mask_encoding.unwrap_or_default(),
                strength,
            });
        }
        providers.sort_by_key(|p| p.config.priority);

        let mut server = self.server.clone();
        if let Some(port) = env("PORT") {
            server.port = port.parse().map_err(|e| format!("Invalid PORT '{port}': {e}"))?;
        }
        if server.provider_timeout_secs == 0 {
            return Err("server.provider_timeout_secs must be greater than 0".to_string());
        }
        if server.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be greater than 0".to_string());
        }

        Ok(Settings { providers, server, card: self.card.clone() })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PHOTOGEN_CONFIG` environment variable
/// 3. `~/.config/photogen/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PHOTOGEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/photogen/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/photogen/config.toml")
    } else {
        PathBuf::from("photogen.toml")
    }
}
