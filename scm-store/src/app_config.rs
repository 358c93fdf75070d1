use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub enhancer: EnhancerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `postgres://…`, or `memory://` for a process-local store.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

fn default_max_connections() -> u32 {
    5
}

/// WhatsApp gateway settings. Token and target can be changed at runtime.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagingConfig {
    pub endpoint: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub target: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default = "default_sender")]
    pub sender: String,
}

fn default_country_code() -> String {
    "62".to_string()
}

fn default_sender() -> String {
    "SCM Bot".to_string()
}

impl MessagingConfig {
    pub const TOKEN_KEY: &'static str = "messaging.token";
    pub const TARGET_KEY: &'static str = "messaging.target";

    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.target.trim().is_empty()
    }

    /// Apply persisted runtime overrides on top of the file/env values.
    pub fn overlay(mut self, settings: &HashMap<String, String>) -> Self {
        if let Some(token) = settings.get(Self::TOKEN_KEY) {
            self.token = token.clone();
        }
        if let Some(target) = settings.get(Self::TARGET_KEY) {
            self.target = target.clone();
        }
        self
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    #[serde(default = "default_id_width")]
    pub id_width: usize,
    #[serde(default = "default_max_allocation_attempts")]
    pub max_allocation_attempts: u32,
}

fn default_id_prefix() -> String {
    "REQ-".to_string()
}

fn default_id_width() -> usize {
    5
}

fn default_max_allocation_attempts() -> u32 {
    3
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            id_width: default_id_width(),
            max_allocation_attempts: default_max_allocation_attempts(),
        }
    }
}

/// Optional text-generation API used to polish job details.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EnhancerConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `SCM__MESSAGING__TOKEN=...`
            .add_source(config::Environment::with_prefix("SCM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
