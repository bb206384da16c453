// src/config/ai.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const ENV_AI_CONFIG_PATH: &str = "AI_CONFIG_PATH";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_sessions() -> usize {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// "gemini" | "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider default when absent (gemini-2.5-flash / gpt-4o-mini).
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from GEMINI_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Override the provider endpoint root, e.g. for a local stand-in.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout of the HTTP transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: default_api_key(),
            base_url: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl AiConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading AI config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: AiConfig = match ext.as_str() {
            "toml" => toml::from_str(&data)
                .with_context(|| format!("parsing TOML AI config {}", path.display()))?,
            "json" => serde_json::from_str(&data)
                .with_context(|| format!("parsing JSON AI config {}", path.display()))?,
            other => bail!("unsupported AI config format: .{other}"),
        };
        cfg.normalized()
    }

    /// Load using env var + fallbacks:
    /// 1) $AI_CONFIG_PATH
    /// 2) config/ai.toml
    /// 3) config/ai.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_AI_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_AI_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        for candidate in ["config/ai.toml", "config/ai.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
        }
        Self::default().normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        self.provider = self.provider.trim().to_lowercase();

        // Resolve api key if "ENV". A missing variable is not fatal here: the
        // provider reports it as a transport failure on the first call.
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            let var = match self.provider.as_str() {
                "gemini" => Some(ENV_GEMINI_API_KEY),
                "openai" => Some(ENV_OPENAI_API_KEY),
                "mock" => None,
                other => bail!("Unsupported provider in config: {other}"),
            };
            self.api_key = match var {
                Some(var) => env::var(var).unwrap_or_else(|_| {
                    warn!(provider = %self.provider, "{var} is not set; analysis calls will fail");
                    String::new()
                }),
                None => String::new(),
            };
        }

        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = default_connect_timeout_secs();
        }
        if self.max_sessions == 0 {
            self.max_sessions = default_max_sessions();
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn toml_and_json_are_both_accepted() {
        let dir = tempfile::tempdir().unwrap();

        let p_toml = dir.path().join("ai.toml");
        fs::write(
            &p_toml,
            r#"
provider = " OpenAI "
api_key = "sk-test"
model = "gpt-4o"
timeout_secs = 0
"#,
        )
        .unwrap();
        let cfg = AiConfig::load_from_file(&p_toml).unwrap();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cfg.timeout_secs, 60);

        let p_json = dir.path().join("ai.json");
        fs::write(&p_json, r#"{"provider":"mock","max_sessions":4}"#).unwrap();
        let cfg = AiConfig::load_from_file(&p_json).unwrap();
        assert_eq!(cfg.provider, "mock");
        assert!(cfg.api_key.is_empty());
        assert_eq!(cfg.max_sessions, 4);
    }

    #[serial_test::serial]
    #[test]
    fn env_key_is_resolved_by_provider() {
        env::set_var(ENV_GEMINI_API_KEY, "g-key");
        let cfg = AiConfig::default().normalized().unwrap();
        assert_eq!(cfg.api_key, "g-key");
        env::remove_var(ENV_GEMINI_API_KEY);

        let cfg = AiConfig::default().normalized().unwrap();
        assert!(cfg.api_key.is_empty());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cfg = AiConfig {
            provider: "watson".into(),
            ..AiConfig::default()
        };
        assert!(cfg.normalized().is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ai.yaml");
        fs::write(&p, "provider: mock").unwrap();
        assert!(AiConfig::load_from_file(&p).is_err());
    }
}
