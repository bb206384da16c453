// src/ai_bootstrap.rs
use crate::analyze::ai_adapter::{build_client_from_config, DynAnalysisClient};
use crate::config::ai::AiConfig;
use anyhow::Context;
use tracing::info;

pub struct AiRuntime {
    pub cfg: AiConfig,
    pub client: DynAnalysisClient,
}

impl AiRuntime {
    /// Config from `$AI_CONFIG_PATH` / `config/ai.{toml,json}` / defaults.
    pub fn from_default() -> anyhow::Result<Self> {
        let cfg = AiConfig::load_default().context("loading AI config")?;
        Self::from_config(cfg)
    }

    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let cfg = AiConfig::load_from_file(path)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: AiConfig) -> anyhow::Result<Self> {
        // Safe diagnostics: only provider + model + key length
        info!(
            "AI cfg loaded: provider={}, model={}, key_len={}",
            cfg.provider,
            cfg.model.as_deref().unwrap_or("(default)"),
            cfg.api_key.len()
        );
        let client = build_client_from_config(&cfg)?;
        Ok(Self { cfg, client })
    }
}
