use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default per-call LLM timeout (§5: "LLM calls carry per-call timeouts, default 12s").
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 12;
/// Progress queue TTL before the background sweeper evicts it (§4.4).
pub const PROGRESS_QUEUE_TTL_SECS: u64 = 300;
/// Sweep cadence for the progress broker's GC loop.
pub const PROGRESS_GC_INTERVAL_SECS: u64 = 60;
/// SSE heartbeat cadence for the progress stream.
pub const PROGRESS_HEARTBEAT_SECS: u64 = 30;
/// Default per-source top-K for the hybrid retriever (§4.5).
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 50;
/// Default RRF fusion depth (§4.5).
pub const DEFAULT_FUSION_DEPTH: usize = 60;
/// Sufficiency threshold below which general-knowledge supplementation may engage (§4.6 step 6).
pub const SUFFICIENCY_THRESHOLD: f32 = 0.7;
/// Default max fraction of the composed answer allowed to be general-knowledge (§4.6 step 7).
pub const DEFAULT_MAX_GENERAL_FRACTION: f32 = 0.25;

/// Top-level config (`uia.toml` + `UIA_*` env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiaConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for UiaConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            rag: RagConfig::default(),
            retrieval: RetrievalConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model")]
    pub planner_model: String,
    #[serde(default = "default_model")]
    pub rerank_model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            planner_model: default_model(),
            rerank_model: default_model(),
            api_key: None,
            request_timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default)]
    pub allow_general_knowledge: bool,
    #[serde(default = "default_max_general_fraction")]
    pub max_general_fraction: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            allow_general_knowledge: false,
            max_general_fraction: default_max_general_fraction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_fusion_depth")]
    pub fusion_depth: usize,
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            fusion_depth: default_fusion_depth(),
            index_dir: default_index_dir(),
        }
    }
}

/// Resolves Open Question (iii): which categories may be auto-recorded from an
/// intent-detected `categoryHit` without user confirmation via survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_persistable_categories")]
    pub persistable_categories: Vec<String>,
    #[serde(default = "default_db_path")]
    pub state_db_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            persistable_categories: default_persistable_categories(),
            state_db_path: default_db_path(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout() -> u64 {
    DEFAULT_LLM_TIMEOUT_SECS
}
fn default_max_general_fraction() -> f32 {
    DEFAULT_MAX_GENERAL_FRACTION
}
fn default_top_k() -> usize {
    DEFAULT_RETRIEVAL_TOP_K
}
fn default_fusion_depth() -> usize {
    DEFAULT_FUSION_DEPTH
}
fn default_index_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.uia/index")
}
fn default_persistable_categories() -> Vec<String> {
    vec!["ec_ds".to_string()]
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.uia/uia.db")
}

impl UiaConfig {
    /// Load config from a TOML file with `UIA_*` env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `~/.uia/uia.toml`
    ///
    /// A missing file is not an error — `Figment` simply contributes nothing
    /// and the coded defaults above take over.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: UiaConfig = Figment::from(figment::providers::Serialized::defaults(
            UiaConfig::default(),
        ))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("UIA_").split("_"))
        .extract()
        .map_err(|e| crate::error::UiaError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.uia/uia.toml")
}
