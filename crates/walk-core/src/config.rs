use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::config_loader::ConfigLoader;
use crate::walk::WalkParams;

pub const CONFIG_FILE: &str = "walk.toml";
pub const ENDPOINT_ENV: &str = "LLM_WALK_ENDPOINT";
pub const DATA_DIR_ENV: &str = "LLM_WALK_DATA_DIR";

/// Endpoint value that selects the offline random-reply client.
pub const MOCK_ENDPOINT: &str = "mock";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434/api/chat";
pub const DEFAULT_GRID_SIZE: u32 = 20;
pub const DEFAULT_TOTAL_STEPS: usize = 20;
pub const DEFAULT_TEMPERATURES: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
pub const DEFAULT_ROUNDS_PER_TEMPERATURE: usize = 5;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    /// No timeout when unset: a hung call blocks the run.
    pub request_timeout_ms: Option<u64>,
    pub retries: u32,
    pub retry_backoff_ms: u64,
    pub mock_seed: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: None,
            retries: 0,
            retry_backoff_ms: 500,
            mock_seed: None,
        }
    }
}

impl LlmConfig {
    pub fn is_mock(&self) -> bool {
        self.endpoint.trim() == MOCK_ENDPOINT
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Experiment configuration. Every field has a default, so a missing `walk.toml` runs the
/// standard sweep.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WalkConfig {
    pub grid_size: u32,
    pub total_steps: usize,
    pub temperatures: Vec<f64>,
    pub rounds_per_temperature: usize,
    pub data_dir: PathBuf,
    pub llm: LlmConfig,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            total_steps: DEFAULT_TOTAL_STEPS,
            temperatures: DEFAULT_TEMPERATURES.to_vec(),
            rounds_per_temperature: DEFAULT_ROUNDS_PER_TEMPERATURE,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            llm: LlmConfig::default(),
        }
    }
}

impl WalkConfig {
    /// Loads `walk.toml` (or defaults) and applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg: WalkConfig = ConfigLoader::parse_from_file_or_default(CONFIG_FILE)?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|s| !s.trim().is_empty()) {
            self.llm.endpoint = endpoint;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    pub fn walk_params(&self) -> WalkParams {
        WalkParams {
            grid_size: self.grid_size,
            steps: self.total_steps,
            temperatures: self.temperatures.clone(),
            rounds_per_temperature: self.rounds_per_temperature,
            retries: self.llm.retries,
            retry_backoff: Duration::from_millis(self.llm.retry_backoff_ms),
        }
    }

    /// Total number of model calls a full run will make.
    pub fn total_calls(&self) -> usize {
        self.total_steps * self.temperatures.len() * self.rounds_per_temperature
    }
}
