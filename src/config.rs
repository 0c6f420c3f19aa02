use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_endpoint: String,
    pub default_format: String,
    pub color_output: bool,
    pub verbose: bool,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Per-provider connection settings for the failover chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub ollama: ProviderEndpoint,
    #[serde(default)]
    pub claude: ProviderEndpoint,
    #[serde(default)]
    pub openai: ProviderEndpoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for ProviderEndpoint {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model: String::new(),
            api_key: None,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ollama: ProviderEndpoint {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                api_key: None,
            },
            claude: ProviderEndpoint {
                base_url: "https://api.anthropic.com".to_string(),
                model: "claude-3-haiku-20240307".to_string(),
                api_key: None,
            },
            openai: ProviderEndpoint {
                base_url: "https://api.openai.com".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: None,
            },
        }
    }
}

/// Batch orchestrator tunables (spec.md §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub api_base_url: String,
    pub max_workers: usize,
    pub batch_size: usize,
    pub rate_limit_per_minute: u32,
    pub request_timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub processing_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8003".to_string(),
            max_workers: 5,
            batch_size: 50,
            rate_limit_per_minute: 100,
            request_timeout_seconds: 120,
            retry_attempts: 3,
            retry_delay_seconds: 5,
            processing_delay_ms: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8003".to_string(),
            default_format: "text".to_string(),
            color_output: true,
            verbose: false,
            providers: ProvidersConfig::default(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        let config_dir = config_path.parent().unwrap();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    pub fn reset() -> Result<()> {
        let config = Config::default();
        config.save()?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "vlawyer", "kanuni")
            .ok_or_else(|| anyhow::anyhow!("Unable to determine config directory"))?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
