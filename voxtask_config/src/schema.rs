use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use voxtask_core::LOW_CONFIDENCE_THRESHOLD;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InterpreterConfig {
    /// Known assignees, in vocabulary order.
    #[serde(default = "InterpreterConfig::default_users")]
    pub users: Vec<String>,
    /// Known categories, in vocabulary order.
    #[serde(default = "InterpreterConfig::default_categories")]
    pub categories: Vec<String>,
    /// Similarity score below which a match is kept as raw text.
    #[serde(default = "InterpreterConfig::default_threshold")]
    pub low_confidence_threshold: f64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            users: Self::default_users(),
            categories: Self::default_categories(),
            low_confidence_threshold: Self::default_threshold(),
        }
    }
}

impl InterpreterConfig {
    fn default_users() -> Vec<String> {
        ["Alice", "Bob", "Charlie", "Ali"]
            .map(ToString::to_string)
            .to_vec()
    }

    fn default_categories() -> Vec<String> {
        ["Construction", "Inspection", "Maintenance"]
            .map(ToString::to_string)
            .to_vec()
    }

    const fn default_threshold() -> f64 {
        LOW_CONFIDENCE_THRESHOLD
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one JSON file per processed task.
    #[serde(default = "StorageConfig::default_tasks_dir")]
    pub tasks_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_dir: Self::default_tasks_dir(),
        }
    }
}

impl StorageConfig {
    fn default_tasks_dir() -> PathBuf {
        PathBuf::from("data/tasks")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_max_size_mb")]
    pub max_size_mb: u64,
    #[serde(default = "AudioConfig::default_formats")]
    pub supported_formats: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_size_mb: Self::default_max_size_mb(),
            supported_formats: Self::default_formats(),
        }
    }
}

impl AudioConfig {
    const fn default_max_size_mb() -> u64 {
        50
    }

    fn default_formats() -> Vec<String> {
        vec!["wav".to_string()]
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'voxtask init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        tracing::info!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("voxtask"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "interpreter": {
    "users": ["Alice", "Bob", "Charlie", "Ali"],
    "categories": ["Construction", "Inspection", "Maintenance"],
    "low_confidence_threshold": 0.3
  },
  "storage": {
    "tasks_dir": "data/tasks"
  },
  "audio": {
    "max_size_mb": 50,
    "supported_formats": ["wav"]
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the user and category vocabularies to match your team");
        println!("   2. Run 'voxtask parse \"task fix door user Bob\"' to try the interpreter");
        println!();
        Ok(())
    }
}
