//! Configuration for mkcorpus

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::keys::DEFAULT_SEED;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the record store and corpus artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Record database file name inside the data directory
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// Ingest configuration
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Corpus construction configuration
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_name: default_db_name(),
            ingest: IngestConfig::default(),
            corpus: CorpusConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "mkcorpus")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".mkcorpus"))
}

fn default_db_name() -> String {
    "records.db".to_string()
}

/// Ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Seed for the corpus key permutation
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Stored articles between status reports
    #[serde(default = "default_status_interval")]
    pub status_interval: usize,
    /// Rough article total, used only for status percentages
    #[serde(default = "default_estimated_articles")]
    pub estimated_articles: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            status_interval: 200,
            estimated_articles: 15_151,
        }
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_status_interval() -> usize {
    200
}

fn default_estimated_articles() -> usize {
    15_151
}

/// Corpus construction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Vocabulary id-map artifact name
    #[serde(default = "default_dictionary_json")]
    pub dictionary_json: String,
    /// Vocabulary listing artifact name
    #[serde(default = "default_dictionary_text")]
    pub dictionary_text: String,
    /// Bag-of-words corpus artifact name
    #[serde(default = "default_corpus_file")]
    pub corpus_file: String,
    /// Documents between status reports during the corpus passes
    #[serde(default = "default_status_interval")]
    pub status_interval: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dictionary_json: default_dictionary_json(),
            dictionary_text: default_dictionary_text(),
            corpus_file: default_corpus_file(),
            status_interval: 200,
        }
    }
}

fn default_dictionary_json() -> String {
    "dictionary.json".to_string()
}

fn default_dictionary_text() -> String {
    "dictionary.txt".to_string()
}

fn default_corpus_file() -> String {
    "corpus.mm".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }
        if self.db_name.is_empty() {
            errors.push("db_name must not be empty".to_string());
        }

        if self.ingest.status_interval == 0 {
            errors.push("ingest.status_interval must be positive".to_string());
        }
        if self.corpus.status_interval == 0 {
            errors.push("corpus.status_interval must be positive".to_string());
        }

        for (field, name) in [
            ("dictionary_json", &self.corpus.dictionary_json),
            ("dictionary_text", &self.corpus.dictionary_text),
            ("corpus_file", &self.corpus.corpus_file),
        ] {
            if name.is_empty() {
                errors.push(format!("{} must not be empty", field));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }

    /// Path of the record database inside the data directory
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_knobs() {
        let config = Config::default();
        assert_eq!(config.ingest.seed, 513_598);
        assert_eq!(config.ingest.status_interval, 200);
        assert_eq!(config.ingest.estimated_articles, 15_151);
        assert_eq!(config.db_name, "records.db");
        assert_eq!(config.corpus.corpus_file, "corpus.mm");
        assert_eq!(config.corpus.status_interval, 200);
    }

    #[test]
    fn test_zero_status_interval_rejected() {
        let mut config = Config::default();
        config.ingest.status_interval = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("status_interval"));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.db_name = String::new();
        config.ingest.status_interval = 0;
        config.corpus.corpus_file = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("db_name"));
        assert!(err.contains("status_interval"));
        assert!(err.contains("corpus_file"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [ingest]
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.ingest.seed, 42);
        assert_eq!(config.ingest.status_interval, 200);
        assert_eq!(config.db_name, "records.db");
    }

    #[test]
    fn test_db_path_joins_data_dir() {
        let mut config = Config::default();
        config.data_dir = PathBuf::from("/var/corpus");
        assert_eq!(config.db_path(), PathBuf::from("/var/corpus/records.db"));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.ingest.seed, config.ingest.seed);
        assert_eq!(parsed.corpus.dictionary_json, config.corpus.dictionary_json);
    }
}
