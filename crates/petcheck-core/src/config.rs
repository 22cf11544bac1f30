//! Project configuration for conformance runs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::schema_db::{SchemaError, SchemaStore};

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the service under test
    pub base_url: String,

    /// Service name used as the first level of schema DB lookups
    #[serde(default = "default_service")]
    pub service: String,

    /// HTTP headers sent with every request (api_key, etc.)
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory for per-suite request logs
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Mask sensitive header values in request logs
    #[serde(default = "default_true")]
    pub mask_headers: bool,

    /// Schema DB file overriding the builtin reference data (JSON or YAML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_db: Option<PathBuf>,

    /// Seed for fixture generation (random when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_service() -> String {
    "petstore".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".petcheck/logs")
}

const fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://petstore.swagger.io/v2".to_string(),
            service: default_service(),
            headers: HashMap::from([("api_key".to_string(), "special-key".to_string())]),
            timeout_secs: default_timeout_secs(),
            log_dir: default_log_dir(),
            mask_headers: true,
            schema_db: None,
            seed: None,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.petcheck.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".petcheck.toml", ".petcheck.json", "petcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// The schema DB this config points at: the configured file, or the
    /// builtin data.
    ///
    /// # Errors
    ///
    /// Returns error if the configured file cannot be loaded
    pub fn schema_store(&self) -> Result<SchemaStore, SchemaError> {
        match &self.schema_db {
            Some(path) => SchemaStore::load(path),
            None => SchemaStore::builtin().cloned(),
        }
    }

    /// Example config file
    pub fn example() -> &'static str {
        r#"# petcheck configuration

# Service under test
base_url = "https://petstore.swagger.io/v2"

# First level of schema DB lookups
service = "petstore"

# Request timeout in seconds
timeout_secs = 10

# Per-suite request logs (<log_dir>/<suite>.log)
log_dir = ".petcheck/logs"
mask_headers = true

# Replace the builtin schema DB (JSON or YAML)
# schema_db = "schema_db.json"

# Fixed fixture seed for reproducible payloads
# seed = 42

# Headers sent with every request
[headers]
api_key = "special-key"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
