//! Configuration management for the course assistant.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - YAML config file (`course-assistant.yaml` or `COURSE_ASSISTANT_CONFIG`)
//! - Environment variables
//! - Command-line flags (see [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "course-assistant.yaml";

/// Default SQLite database holding documents, conversations and feedback.
pub const DEFAULT_DATABASE_PATH: &str = "course-assistant.db";

/// Default local Ollama endpoint.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Default OpenAI API base.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Environment variable holding the OpenAI key unless the config names another.
pub const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// SQLite database path
    pub database_path: PathBuf,

    /// Local inference backend
    pub ollama: BackendSettings,

    /// Cloud backend
    pub openai: BackendSettings,

    /// Resolved OpenAI API key
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Connection settings for one generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the backend API
    pub endpoint: String,

    /// Request timeout in seconds; `None` keeps the transport default
    pub timeout_secs: Option<u64>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    database: Option<DatabaseSection>,
    backends: Option<BackendsSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BackendsSection {
    ollama: Option<BackendSection>,
    openai: Option<BackendSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BackendSection {
    endpoint: Option<String>,
    timeout: Option<u64>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            ollama: BackendSettings {
                endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
                timeout_secs: None,
            },
            openai: BackendSettings {
                endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
                timeout_secs: None,
            },
            openai_api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and process environment.
    ///
    /// Environment variables:
    /// - `COURSE_ASSISTANT_CONFIG`: Path to the YAML config file
    /// - `COURSE_ASSISTANT_DB`: SQLite database path
    /// - `OLLAMA_URL`: Ollama endpoint
    /// - `OPENAI_BASE_URL`: OpenAI-compatible endpoint
    /// - `OPENAI_API_KEY`: OpenAI key (or the variable named by `apiKeyEnv`)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use assistant_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Database: {:?}", config.database_path);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        Self::load_with(config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration using `env` to look up environment variables.
    pub fn load_with<F>(config_file: Option<&Path>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // An explicit path must exist; the default one is optional
        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| env("COURSE_ASSISTANT_CONFIG").map(PathBuf::from));

        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            Some(path) => Some(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let mut api_key_env = DEFAULT_OPENAI_KEY_ENV.to_string();
        if let Some(path) = file {
            api_key_env = config.merge_yaml(&path)?.unwrap_or(api_key_env);
            config.config_file = Some(path);
        }

        // Environment variables override YAML config
        if let Some(db) = env("COURSE_ASSISTANT_DB") {
            config.database_path = PathBuf::from(db);
        }

        if let Some(url) = env("OLLAMA_URL") {
            config.ollama.endpoint = url;
        }

        if let Some(url) = env("OPENAI_BASE_URL") {
            config.openai.endpoint = url;
        }

        config.openai_api_key = env(&api_key_env).filter(|key| !key.trim().is_empty());

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML config file into this config.
    ///
    /// Returns the API key variable name for the cloud backend, if the file
    /// overrides it.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<Option<String>> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        if let Some(db_path) = file.database.and_then(|db| db.path) {
            self.database_path = PathBuf::from(db_path);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        let mut api_key_env = None;
        if let Some(backends) = file.backends {
            if let Some(ollama) = backends.ollama {
                merge_backend(&mut self.ollama, &ollama);
            }
            if let Some(openai) = backends.openai {
                merge_backend(&mut self.openai, &openai);
                api_key_env = openai.api_key_env;
            }
        }

        Ok(api_key_env)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config
    /// file.
    pub fn with_overrides(
        mut self,
        database_path: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(database_path) = database_path {
            self.database_path = database_path;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> AppResult<()> {
        for (name, backend) in [("ollama", &self.ollama), ("openai", &self.openai)] {
            if backend.endpoint.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Endpoint for backend '{}' cannot be empty",
                    name
                )));
            }
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path cannot be empty".to_string()));
        }

        if self.openai_api_key.is_none() {
            tracing::warn!(
                "No OpenAI API key configured; openai/* generation and relevance evaluation will degrade"
            );
        }

        Ok(())
    }
}

fn merge_backend(target: &mut BackendSettings, section: &BackendSection) {
    if let Some(ref endpoint) = section.endpoint {
        target.endpoint = endpoint.clone();
    }
    if section.timeout.is_some() {
        target.timeout_secs = section.timeout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.ollama.endpoint, DEFAULT_OLLAMA_ENDPOINT);
        assert_eq!(config.openai.endpoint, DEFAULT_OPENAI_ENDPOINT);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert!(config.openai_api_key.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_overrides() {
        let env = env_from(&[
            ("COURSE_ASSISTANT_DB", "/tmp/faq.db"),
            ("OLLAMA_URL", "http://ollama:11434"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);

        let config = AppConfig::load_with(None, env).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/faq.db"));
        assert_eq!(config.ollama.endpoint, "http://ollama:11434");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_yaml_merge_and_custom_key_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assistant.yaml");
        std::fs::write(
            &path,
            r#"
database:
  path: data/faq.db
backends:
  ollama:
    endpoint: http://gpu-box:11434
    timeout: 120
  openai:
    apiKeyEnv: MY_OPENAI_KEY
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let env = env_from(&[("MY_OPENAI_KEY", "sk-custom"), ("OPENAI_API_KEY", "sk-ignored")]);
        let config = AppConfig::load_with(Some(&path), env).unwrap();

        assert_eq!(config.database_path, PathBuf::from("data/faq.db"));
        assert_eq!(config.ollama.endpoint, "http://gpu-box:11434");
        assert_eq!(config.ollama.timeout_secs, Some(120));
        assert_eq!(config.openai.endpoint, DEFAULT_OPENAI_ENDPOINT);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-custom"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let result = AppConfig::load_with(Some(Path::new("/nonexistent/a.yaml")), env_from(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("other.db")),
            None,
            true,
            false,
        );

        assert_eq!(config.database_path, PathBuf::from("other.db"));
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut config = AppConfig::default();
        config.ollama.endpoint = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_without_api_key_is_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
