use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".gh-version-compare.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .gh-version-compare.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub compare: CompareConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. Filled from the flag, local store or GITHUB_TOKEN
    /// when the file does not set one.
    pub token: Option<String>,
    /// Override for the API root (GitHub Enterprise, tests)
    pub api_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareConfig {
    #[serde(default)]
    pub strategy: CompareStrategy,
}

/// How the two directions of a comparison are requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareStrategy {
    /// Ask for the reverse direction only after an empty first answer
    #[default]
    Sequential,
    /// Ask for both directions at once and keep the one the sequential
    /// strategy would have kept
    Parallel,
}

impl Config {
    /// Load configuration from .gh-version-compare.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Settle the token to use, in order of precedence:
    /// command-line flag, config file, local store, GITHUB_TOKEN.
    pub fn resolve_token(&mut self, flag: Option<String>, stored: Option<String>) {
        let env = std::env::var("GITHUB_TOKEN").ok();
        self.resolve_token_from(flag, stored, env);
    }

    fn resolve_token_from(
        &mut self,
        flag: Option<String>,
        stored: Option<String>,
        env: Option<String>,
    ) {
        let non_empty = |t: &Option<String>| t.as_deref().is_some_and(|t| !t.is_empty());
        let token = [flag, self.github.token.take(), stored, env]
            .into_iter()
            .find(non_empty)
            .flatten();
        self.github.token = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert!(config.github.api_url.is_none());
        assert_eq!(config.compare.strategy, CompareStrategy::Sequential);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
api_url = "https://ghe.example.com/api/v3"
user_agent = "release-notes-bot"

[compare]
strategy = "parallel"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.github.api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(config.github.user_agent.as_deref(), Some("release-notes-bot"));
        assert_eq!(config.compare.strategy, CompareStrategy::Parallel);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[compare]\nstrategy = \"eager\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[github]\ntoken = \"from-file\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = Config::load_from(Path::new("/nonexistent/gh-version-compare.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_token_precedence() {
        let mut config = Config::default();
        config.github.token = Some("file".to_string());
        config.resolve_token_from(
            Some("flag".to_string()),
            Some("stored".to_string()),
            Some("env".to_string()),
        );
        assert_eq!(config.github.token.as_deref(), Some("flag"));

        let mut config = Config::default();
        config.github.token = Some("file".to_string());
        config.resolve_token_from(None, Some("stored".to_string()), Some("env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("file"));

        let mut config = Config::default();
        config.resolve_token_from(None, Some("stored".to_string()), Some("env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("stored"));

        let mut config = Config::default();
        config.resolve_token_from(None, None, Some("env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("env"));
    }

    #[test]
    fn test_empty_tokens_are_skipped() {
        let mut config = Config::default();
        config.resolve_token_from(Some(String::new()), None, Some("env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("env"));

        let mut config = Config::default();
        config.resolve_token_from(None, None, None);
        assert!(config.github.token.is_none());
    }
}
