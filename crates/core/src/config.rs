//! Configuration management for kbot.
//!
//! Configuration is assembled from several sources, later ones winning:
//! - Built-in defaults
//! - A YAML config file (`--config` or `KBOT_CONFIG`)
//! - Environment variables (a `.env` file in the working directory is loaded first)
//! - Command-line flags
//!
//! Everything is resolved once at startup and handed to each component at
//! construction; nothing reads the environment after that.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variables that must be present for the bot to start.
pub const REQUIRED_ENV_VARS: [&str; 4] = [
    "TELEGRAM_BOT_TOKEN",
    "NOTION_API_KEY",
    "NOTION_DATABASE_ID",
    "OPENAI_API_KEY",
];

/// Default number of documents fetched per question.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 5;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// A secret value whose `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret for use in an outgoing request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Shape of a database property used in the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
}

impl PropertyKind {
    /// The property type name as used by the document store's filter API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
        }
    }
}

/// A database property the keyword filter matches against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProperty {
    pub name: String,
    pub kind: PropertyKind,
}

impl SearchProperty {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Property names checked, in order, when extracting a page title.
pub fn default_title_properties() -> Vec<String> {
    vec!["title".to_string(), "Name".to_string(), "Title".to_string()]
}

/// Properties OR-ed together in the keyword filter.
pub fn default_search_properties() -> Vec<SearchProperty> {
    vec![
        SearchProperty::new("title", PropertyKind::RichText),
        SearchProperty::new("Name", PropertyKind::Title),
    ]
}

/// Main bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token
    pub telegram_token: Secret,

    /// Notion integration key
    pub notion_api_key: Secret,

    /// Notion database queried for documents
    pub notion_database_id: String,

    /// OpenAI API key
    pub openai_api_key: Secret,

    /// Documents fetched per question
    pub max_search_results: usize,

    /// Chat model identifier
    pub model: String,

    /// Sampling temperature for both pipeline stages
    pub temperature: f32,

    /// OpenAI-compatible endpoint
    pub llm_base_url: String,

    /// Candidate title property names, in priority order
    pub title_properties: Vec<String>,

    /// Properties matched by the keyword filter
    pub search_properties: Vec<SearchProperty>,

    /// Directory holding prompt template overrides
    pub prompts_dir: Option<PathBuf>,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: Secret::default(),
            notion_api_key: Secret::default(),
            notion_database_id: String::new(),
            openai_api_key: Secret::default(),
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            title_properties: default_title_properties(),
            search_properties: default_search_properties(),
            prompts_dir: None,
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    knowledge: Option<KnowledgeSection>,
    prompts: Option<PromptsSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    model: Option<String>,
    temperature: Option<f32>,
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    #[serde(rename = "maxSearchResults")]
    max_search_results: Option<usize>,
    #[serde(rename = "titleProperties")]
    title_properties: Option<Vec<String>>,
    #[serde(rename = "searchProperties")]
    search_properties: Option<Vec<SearchProperty>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptsSection {
    dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

impl BotConfig {
    /// Load configuration from `.env`, an optional YAML file, and the process
    /// environment.
    ///
    /// # Example
    /// ```no_run
    /// use kbot_core::config::BotConfig;
    ///
    /// let config = BotConfig::load(None).expect("Failed to load config");
    /// println!("Database: {}", config.notion_database_id);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env file is fine; the real environment may carry everything.
        dotenvy::dotenv().ok();
        Self::from_lookup(config_file, |name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as absent. All missing required names are
    /// reported together.
    pub fn from_lookup<F>(config_file: Option<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        let config_path = config_file.or_else(|| get("KBOT_CONFIG").map(PathBuf::from));
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config.merge_yaml(&path)?;
            config.config_file = Some(path);
        }

        let missing: Vec<String> = REQUIRED_ENV_VARS
            .iter()
            .filter(|&&name| get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingConfig(missing));
        }

        config.telegram_token = Secret::new(get("TELEGRAM_BOT_TOKEN").unwrap_or_default());
        config.notion_api_key = Secret::new(get("NOTION_API_KEY").unwrap_or_default());
        config.notion_database_id = get("NOTION_DATABASE_ID").unwrap_or_default();
        config.openai_api_key = Secret::new(get("OPENAI_API_KEY").unwrap_or_default());

        if let Some(raw) = get("MAX_SEARCH_RESULTS") {
            config.max_search_results = parse_result_limit(&raw);
        }

        if let Some(model) = get("KBOT_MODEL") {
            config.model = model;
        }

        if let Some(base_url) = get("OPENAI_BASE_URL") {
            config.llm_base_url = base_url;
        }

        if let Some(dir) = get("KBOT_PROMPTS_DIR") {
            config.prompts_dir = Some(PathBuf::from(dir));
        }

        if let Some(level) = get("RUST_LOG") {
            config.log_level = Some(level);
        }

        if get("NO_COLOR").is_some() {
            config.no_color = true;
        }

        if let Some(format) = get("KBOT_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&format).ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown log format: {}. Supported: pretty, json",
                    format
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(llm) = file.llm {
            if let Some(model) = llm.model {
                self.model = model;
            }
            if let Some(temperature) = llm.temperature {
                self.temperature = temperature;
            }
            if let Some(base_url) = llm.base_url {
                self.llm_base_url = base_url;
            }
        }

        if let Some(knowledge) = file.knowledge {
            if let Some(limit) = knowledge.max_search_results {
                self.max_search_results = limit;
            }
            if let Some(titles) = knowledge.title_properties {
                self.title_properties = titles;
            }
            if let Some(search) = knowledge.search_properties {
                self.search_properties = search;
            }
        }

        if let Some(dir) = file.prompts.and_then(|p| p.dir) {
            self.prompts_dir = Some(PathBuf::from(dir));
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(format) = logging.format {
                self.log_format = format;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment and file values.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        max_results: Option<usize>,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if let Some(limit) = max_results.filter(|n| *n > 0) {
            self.max_search_results = limit;
        }

        self
    }

    /// Check value ranges that the type system does not.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_search_results == 0 {
            return Err(AppError::Config(
                "MAX_SEARCH_RESULTS must be at least 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.title_properties.is_empty() {
            return Err(AppError::Config(
                "At least one title property is required".to_string(),
            ));
        }

        if self.search_properties.is_empty() {
            return Err(AppError::Config(
                "At least one search property is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse `MAX_SEARCH_RESULTS`, falling back to the default on anything but
/// a positive integer.
fn parse_result_limit(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            tracing::warn!(
                "Ignoring MAX_SEARCH_RESULTS={:?}, using {}",
                raw,
                DEFAULT_MAX_SEARCH_RESULTS
            );
            DEFAULT_MAX_SEARCH_RESULTS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn required_env() -> HashMap<String, String> {
        REQUIRED_ENV_VARS
            .iter()
            .map(|name| (name.to_string(), format!("value-of-{}", name)))
            .collect()
    }

    fn load_from(env: &HashMap<String, String>, file: Option<PathBuf>) -> AppResult<BotConfig> {
        BotConfig::from_lookup(file, |name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_from(&required_env(), None).unwrap();
        assert_eq!(config.max_search_results, 5);
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.notion_database_id, "value-of-NOTION_DATABASE_ID");
        assert_eq!(config.telegram_token.expose(), "value-of-TELEGRAM_BOT_TOKEN");
        assert_eq!(config.title_properties, vec!["title", "Name", "Title"]);
        assert_eq!(config.search_properties.len(), 2);
    }

    #[test]
    fn test_missing_vars_are_all_reported() {
        let mut env = required_env();
        env.remove("NOTION_API_KEY");
        env.insert("OPENAI_API_KEY".to_string(), "   ".to_string());

        match load_from(&env, None) {
            Err(AppError::MissingConfig(missing)) => {
                assert_eq!(missing, vec!["NOTION_API_KEY", "OPENAI_API_KEY"]);
            }
            other => panic!("Expected MissingConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_max_search_results_override() {
        let mut env = required_env();
        env.insert("MAX_SEARCH_RESULTS".to_string(), "12".to_string());
        let config = load_from(&env, None).unwrap();
        assert_eq!(config.max_search_results, 12);
    }

    #[test]
    fn test_invalid_max_search_results_fall_back_to_default() {
        for bad in ["abc", "zero", "0", "-3"] {
            let mut env = required_env();
            env.insert("MAX_SEARCH_RESULTS".to_string(), bad.to_string());
            let config = load_from(&env, None).unwrap();
            assert_eq!(config.max_search_results, DEFAULT_MAX_SEARCH_RESULTS, "{:?}", bad);
        }
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let config = load_from(&required_env(), None).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("value-of-OPENAI_API_KEY"));
        assert!(debug.contains("Secret(****)"));
    }

    #[test]
    fn test_yaml_file_merged_and_env_wins() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kbot.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  model: gpt-4o-mini
  temperature: 0.1
knowledge:
  maxSearchResults: 3
  titleProperties: [Page, Name]
  searchProperties:
    - name: Page
      kind: title
logging:
  color: false
  format: json
"#,
        )
        .unwrap();

        let mut env = required_env();
        env.insert("KBOT_MODEL".to_string(), "gpt-4o".to_string());
        let config = load_from(&env, Some(path.clone())).unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_search_results, 3);
        assert_eq!(config.title_properties, vec!["Page", "Name"]);
        assert_eq!(
            config.search_properties,
            vec![SearchProperty::new("Page", PropertyKind::Title)]
        );
        assert!(config.no_color);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let result = load_from(&required_env(), Some(PathBuf::from("/nonexistent/kbot.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = load_from(&required_env(), None)
            .unwrap()
            .with_overrides(None, true, false, Some(8));

        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.max_search_results, 8);
    }

    #[test]
    fn test_validate_rejects_empty_title_list() {
        let config = BotConfig {
            title_properties: Vec::new(),
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
