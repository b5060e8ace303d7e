//! TOML configuration and API credentials.
//!
//! Every section is optional; an absent file behaves like an empty one.
//! The API key never lives in the file. It is read from the environment
//! variable named by `api.key_env` via [`ApiCredentials::from_env`].
//!
//! ```toml
//! [api]
//! key_env = "DATA_GO_KR_API_KEY"
//! page_size = 100
//!
//! [collect]
//! max_pages = 20
//! output = "hypertension_diabetes_drugs.csv"
//!
//! [categories]
//! hypertension = ["amlodipine", "losartan"]
//! diabetes = ["metformin", "insulin"]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::keywords::CategoryTable;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set; export the data.go.kr service key before running")]
    MissingCredential { var: String },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default = "default_dur_url")]
    pub dur_url: String,
    #[serde(default = "default_drug_info_url")]
    pub drug_info_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key_env: default_key_env(),
            dur_url: default_dur_url(),
            drug_info_url: default_drug_info_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_key_env() -> String {
    "DATA_GO_KR_API_KEY".to_string()
}
fn default_dur_url() -> String {
    "http://apis.data.go.kr/1471000/DURPrdlstInfoService/getDurPrdlstInfoList".to_string()
}
fn default_drug_info_url() -> String {
    "http://apis.data.go.kr/1471000/DrugPrdtPrmsnInfoService/getDrugPrdtPrmsnInfoList".to_string()
}
fn default_page_size() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            lookup_delay_ms: default_lookup_delay_ms(),
            fallback_limit: default_fallback_limit(),
            output: default_output(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl CollectConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }
}

fn default_max_pages() -> u32 {
    20
}
fn default_page_delay_ms() -> u64 {
    500
}
fn default_lookup_delay_ms() -> u64 {
    300
}
fn default_fallback_limit() -> usize {
    50
}
fn default_output() -> PathBuf {
    PathBuf::from("hypertension_diabetes_drugs.csv")
}
fn default_preview_rows() -> usize {
    10
}

/// Built-in keyword lists, Korean and English spellings mixed.
///
/// Short entries like `ace` and `arb` match inside unrelated words; that
/// is the established selection behavior and downstream consumers rely on it.
pub fn default_categories() -> BTreeMap<String, Vec<String>> {
    let hypertension = [
        "amlodipine",
        "amlodipin",
        "아몰디핀",
        "losartan",
        "로사르탄",
        "metoprolol",
        "메토프롤롤",
        "hydrochlorothiazide",
        "하이드로클로로티아지드",
        "hctz",
        "captopril",
        "캅토프릴",
        "valsartan",
        "발사르탄",
        "ace",
        "arb",
        "베타차단제",
        "이뇨제",
    ];
    let diabetes = [
        "metformin",
        "메트포르민",
        "glimepiride",
        "글리메피리드",
        "insulin",
        "인슐린",
        "glipizide",
        "글리피지드",
        "sitagliptin",
        "시타글립틴",
        "sulfonylurea",
        "설포닐우레아",
    ];

    let mut map = BTreeMap::new();
    map.insert(
        "hypertension".to_string(),
        hypertension.iter().map(|s| s.to_string()).collect(),
    );
    map.insert(
        "diabetes".to_string(),
        diabetes.iter().map(|s| s.to_string()).collect(),
    );
    map
}

/// Defaults for every field, including the built-in categories.
impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            collect: CollectConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// The keyword table used by the classifier.
    pub fn category_table(&self) -> CategoryTable {
        CategoryTable::from_map(&self.categories)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.page_size == 0 {
            return Err(ConfigError::Invalid("api.page_size must be >= 1".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be >= 1".into()));
        }
        if self.api.key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("api.key_env must not be empty".into()));
        }
        if self.collect.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "collect.max_pages must be >= 1".into(),
            ));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [categories] entry is required".into(),
            ));
        }
        for (name, keywords) in &self.categories {
            if keywords.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "category '{}' has no keywords",
                    name
                )));
            }
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "category '{}' contains an empty keyword",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Parse and validate a TOML config string.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Load from `path` when given, otherwise use [`Config::default`].
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(Config::default()),
    }
}

/// The data.go.kr service key.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ApiCredentials {
    /// Read the key from the process environment.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(var, |k| std::env::var(k).ok())
    }

    /// Read the key through `lookup`; empty values count as missing.
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(key) if !key.trim().is_empty() => Ok(Self {
                api_key: key.trim().to_string(),
            }),
            _ => Err(ConfigError::MissingCredential {
                var: var.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Config, ConfigError> {
        parse_config(s, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.api.page_size, 100);
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.collect.max_pages, 20);
        assert_eq!(cfg.collect.page_delay_ms, 500);
        assert_eq!(cfg.collect.lookup_delay_ms, 300);
        assert_eq!(cfg.collect.fallback_limit, 50);
        assert!(cfg.categories.contains_key("hypertension"));
        assert!(cfg.categories.contains_key("diabetes"));
    }

    #[test]
    fn test_categories_replace_builtin() {
        let cfg = parse(
            r#"
[categories]
asthma = ["Salbutamol", "budesonide"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.categories.len(), 1);
        let table = cfg.category_table();
        assert_eq!(table.names(), vec!["asthma"]);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let cfg = parse(
            r#"
[collect]
max_pages = 3
output = "out/drugs.csv"
"#,
        )
        .unwrap();
        assert_eq!(cfg.collect.max_pages, 3);
        assert_eq!(cfg.collect.output, PathBuf::from("out/drugs.csv"));
        assert_eq!(cfg.collect.fallback_limit, 50);
        assert_eq!(cfg.api.key_env, "DATA_GO_KR_API_KEY");
    }

    #[test]
    fn test_rejects_zero_pages() {
        let err = parse("[collect]\nmax_pages = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_empty_keyword() {
        let err = parse("[categories]\nx = [\"ok\", \" \"]\n").unwrap_err();
        assert!(err.to_string().contains("empty keyword"));
    }

    #[test]
    fn test_keyword_padding_survives_parse() {
        let cfg = parse("[categories]\nhypertension = [\"ace \", \" arb\"]\n").unwrap();
        let table = cfg.category_table();
        assert_eq!(table.get("hypertension").unwrap().keywords(), &["ace ", " arb"]);
    }

    #[test]
    fn test_rejects_empty_category_table() {
        let err = parse("[categories]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = parse("[api\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn test_missing_credential() {
        let err = ApiCredentials::from_lookup("DATA_GO_KR_API_KEY", |_| None).unwrap_err();
        match err {
            ConfigError::MissingCredential { var } => assert_eq!(var, "DATA_GO_KR_API_KEY"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let err = ApiCredentials::from_lookup("K", |_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let creds = ApiCredentials::from_lookup("K", |_| Some("secret-key".into())).unwrap();
        assert_eq!(creds.api_key, "secret-key");
        assert!(!format!("{:?}", creds).contains("secret-key"));
    }
}
