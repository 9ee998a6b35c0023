use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    /// Credential for the Graphon knowledge-graph API. Optional so the server can
    /// still start (degraded) without it.
    #[serde(default)]
    pub graphon_api_key: Option<String>,
    #[serde(default = "default_graphon_base_url")]
    pub graphon_base_url: String,
    #[serde(default = "default_graphon_poll_interval_ms")]
    pub graphon_poll_interval_ms: u64,
    #[serde(default = "default_graphon_request_timeout_secs")]
    pub graphon_request_timeout_secs: u64,
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    /// Parent directory for per-request staging directories. Defaults to the
    /// system temp dir.
    #[serde(default)]
    pub staging_dir: Option<String>,
    #[serde(default = "default_group_name_prefix")]
    pub group_name_prefix: String,
    #[serde(default = "default_ingest_max_body_bytes")]
    pub ingest_max_body_bytes: usize,
    #[serde(default = "default_ingest_max_files")]
    pub ingest_max_files: usize,
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graphon_api_key: None,
            graphon_base_url: default_graphon_base_url(),
            graphon_poll_interval_ms: default_graphon_poll_interval_ms(),
            graphon_request_timeout_secs: default_graphon_request_timeout_secs(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            cors_allowed_origins: default_cors_allowed_origins(),
            staging_dir: None,
            group_name_prefix: default_group_name_prefix(),
            ingest_max_body_bytes: default_ingest_max_body_bytes(),
            ingest_max_files: default_ingest_max_files(),
            search_base_url: default_search_base_url(),
            search_timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// The API key, if one is set and not blank.
    pub fn graphon_api_key(&self) -> Option<&str> {
        self.graphon_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn default_graphon_base_url() -> String {
    "https://api.graphon.ai/v1".to_string()
}

fn default_graphon_poll_interval_ms() -> u64 {
    2_000
}

fn default_graphon_request_timeout_secs() -> u64 {
    120
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_cors_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_group_name_prefix() -> String {
    "knowledge_base".to_string()
}

fn default_ingest_max_body_bytes() -> usize {
    512 * 1024 * 1024
}

fn default_ingest_max_files() -> usize {
    50
}

fn default_search_base_url() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

fn default_search_timeout_secs() -> u64 {
    10
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::default()
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("cors_allowed_origins"),
        )
        .build()?;

    config.try_deserialize()
}
