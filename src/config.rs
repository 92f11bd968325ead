use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub extraction: ExtractionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// 超过该秒数的语句以 warn 级别记录
    pub slow_statement_secs: u64,
}

/// 票据识别服务
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
}

// api_key 不输出到日志
impl std::fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5001,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/receipts".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 5,
                slow_statement_secs: 5,
            },
            extraction: ExtractionConfig {
                endpoint: String::new(),
                api_key: String::new(),
                api_version: "2023-07-31".to_string(),
                timeout_secs: 60,
                poll_interval_ms: 1000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> receipts.toml (可选) -> APP__* 环境变量 -> 常用环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("database.acquire_timeout_secs", defaults.database.acquire_timeout_secs)?
            .set_default("database.slow_statement_secs", defaults.database.slow_statement_secs)?
            .set_default("extraction.endpoint", defaults.extraction.endpoint)?
            .set_default("extraction.api_key", defaults.extraction.api_key)?
            .set_default("extraction.api_version", defaults.extraction.api_version)?
            .set_default("extraction.timeout_secs", defaults.extraction.timeout_secs)?
            .set_default("extraction.poll_interval_ms", defaults.extraction.poll_interval_ms)?
            .set_default("storage.backend", "postgres")?
            .add_source(File::with_name("receipts").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("extraction.endpoint", std::env::var("AZURE_ENDPOINT").ok())?
            .set_override_option("extraction.api_key", std::env::var("AZURE_API_KEY").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 识别服务地址和密钥必须配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.endpoint.trim().is_empty() || self.extraction.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "Missing required extraction settings (AZURE_ENDPOINT / AZURE_API_KEY)".to_string(),
            ));
        }
        if self.extraction.timeout_secs == 0 {
            return Err(ConfigError::Message("extraction.timeout_secs must be positive".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message("database.max_connections must be positive".to_string()));
        }
        Ok(())
    }
}
