//! 配置管理模块
//!
//! 配置文件为 YAML，默认位于 `~/.promptdeck/config.yaml`。
//! 所有字段都有默认值，加载后再应用环境变量覆盖：
//!
//! - `PROMPTDECK_SUPABASE_URL`
//! - `PROMPTDECK_SUPABASE_ANON_KEY`
//! - `PROMPTDECK_PROXY`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = ".promptdeck";
const CONFIG_FILE: &str = "config.yaml";

pub const ENV_SUPABASE_URL: &str = "PROMPTDECK_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "PROMPTDECK_SUPABASE_ANON_KEY";
pub const ENV_PROXY: &str = "PROMPTDECK_PROXY";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("缺少配置项: {0}")]
    Missing(&'static str),

    #[error("无效的 Supabase URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP 客户端配置错误: {0}")]
    Http(String),
}

/// 远端项目配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    /// 项目地址，如 `https://xyz.supabase.co`
    pub url: String,
    /// 匿名 key（公开 key，不是 service role key）
    pub anon_key: String,
}

/// HTTP 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 代理 URL（socks5 / http / https）
    pub proxy: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 是否写日志文件
    pub enabled: bool,
    /// 默认过滤级别（`RUST_LOG` 优先）
    pub level: String,
    /// 日志文件路径，默认 `~/.promptdeck/logs/promptdeck.log`
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    /// 会话与日志所在目录，默认 `~/.promptdeck`
    pub data_dir: Option<String>,
}

impl Config {
    /// Loads the config file at `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults; environment overrides are applied
    /// in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            Self::from_yaml(&content)?
        } else {
            tracing::debug!("[配置] 配置文件不存在，使用默认配置: {:?}", path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(ENV_SUPABASE_URL) {
            self.supabase.url = url;
        }
        if let Some(key) = non_blank(ENV_SUPABASE_ANON_KEY) {
            self.supabase.anon_key = key;
        }
        if let Some(proxy) = non_blank(ENV_PROXY) {
            self.http.proxy = Some(proxy);
        }
    }

    /// Checks that the remote project is configured and returns its base URL.
    pub fn supabase_base_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self.supabase.url.trim();
        if raw.is_empty() {
            return Err(ConfigError::Missing("supabase.url"));
        }
        if self.supabase.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("supabase.anon_key"));
        }

        let url = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        Ok(url)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_data_dir)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.logging
            .file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| self.data_dir().join("logs").join("promptdeck.log"))
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    default_data_dir().join(CONFIG_FILE)
}

/// 展开路径开头的 `~`
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.connect_timeout_secs, 30);
        assert_eq!(config.http.request_timeout_secs, 60);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
supabase:
  url: https://demo.supabase.co
  anon_key: anon
http:
  proxy: socks5://127.0.0.1:1080
"#,
        )
        .unwrap();
        assert_eq!(config.supabase.url, "https://demo.supabase.co");
        assert_eq!(config.http.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(config.http.request_timeout_secs, 60);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("supabase: [unclosed"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  enabled: true\n  level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.logging.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.yaml"))).unwrap();
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_SUPABASE_URL, "https://env.supabase.co"),
            (ENV_SUPABASE_ANON_KEY, "env-key"),
            (ENV_PROXY, "   "),
        ]);
        let mut config = Config::default();
        config.http.proxy = Some("http://file.proxy:8080".to_string());
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.supabase.url, "https://env.supabase.co");
        assert_eq!(config.supabase.anon_key, "env-key");
        // 空白值不覆盖
        assert_eq!(config.http.proxy.as_deref(), Some("http://file.proxy:8080"));
    }

    #[test]
    fn test_supabase_base_url_validation() {
        let mut config = Config::default();
        assert!(matches!(
            config.supabase_base_url(),
            Err(ConfigError::Missing("supabase.url"))
        ));

        config.supabase.url = "https://demo.supabase.co".to_string();
        assert!(matches!(
            config.supabase_base_url(),
            Err(ConfigError::Missing("supabase.anon_key"))
        ));

        config.supabase.anon_key = "anon".to_string();
        assert_eq!(
            config.supabase_base_url().unwrap().as_str(),
            "https://demo.supabase.co/"
        );

        config.supabase.url = "ftp://demo".to_string();
        assert!(matches!(
            config.supabase_base_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = Config {
            data_dir: Some("/tmp/promptdeck-test".to_string()),
            ..Config::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/promptdeck-test"));
        assert_eq!(
            config.log_file_path(),
            PathBuf::from("/tmp/promptdeck-test/logs/promptdeck.log")
        );
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
    }
}
