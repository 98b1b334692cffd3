use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 托管数据库（Supabase）配置 ---
    pub supabase_url: String,
    pub supabase_anon_key: String,
    // --- 评分服务配置 ---
    pub scorer_api_url: String,
    /// 屏幕逻辑宽度（取景框换算用）
    pub screen_width: f64,
    /// 屏幕逻辑高度
    pub screen_height: f64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 会话缓存文件，未设置时只保存在内存
    pub session_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            scorer_api_url: "http://localhost:8000".to_string(),
            screen_width: 390.0,
            screen_height: 844.0,
            request_timeout_secs: 30,
            session_file: None,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    scorer_api_url: Option<String>,
    screen_width: Option<f64>,
    screen_height: Option<f64>,
    request_timeout_secs: Option<u64>,
    session_file: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load(toml_path: Option<&Path>) -> Result<Self> {
        let base = match toml_path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.overlay_env();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺失字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            supabase_url: file.supabase_url.unwrap_or(default.supabase_url),
            supabase_anon_key: file.supabase_anon_key.unwrap_or(default.supabase_anon_key),
            scorer_api_url: file.scorer_api_url.unwrap_or(default.scorer_api_url),
            screen_width: file.screen_width.unwrap_or(default.screen_width),
            screen_height: file.screen_height.unwrap_or(default.screen_height),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            session_file: file.session_file.or(default.session_file),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    fn overlay_env(self) -> Self {
        Self {
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or(self.supabase_url),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or(self.supabase_anon_key),
            scorer_api_url: std::env::var("SCORER_API_URL")
                .or_else(|_| std::env::var("EXPO_PUBLIC_API_URL"))
                .unwrap_or(self.scorer_api_url),
            screen_width: std::env::var("SCREEN_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(self.screen_width),
            screen_height: std::env::var("SCREEN_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.screen_height),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            session_file: std::env::var("SESSION_FILE").ok().or(self.session_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, url) in [
            ("supabase_url", &self.supabase_url),
            ("scorer_api_url", &self.scorer_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{}' 不是 http(s) 地址", url),
                });
            }
        }
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "screen_width/screen_height".to_string(),
                reason: "屏幕尺寸必须为正数".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_defaults() {
        let config = Config::from_toml_str(
            r#"
            scorer_api_url = "https://scorer.example.com"
            screen_width = 414.0
            "#,
        )
        .unwrap();

        assert_eq!(config.scorer_api_url, "https://scorer.example.com");
        assert_eq!(config.screen_width, 414.0);
        assert_eq!(config.screen_height, 844.0);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            scorer_api_url: "process.env.EXPO_PUBLIC_API_URL".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "scorer_api_url"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_screen() {
        let config = Config {
            screen_height: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
