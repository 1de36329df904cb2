//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，环境变量可覆盖关键项

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::services::analytics::{MAX_COMPARE, TABLE_PAGE_SIZE};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
}

/// 远端数据存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// 项目地址，如 https://xxxx.supabase.co
    #[serde(default)]
    pub url: String,
    /// 匿名访问密钥
    #[serde(default)]
    pub anon_key: String,
    /// 分页大小
    #[serde(default = "default_fetch_page_size")]
    pub page_size: usize,
    /// 单次拉取的最大页数
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 看板配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// 表格每页条数
    #[serde(default = "default_table_page_size")]
    pub table_page_size: usize,
    /// 最多同时对比的标的数
    #[serde(default = "default_max_compare")]
    pub max_compare: usize,
    /// 概览中展示的涨幅榜条数
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// 对齐结果按日期标签字符串排序（兼容旧版）
    #[serde(default)]
    pub legacy_date_sort: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 数据存储配置
    #[serde(default)]
    pub supabase: SupabaseConfig,
    /// 看板配置
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_fetch_page_size() -> usize { 1000 }
fn default_max_pages() -> usize { 10 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_table_page_size() -> usize { TABLE_PAGE_SIZE }
fn default_max_compare() -> usize { MAX_COMPARE }
fn default_top_n() -> usize { 10 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            page_size: default_fetch_page_size(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            table_page_size: default_table_page_size(),
            max_compare: default_max_compare(),
            top_n: default_top_n(),
            legacy_date_sort: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量
    ///
    /// 此时日志尚未初始化，加载过程记录在返回的消息中
    pub fn load() -> (Self, Vec<String>) {
        let config_paths = ["config.json", "config/config.json"];
        let mut notes = Vec::new();
        let mut loaded = None;

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        notes.push(format!("从 {} 加载配置成功", path));
                        loaded = Some(config);
                        break;
                    }
                    Err(e) => {
                        notes.push(format!("加载配置文件 {} 失败: {}", path, e));
                    }
                }
            }
        }

        let mut config = loaded.unwrap_or_else(|| {
            notes.push("使用默认配置".to_string());
            Self::default()
        });
        config.apply_env(|key| env::var(key).ok());
        (config, notes)
    }

    /// 用环境变量覆盖配置
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.supabase.url = url;
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = key;
        }
        if let Some(key) = lookup("API_KEY") {
            self.api.api_key = key;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.supabase.page_size, 1000);
        assert_eq!(config.supabase.max_pages, 10);
        assert_eq!(config.dashboard.table_page_size, 15);
        assert_eq!(config.dashboard.max_compare, 5);
        assert!(!config.dashboard.legacy_date_sort);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"supabase": {"url": "https://demo.supabase.co"}}"#).unwrap();
        assert_eq!(config.supabase.url, "https://demo.supabase.co");
        assert_eq!(config.supabase.timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SUPABASE_URL", "https://env.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("PORT", "9090"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.supabase.url, "https://env.supabase.co");
        assert_eq!(config.supabase.anon_key, "anon");
        assert_eq!(config.server.port, 9090);
        assert!(config.api.api_key.is_empty());
    }
}
