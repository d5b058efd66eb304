use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// 反代服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// 是否允许局域网访问
    /// - false: 仅本机访问 127.0.0.1（默认）
    /// - true: 允许局域网访问 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// TMDB API key, injected into every upstream call as `api_key`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upstream API root, the requested sub-path is appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `language` default parameter
    #[serde(default = "default_language")]
    pub language: String,

    /// Value of the `include_adult` default parameter
    #[serde(default)]
    pub include_adult: bool,

    /// `s-maxage` advertised on successful responses
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_secs: u64,

    /// Upstream request timeout (seconds). `None` keeps the HTTP client default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// 上游代理配置
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,

    #[serde(default)]
    pub cors: CorsConfig,
}

/// 上游代理配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    /// 是否启用
    pub enabled: bool,
    /// 代理地址 (http://, https://, socks5://)
    pub url: String,
}

/// Browser origins allowed to call the proxy. Empty means any origin.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: default_port(),
            api_key: None,
            base_url: default_base_url(),
            language: default_language(),
            include_adult: false,
            cache_max_age_secs: default_cache_max_age(),
            request_timeout_secs: None,
            upstream_proxy: UpstreamProxyConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_cache_max_age() -> u64 {
    3600
}

impl ProxyConfig {
    /// 获取实际的监听地址
    /// - allow_lan_access = false: 返回 "127.0.0.1"（默认）
    /// - allow_lan_access = true: 返回 "0.0.0.0"（允许局域网访问）
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }

    /// API key with surrounding whitespace removed, `None` when blank
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// `Cache-Control` value sent with successful responses
    pub fn cache_control_value(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate",
            self.cache_max_age_secs
        )
    }
}
