// Copyright 2025 nostalgiatan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! 配置模块
//!
//! 提供 TOML 配置文件加载与校验；所有段落都有可用的默认值

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::booru::{BooruConfig, CacheConfig, FetchConfig, RateLimitConfig};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,

    /// 监听端口
    pub port: u16,

    /// CORS 允许的源
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// 管理接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// 允许访问管理接口的客户端地址
    pub allowed_ips: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            allowed_ips: vec!["127.0.0.1".to_string(), "::1".to_string()],
        }
    }
}

impl AdminConfig {
    /// 判断某客户端是否允许访问管理接口
    pub fn is_allowed(&self, client_key: &str) -> bool {
        self.allowed_ips.iter().any(|ip| ip == client_key)
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,

    /// 管理接口配置
    pub admin: AdminConfig,

    /// 速率限制配置
    pub rate_limit: RateLimitConfig,

    /// 缓存配置
    pub cache: CacheConfig,

    /// 上游抓取配置
    pub upstream: FetchConfig,
}

impl AppConfig {
    /// 从 TOML 文件加载配置
    ///
    /// # Arguments
    ///
    /// * `path` - 配置文件路径
    ///
    /// # Returns
    ///
    /// 返回配置或错误描述
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&raw).map_err(|e| format!("invalid config file: {}", e))
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must not be 0".to_string());
        }
        if self.rate_limit.enabled && self.rate_limit.window_secs == 0 {
            return Err("rate_limit.window_secs must be positive".to_string());
        }
        if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
            return Err("rate_limit.max_requests must be positive".to_string());
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err("cache.ttl_secs must be positive".to_string());
        }
        if self.upstream.timeout_secs == 0 {
            return Err("upstream.timeout_secs must be positive".to_string());
        }
        Ok(())
    }

    /// 组装流水线配置
    pub fn booru_config(&self) -> BooruConfig {
        BooruConfig {
            rate_limit: self.rate_limit.clone(),
            cache: self.cache.clone(),
            upstream: self.upstream.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.max_requests, 30);
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.upstream.timeout_secs, 8);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[rate_limit]\nmax_requests = 5\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.cache.ttl_secs, 120);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.rate_limit.window_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.upstream.timeout_secs = 0;
        assert!(config.validate().is_err());

        // 关闭限流后窗口参数不再校验
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.window_secs = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_admin_allow_list() {
        let admin = AdminConfig::default();
        assert!(admin.is_allowed("127.0.0.1"));
        assert!(!admin.is_allowed("190.80.34.73"));
    }
}
