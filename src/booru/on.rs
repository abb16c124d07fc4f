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

//! 图搜外部接口模块
//!
//! 将规范化、限流、缓存、适配与上游抓取组合为完整的请求流水线，
//! 供 HTTP 层调用。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::cache::{CacheConfig, ResponseCache};
use super::fetch::{FetchConfig, UpstreamFetcher};
use super::query::{ImageQuery, RawImageQuery};
use super::ratelimit::{RateLimitConfig, RateLimiter};
use super::sources::SourceRegistry;
use super::types::ImageResult;
use crate::error::{ProxyError, Result};

/// 流水线配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BooruConfig {
    /// 速率限制配置
    pub rate_limit: RateLimitConfig,
    /// 缓存配置
    pub cache: CacheConfig,
    /// 上游抓取配置
    pub upstream: FetchConfig,
}

/// 流水线统计
#[derive(Debug, Default)]
pub struct ProxyStats {
    /// 总请求数
    pub total_requests: AtomicU64,
    /// 缓存命中数
    pub cache_hits: AtomicU64,
    /// 缓存未命中数
    pub cache_misses: AtomicU64,
    /// 限流拒绝数
    pub rate_limited: AtomicU64,
    /// 上游失败数（拒绝、解析失败、传输失败）
    pub upstream_failures: AtomicU64,
    /// 上游超时数
    pub timeouts: AtomicU64,
}

/// 统计快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyStatsSnapshot {
    /// 总请求数
    pub total_requests: u64,
    /// 缓存命中数
    pub cache_hits: u64,
    /// 缓存未命中数
    pub cache_misses: u64,
    /// 限流拒绝数
    pub rate_limited: u64,
    /// 上游失败数
    pub upstream_failures: u64,
    /// 上游超时数
    pub timeouts: u64,
}

/// 一次图搜请求的结果
#[derive(Debug, Clone)]
pub struct ImagesResponse {
    /// 规范化后的查询
    pub query: ImageQuery,
    /// 规范结果
    pub result: ImageResult,
    /// 是否命中缓存
    pub cached: bool,
    /// 处理耗时（毫秒）
    pub elapsed_ms: u64,
}

/// 图搜接口
///
/// 统一的请求编排入口：限流 → 规范化 → 查缓存 → 未命中则解析适配器、
/// 构造 URL、限时抓取上游、映射并回填缓存。限流与缓存的底层映射都是
/// 并发安全结构，整条流水线没有全局锁；唯一的挂起点是上游调用。
pub struct BooruInterface {
    /// 限流器
    limiter: RateLimiter,
    /// 响应缓存
    cache: ResponseCache,
    /// 适配器注册表
    registry: SourceRegistry,
    /// 上游抓取器
    fetcher: UpstreamFetcher,
    /// 统计信息
    stats: Arc<ProxyStats>,
}

impl BooruInterface {
    /// 创建新的图搜接口
    ///
    /// # Arguments
    ///
    /// * `config` - 流水线配置
    ///
    /// # Returns
    ///
    /// 返回图搜接口实例或错误
    pub fn new(config: BooruConfig) -> Result<Self> {
        Self::with_registry(config, SourceRegistry::new())
    }

    /// 使用自定义注册表创建（测试或扩展用）
    pub fn with_registry(config: BooruConfig, registry: SourceRegistry) -> Result<Self> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit),
            cache: ResponseCache::new(config.cache),
            registry,
            fetcher: UpstreamFetcher::new(config.upstream)?,
            stats: Arc::new(ProxyStats::default()),
        })
    }

    /// 处理一次图搜请求
    ///
    /// # Arguments
    ///
    /// * `client_key` - 调用方派生的客户端键（不透明字符串）
    /// * `raw` - 原始查询参数
    ///
    /// # Returns
    ///
    /// 返回规范结果或分类后的错误；请求以单一响应终止，不做重试。
    pub async fn query(&self, client_key: &str, raw: &RawImageQuery) -> Result<ImagesResponse> {
        let started = Instant::now();
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);

        if !self.limiter.admit(client_key) {
            self.stats.rate_limited.fetch_add(1, Ordering::Relaxed);
            return Err(ProxyError::RateLimited);
        }

        // 规范化永不失败
        let query = ImageQuery::normalize(raw);
        let key = query.cache_key();

        if let Some(result) = self.cache.get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(ImagesResponse {
                query,
                result,
                cached: true,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }
        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        let source = self.registry.resolve(query.source)?;
        let url = source.build_url(&query)?;

        let body = self
            .fetcher
            .fetch(&url)
            .await
            .inspect_err(|err| self.record_upstream_failure(err))?;

        let posts = source
            .parse_posts(&body)
            .inspect_err(|err| self.record_upstream_failure(err))?;

        let result = ImageResult { posts };
        self.cache.put(&key, result.clone());

        tracing::debug!(
            source = source.name(),
            posts = result.posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upstream response mapped"
        );

        Ok(ImagesResponse {
            query,
            result,
            cached: false,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// 按错误分类记录日志与统计
    fn record_upstream_failure(&self, err: &ProxyError) {
        match err {
            ProxyError::UpstreamTimeout { url, elapsed_ms } => {
                self.stats.timeouts.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(url = %url, elapsed_ms, "upstream request timed out");
            }
            ProxyError::UpstreamRejected { status, excerpt } => {
                self.stats.upstream_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(status, excerpt = %excerpt, "upstream rejected request");
            }
            ProxyError::UpstreamParse { excerpt } => {
                self.stats.upstream_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(excerpt = %excerpt, "failed to parse upstream response");
            }
            ProxyError::Network(e) => {
                self.stats.upstream_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(error = %e, "upstream transport failure");
            }
            ProxyError::RateLimited | ProxyError::Internal(_) => {}
        }
    }

    /// 统计快照
    pub fn stats(&self) -> ProxyStatsSnapshot {
        ProxyStatsSnapshot {
            total_requests: self.stats.total_requests.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
            rate_limited: self.stats.rate_limited.load(Ordering::Relaxed),
            upstream_failures: self.stats.upstream_failures.load(Ordering::Relaxed),
            timeouts: self.stats.timeouts.load(Ordering::Relaxed),
        }
    }

    /// 已注册的来源名称
    pub fn list_sources(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// 适配器注册表
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// 响应缓存（维护接口用）
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}
