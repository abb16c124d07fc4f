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

//! API 类型定义模块
//!
//! 定义所有 API 相关的数据结构和类型

use serde::{Deserialize, Serialize};

use crate::booru::{Post, ProxyStatsSnapshot};

/// 图搜成功响应
///
/// `post` 键与上游图站的习惯保持一致，便于既有客户端迁移。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiImagesResponse {
    /// 帖子数量
    pub count: usize,

    /// 帖子列表
    pub post: Vec<Post>,
}

/// API 错误响应
///
/// 响应体只携带面向客户端的消息，不包含内部细节。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 错误消息
    pub error: String,
}

/// API 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealthResponse {
    /// 服务状态
    pub status: String,

    /// 版本号
    pub version: String,

    /// 已注册的来源
    pub sources: Vec<String>,
}

/// API 来源信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSourceInfo {
    /// 来源名称
    pub name: String,

    /// 分页基数
    pub base_page: u32,

    /// 是否为默认来源
    pub default: bool,
}

/// API 统计信息响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatsResponse {
    /// 总请求数
    pub total_requests: u64,

    /// 缓存命中次数
    pub cache_hits: u64,

    /// 缓存未命中次数
    pub cache_misses: u64,

    /// 缓存命中率
    pub cache_hit_rate: f64,

    /// 限流拒绝次数
    pub rate_limited: u64,

    /// 上游失败次数
    pub upstream_failures: u64,

    /// 上游超时次数
    pub timeouts: u64,
}

impl ApiStatsResponse {
    /// 从流水线统计快照创建
    pub fn from_snapshot(stats: &ProxyStatsSnapshot) -> Self {
        let total = stats.cache_hits + stats.cache_misses;
        let hit_rate = if total > 0 {
            stats.cache_hits as f64 / total as f64
        } else {
            0.0
        };

        Self {
            total_requests: stats.total_requests,
            cache_hits: stats.cache_hits,
            cache_misses: stats.cache_misses,
            cache_hit_rate: hit_rate,
            rate_limited: stats.rate_limited,
            upstream_failures: stats.upstream_failures,
            timeouts: stats.timeouts,
        }
    }
}

/// API 缓存统计响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCacheStatsResponse {
    /// 当前条目数（含尚未移除的过期条目）
    pub entries: usize,

    /// 存活时长（秒）
    pub ttl_secs: u64,
}

/// API 活跃客户端响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiActivityResponse {
    /// 活跃客户端数
    pub count: usize,

    /// 活跃客户端列表
    pub users: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_response_uses_post_key() {
        let response = ApiImagesResponse {
            count: 0,
            post: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("post").is_some());
        assert_eq!(json.get("count").unwrap(), 0);
    }

    #[test]
    fn test_error_response_shape() {
        let response = ApiErrorResponse {
            error: "Rate limit exceeded, try again later".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"error":"Rate limit exceeded, try again later"}"#
        );
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let snapshot = ProxyStatsSnapshot {
            total_requests: 100,
            cache_hits: 60,
            cache_misses: 40,
            rate_limited: 3,
            upstream_failures: 2,
            timeouts: 1,
        };
        let stats = ApiStatsResponse::from_snapshot(&snapshot);
        assert_eq!(stats.cache_hit_rate, 0.6);

        let empty = ProxyStatsSnapshot {
            total_requests: 0,
            cache_hits: 0,
            cache_misses: 0,
            rate_limited: 0,
            upstream_failures: 0,
            timeouts: 0,
        };
        assert_eq!(ApiStatsResponse::from_snapshot(&empty).cache_hit_rate, 0.0);
    }
}
