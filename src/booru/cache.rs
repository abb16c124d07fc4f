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

//! 响应缓存
//!
//! 以规范查询为键、带 TTL 的进程内缓存。过期条目按惰性方式处理：
//! TTL 过后条目视同不存在，物理移除发生在下一次访问或显式清理时。

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::types::ImageResult;

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 存活时长（秒）
    pub ttl_secs: u64,

    /// 是否启用
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 120,
            enabled: true,
        }
    }
}

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry {
    /// 缓存的规范结果
    value: ImageResult,
    /// 写入时间
    stored_at: Instant,
}

/// TTL 响应缓存
pub struct ResponseCache {
    /// 条目映射
    entries: DashMap<String, CacheEntry>,
    /// 存活时长
    ttl: Duration,
    /// 是否启用
    enabled: bool,
}

impl ResponseCache {
    /// 创建新的响应缓存
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(config.ttl_secs),
            enabled: config.enabled,
        }
    }

    /// 查询缓存
    ///
    /// TTL 已过的条目视同不存在，并顺手物理移除。
    pub fn get(&self, key: &str) -> Option<ImageResult> {
        self.get_at(key, Instant::now())
    }

    /// 以注入的时间点查询（测试用）
    pub fn get_at(&self, key: &str, now: Instant) -> Option<ImageResult> {
        if !self.enabled {
            return None;
        }

        let entry = self.entries.get(key)?;
        if now.duration_since(entry.stored_at) > self.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// 写入缓存
    ///
    /// 同键条目被覆盖，计时器重置。
    pub fn put(&self, key: &str, value: ImageResult) {
        self.put_at(key, value, Instant::now());
    }

    /// 以注入的时间点写入（测试用）
    pub fn put_at(&self, key: &str, value: ImageResult, now: Instant) {
        if !self.enabled {
            return;
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    /// 移除所有已过期条目，返回移除数量
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// 以注入的时间点清理（测试用）
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) <= self.ttl);
        before.saturating_sub(self.entries.len())
    }

    /// 清空缓存，返回清除数量
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// 当前物理条目数（含尚未移除的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 配置的存活时长
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booru::types::Post;

    fn sample_result() -> ImageResult {
        ImageResult {
            posts: vec![Post {
                id: Some(1),
                tags: "cat".to_string(),
                file_url: "http://x/f.jpg".to_string(),
                ..Default::default()
            }],
        }
    }

    fn cache(ttl_secs: u64) -> ResponseCache {
        ResponseCache::new(CacheConfig {
            ttl_secs,
            enabled: true,
        })
    }

    #[test]
    fn test_put_then_get_returns_value() {
        let cache = cache(60);
        cache.put("k", sample_result());
        assert_eq!(cache.get("k"), Some(sample_result()));
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let cache = cache(60);
        let now = Instant::now();
        cache.put_at("k", sample_result(), now);

        // TTL 边界之内仍然可见
        assert!(cache.get_at("k", now + Duration::from_secs(60)).is_some());

        // TTL 过后视同不存在，并被顺手移除
        assert!(cache.get_at("k", now + Duration::from_secs(61)).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_overwrites_and_resets_timer() {
        let cache = cache(60);
        let now = Instant::now();
        cache.put_at("k", ImageResult::default(), now);
        cache.put_at("k", sample_result(), now + Duration::from_secs(50));

        // 以第二次写入时间计算 TTL
        let later = now + Duration::from_secs(100);
        assert_eq!(cache.get_at("k", later), Some(sample_result()));
    }

    #[test]
    fn test_purge_expired_removes_only_stale_entries() {
        let cache = cache(60);
        let now = Instant::now();
        cache.put_at("old", sample_result(), now);
        cache.put_at("fresh", sample_result(), now + Duration::from_secs(100));

        let removed = cache.purge_expired_at(now + Duration::from_secs(100));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at("fresh", now + Duration::from_secs(100)).is_some());
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = cache(60);
        cache.put("a", sample_result());
        cache.put("b", sample_result());
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = ResponseCache::new(CacheConfig {
            ttl_secs: 60,
            enabled: false,
        });
        cache.put("k", sample_result());
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }
}
