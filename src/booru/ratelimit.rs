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

//! 固定窗口速率限制
//!
//! 按客户端键统计固定时间窗口内的请求次数，超限则拒绝。
//! 计数不跨进程重启保留：防护目标是短时突发，不是长期滥用。

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// 速率限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// 窗口长度（秒）
    pub window_secs: u64,

    /// 单窗口内允许的最大请求数
    pub max_requests: u32,

    /// 是否启用
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 30,
            enabled: true,
        }
    }
}

/// 单个客户端的窗口记录
#[derive(Debug, Clone)]
struct RateRecord {
    /// 当前窗口内的请求计数
    count: u32,
    /// 窗口起点
    window_start: Instant,
}

/// 固定窗口限流器
///
/// 客户端键由调用方派生（转发头或套接字地址），这里只作为不透明字符串
/// 使用。条目按键惰性创建，窗口过期后在下一次判定时重置。
pub struct RateLimiter {
    /// 客户端窗口记录
    records: DashMap<String, RateRecord>,
    /// 窗口长度
    window: Duration,
    /// 单窗口最大请求数
    max_requests: u32,
    /// 是否启用
    enabled: bool,
}

impl RateLimiter {
    /// 创建新的限流器
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            records: DashMap::new(),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            enabled: config.enabled,
        }
    }

    /// 判定某客户端是否放行
    pub fn admit(&self, client_key: &str) -> bool {
        self.admit_at(client_key, Instant::now())
    }

    /// 以注入的时间点判定（测试用）
    pub fn admit_at(&self, client_key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        let mut record = self
            .records
            .entry(client_key.to_string())
            .or_insert_with(|| RateRecord {
                count: 0,
                window_start: now,
            });

        // 窗口过期后计数重置为 1
        if now.duration_since(record.window_start) > self.window {
            record.count = 1;
            record.window_start = now;
            return true;
        }

        record.count += 1;
        record.count <= self.max_requests
    }

    /// 当前跟踪的客户端数
    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }
}
