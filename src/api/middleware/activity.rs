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

//! 活跃度跟踪中间件
//!
//! 按客户端键记录最近一次活动时间，供管理接口统计活跃客户端。
//! 过期条目在读取时清理。

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

/// 活跃判定窗口
const ACTIVITY_WINDOW: Duration = Duration::from_secs(10 * 60);

/// 活跃度状态
pub struct ActivityState {
    /// 客户端最近活动时间
    seen: DashMap<String, Instant>,
    /// 活跃判定窗口
    window: Duration,
}

impl ActivityState {
    /// 创建新的活跃度状态
    pub fn new() -> Self {
        Self::with_window(ACTIVITY_WINDOW)
    }

    /// 指定窗口创建（测试用）
    pub fn with_window(window: Duration) -> Self {
        Self {
            seen: DashMap::new(),
            window,
        }
    }

    /// 记录一次客户端活动
    pub fn touch(&self, client_key: &str) {
        self.touch_at(client_key, Instant::now());
    }

    /// 以注入的时间点记录（测试用）
    pub fn touch_at(&self, client_key: &str, now: Instant) {
        self.seen.insert(client_key.to_string(), now);
    }

    /// 清理过期条目并返回当前活跃客户端
    pub fn active_clients(&self) -> Vec<String> {
        self.active_clients_at(Instant::now())
    }

    /// 以注入的时间点统计（测试用）
    pub fn active_clients_at(&self, now: Instant) -> Vec<String> {
        self.seen
            .retain(|_, last_seen| now.duration_since(*last_seen) <= self.window);
        self.seen.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new()
    }
}

/// 活跃度跟踪中间件
pub async fn activity_middleware(
    State(state): State<Arc<ActivityState>>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client_key = extract_client_key(req.headers(), peer);
    state.touch(&client_key);

    next.run(req).await
}

/// 提取客户端键
///
/// 依次尝试 X-Forwarded-For 首项、X-Real-IP，最后回退到套接字地址。
/// 返回值只作为不透明字符串使用。
pub fn extract_client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first) = forwarded_str.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            let ip_str = ip_str.trim();
            if !ip_str.is_empty() {
                return ip_str.to_string();
            }
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
