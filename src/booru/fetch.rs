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

//! 上游抓取器
//!
//! 在限定时限内发起单次上游 GET 请求。超时、上游拒绝与传输失败
//! 被区分为不同的错误分类；不做任何重试。

use std::time::{Duration, Instant};

use tokio::time::timeout;
use url::Url;

use crate::error::{excerpt, ProxyError, Result};

/// 默认 User-Agent
const DEFAULT_USER_AGENT: &str = concat!("SeeMoe/", env!("CARGO_PKG_VERSION"));

/// 上游抓取配置
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// 单次请求的时限（秒）
    pub timeout_secs: u64,

    /// 请求携带的 User-Agent
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// 上游抓取器
///
/// 复用同一个 HTTP 客户端；每次请求独立计时，超时只取消自己的在途调用。
pub struct UpstreamFetcher {
    /// 共享 HTTP 客户端
    client: reqwest::Client,
    /// 默认时限
    deadline: Duration,
}

impl UpstreamFetcher {
    /// 创建新的抓取器
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            deadline: Duration::from_secs(config.timeout_secs),
        })
    }

    /// 以默认时限抓取
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        self.fetch_with_deadline(url, self.deadline).await
    }

    /// 以指定时限抓取响应体
    ///
    /// 时限覆盖发送与读取响应体的全过程。触发时在途 future 被丢弃，
    /// 连接随之中止，并返回可区分的 [`ProxyError::UpstreamTimeout`]。
    /// 非成功状态码返回 [`ProxyError::UpstreamRejected`] 并保留上游状态。
    pub async fn fetch_with_deadline(&self, url: &Url, deadline: Duration) -> Result<String> {
        let started = Instant::now();

        let response = match timeout(deadline, self.client.get(url.clone()).send()).await {
            Ok(response) => response?,
            Err(_) => return Err(self.timeout_error(url, started)),
        };

        let status = response.status();

        // 读取响应体同样计入时限
        let remaining = deadline.saturating_sub(started.elapsed());
        let body = match timeout(remaining, response.text()).await {
            Ok(body) => body?,
            Err(_) => return Err(self.timeout_error(url, started)),
        };

        if !status.is_success() {
            return Err(ProxyError::UpstreamRejected {
                status: status.as_u16(),
                excerpt: excerpt(&body),
            });
        }

        Ok(body)
    }

    fn timeout_error(&self, url: &Url, started: Instant) -> ProxyError {
        ProxyError::UpstreamTimeout {
            url: url.to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}
