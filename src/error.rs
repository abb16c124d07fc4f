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

//! 错误处理模块
//!
//! 定义代理请求的错误分类以及到 HTTP 状态码的映射

use axum::http::StatusCode;
use thiserror::Error;

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ProxyError>;

/// 代理错误分类
///
/// 除速率限制外，所有分类都在请求编排层被捕获并转换为响应契约；
/// 内部细节（原始响应体、底层错误）只进入服务端日志，不进入响应体。
#[derive(Debug, Error)]
pub enum ProxyError {
    /// 客户端超出速率限制
    #[error("rate limit exceeded")]
    RateLimited,

    /// 上游请求超过时限
    #[error("upstream request to {url} timed out after {elapsed_ms}ms")]
    UpstreamTimeout {
        /// 请求的上游地址
        url: String,
        /// 截止触发时已经过的毫秒数
        elapsed_ms: u64,
    },

    /// 上游返回非成功状态码
    #[error("upstream rejected request with status {status}")]
    UpstreamRejected {
        /// 上游返回的状态码
        status: u16,
        /// 响应体摘录（仅用于日志）
        excerpt: String,
    },

    /// 上游响应体无法按结构化数据解析
    #[error("failed to parse upstream response")]
    UpstreamParse {
        /// 响应体摘录（仅用于日志）
        excerpt: String,
    },

    /// 网络传输失败（连接、TLS、读取响应体等）
    #[error("upstream transport failure: {0}")]
    Network(#[from] reqwest::Error),

    /// 其他未预期的内部错误
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// 映射到响应状态码
    ///
    /// 上游拒绝时保留上游状态码，非法状态码回退到 500。
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ProxyError::UpstreamParse { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Network(_) | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 面向客户端的错误消息
    ///
    /// 不包含堆栈、上游原始响应体等内部细节。
    pub fn client_message(&self) -> String {
        match self {
            ProxyError::RateLimited => "Rate limit exceeded, try again later".to_string(),
            ProxyError::UpstreamTimeout { .. } => "Request to upstream timed out".to_string(),
            ProxyError::UpstreamRejected { status, .. } => {
                format!("Upstream rejected the request with status {}", status)
            }
            ProxyError::UpstreamParse { .. } => {
                "Upstream returned an unreadable response".to_string()
            }
            ProxyError::Network(_) | ProxyError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// 创建内部错误
pub fn internal_error(message: impl Into<String>) -> ProxyError {
    ProxyError::Internal(message.into())
}

/// 创建解析错误，保留响应体摘录
pub fn parse_error(body: &str) -> ProxyError {
    ProxyError::UpstreamParse {
        excerpt: excerpt(body),
    }
}

/// 截取响应体开头作为日志摘录
pub fn excerpt(body: &str) -> String {
    const MAX_LEN: usize = 200;
    let mut end = body.len().min(MAX_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ProxyError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ProxyError::UpstreamTimeout {
                url: "http://example.com".to_string(),
                elapsed_ms: 8000,
            }
            .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::UpstreamParse {
                excerpt: String::new(),
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejected_preserves_upstream_status() {
        let err = ProxyError::UpstreamRejected {
            status: 404,
            excerpt: String::new(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        // 非法状态码回退到 500
        let err = ProxyError::UpstreamRejected {
            status: 42,
            excerpt: String::new(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_message_hides_internals() {
        let err = ProxyError::Internal("connection pool exhausted at worker 3".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err = ProxyError::UpstreamParse {
            excerpt: "<html>secret</html>".to_string(),
        };
        assert!(!err.client_message().contains("secret"));
    }

    #[test]
    fn test_excerpt_respects_char_boundary() {
        let body = "搜".repeat(200);
        let cut = excerpt(&body);
        assert!(cut.len() <= 200);
        assert!(body.starts_with(&cut));
    }
}
