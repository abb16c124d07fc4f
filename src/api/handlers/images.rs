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

//! 图搜处理器
//!
//! 处理 `/api/images` 请求：派生客户端键、调用流水线、
//! 将分类后的错误转换为响应契约。

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::middleware::extract_client_key;
use crate::api::on::ApiState;
use crate::api::types::{ApiErrorResponse, ApiImagesResponse};
use crate::booru::RawImageQuery;
use crate::error::ProxyError;

/// 处理图搜请求
pub async fn handle_images(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(raw): Query<RawImageQuery>,
) -> Response {
    let client_key = extract_client_key(&headers, Some(peer));

    match state.booru.query(&client_key, &raw).await {
        Ok(outcome) => {
            let body = ApiImagesResponse {
                count: outcome.result.posts.len(),
                post: outcome.result.posts,
            };

            let mut response = (StatusCode::OK, Json(body)).into_response();
            response.headers_mut().insert(
                "x-cache",
                HeaderValue::from_static(if outcome.cached { "HIT" } else { "MISS" }),
            );
            response
        }
        Err(err) => error_response(err),
    }
}

/// 将分类后的错误转换为响应
///
/// 响应体只携带客户端可见的消息；未预期错误的完整细节留在服务端日志。
pub fn error_response(err: ProxyError) -> Response {
    if let ProxyError::Internal(ref detail) = err {
        tracing::error!(detail = %detail, "internal error while handling request");
    }

    let body = ApiErrorResponse {
        error: err.client_message(),
    };
    (err.status_code(), Json(body)).into_response()
}
