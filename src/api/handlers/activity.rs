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

//! 活跃客户端处理器
//!
//! 仅允许配置中的管理地址访问

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::middleware::extract_client_key;
use crate::api::on::ApiState;
use crate::api::types::{ApiActivityResponse, ApiErrorResponse};

/// 处理活跃客户端统计请求
pub async fn handle_activity(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let client_key = extract_client_key(&headers, Some(peer));

    if !state.admin.is_allowed(&client_key) {
        let body = ApiErrorResponse {
            error: "Forbidden".to_string(),
        };
        return (StatusCode::FORBIDDEN, Json(body)).into_response();
    }

    let users = state.activity.active_clients();
    let response = ApiActivityResponse {
        count: users.len(),
        users,
    };

    (StatusCode::OK, Json(response)).into_response()
}
