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

//! 缓存管理处理器
//!
//! 提供缓存统计、清空与过期清理接口

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::on::ApiState;
use crate::api::types::ApiCacheStatsResponse;

/// 处理缓存统计请求
pub async fn handle_cache_stats(State(state): State<ApiState>) -> Response {
    let cache = state.booru.cache();
    let stats = ApiCacheStatsResponse {
        entries: cache.len(),
        ttl_secs: cache.ttl().as_secs(),
    };

    (StatusCode::OK, Json(stats)).into_response()
}

/// 处理缓存清空请求
pub async fn handle_cache_clear(State(state): State<ApiState>) -> Response {
    let cleared = state.booru.cache().clear();
    tracing::info!(cleared, "response cache cleared");

    (StatusCode::OK, Json(json!({ "cleared": cleared }))).into_response()
}

/// 处理过期条目清理请求
pub async fn handle_cache_cleanup(State(state): State<ApiState>) -> Response {
    let removed = state.booru.cache().purge_expired();

    (StatusCode::OK, Json(json!({ "removed": removed }))).into_response()
}
