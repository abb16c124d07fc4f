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

//! 指标处理器
//!
//! 处理统计、来源列表与版本信息请求

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::on::ApiState;
use crate::api::types::{ApiSourceInfo, ApiStatsResponse};
use crate::booru::SourceKind;

/// 处理统计信息请求
pub async fn handle_stats(State(state): State<ApiState>) -> Response {
    let snapshot = state.booru.stats();
    let stats = ApiStatsResponse::from_snapshot(&snapshot);

    (StatusCode::OK, Json(stats)).into_response()
}

/// 处理来源列表请求
pub async fn handle_sources_list(State(state): State<ApiState>) -> Response {
    let registry = state.booru.registry();
    let sources: Vec<ApiSourceInfo> = SourceKind::all()
        .iter()
        .filter_map(|kind| registry.resolve(*kind).ok())
        .map(|adapter| ApiSourceInfo {
            name: adapter.name().to_string(),
            base_page: adapter.base_page(),
            default: adapter.name() == SourceKind::default().as_str(),
        })
        .collect();

    (StatusCode::OK, Json(sources)).into_response()
}

/// 处理版本信息请求
pub async fn handle_version(State(state): State<ApiState>) -> Response {
    let version_info = json!({
        "version": state.version,
        "name": "SeeMoe",
        "description": "图站搜索代理"
    });

    (StatusCode::OK, Json(version_info)).into_response()
}
