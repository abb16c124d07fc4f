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

//! API 外部接口模块
//!
//! 提供高层次的 HTTP API 接口供外部调用

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{
    cache, handle_activity, handle_favicon, handle_health, handle_images, handle_index,
    handle_sources_list, handle_stats, handle_version,
};
use super::middleware::{activity_middleware, cors, logging_middleware, ActivityState};
use crate::booru::BooruInterface;
use crate::config::{AdminConfig, AppConfig, ServerConfig};
use crate::error::Result;

/// API 服务状态
#[derive(Clone)]
pub struct ApiState {
    /// 图搜接口
    pub booru: Arc<BooruInterface>,
    /// 版本信息
    pub version: String,
    /// 活跃度状态
    pub activity: Arc<ActivityState>,
    /// 管理接口配置
    pub admin: AdminConfig,
}

/// API 接口
pub struct ApiInterface {
    /// 内部状态
    state: ApiState,
    /// 服务器配置
    server: ServerConfig,
}

impl ApiInterface {
    /// 创建新的 API 接口
    ///
    /// # Arguments
    ///
    /// * `booru` - 图搜接口
    /// * `version` - 版本号
    ///
    /// # Returns
    ///
    /// 返回 API 接口实例
    pub fn new(booru: Arc<BooruInterface>, version: String) -> Self {
        Self::with_config(
            booru,
            version,
            ServerConfig::default(),
            AdminConfig::default(),
        )
    }

    /// 使用服务器与管理配置创建 API 接口
    pub fn with_config(
        booru: Arc<BooruInterface>,
        version: String,
        server: ServerConfig,
        admin: AdminConfig,
    ) -> Self {
        let state = ApiState {
            booru,
            version,
            activity: Arc::new(ActivityState::new()),
            admin,
        };

        Self { state, server }
    }

    /// 从应用配置创建 API 接口
    ///
    /// # Arguments
    ///
    /// * `config` - 应用配置
    ///
    /// # Returns
    ///
    /// 返回 API 接口实例或错误
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let booru = Arc::new(BooruInterface::new(config.booru_config())?);
        Ok(Self::with_config(
            booru,
            env!("CARGO_PKG_VERSION").to_string(),
            config.server,
            config.admin,
        ))
    }

    /// 构建路由器
    ///
    /// # Returns
    ///
    /// 返回配置好的 Axum Router
    pub fn build_router(&self) -> Router {
        Router::new()
            // 首页路由
            .route("/", get(handle_index))
            .route("/favicon.ico", get(handle_favicon))
            // 图搜路由
            .route("/api/images", get(handle_images))
            // 来源信息路由
            .route("/api/sources", get(handle_sources_list))
            // 缓存管理路由
            .route("/api/cache/stats", get(cache::handle_cache_stats))
            .route("/api/cache/clear", post(cache::handle_cache_clear))
            .route("/api/cache/cleanup", post(cache::handle_cache_cleanup))
            // 统计信息路由
            .route("/api/stats", get(handle_stats))
            // 健康检查路由
            .route("/api/health", get(handle_health))
            .route("/health", get(handle_health))
            // 版本信息路由
            .route("/api/version", get(handle_version))
            // 管理路由
            .route("/api/admin/activity", get(handle_activity))
            .with_state(self.state.clone())
            // 应用中间件（顺序很重要）
            // 1. 活跃度跟踪
            .layer(middleware::from_fn_with_state(
                self.state.activity.clone(),
                activity_middleware,
            ))
            // 2. 请求日志
            .layer(middleware::from_fn(logging_middleware))
            // 3. CORS
            .layer(cors::create_cors_layer(&self.server.cors_origins))
    }

    /// 启动服务器
    ///
    /// # Returns
    ///
    /// 返回结果
    pub async fn serve(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = format!("{}:{}", self.server.host, self.server.port);

        println!("🌸 SeeMoe 服务器启动在: {}", addr);
        println!("   - 已注册来源: {}", self.state.booru.list_sources().join(", "));
        println!("   - 限流与缓存状态见 /api/stats");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(
            listener,
            self.build_router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }

    /// 获取服务状态
    pub fn state(&self) -> &ApiState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booru::BooruConfig;

    #[test]
    fn test_api_interface_creation() {
        let booru = Arc::new(BooruInterface::new(BooruConfig::default()).unwrap());
        let api = ApiInterface::new(booru, "0.2.0".to_string());
        let _router = api.build_router();
        // Router is built successfully
    }

    #[test]
    fn test_api_interface_from_config() {
        let api = ApiInterface::from_config(AppConfig::default());
        assert!(api.is_ok());
    }
}
