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

//! SeeMoe 服务器入口

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use seemoe_core::api::ApiInterface;
use seemoe_core::config::AppConfig;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "SeeMoe", about = "A caching image board search proxy", version)]
struct Cli {
    /// 配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖监听地址
    #[arg(long)]
    host: Option<String>,

    /// 覆盖监听端口
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 加载配置
    let mut config = match &cli.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("配置加载失败: {}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    // 命令行覆盖
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // 验证配置
    if let Err(e) = config.validate() {
        eprintln!("配置验证失败: {}", e);
        std::process::exit(1);
    }

    // 创建 API 接口
    let api = match ApiInterface::from_config(config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    // 启动服务器（这会阻塞）
    if let Err(e) = api.serve().await {
        eprintln!("服务器错误: {}", e);
        std::process::exit(1);
    }
}
