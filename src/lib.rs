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

//! SeeMoe 核心库
//!
//! 一个带规范化、限流与缓存的图站（booru）搜索代理：
//! 接收统一的图搜查询，转发到选定的上游图站 API，并把各家异构的
//! 响应映射为统一的规范形态。

pub mod api;
pub mod booru;
pub mod config;
pub mod error;

pub use api::ApiInterface;
pub use booru::BooruInterface;
pub use config::AppConfig;
pub use error::{ProxyError, Result};
