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

//! 图搜流水线模块
//!
//! 包含查询规范化、限流、缓存、图站适配与上游抓取

pub mod cache;
pub mod fetch;
pub mod on;
pub mod query;
pub mod ratelimit;
pub mod sources;
pub mod types;

// 统一导出常用类型
pub use cache::{CacheConfig, ResponseCache};
pub use fetch::{FetchConfig, UpstreamFetcher};
pub use on::{BooruConfig, BooruInterface, ImagesResponse, ProxyStatsSnapshot};
pub use query::{ImageQuery, RawImageQuery, SortOrder};
pub use ratelimit::{RateLimitConfig, RateLimiter};
pub use sources::{BooruSource, SourceKind, SourceRegistry};
pub use types::{ImageResult, Post};
