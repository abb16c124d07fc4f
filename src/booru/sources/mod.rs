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

//! 图站适配器模块
//!
//! 每个上游图站一个适配器，封装三类来源特定行为：URL 构造、
//! 分页约定与响应到规范帖子的映射。接入新图站只需新增一个适配器
//! 并在注册表中登记，其余组件不变。

pub mod danbooru;
pub mod gelbooru;

pub use danbooru::Danbooru;
pub use gelbooru::Gelbooru;

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use super::query::ImageQuery;
use super::types::Post;
use crate::error::{internal_error, Result};

/// 已注册的图站
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Gelbooru
    #[default]
    Gelbooru,
    /// Danbooru
    Danbooru,
}

impl SourceKind {
    /// 解析来源参数，未注册的值回退到 Gelbooru
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "danbooru" => SourceKind::Danbooru,
            _ => SourceKind::Gelbooru,
        }
    }

    /// 规范名称
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Gelbooru => "gelbooru",
            SourceKind::Danbooru => "danbooru",
        }
    }

    /// 全部已注册来源
    pub fn all() -> &'static [SourceKind] {
        &[SourceKind::Gelbooru, SourceKind::Danbooru]
    }
}

/// 图站适配器能力集
///
/// 实现必须是纯函数式的：URL 构造与响应解析不发起网络调用，
/// 网络交互统一由上游抓取器完成。
pub trait BooruSource: Send + Sync {
    /// 适配器名称（与来源参数一致）
    fn name(&self) -> &'static str;

    /// 分页基数（0 或 1）
    fn base_page(&self) -> u32;

    /// 根据规范查询构造上游 URL
    fn build_url(&self, query: &ImageQuery) -> Result<Url>;

    /// 解析上游响应体并映射为规范帖子列表
    fn parse_posts(&self, body: &str) -> Result<Vec<Post>>;
}

/// 适配器注册表
///
/// 进程启动时构建，之后不可变。
pub struct SourceRegistry {
    /// 来源到适配器的映射
    sources: HashMap<SourceKind, Arc<dyn BooruSource>>,
}

impl SourceRegistry {
    /// 创建包含全部内置适配器的注册表
    pub fn new() -> Self {
        let mut sources: HashMap<SourceKind, Arc<dyn BooruSource>> = HashMap::new();
        sources.insert(SourceKind::Gelbooru, Arc::new(Gelbooru::new()));
        sources.insert(SourceKind::Danbooru, Arc::new(Danbooru::new()));
        Self { sources }
    }

    /// 替换或追加一个适配器（构建期使用，注册表交付后不再变更）
    pub fn with_source(mut self, kind: SourceKind, source: Arc<dyn BooruSource>) -> Self {
        self.sources.insert(kind, source);
        self
    }

    /// 查找适配器
    ///
    /// 规范化阶段已保证来源键必然注册；查不到说明注册表被错误构建。
    pub fn resolve(&self, kind: SourceKind) -> Result<Arc<dyn BooruSource>> {
        self.sources
            .get(&kind)
            .cloned()
            .ok_or_else(|| internal_error(format!("source '{}' is not registered", kind.as_str())))
    }

    /// 已注册的来源名称（稳定顺序）
    pub fn names(&self) -> Vec<&'static str> {
        SourceKind::all()
            .iter()
            .filter(|kind| self.sources.contains_key(kind))
            .map(|kind| kind.as_str())
            .collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parse_defaults_to_gelbooru() {
        assert_eq!(SourceKind::parse("danbooru"), SourceKind::Danbooru);
        assert_eq!(SourceKind::parse("gelbooru"), SourceKind::Gelbooru);
        assert_eq!(SourceKind::parse("e621"), SourceKind::Gelbooru);
        assert_eq!(SourceKind::parse(""), SourceKind::Gelbooru);
    }

    #[test]
    fn test_registry_resolves_builtin_sources() {
        let registry = SourceRegistry::new();
        assert_eq!(
            registry.resolve(SourceKind::Gelbooru).unwrap().name(),
            "gelbooru"
        );
        assert_eq!(
            registry.resolve(SourceKind::Danbooru).unwrap().name(),
            "danbooru"
        );
        assert_eq!(registry.names(), vec!["gelbooru", "danbooru"]);
    }
}
