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

//! 查询规范化模块
//!
//! 将原始查询参数净化为规范查询。任何形态的非法输入都回退到默认值，
//! 这一层永远不会向客户端报错。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::sources::SourceKind;

/// 标签允许的字符集
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_:-]+$").expect("valid tag regex"));

/// 最多保留的标签数
pub const MAX_TAGS: usize = 6;

/// 默认每页结果数
pub const DEFAULT_LIMIT: u32 = 20;

/// 每页结果数上限
pub const MAX_LIMIT: u32 = 100;

/// 原始查询参数
///
/// 数值参数按字符串接收，保证非数字输入进入规范化流程而不是在
/// 反序列化阶段被拒绝。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImageQuery {
    /// 空格分隔的标签串
    pub tags: Option<String>,
    /// 页码
    pub page: Option<String>,
    /// 每页结果数
    pub limit: Option<String>,
    /// 排序方式
    pub sort: Option<String>,
    /// 图站来源
    pub source: Option<String>,
}

/// 排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// 按时间（最新优先）
    #[default]
    Date,
    /// 按热度
    Popular,
    /// 随机
    Random,
}

impl SortOrder {
    /// 解析排序参数，未知值回退到 `Date`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "popular" => SortOrder::Popular,
            "random" => SortOrder::Random,
            _ => SortOrder::Date,
        }
    }

    /// 规范名称
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Popular => "popular",
            SortOrder::Random => "random",
        }
    }
}

/// 规范查询
///
/// 只能通过 [`ImageQuery::normalize`] 构造，不允许由未校验的输入直接拼装。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    /// 规范化后的标签（≤6 个，受限字符集）
    pub tags: Vec<String>,
    /// 页码（0 基）
    pub page: u32,
    /// 每页结果数（1..=100）
    pub limit: u32,
    /// 排序方式
    pub sort: SortOrder,
    /// 图站来源
    pub source: SourceKind,
}

impl ImageQuery {
    /// 规范化原始查询参数
    ///
    /// - `tags`：按空白切分、小写、去掉不合法字符集的标签，最多保留 6 个；
    /// - `page`：非数字或负数回退到 0；
    /// - `limit`：非数字或非正数回退到 20，上限 100；
    /// - `sort` / `source`：未知值回退到默认项。
    ///
    /// 此函数永不失败。
    pub fn normalize(raw: &RawImageQuery) -> Self {
        let tags = raw
            .tags
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| TAG_RE.is_match(t))
            .take(MAX_TAGS)
            .collect();

        let page = raw
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);

        let limit = raw
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l.min(i64::from(MAX_LIMIT)) as u32)
            .unwrap_or(DEFAULT_LIMIT);

        let sort = raw.sort.as_deref().map(SortOrder::parse).unwrap_or_default();
        let source = raw
            .source
            .as_deref()
            .map(SourceKind::parse)
            .unwrap_or_default();

        Self {
            tags,
            page,
            limit,
            sort,
            source,
        }
    }

    /// 缓存键
    ///
    /// 由来源和全部规范化字段组成。原始参数格式不同但规范化结果相同的
    /// 请求必须共享同一个缓存条目。
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.source.as_str(),
            self.tags.join(" "),
            self.page,
            self.limit,
            self.sort.as_str()
        )
    }

    /// 组合上游标签串，追加来源特定的排序指示符
    pub fn tags_with(&self, sort_token: &str) -> String {
        if self.tags.is_empty() {
            sort_token.to_string()
        } else {
            format!("{} {}", self.tags.join(" "), sort_token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        tags: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
        sort: Option<&str>,
        source: Option<&str>,
    ) -> RawImageQuery {
        RawImageQuery {
            tags: tags.map(str::to_string),
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            sort: sort.map(str::to_string),
            source: source.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_defaults_for_empty_input() {
        let query = ImageQuery::normalize(&RawImageQuery::default());
        assert!(query.tags.is_empty());
        assert_eq!(query.page, 0);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.sort, SortOrder::Date);
        assert_eq!(query.source, SourceKind::Gelbooru);
    }

    #[test]
    fn test_normalize_filters_and_lowercases_tags() {
        let query = ImageQuery::normalize(&raw(
            Some("  Cat_Ears dog!! rating:safe  <script> blue-sky "),
            None,
            None,
            None,
            None,
        ));
        assert_eq!(query.tags, vec!["cat_ears", "rating:safe", "blue-sky"]);
    }

    #[test]
    fn test_normalize_truncates_to_six_tags() {
        let query = ImageQuery::normalize(&raw(Some("a b c d e f g h"), None, None, None, None));
        assert_eq!(query.tags.len(), MAX_TAGS);
        assert_eq!(query.tags, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_normalize_clamps_page_and_limit() {
        let query = ImageQuery::normalize(&raw(None, Some("-3"), Some("500"), None, None));
        assert_eq!(query.page, 0);
        assert_eq!(query.limit, MAX_LIMIT);

        let query = ImageQuery::normalize(&raw(None, Some("abc"), Some("0"), None, None));
        assert_eq!(query.page, 0);
        assert_eq!(query.limit, DEFAULT_LIMIT);

        let query = ImageQuery::normalize(&raw(None, Some("7"), Some("42"), None, None));
        assert_eq!(query.page, 7);
        assert_eq!(query.limit, 42);
    }

    #[test]
    fn test_normalize_defaults_sort_and_source() {
        let query = ImageQuery::normalize(&raw(None, None, None, Some("bogus"), Some("e621")));
        assert_eq!(query.sort, SortOrder::Date);
        assert_eq!(query.source, SourceKind::Gelbooru);

        let query = ImageQuery::normalize(&raw(None, None, None, Some("random"), Some("danbooru")));
        assert_eq!(query.sort, SortOrder::Random);
        assert_eq!(query.source, SourceKind::Danbooru);
    }

    #[test]
    fn test_normalize_full_junk_request() {
        let query = ImageQuery::normalize(&raw(
            Some("cat dog!!"),
            Some("-1"),
            Some("500"),
            Some("bogus"),
            Some("danbooru"),
        ));
        assert_eq!(query.tags, vec!["cat"]);
        assert_eq!(query.page, 0);
        assert_eq!(query.limit, 100);
        assert_eq!(query.sort, SortOrder::Date);
        assert_eq!(query.source, SourceKind::Danbooru);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let first = ImageQuery::normalize(&raw(
            Some("Cat_Ears  SOLO"),
            Some("3"),
            Some("50"),
            Some("popular"),
            Some("danbooru"),
        ));
        let second = ImageQuery::normalize(&RawImageQuery {
            tags: Some(first.tags.join(" ")),
            page: Some(first.page.to_string()),
            limit: Some(first.limit.to_string()),
            sort: Some(first.sort.as_str().to_string()),
            source: Some(first.source.as_str().to_string()),
        });
        assert_eq!(first, second);
    }

    #[test]
    fn test_cache_key_includes_source() {
        let gel = ImageQuery::normalize(&raw(Some("cat"), None, None, None, Some("gelbooru")));
        let dan = ImageQuery::normalize(&raw(Some("cat"), None, None, None, Some("danbooru")));
        assert_ne!(gel.cache_key(), dan.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_raw_formatting() {
        let a = ImageQuery::normalize(&raw(Some("  CAT   dog "), Some("0"), None, None, None));
        let b = ImageQuery::normalize(&raw(Some("cat dog"), None, Some("20"), Some("date"), None));
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_tags_with_sort_token() {
        let query = ImageQuery::normalize(&raw(Some("cat dog"), None, None, None, None));
        assert_eq!(query.tags_with("sort:id:desc"), "cat dog sort:id:desc");

        let empty = ImageQuery::normalize(&RawImageQuery::default());
        assert_eq!(empty.tags_with("sort:random"), "sort:random");
    }
}
