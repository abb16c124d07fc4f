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

use serde_json::Value;
use url::Url;

use super::BooruSource;
use crate::booru::query::{ImageQuery, SortOrder};
use crate::booru::types::Post;
use crate::error::{internal_error, parse_error, Result};

/// Gelbooru dapi 入口
const BASE_URL: &str = "https://gelbooru.com/index.php";

/// Gelbooru 适配器
///
/// 使用 dapi JSON 接口。`pid` 为 0 基分页；排序指示符追加在标签串内；
/// 帖子位于响应对象的 `.post` 数组，数组缺失等价于空结果。
pub struct Gelbooru {
    /// dapi 入口地址
    base_url: String,
}

impl Gelbooru {
    /// 创建指向官方入口的适配器
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// 指定入口地址创建（测试用）
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn sort_token(sort: SortOrder) -> &'static str {
        match sort {
            SortOrder::Date => "sort:id:desc",
            SortOrder::Popular => "sort:score:desc",
            SortOrder::Random => "sort:random",
        }
    }

    fn map_post(raw: &Value) -> Post {
        let text = |field: &str| -> String {
            raw.get(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let number = |field: &str| raw.get(field).and_then(|v| v.as_i64());

        let file_url = text("file_url");
        let sample_url = text("sample_url");

        Post {
            id: number("id"),
            tags: text("tags"),
            preview_url: text("preview_url"),
            // 原图缺失时退回样张
            file_url: if file_url.is_empty() {
                sample_url.clone()
            } else {
                file_url
            },
            sample_url,
            width: number("width"),
            height: number("height"),
            rating: text("rating"),
            score: number("score"),
            source: text("source"),
        }
    }
}

impl Default for Gelbooru {
    fn default() -> Self {
        Self::new()
    }
}

impl BooruSource for Gelbooru {
    fn name(&self) -> &'static str {
        "gelbooru"
    }

    fn base_page(&self) -> u32 {
        0
    }

    fn build_url(&self, query: &ImageQuery) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| internal_error(format!("invalid gelbooru base url: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("page", "dapi")
            .append_pair("s", "post")
            .append_pair("q", "index")
            .append_pair("json", "1")
            .append_pair("tags", &query.tags_with(Self::sort_token(query.sort)))
            .append_pair("pid", &(self.base_page() + query.page).to_string())
            .append_pair("limit", &query.limit.to_string());

        Ok(url)
    }

    fn parse_posts(&self, body: &str) -> Result<Vec<Post>> {
        let json: Value = serde_json::from_str(body).map_err(|_| parse_error(body))?;

        // `.post` 数组缺失等价于零结果
        let posts = json
            .get("post")
            .and_then(|v| v.as_array())
            .map(|array| array.iter().map(Self::map_post).collect())
            .unwrap_or_default();

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booru::query::RawImageQuery;

    fn query(tags: &str, page: &str, limit: &str, sort: &str) -> ImageQuery {
        ImageQuery::normalize(&RawImageQuery {
            tags: Some(tags.to_string()),
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            sort: Some(sort.to_string()),
            source: Some("gelbooru".to_string()),
        })
    }

    #[test]
    fn test_build_url_uses_zero_based_pid() {
        let url = Gelbooru::new()
            .build_url(&query("cat dog", "2", "30", "date"))
            .unwrap();

        let query_string = url.query().unwrap();
        assert!(url.as_str().starts_with("https://gelbooru.com/index.php?"));
        assert!(query_string.contains("page=dapi"));
        assert!(query_string.contains("json=1"));
        assert!(query_string.contains("pid=2"));
        assert!(query_string.contains("limit=30"));
        assert!(query_string.contains("tags=cat+dog+sort%3Aid%3Adesc"));
    }

    #[test]
    fn test_build_url_appends_sort_token() {
        let gelbooru = Gelbooru::new();

        let url = gelbooru.build_url(&query("cat", "0", "20", "popular")).unwrap();
        assert!(url.query().unwrap().contains("sort%3Ascore%3Adesc"));

        let url = gelbooru.build_url(&query("", "0", "20", "random")).unwrap();
        assert!(url.query().unwrap().contains("tags=sort%3Arandom"));
    }

    #[test]
    fn test_parse_posts_maps_canonical_fields() {
        let body = r#"{"post":[{"id":1,"tags":"a b","file_url":"http://x/f.jpg"}]}"#;
        let posts = Gelbooru::new().parse_posts(body).unwrap();

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.id, Some(1));
        assert_eq!(post.tags, "a b");
        assert_eq!(post.file_url, "http://x/f.jpg");
        assert_eq!(post.sample_url, "");
        assert_eq!(post.preview_url, "");
    }

    #[test]
    fn test_parse_posts_falls_back_to_sample_url() {
        let body = r#"{"post":[{"id":7,"sample_url":"http://x/s.jpg"}]}"#;
        let posts = Gelbooru::new().parse_posts(body).unwrap();
        assert_eq!(posts[0].file_url, "http://x/s.jpg");
        assert_eq!(posts[0].sample_url, "http://x/s.jpg");
    }

    #[test]
    fn test_parse_posts_missing_container_is_empty() {
        let posts = Gelbooru::new()
            .parse_posts(r#"{"@attributes":{"count":0}}"#)
            .unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_parse_posts_rejects_non_json() {
        let err = Gelbooru::new().parse_posts("<html>maintenance</html>");
        assert!(err.is_err());
    }
}
