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

/// Danbooru 站点地址
const BASE_URL: &str = "https://danbooru.donmai.us";

/// Danbooru 适配器
///
/// 使用 `/posts.json` 接口。`page` 为 1 基分页（规范页码加一）；
/// 帖子是顶层数组；相对的图片地址需要补全站点前缀。
pub struct Danbooru {
    /// 站点地址（无尾斜杠）
    base_url: String,
}

impl Danbooru {
    /// 创建指向官方站点的适配器
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// 指定站点地址创建（测试用）
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn sort_token(sort: SortOrder) -> &'static str {
        match sort {
            SortOrder::Date => "order:id",
            SortOrder::Popular => "order:rank",
            SortOrder::Random => "order:random",
        }
    }

    /// 补全相对地址的站点前缀
    fn absolutize(&self, raw: &str) -> String {
        if raw.is_empty() || raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else if raw.starts_with("//") {
            format!("https:{}", raw)
        } else if raw.starts_with('/') {
            format!("{}{}", self.base_url, raw)
        } else {
            format!("{}/{}", self.base_url, raw)
        }
    }

    fn map_post(&self, raw: &Value) -> Post {
        let text = |field: &str| -> String {
            raw.get(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let number = |field: &str| raw.get(field).and_then(|v| v.as_i64());

        Post {
            id: number("id"),
            tags: text("tag_string"),
            preview_url: self.absolutize(&text("preview_file_url")),
            file_url: self.absolutize(&text("file_url")),
            sample_url: self.absolutize(&text("large_file_url")),
            width: number("image_width"),
            height: number("image_height"),
            rating: text("rating"),
            score: number("score"),
            source: text("source"),
        }
    }
}

impl Default for Danbooru {
    fn default() -> Self {
        Self::new()
    }
}

impl BooruSource for Danbooru {
    fn name(&self) -> &'static str {
        "danbooru"
    }

    fn base_page(&self) -> u32 {
        1
    }

    fn build_url(&self, query: &ImageQuery) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/posts.json", self.base_url))
            .map_err(|e| internal_error(format!("invalid danbooru base url: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("tags", &query.tags_with(Self::sort_token(query.sort)))
            .append_pair("page", &(self.base_page() + query.page).to_string())
            .append_pair("limit", &query.limit.to_string());

        Ok(url)
    }

    fn parse_posts(&self, body: &str) -> Result<Vec<Post>> {
        let json: Value = serde_json::from_str(body).map_err(|_| parse_error(body))?;

        let posts = json
            .as_array()
            .ok_or_else(|| parse_error(body))?
            .iter()
            .map(|raw| self.map_post(raw))
            .collect();

        Ok(posts)
    }
}
