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

//! 规范结果类型定义
//!
//! 所有上游图站的响应都被映射到这里定义的统一形态

use serde::{Deserialize, Serialize};

/// 规范化的帖子
///
/// 字段始终存在：缺失值以空串或 null 填充，消费方无需判断字段是否存在。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// 帖子 ID
    pub id: Option<i64>,

    /// 空格分隔的标签串
    #[serde(default)]
    pub tags: String,

    /// 预览图地址
    #[serde(default)]
    pub preview_url: String,

    /// 原图地址
    #[serde(default)]
    pub file_url: String,

    /// 样张地址
    #[serde(default)]
    pub sample_url: String,

    /// 原图宽度
    pub width: Option<i64>,

    /// 原图高度
    pub height: Option<i64>,

    /// 分级
    #[serde(default)]
    pub rating: String,

    /// 评分
    pub score: Option<i64>,

    /// 来源页面地址
    #[serde(default)]
    pub source: String,
}

/// 一次图搜的规范结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    /// 帖子列表
    pub posts: Vec<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_default_has_empty_fields() {
        let post = Post::default();
        assert_eq!(post.id, None);
        assert_eq!(post.tags, "");
        assert_eq!(post.file_url, "");
        assert_eq!(post.sample_url, "");
    }

    #[test]
    fn test_post_serializes_all_fields() {
        let json = serde_json::to_value(Post::default()).unwrap();
        // 消费方依赖字段始终存在
        for field in [
            "id",
            "tags",
            "preview_url",
            "file_url",
            "sample_url",
            "rating",
            "source",
        ] {
            assert!(json.get(field).is_some(), "missing field: {}", field);
        }
    }
}
