//! 产品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 由服务端维护、不接受客户端写入的字段
pub const SERVER_MANAGED_FIELDS: [&str; 4] = ["id", "createdAt", "updatedAt", "reviews"];

/// 产品记录：固定的服务端字段加上客户端提交的任意字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
    /// name、description、brand、category 以及其它客户端字段
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// 嵌入在产品中的评论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn category(&self) -> Option<&str> {
        self.attribute("category").and_then(Value::as_str)
    }

    /// 浅合并：payload 的顶层字段覆盖已有字段，服务端字段被忽略
    pub fn merge(&mut self, payload: Map<String, Value>) {
        self.attributes.extend(client_fields(payload));
    }
}

/// 去掉服务端维护的字段
pub fn client_fields(payload: Map<String, Value>) -> Map<String, Value> {
    payload
        .into_iter()
        .filter(|(key, _)| !SERVER_MANAGED_FIELDS.contains(&key.as_str()))
        .collect()
}

/// 列表查询参数，未知参数被忽略
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductQuery {
    /// 从原始查询参数构造：取第一个非空的 category，空值等同于不过滤
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let category = pairs
            .iter()
            .filter(|(key, _)| key == "category")
            .map(|(_, value)| value)
            .find(|value| !value.is_empty())
            .cloned();
        Self { category }
    }
}
