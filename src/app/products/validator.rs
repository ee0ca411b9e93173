//! 产品与评论写入请求的校验

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

/// 一条校验失败信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 创建产品时必须存在且为字符串的字段
#[derive(Debug, Deserialize, Validate)]
struct ProductDraft {
    #[serde(default, deserialize_with = "string_or_none")]
    #[validate(required(message = "Name is a mandatory field and needs to be a string!"))]
    name: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    #[validate(required(message = "Description is a mandatory field and needs to be a string!"))]
    description: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    #[validate(required(message = "Brand is a mandatory field and needs to be a string!"))]
    brand: Option<String>,

    #[serde(default, deserialize_with = "string_or_none")]
    #[validate(required(message = "Category is a mandatory field and needs to be a string!"))]
    category: Option<String>,
}

const PRODUCT_FIELDS: [&str; 4] = ["name", "description", "brand", "category"];

/// 非字符串值视为缺失
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned))
}

/// 校验产品创建请求，返回所有失败项 (按字段声明顺序)
pub fn validate_product(payload: &Value) -> Vec<Violation> {
    let Some(object) = payload.as_object() else {
        return vec![not_an_object()];
    };

    let draft: ProductDraft = match serde_json::from_value(Value::Object(object.clone())) {
        Ok(draft) => draft,
        Err(e) => return vec![Violation::new("body", e.to_string())],
    };

    match draft.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => into_violations(&errors),
    }
}

/// 评论没有字段级约束，只要求是 JSON 对象
pub fn validate_review(payload: &Value) -> Vec<Violation> {
    if payload.is_object() {
        Vec::new()
    } else {
        vec![not_an_object()]
    }
}

/// 有失败项时返回错误，否则原样放行 payload
pub fn trigger_bad_request(
    payload: Value,
    violations: Vec<Violation>,
) -> Result<Map<String, Value>, Vec<Violation>> {
    if !violations.is_empty() {
        return Err(violations);
    }

    match payload {
        Value::Object(object) => Ok(object),
        _ => Err(vec![not_an_object()]),
    }
}

fn not_an_object() -> Violation {
    Violation::new("body", "Request body must be a JSON object!")
}

fn into_violations(errors: &ValidationErrors) -> Vec<Violation> {
    let field_errors = errors.field_errors();
    let mut violations = Vec::new();

    for field in PRODUCT_FIELDS {
        let Some(errors) = field_errors.get(field) else {
            continue;
        };
        for error in errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            violations.push(Violation::new(field, message));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_product() {
        let payload = json!({
            "name": "Foo",
            "description": "Bar",
            "brand": "Acme",
            "category": "tools",
            "price": 10
        });
        assert!(validate_product(&payload).is_empty());
    }

    #[test]
    fn test_missing_brand() {
        let payload = json!({"name": "Foo", "description": "Bar", "category": "tools"});
        let violations = validate_product(&payload);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "brand");
        assert!(violations[0].message.contains("Brand"));
    }

    #[test]
    fn test_non_string_fields_are_violations() {
        let payload = json!({"name": 42, "description": null, "brand": ["Acme"], "category": "x"});
        let fields: Vec<_> = validate_product(&payload)
            .into_iter()
            .map(|v| v.field)
            .collect();

        assert_eq!(fields, vec!["name", "description", "brand"]);
    }

    #[test]
    fn test_empty_object_reports_every_field_in_order() {
        let fields: Vec<_> = validate_product(&json!({}))
            .into_iter()
            .map(|v| v.field)
            .collect();

        assert_eq!(fields, PRODUCT_FIELDS.to_vec());
    }

    #[test]
    fn test_non_object_payload() {
        assert_eq!(validate_product(&json!([1, 2]))[0].field, "body");
        assert_eq!(validate_review(&json!("great"))[0].field, "body");
        assert!(validate_review(&json!({"rating": 5})).is_empty());
    }

    #[test]
    fn test_trigger_bad_request() {
        let payload = json!({"rating": 5});
        let violations = validate_review(&payload);
        let object = trigger_bad_request(payload, violations).unwrap();
        assert_eq!(object["rating"], 5);

        let payload = json!({});
        let violations = validate_product(&payload);
        assert_eq!(trigger_bad_request(payload, violations).unwrap_err().len(), 4);
    }
}
