//! 响应结构归一化
//!
//! 后端不同接口的分页包装并不统一：裸数组、Spring `Page`（`content` +
//! `totalElements`）、`{ data: [...] }` 等。这里按固定优先级把任意响应
//! 转为 `{ list, total }`，识别不出时返回空列表，从不报错。

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::common::NormalizedPage;
use crate::models::common::lenient::lenient_count;

/// 列表字段的检查顺序
pub const LIST_KEYS: [&str; 7] = ["content", "items", "records", "rows", "result", "results", "data"];

/// 总数字段的检查顺序
pub const TOTAL_KEYS: [&str; 3] = ["totalElements", "total", "count"];

/// 深度优先搜索的最大层数
pub const MAX_SEARCH_DEPTH: usize = 8;

/// 将任意响应体归一化为列表与总数
pub fn normalize(body: &Value) -> NormalizedPage<Value> {
    match body {
        Value::Array(items) => page_of(items, None),
        Value::Object(obj) => {
            if let Some(data) = obj.get("data") {
                match data {
                    Value::Array(items) => return page_of(items, read_total(obj, &["total"])),
                    Value::Object(inner) => {
                        if let Some(page) = detect_in_object(inner) {
                            return page;
                        }
                    }
                    _ => {}
                }
            }
            detect_in_object(obj).unwrap_or_default()
        }
        _ => NormalizedPage::empty(),
    }
}

/// 归一化并转换为具体类型，无法解析的记录会被跳过
pub fn normalize_as<T>(body: &Value) -> NormalizedPage<T>
where
    T: DeserializeOwned,
{
    let page = normalize(body);
    let mut list = Vec::with_capacity(page.list.len());
    for (index, record) in page.list.into_iter().enumerate() {
        match serde_json::from_value::<T>(record) {
            Ok(item) => list.push(item),
            Err(e) => warn!("Skipping malformed record at index {}: {}", index, e),
        }
    }
    NormalizedPage {
        list,
        total: page.total,
    }
}

/// 单个对象的响应可能包在 `{ code, message, data: {...} }` 中
pub fn unwrap_data(body: &Value) -> &Value {
    match body.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => body,
    }
}

fn detect_in_object(obj: &Map<String, Value>) -> Option<NormalizedPage<Value>> {
    for key in LIST_KEYS {
        if let Some(Value::Array(items)) = obj.get(key) {
            return Some(page_of(items, read_total(obj, &TOTAL_KEYS)));
        }
    }
    search_first_array(obj, 0)
}

fn search_first_array(obj: &Map<String, Value>, depth: usize) -> Option<NormalizedPage<Value>> {
    if depth >= MAX_SEARCH_DEPTH {
        return None;
    }
    for value in obj.values() {
        match value {
            Value::Array(items) => return Some(page_of(items, read_total(obj, &TOTAL_KEYS))),
            Value::Object(child) => {
                if let Some(page) = search_first_array(child, depth + 1) {
                    return Some(page);
                }
            }
            _ => {}
        }
    }
    None
}

fn page_of(items: &[Value], total: Option<u64>) -> NormalizedPage<Value> {
    NormalizedPage {
        list: items.to_vec(),
        total: total.unwrap_or(items.len() as u64),
    }
}

fn read_total(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| obj.get(*key).and_then(lenient_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty() -> NormalizedPage<Value> {
        NormalizedPage::empty()
    }

    #[test]
    fn test_plain_array_is_returned_as_is() {
        let body = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let page = normalize(&body);
        assert_eq!(page.list, body.as_array().unwrap().clone());
        assert_eq!(page.total, 3);

        assert_eq!(normalize(&json!([])), empty());
    }

    #[test]
    fn test_priority_order_prefers_content_over_items() {
        let body = json!({
            "items": [{"id": 10}],
            "content": [{"id": 1}, {"id": 2}]
        });
        let page = normalize(&body);
        assert_eq!(page.list, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_total_elements_wins_over_length() {
        let body = json!({
            "content": [{"id": 1}, {"id": 2}, {"id": 3}],
            "totalElements": 42,
            "total": 7
        });
        assert_eq!(normalize(&body).total, 42);

        let body = json!({"records": [1, 2], "count": "9"});
        assert_eq!(normalize(&body).total, 9);
    }

    #[test]
    fn test_data_array_uses_sibling_total() {
        let body = json!({"code": 0, "data": [{"id": 1}], "total": 15});
        let page = normalize(&body);
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.total, 15);

        let body = json!({"data": [{"id": 1}, {"id": 2}]});
        assert_eq!(normalize(&body).total, 2);
    }

    #[test]
    fn test_data_object_is_searched_first() {
        let body = json!({
            "code": 200,
            "message": "ok",
            "data": {"content": [{"id": 5}], "totalElements": 31}
        });
        let page = normalize(&body);
        assert_eq!(page.list, vec![json!({"id": 5})]);
        assert_eq!(page.total, 31);
    }

    #[test]
    fn test_depth_first_search_finds_nested_array() {
        let body = json!({
            "meta": {"page": 0},
            "payload": {"wrapper": {"evaluations": [{"id": 1}], "count": 12}}
        });
        let page = normalize(&body);
        assert_eq!(page.list, vec![json!({"id": 1})]);
        assert_eq!(page.total, 12);
    }

    #[test]
    fn test_safe_fallback() {
        assert_eq!(normalize(&json!({})), empty());
        assert_eq!(normalize(&json!({"foo": "bar"})), empty());
        assert_eq!(normalize(&Value::Null), empty());
        assert_eq!(normalize(&json!("text")), empty());
        assert_eq!(normalize(&json!({"data": null})), empty());
    }

    #[test]
    fn test_search_depth_is_bounded() {
        let mut body = json!({"rows": [1, 2, 3]});
        for _ in 0..MAX_SEARCH_DEPTH + 2 {
            body = json!({"next": body});
        }
        assert_eq!(normalize(&body), empty());
    }

    #[test]
    fn test_normalize_as_skips_malformed_records() {
        #[derive(serde::Deserialize)]
        struct Item {
            id: i64,
        }
        let body = json!({"content": [{"id": 1}, {"id": "x"}, {"id": 3}], "totalElements": 3});
        let page = normalize_as::<Item>(&body);
        assert_eq!(page.list.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_unwrap_data() {
        let body = json!({"code": 0, "data": {"id": 7}});
        assert_eq!(unwrap_data(&body), &json!({"id": 7}));
        let body = json!({"id": 7});
        assert_eq!(unwrap_data(&body), &body);
    }
}
