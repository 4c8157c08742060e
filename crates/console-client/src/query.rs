//! 查询参数展开
//!
//! GET/DELETE 的参数先序列化为 JSON，再展开为 `key=value` 对：
//! null 跳过，数组展开为重复的 `key[]=v`，嵌套对象展开为 `key[sub]=v`。

use serde_json::Value;

/// 将 JSON 对象展开为查询参数对；非对象顶层值没有可用的键名，返回空
pub fn to_pairs(value: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Value::Object(map) = value {
        for (key, item) in map {
            push_pairs(&mut pairs, key.clone(), item);
        }
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            let array_key = format!("{}[]", key);
            for item in items {
                push_pairs(pairs, array_key.clone(), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                push_pairs(pairs, format!("{}[{}]", key, sub), item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sorted(mut pairs: Vec<(String, String)>) -> Vec<(String, String)> {
        pairs.sort();
        pairs
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_scalars_and_nulls() {
        let pairs = to_pairs(&json!({
            "advertiser_id": 1001,
            "keyword": "品牌",
            "only_active": true,
            "status": null
        }));

        assert_eq!(
            sorted(pairs),
            vec![
                pair("advertiser_id", "1001"),
                pair("keyword", "品牌"),
                pair("only_active", "true"),
            ]
        );
    }

    #[test]
    fn test_arrays_repeat_key() {
        let pairs = to_pairs(&json!({"ids": [3, 4], "group_by": ["STAT_GROUP_BY_FIELD_STAT_TIME"]}));
        assert_eq!(
            sorted(pairs),
            vec![
                pair("group_by[]", "STAT_GROUP_BY_FIELD_STAT_TIME"),
                pair("ids[]", "3"),
                pair("ids[]", "4"),
            ]
        );
    }

    #[test]
    fn test_nested_objects() {
        let pairs = to_pairs(&json!({"filter": {"min_cost": 10}}));
        assert_eq!(pairs, vec![pair("filter[min_cost]", "10")]);
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(to_pairs(&json!([1, 2])).is_empty());
        assert!(to_pairs(&Value::Null).is_empty());
    }
}
