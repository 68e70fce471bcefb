//! Input variables passed on the command line.

use serde_json::Value;

use crate::options::TfOption;

/// Input variables in insertion order.
///
/// Serialized as repeated `-var key=value` token pairs: strings are wrapped
/// in double quotes with backslashes and quotes backslash-escaped, objects and
/// arrays are JSON-encoded, and other scalars are written as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    entries: Vec<(String, Value)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing an existing value in place.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encode a single value the way the engine expects it after `key=`.
    pub fn encode_value(value: &Value) -> String {
        match value {
            Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::Object(_) | Value::Array(_) => value.to_string(),
            other => other.to_string(),
        }
    }

    /// Serialize into `-var`, `key=value` token pairs.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            args.push(TfOption::Var.flag_template().to_string());
            args.push(format!("{}={}", key, Self::encode_value(value)));
        }
        args
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (key, value) in iter {
            vars.insert(key, value);
        }
        vars
    }
}

impl From<serde_json::Map<String, Value>> for Variables {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Split `-var key=value` pairs back into (key, encoded value).
    fn pairs(args: &[String]) -> Vec<(String, String)> {
        args.chunks(2)
            .map(|chunk| {
                assert_eq!(chunk[0], "-var");
                let (key, value) = chunk[1].split_once('=').unwrap();
                (key.to_string(), value.to_string())
            })
            .collect()
    }

    #[test]
    fn test_empty_variables_yield_no_tokens() {
        assert!(Variables::new().to_args().is_empty());
    }

    #[test]
    fn test_string_is_quoted_and_escaped() {
        let vars = Variables::new()
            .set("bucket_name", "test_bucket")
            .set("motd", "say \"hi\"");

        assert_eq!(
            vars.to_args(),
            vec![
                "-var",
                "bucket_name=\"test_bucket\"",
                "-var",
                "motd=\"say \\\"hi\\\"\"",
            ]
        );
    }

    #[test]
    fn test_scalars_and_composites() {
        let vars = Variables::new()
            .set("count", 3)
            .set("enabled", true)
            .set("nothing", Value::Null)
            .set("tags", json!({"test1": 1, "test2": null}))
            .set("zones", json!(["a", "b"]));

        let encoded = pairs(&vars.to_args());
        assert_eq!(encoded[0], ("count".to_string(), "3".to_string()));
        assert_eq!(encoded[1], ("enabled".to_string(), "true".to_string()));
        assert_eq!(encoded[2], ("nothing".to_string(), "null".to_string()));
        assert_eq!(
            encoded[3],
            ("tags".to_string(), r#"{"test1":1,"test2":null}"#.to_string())
        );
        assert_eq!(encoded[4], ("zones".to_string(), r#"["a","b"]"#.to_string()));
    }

    #[test]
    fn test_composite_values_decode_back() {
        let nested = json!({"a": {"b": [1, 2, {"c": null}]}, "d": "e\"f"});
        let list = json!([{"x": 1}, [], "y"]);
        let vars = Variables::new().set("nested", nested.clone()).set("list", list.clone());

        let encoded = pairs(&vars.to_args());
        let decoded: Vec<Value> = encoded
            .iter()
            .map(|(_, v)| serde_json::from_str(v).unwrap())
            .collect();
        assert_eq!(decoded, vec![nested, list]);
    }

    #[test]
    fn test_strings_decode_back_after_unescaping() {
        let original = "quote \" inside \"twice\"";
        let vars = Variables::new().set("s", original);

        let (_, encoded) = pairs(&vars.to_args()).remove(0);
        let decoded: String = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_backslashes_survive_decoding() {
        for original in ["C:\\", "a\\\"b", "\\n is not a newline"] {
            let vars = Variables::new().set("path", original);

            let (_, encoded) = pairs(&vars.to_args()).remove(0);
            let decoded: String = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn test_insertion_order_and_overwrite() {
        let mut vars: Variables = vec![("b", json!(1)), ("a", json!(2))].into_iter().collect();
        vars.insert("b", json!(3));

        let keys: Vec<&str> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(vars.get("b"), Some(&json!(3)));
        assert_eq!(vars.len(), 2);
    }
}
