//! Core value types and operations.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Value represents a JSON/YAML value that can be any of the supported types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

/// Map represents a key-value map where keys are strings.
///
/// Keys keep the order they were read in, which is also the order they are
/// serialized in. Scalar keys that are not strings (`1: one`, `true: x`) are
/// read as their string form.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Map {
    pub fields: IndexMap<String, Value>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the name of this value's type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::UInt(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Follows a chain of map keys from this value. Returns None as soon as
    /// a key is missing or a non-map value is reached.
    pub fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        let mut current = self;
        for key in keys {
            current = current.as_map()?.get(key)?;
        }
        Some(current)
    }

    /// Like [`Value::lookup`], returning the value only if it is a string.
    pub fn lookup_str(&self, keys: &[&str]) -> Option<&str> {
        self.lookup(keys).and_then(Value::as_str)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

// Key order does not take part in equality.
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            fields: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Sets a key. An existing key keeps its position; a new key is
    /// appended.
    pub fn set(&mut self, key: String, value: Value) {
        self.fields.insert(key, value);
    }

    /// Returns the string-valued entries of this map. Entries holding any
    /// other type are skipped, as label and annotation maps only carry
    /// strings.
    pub fn string_entries(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
            .collect()
    }
}

/// A scalar map key as it may appear in YAML.
#[derive(Deserialize)]
#[serde(untagged)]
enum Key {
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Null,
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        match key {
            Key::String(s) => s,
            Key::Bool(b) => b.to_string(),
            Key::Int(i) => i.to_string(),
            Key::UInt(u) => u.to_string(),
            Key::Float(f) => f.to_string(),
            Key::Null => "null".to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Map {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = Map;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with scalar keys")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Map, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<Key, Value>()? {
                    fields.insert(String::from(key), value);
                }
                Ok(Map { fields })
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

#[cfg(test)]
pub(crate) fn from_json(json: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
pub(crate) fn from_yaml(yaml: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_types() {
        assert!(Value::Null.is_null());
        assert!(Value::Map(Map::new()).is_map());
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Float(1.5).type_name(), "float");
        assert_eq!(Value::UInt(u64::MAX).type_name(), "int");
    }

    #[test]
    fn test_map_set_keeps_position() {
        let mut map = Map::new();
        map.set("b".into(), Value::from("1"));
        map.set("a".into(), Value::from("2"));
        map.set("b".into(), Value::from("3"));

        let keys: Vec<_> = map.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&Value::from("3")));
    }

    #[test]
    fn test_lookup() {
        let value = from_yaml(
            r#"
metadata:
  name: web
  labels:
    app: web
    replicas: 3
"#,
        )
        .unwrap();

        assert_eq!(value.lookup_str(&["metadata", "name"]), Some("web"));
        assert_eq!(value.lookup_str(&["metadata", "missing"]), None);
        assert_eq!(value.lookup_str(&["metadata", "name", "deeper"]), None);

        let labels = value.lookup(&["metadata", "labels"]).unwrap().as_map().unwrap();
        let entries: Vec<_> = labels.string_entries().into_iter().collect();
        assert_eq!(entries, vec![("app", "web")]);
    }

    #[test]
    fn test_yaml_scalars() {
        let value = from_yaml("a: 1\nb: 1.5\nc: true\nd: ~\ne: text\n").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(map.get("b"), Some(&Value::Float(1.5)));
        assert_eq!(map.get("c"), Some(&Value::Bool(true)));
        assert_eq!(map.get("d"), Some(&Value::Null));
        assert_eq!(map.get("e"), Some(&Value::from("text")));
    }

    #[test]
    fn test_large_unsigned_integer() {
        let value = from_yaml("big: 18446744073709551615\nsmall: -1\n").unwrap();
        assert_eq!(value.lookup(&["big"]), Some(&Value::UInt(u64::MAX)));
        assert_eq!(value.lookup(&["small"]), Some(&Value::Int(-1)));
        assert_eq!(
            serde_yaml::to_string(&value).unwrap(),
            "big: 18446744073709551615\nsmall: -1\n"
        );
    }

    #[test]
    fn test_scalar_keys_read_as_strings() {
        let value = from_yaml("1: one\ntrue: yes\n2.5: x\nname: n\n").unwrap();
        let keys: Vec<_> = value.as_map().unwrap().fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1", "true", "2.5", "name"]);
        assert_eq!(value.lookup_str(&["1"]), Some("one"));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let value = from_json(r#"{"b": 1, "a": [true, null]}"#).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"b":1,"a":[true,null]}"#);
        assert_eq!(value, from_json(r#"{"a": [true, null], "b": 1}"#).unwrap());
    }
}
