//! CMS response envelopes
//!
//! The CMS wraps every payload in `{ data, meta }`. Older deployments nest each
//! record as `{ id, attributes: {...} }` and each relation as
//! `{ data: { id, attributes } }`; newer ones return flat objects. Both shapes
//! are normalised here so the rest of the crate only sees flat records.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination block reported by the CMS for list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            page_count: 0,
            total: 0,
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

/// `meta` block of a list response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// List response: `{ data: [...], meta: { pagination } }`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ListResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            data: Vec<Value>,
            #[serde(default)]
            meta: Meta,
        }

        let raw = Raw::deserialize(deserializer)?;
        let data = raw
            .data
            .into_iter()
            .map(|entry| serde_json::from_value(flatten_entry(entry)))
            .collect::<Result<Vec<T>, _>>()
            .map_err(serde::de::Error::custom)?;

        Ok(Self { data, meta: raw.meta })
    }
}

/// Single response: `{ data: {...} }`; `data` may be `null`
#[derive(Debug, Clone, Serialize)]
pub struct SingleResponse<T> {
    pub data: Option<T>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for SingleResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            data: Value,
        }

        let raw = Raw::deserialize(deserializer)?;
        let data = match raw.data {
            Value::Null => None,
            entry => Some(serde_json::from_value(flatten_entry(entry)).map_err(serde::de::Error::custom)?),
        };

        Ok(Self { data })
    }
}

/// Turn `{ id, attributes: {...} }` into `{ id, ...attributes }`.
/// Flat records pass through untouched.
pub fn flatten_entry(entry: Value) -> Value {
    match entry {
        Value::Object(mut map) => match map.remove("attributes") {
            Some(Value::Object(attributes)) => {
                for (key, value) in attributes {
                    map.entry(key).or_insert(value);
                }
                Value::Object(map)
            }
            Some(other) => {
                map.insert("attributes".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Unwrap a relation value: `{ data: entry | null }` or a flat entry
pub fn unwrap_relation(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            flatten_entry(map.remove("data").unwrap_or(Value::Null))
        }
        other => flatten_entry(other),
    }
}

/// `deserialize_with` helper for optional single relations (cover, author, category)
pub fn relation<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    match unwrap_relation(value) {
        Value::Null => Ok(None),
        entry => serde_json::from_value(entry).map(Some).map_err(serde::de::Error::custom),
    }
}

/// `deserialize_with` helper for multi relations (slider files)
pub fn relation_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    match unwrap_relation(value) {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| serde_json::from_value(flatten_entry(entry)).map_err(serde::de::Error::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        entry => serde_json::from_value(entry)
            .map(|single| vec![single])
            .map_err(serde::de::Error::custom),
    }
}
