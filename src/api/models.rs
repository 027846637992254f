use crate::core::payload::QueryPayload;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

// GraphQL envelopes
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: SearchVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct SearchVariables<'a> {
    #[serde(rename = "workSearchInput")]
    pub work_search_input: &'a QueryPayload,
}

#[derive(Debug, Deserialize, Default)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Total count plus the page of works the server returned.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SearchResult {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "works", default, deserialize_with = "deserialize_records")]
    pub records: Vec<Record>,
}

/// `works: null` is treated as an empty page.
fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One work record with whatever fields the query selected, in server order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Tagged view of a JSON value as the renderer cares about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Every element is a string. The empty array lands here.
    TextList(Vec<String>),
    Nested(Record),
    /// Non-empty, every element is an object.
    NestedList(Vec<Record>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::Text(s),
            Value::Object(map) => FieldValue::Nested(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                if items.iter().all(Value::is_string) {
                    FieldValue::TextList(
                        items
                            .into_iter()
                            .filter_map(|v| match v {
                                Value::String(s) => Some(s),
                                _ => None,
                            })
                            .collect(),
                    )
                } else if items.iter().all(Value::is_object) {
                    FieldValue::NestedList(
                        items
                            .into_iter()
                            .filter_map(|v| match v {
                                Value::Object(map) => Some(
                                    map.into_iter()
                                        .map(|(k, v)| (k, FieldValue::from(v)))
                                        .collect(),
                                ),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    FieldValue::List(items.into_iter().map(FieldValue::from).collect())
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}
