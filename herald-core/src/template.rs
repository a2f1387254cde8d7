//! Remote Config template model.
//!
//! Only `parameters.<key>.defaultValue.value` is interpreted. Everything else
//! (conditions, parameter groups, conditional values, descriptions, version
//! metadata) is carried in `extra` maps so a read → modify → publish cycle
//! round-trips it untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A full template snapshot as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Concurrency token from the store (HTTP `ETag`, or a content hash for
    /// file-backed stores). Never serialized into the body.
    #[serde(skip)]
    pub etag: Option<String>,
}

/// One template parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `defaultValue` envelope. `useInAppDefault` and friends live in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Parameter {
    /// A plain string parameter: `{"defaultValue": {"value": "<value>"}}`.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            default_value: Some(DefaultValue {
                value: Some(value.into()),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.default_value.as_ref()?.value.as_deref()
    }
}

impl Template {
    /// Build a template from plain key/value pairs.
    pub fn from_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let parameters = values
            .into_iter()
            .map(|(k, v)| (k.into(), Parameter::string(v)))
            .collect();
        Self {
            parameters,
            ..Self::default()
        }
    }

    /// Parameter names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    /// Default string value of `key`, if the parameter exists and has one.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.parameters.get(key)?.value()
    }

    /// Replace `key` with a plain string parameter.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), Parameter::string(value));
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.parameters.remove(key).is_some()
    }

    /// Delete every key in `deletions`, then write every pair in `writes`.
    /// Deletions run first so a key that is both deleted and written ends up
    /// written.
    pub fn apply<'a, D, W>(&mut self, deletions: D, writes: W)
    where
        D: IntoIterator<Item = &'a String>,
        W: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for key in deletions {
            self.parameters.remove(key);
        }
        for (key, value) in writes {
            self.set_string(key.clone(), value.clone());
        }
    }

    /// `version.versionNumber`, when the store included version metadata.
    pub fn version_number(&self) -> Option<String> {
        match self.extra.get("version")?.get("versionNumber")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Overwrite `version.versionNumber`, keeping the rest of the version object.
    pub fn set_version_number(&mut self, number: &str) {
        let version = self
            .extra
            .entry("version")
            .or_insert_with(|| Value::Object(Map::new()));
        if !version.is_object() {
            *version = Value::Object(Map::new());
        }
        if let Value::Object(map) = version {
            map.insert("versionNumber".to_string(), Value::String(number.to_string()));
        }
    }
}
