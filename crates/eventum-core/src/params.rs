//! Immutable run-configuration bag
//!
//! A string-keyed, insertion-ordered mapping of heterogeneous values,
//! supplied to the simulator at construction and read-only afterwards.
//! Bags can be assembled programmatically or loaded from JSON/YAML text.

use crate::error::{SimError, SimResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::ops::Index;

#[derive(Debug, Clone, Default)]
pub struct Params {
    map: IndexMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, consuming the bag
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(name.into(), value.into());
        self
    }

    /// Load a bag from a JSON object
    pub fn from_json_str(text: &str) -> SimResult<Self> {
        let map: IndexMap<String, Value> =
            serde_json::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        Ok(Self { map })
    }

    /// Load a bag from a YAML mapping
    pub fn from_yaml_str(text: &str) -> SimResult<Self> {
        let map: IndexMap<String, Value> =
            serde_yaml::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        Ok(Self { map })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    /// Lookup that surfaces absence as `UnknownName`
    pub fn req(&self, name: &str) -> SimResult<&Value> {
        self.map
            .get(name)
            .ok_or_else(|| SimError::UnknownName(name.to_string()))
    }

    pub fn get_f64(&self, name: &str) -> SimResult<f64> {
        self.req(name)?.as_f64().ok_or(SimError::ParamType {
            name: name.to_string(),
            expected: "a number",
        })
    }

    pub fn get_u64(&self, name: &str) -> SimResult<u64> {
        self.req(name)?.as_u64().ok_or(SimError::ParamType {
            name: name.to_string(),
            expected: "an unsigned integer",
        })
    }

    pub fn get_i64(&self, name: &str) -> SimResult<i64> {
        self.req(name)?.as_i64().ok_or(SimError::ParamType {
            name: name.to_string(),
            expected: "an integer",
        })
    }

    pub fn get_str(&self, name: &str) -> SimResult<&str> {
        self.req(name)?.as_str().ok_or(SimError::ParamType {
            name: name.to_string(),
            expected: "a string",
        })
    }

    pub fn get_bool(&self, name: &str) -> SimResult<bool> {
        self.req(name)?.as_bool().ok_or(SimError::ParamType {
            name: name.to_string(),
            expected: "a boolean",
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The backing name → value mapping
    pub fn as_map(&self) -> &IndexMap<String, Value> {
        &self.map
    }
}

impl Index<&str> for Params {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get(name)
            .unwrap_or_else(|| panic!("{}", SimError::UnknownName(name.to_string())))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
