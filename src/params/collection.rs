//! Parameter collection
//!
//! [`Params`] maps unique parameter names to [`ParamValue`]s. Operations that change
//! values build a new collection; the input is only ever borrowed.

use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::error::{GpParamsError, Result};
use crate::params::value::ParamValue;
use crate::transforms::bounds::Bounds;

/// A named collection of parameter values
///
/// Ordering of keys carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    values: HashMap<String, ParamValue>,
}

impl Params {
    /// Create a new empty collection
    ///
    /// # Examples
    ///
    /// ```
    /// use gpparams_rs::params::Params;
    ///
    /// let params = Params::new().with("lengthscale", 2.0).with("variance", 0.5);
    /// assert_eq!(params.len(), 2);
    /// assert_eq!(params.scalar("variance"), Some(0.5));
    /// ```
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builder-style insert. A value already stored under `key` is replaced.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the one previously stored under `key`
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// The scalar stored under `key`, if there is one
    pub fn scalar(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_scalar)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter names, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// The set of parameter names
    pub fn key_set(&self) -> HashSet<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// Whether both collections hold exactly the same names
    pub fn same_keys(&self, other: &Params) -> bool {
        self.len() == other.len() && self.values.keys().all(|k| other.contains(k))
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, ParamValue> {
        self.values.iter()
    }

    /// Total number of scalar elements across all values
    pub fn num_elements(&self) -> usize {
        self.values.values().map(ParamValue::len).sum()
    }

    /// Build a new collection by mapping every `(key, value)` pair.
    ///
    /// The key set is preserved and `self` is left untouched.
    pub fn map_values<F>(&self, mut f: F) -> Params
    where
        F: FnMut(&str, &ParamValue) -> ParamValue,
    {
        let values = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), f(k, v)))
            .collect();
        Params { values }
    }

    /// Check that every element of every value is finite and strictly positive.
    ///
    /// Opt-in guard for the model boundary; the transformations themselves never check.
    pub fn validate_positive(&self) -> Result<()> {
        self.validate_with(|_| Some(Bounds::positive()), "positive")
    }

    /// Check values against per-key bounds. Keys without bounds are not checked.
    pub fn validate_bounds(&self, bounds: &HashMap<String, Bounds>) -> Result<()> {
        self.validate_with(|key| bounds.get(key).copied(), "bounded")
    }

    fn validate_with<F>(&self, bounds_for: F, label: &str) -> Result<()>
    where
        F: Fn(&str) -> Option<Bounds>,
    {
        for key in self.keys() {
            let Some(bounds) = bounds_for(&key) else {
                continue;
            };
            if let Some(value) = self.values[&key].iter().find(|&v| !bounds.contains(v)) {
                return Err(GpParamsError::DomainViolation {
                    key,
                    value,
                    transformation: label.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = hash_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl std::ops::Index<&str> for Params {
    type Output = ParamValue;

    fn index(&self, key: &str) -> &ParamValue {
        &self.values[key]
    }
}

/// Error type for parameter serialization
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Params {
    /// Save the collection to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), SerializationError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Serialize the collection to a pretty-printed JSON string
    ///
    /// # Examples
    ///
    /// ```
    /// use gpparams_rs::params::Params;
    ///
    /// let params = Params::new().with("variance", 0.5).with("lengthscale", vec![1.0, 2.0]);
    /// let json = params.to_json().unwrap();
    /// assert_eq!(Params::from_json(&json).unwrap(), params);
    /// ```
    pub fn to_json(&self) -> std::result::Result<String, SerializationError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Load a collection from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::result::Result<Self, SerializationError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Deserialize a collection from a JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, SerializationError> {
        let params: Params = serde_json::from_str(json)?;
        Ok(params)
    }
}
