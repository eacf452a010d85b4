//! Nested reward-parameter trees.
//!
//! A [`ParamTree`] maps parameter-group names (e.g. `centered`, `small_control`) to
//! option mappings (e.g. `sigmoid`, `margin`, `value_at_margin`, `bounds`). Values are
//! held as [`ParamValue`], which deserializes untagged, so trees can be written
//! directly in YAML or JSON:
//!
//! ```rust
//! use ccs_core::ParamTree;
//!
//! let tree: ParamTree = serde_yaml::from_str(
//!     "speed:\n  margin: 10\n  sigmoid: linear\n  bounds: [10, .inf]\n",
//! ).unwrap();
//! assert_eq!(tree.get_map("speed").unwrap().get_text("sigmoid").unwrap(), "linear");
//! ```
use crate::error::ParamError;
use serde::{Deserialize, Serialize};
use std::collections::{
    btree_map::{IntoIter, Iter, Keys},
    BTreeMap,
};

/// A value stored in a [`ParamTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A numeric option such as `margin`.
    Number(f64),

    /// A textual option such as `sigmoid`.
    Text(String),

    /// A sequence, e.g. `bounds`.
    List(Vec<ParamValue>),

    /// A nested mapping.
    Map(ParamTree),
}

impl ParamValue {
    /// Returns the nested mapping if this value is one.
    pub fn as_map(&self) -> Option<&ParamTree> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the number if this value is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<ParamTree> for ParamValue {
    fn from(v: ParamTree) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// An ordered mapping from keys to [`ParamValue`]s.
///
/// Iteration order is the lexicographic order of the keys, which keeps merge results
/// and serialized trees deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamTree(BTreeMap<String, ParamValue>);

impl ParamTree {
    /// Creates an empty tree.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a tree from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, ParamValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, String, ParamValue> {
        self.0.keys()
    }

    /// Returns an iterator over the key-value pairs.
    pub fn iter(&self) -> Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    /// Inserts a key-value pair, returning the previous value if any.
    pub fn insert(&mut self, k: impl Into<String>, v: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(k.into(), v.into())
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, k: &str) -> Option<ParamValue> {
        self.0.remove(k)
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&ParamValue> {
        self.0.get(k)
    }

    /// Gets a mutable reference to the value associated with the given key.
    pub fn get_mut(&mut self, k: &str) -> Option<&mut ParamValue> {
        self.0.get_mut(k)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    /// Number of entries at the top level.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn lookup(&self, k: &str) -> Result<&ParamValue, ParamError> {
        self.0
            .get(k)
            .ok_or_else(|| ParamError::KeyNotFound(k.to_string()))
    }

    /// Gets a number.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a number.
    pub fn get_number(&self, k: &str) -> Result<f64, ParamError> {
        match self.lookup(k)? {
            ParamValue::Number(v) => Ok(*v),
            _ => Err(ParamError::TypeMismatch {
                key: k.to_string(),
                expected: "number",
            }),
        }
    }

    /// Gets a string.
    pub fn get_text(&self, k: &str) -> Result<&str, ParamError> {
        match self.lookup(k)? {
            ParamValue::Text(v) => Ok(v.as_str()),
            _ => Err(ParamError::TypeMismatch {
                key: k.to_string(),
                expected: "string",
            }),
        }
    }

    /// Gets a list of numbers, e.g. `bounds`.
    pub fn get_numbers(&self, k: &str) -> Result<Vec<f64>, ParamError> {
        match self.lookup(k)? {
            ParamValue::List(vs) => vs
                .iter()
                .map(|v| {
                    v.as_number().ok_or_else(|| ParamError::TypeMismatch {
                        key: k.to_string(),
                        expected: "list of numbers",
                    })
                })
                .collect(),
            _ => Err(ParamError::TypeMismatch {
                key: k.to_string(),
                expected: "list of numbers",
            }),
        }
    }

    /// Gets a nested mapping.
    pub fn get_map(&self, k: &str) -> Result<&ParamTree, ParamError> {
        self.lookup(k)?
            .as_map()
            .ok_or_else(|| ParamError::NotAMapping(k.to_string()))
    }

    /// Gets a mutable nested mapping.
    pub fn get_map_mut(&mut self, k: &str) -> Result<&mut ParamTree, ParamError> {
        match self.0.get_mut(k) {
            Some(ParamValue::Map(m)) => Ok(m),
            Some(_) => Err(ParamError::NotAMapping(k.to_string())),
            None => Err(ParamError::KeyNotFound(k.to_string())),
        }
    }
}

impl IntoIterator for ParamTree {
    type Item = (String, ParamValue);
    type IntoIter = IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for ParamTree {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Builds a [`ParamTree`] from `key => value` pairs.
///
/// Values go through [`Into<ParamValue>`], so numbers, strings, vectors and nested
/// trees can be mixed.
///
/// ```rust
/// use ccs_core::param_tree;
///
/// let tree = param_tree! {
///     "speed" => param_tree! { "margin" => 1.0, "sigmoid" => "linear" },
/// };
/// assert_eq!(tree.len(), 1);
/// ```
#[macro_export]
macro_rules! param_tree {
    () => { $crate::ParamTree::empty() };
    ($($k:expr => $v:expr),+ $(,)?) => {{
        let mut tree = $crate::ParamTree::empty();
        $( tree.insert($k, $v); )+
        tree
    }};
}
