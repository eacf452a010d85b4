//! Dynamics override requests.
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map::Iter, BTreeMap},
    fmt,
    str::FromStr,
};

/// Body attributes that a dynamics override can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DynamicsKey {
    /// Mass of a part.
    Mass,
    /// Size of a part.
    Size,
    /// Length of a part. Dependent parts are moved to stay attached.
    Length,
}

impl DynamicsKey {
    /// Name of the key in an override request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::Size => "size",
            Self::Length => "length",
        }
    }
}

impl FromStr for DynamicsKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mass" => Ok(Self::Mass),
            "size" => Ok(Self::Size),
            "length" => Ok(Self::Length),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DynamicsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat mapping from attribute names to values.
///
/// Keys other than `mass`, `size` and `length` are accepted and carried along but
/// never trigger a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicsOverrides(BTreeMap<String, f64>);

impl DynamicsOverrides {
    /// Sets an arbitrary key.
    pub fn set(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Sets the mass.
    pub fn mass(self, v: f64) -> Self {
        self.set(DynamicsKey::Mass.as_str(), v)
    }

    /// Sets the size.
    pub fn size(self, v: f64) -> Self {
        self.set(DynamicsKey::Size.as_str(), v)
    }

    /// Sets the length.
    pub fn length(self, v: f64) -> Self {
        self.set(DynamicsKey::Length.as_str(), v)
    }

    /// Value requested for a recognized key.
    pub fn get(&self, key: DynamicsKey) -> Option<f64> {
        self.0.get(key.as_str()).copied()
    }

    /// Keys that are not [`DynamicsKey`]s.
    pub fn unrecognized(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|k| k.parse::<DynamicsKey>().is_err())
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> Iter<'_, String, f64> {
        self.0.iter()
    }

    /// Checks if no key is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for DynamicsOverrides {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_and_unrecognized_keys() {
        let overrides = DynamicsOverrides::default()
            .length(0.9)
            .set("stiffness", 3.0)
            .set("Mass", 1.0);
        assert_eq!(overrides.get(DynamicsKey::Length), Some(0.9));
        assert_eq!(overrides.get(DynamicsKey::Mass), None);
        assert_eq!(
            overrides.unrecognized().collect::<Vec<_>>(),
            vec!["Mass", "stiffness"]
        );
    }

    #[test]
    fn test_deserialize_flat_mapping() {
        let overrides: DynamicsOverrides = serde_yaml::from_str("length: 0.5\nmass: 2\n").unwrap();
        assert_eq!(overrides, DynamicsOverrides::default().length(0.5).mass(2.0));
    }
}
