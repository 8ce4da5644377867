//! Discrete hyperparameter search spaces.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ParamValue;

/// One searchable parameter and its candidate values.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<ParamValue>,
}

/// Ordered mapping from parameter name to candidate values.
///
/// Parameter order defines gene order and never changes during a search.
/// Deserializing from a JSON object keeps the document's key order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSpace {
    params: Vec<Parameter>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style parameter insertion.
    pub fn with_param<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.push(name, values);
        self
    }

    pub fn push<V: Into<ParamValue>>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) {
        self.params.push(Parameter {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Number of parameters (the genome length).
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Size of the exhaustive grid, saturating at `u128::MAX`.
    pub fn combinations(&self) -> u128 {
        self.params
            .iter()
            .fold(1u128, |acc, p| acc.saturating_mul(p.values.len() as u128))
    }

    /// Reject spaces the engine cannot search.
    pub fn validate(&self) -> Result<(), SpaceError> {
        if self.params.is_empty() {
            return Err(SpaceError::Empty);
        }
        for (i, param) in self.params.iter().enumerate() {
            if param.values.is_empty() {
                return Err(SpaceError::EmptyCandidates(param.name.clone()));
            }
            if self.params[..i].iter().any(|p| p.name == param.name) {
                return Err(SpaceError::DuplicateName(param.name.clone()));
            }
        }
        Ok(())
    }
}

/// Search space validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpaceError {
    #[error("Search space has no parameters")]
    Empty,
    #[error("Parameter '{0}' has no candidate values")]
    EmptyCandidates(String),
    #[error("Parameter '{0}' is listed more than once")]
    DuplicateName(String),
}

impl Serialize for SearchSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for param in &self.params {
            map.serialize_entry(&param.name, &param.values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SearchSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SearchSpaceVisitor)
    }
}

struct SearchSpaceVisitor;

impl<'de> Visitor<'de> for SearchSpaceVisitor {
    type Value = SearchSpace;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from parameter name to a list of candidate values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut params: Vec<Parameter> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, values)) = access.next_entry::<String, Vec<ParamValue>>()? {
            if params.iter().any(|p| p.name == name) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate parameter '{}'",
                    name
                )));
            }
            params.push(Parameter { name, values });
        }
        Ok(SearchSpace { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_preserves_key_order() {
        let space: SearchSpace =
            serde_json::from_str(r#"{"zeta": [1, 2], "alpha": ["x"], "mid": [true, false]}"#)
                .unwrap();
        let names: Vec<&str> = space.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(space.combinations(), 4);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result: Result<SearchSpace, _> = serde_json::from_str(r#"{"a": [1], "a": [2]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        assert_eq!(SearchSpace::new().validate(), Err(SpaceError::Empty));

        let empty_list = SearchSpace::new()
            .with_param("a", [1, 2])
            .with_param("b", Vec::<i64>::new());
        assert_eq!(
            empty_list.validate(),
            Err(SpaceError::EmptyCandidates("b".to_string()))
        );

        let duplicated = SearchSpace::new().with_param("a", [1]).with_param("a", [2]);
        assert_eq!(
            duplicated.validate(),
            Err(SpaceError::DuplicateName("a".to_string()))
        );

        let ok = SearchSpace::new().with_param("a", [1, 2, 3]).with_param("b", ["x", "y"]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_serialization_roundtrip_keeps_order() {
        let space = SearchSpace::new()
            .with_param("kernel", ["rbf", "linear"])
            .with_param("C", [0.1, 1.0, 10.0]);
        let json = serde_json::to_string(&space).unwrap();
        assert_eq!(json, r#"{"kernel":["rbf","linear"],"C":[0.1,1.0,10.0]}"#);
        let parsed: SearchSpace = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, space);
    }
}
