//! Parameter values and decoded parameter assignments.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single candidate value for a hyperparameter.
///
/// Grids are heterogeneous: one parameter may list integers, another floats,
/// strings or booleans. JSON grids deserialize without tags, so
/// `[1, 2.5, "rbf", true]` is a valid candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Collapse an integral float into an integer.
    ///
    /// `3.0` becomes `3`, while `3.5`, `NaN`, infinities and floats outside the
    /// `i64` range are returned unchanged. Non-numeric values pass through.
    pub fn normalized(&self) -> ParamValue {
        match *self {
            ParamValue::Float(f) if f.is_finite() && f.trunc() == f => {
                // i64::MAX as f64 rounds up to 2^63, which is out of range.
                if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    ParamValue::Int(f as i64)
                } else {
                    self.clone()
                }
            }
            _ => self.clone(),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Int(i) => Some(i as f64),
            ParamValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{:?}", x),
            ParamValue::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// A concrete parameter setting: one value per parameter, in search-space order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assignment {
    entries: Vec<(String, ParamValue)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a parameter. Callers keep names unique.
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.entries.push((name.into(), value));
    }

    /// Look up a value by parameter name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_float_collapses() {
        assert_eq!(ParamValue::Float(2.0).normalized(), ParamValue::Int(2));
        assert_eq!(ParamValue::Float(-7.0).normalized(), ParamValue::Int(-7));
    }

    #[test]
    fn test_non_integral_values_pass_through() {
        assert_eq!(ParamValue::Float(0.5).normalized(), ParamValue::Float(0.5));
        assert_eq!(ParamValue::from("rbf").normalized(), ParamValue::from("rbf"));
        assert_eq!(ParamValue::Bool(true).normalized(), ParamValue::Bool(true));
        assert_eq!(ParamValue::Int(4).normalized(), ParamValue::Int(4));

        let nan = ParamValue::Float(f64::NAN).normalized();
        assert!(matches!(nan, ParamValue::Float(f) if f.is_nan()));
        assert_eq!(
            ParamValue::Float(f64::INFINITY).normalized(),
            ParamValue::Float(f64::INFINITY)
        );
        assert_eq!(ParamValue::Float(1e300).normalized(), ParamValue::Float(1e300));
    }

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<ParamValue> = serde_json::from_str(r#"[1, 2.5, "rbf", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ParamValue::Int(1),
                ParamValue::Float(2.5),
                ParamValue::from("rbf"),
                ParamValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_assignment_serializes_in_order() {
        let assignment: Assignment = [("b", ParamValue::from("y")), ("a", ParamValue::Int(2))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&assignment).unwrap();
        assert_eq!(json, r#"{"b":"y","a":2}"#);
        assert_eq!(assignment.to_string(), r#"{b: "y", a: 2}"#);
    }
}
