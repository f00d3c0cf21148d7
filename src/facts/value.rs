// ABOUTME: Fact values and their structural shape tag.
// ABOUTME: A fact is either a scalar string or an ordered list of strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural shape of a fact. Consumers depend on it, so it never changes
/// for a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactShape {
    Scalar,
    List,
}

impl fmt::Display for FactShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactShape::Scalar => write!(f, "scalar"),
            FactShape::List => write!(f, "list"),
        }
    }
}

/// A published fact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FactValue {
    Scalar(String),
    List(Vec<String>),
}

impl FactValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FactValue::Scalar(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FactValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn shape(&self) -> FactShape {
        match self {
            FactValue::Scalar(_) => FactShape::Scalar,
            FactValue::List(_) => FactShape::List,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FactValue::Scalar(s) => Some(s),
            FactValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FactValue::List(items) => Some(items),
            FactValue::Scalar(_) => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Scalar(s) => write!(f, "{s}"),
            FactValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
