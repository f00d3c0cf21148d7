// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles namespace segments and explicit availability zone lists.

use nonempty::NonEmpty;
use serde::Deserialize;

/// Check a value used as a fact key segment.
pub fn validate_segment(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| c.is_whitespace() || *c == '/' || c.is_control())
    {
        return Err(format!("{field} contains invalid character {c:?}"));
    }
    Ok(())
}

pub fn deserialize_app<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    validate_segment("app", &s).map_err(serde::de::Error::custom)?;
    Ok(s)
}

pub fn deserialize_zones<'de, D>(deserializer: D) -> Result<Option<NonEmpty<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<Vec<String>> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(values) => NonEmpty::from_vec(values)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("availability_zones cannot be empty")),
    }
}
