// ABOUTME: Container image reference used by workload definitions.
// ABOUTME: Parses registry/repository:tag@digest and deserializes straight from config strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("image reference has an empty {0}")]
    EmptyComponent(&'static str),
}

/// An image a container workload runs, e.g. `postgres:16` or
/// `docker.n8n.io/n8nio/n8n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef {
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !"/:.-_@".contains(*c))
        {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let (rest, digest) = match input.split_once('@') {
            Some((_, "")) => return Err(ParseImageRefError::EmptyComponent("digest")),
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        // A colon after the last slash separates the tag; earlier colons
        // belong to a registry port.
        let last_slash = rest.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (rest, tag) = match rest[last_slash..].split_once(':') {
            Some((_, "")) => return Err(ParseImageRefError::EmptyComponent("tag")),
            Some((_, tag)) => (&rest[..rest.len() - tag.len() - 1], Some(tag.to_string())),
            None => (rest, None),
        };

        let (registry, repository) = match rest.split_once('/') {
            Some((first, remainder))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(first.to_string()), remainder.to_string())
            }
            _ => (None, rest.to_string()),
        };

        if repository.is_empty() {
            return Err(ParseImageRefError::EmptyComponent("repository"));
        }

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }

    /// Build a reference from known-good parts; used for built-in defaults.
    pub(crate) fn from_parts(registry: Option<&str>, repository: &str, tag: Option<&str>) -> Self {
        Self {
            registry: registry.map(str::to_string),
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
            digest: None,
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The explicit tag, or `latest` when neither tag nor digest is pinned.
    pub fn tag(&self) -> Option<&str> {
        match (&self.tag, &self.digest) {
            (None, None) => Some("latest"),
            (tag, _) => tag.as_deref(),
        }
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{registry}/")?;
        }
        write!(f, "{}", self.repository)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ParseImageRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_image_with_tag() {
        let img = ImageRef::parse("postgres:16").unwrap();
        assert_eq!(img.repository(), "postgres");
        assert_eq!(img.tag(), Some("16"));
        assert!(img.registry().is_none());
    }

    #[test]
    fn registry_without_tag_defaults_to_latest() {
        let img = ImageRef::parse("docker.n8n.io/n8nio/n8n").unwrap();
        assert_eq!(img.registry(), Some("docker.n8n.io"));
        assert_eq!(img.repository(), "n8nio/n8n");
        assert_eq!(img.tag(), Some("latest"));
        assert_eq!(img.to_string(), "docker.n8n.io/n8nio/n8n");
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        let img = ImageRef::parse("localhost:5000/redis").unwrap();
        assert_eq!(img.registry(), Some("localhost:5000"));
        assert_eq!(img.repository(), "redis");
        assert_eq!(img.tag(), Some("latest"));
    }

    #[test]
    fn digest_pins_without_tag() {
        let img = ImageRef::parse("redis@sha256:abc").unwrap();
        assert_eq!(img.digest(), Some("sha256:abc"));
        assert!(img.tag().is_none());
    }

    #[test]
    fn rejects_whitespace_inside() {
        assert!(matches!(
            ImageRef::parse("redis 7"),
            Err(ParseImageRefError::InvalidChar(' '))
        ));
    }

    #[test]
    fn rejects_empty_tag() {
        assert!(ImageRef::parse("redis:").is_err());
    }
}
