// ABOUTME: Namespace key builder for cross-unit facts.
// ABOUTME: The only place where fact key strings are assembled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical key identifying one fact: `/<app>/<env>/<category>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactKey(String);

impl FactKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key lives under `prefix` (a namespace root or deeper).
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the key for `(category, name)` within the `(app, env)` namespace.
///
/// `app` and `env` are lower-cased; `category` and `name` keep their case.
/// Every string is accepted. `/` and `%` in `app`, `env` and `category` are
/// percent-encoded so those three always occupy exactly one segment each;
/// `name` may nest (`BastionHost/instance/id`).
pub fn build_key(app: &str, env: &str, category: &str, name: &str) -> FactKey {
    FactKey(format!("{}/{}/{}", root(app, env), escape(category), name))
}

fn root(app: &str, env: &str) -> String {
    format!(
        "/{}/{}",
        escape(&app.to_lowercase()),
        escape(&env.to_lowercase())
    )
}

fn escape(segment: &str) -> String {
    segment.replace('%', "%25").replace('/', "%2F")
}

/// The `(app, env)` pair every unit in one deployment run shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    app: String,
    env: String,
}

impl Namespace {
    pub fn new(app: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            env: env.into(),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    /// Key for a fact in this namespace.
    pub fn key(&self, category: &str, name: &str) -> FactKey {
        build_key(&self.app, &self.env, category, name)
    }

    /// Key prefix shared by every fact in this namespace, with trailing slash.
    pub fn root(&self) -> String {
        format!("{}/", root(&self.app, &self.env))
    }

    /// Resource name prefix, e.g. `n8n-stg`.
    pub fn prefix(&self) -> String {
        format!("{}-{}", self.app.to_lowercase(), self.env.to_lowercase())
    }

    /// Name of a deployable unit, e.g. `N8nStgNetworkStack`.
    pub fn stack_name(&self, label: &str) -> String {
        format!(
            "{}{}{}Stack",
            capitalize(&self.app),
            capitalize(&self.env),
            label
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shape() {
        assert_eq!(build_key("n8n", "stg", "Vpc", "Id").as_str(), "/n8n/stg/Vpc/Id");
    }

    #[test]
    fn app_and_env_are_lowercased() {
        assert_eq!(
            build_key("N8N", "Prod", "Redis", "Host"),
            build_key("n8n", "prod", "Redis", "Host")
        );
    }

    #[test]
    fn category_and_name_keep_case() {
        assert_eq!(
            build_key("n8n", "stg", "ServiceDiscovery", "NamespaceId").as_str(),
            "/n8n/stg/ServiceDiscovery/NamespaceId"
        );
    }

    #[test]
    fn separators_inside_segments_are_escaped() {
        assert_ne!(
            build_key("n8n", "stg", "BastionHost/instance", "id"),
            build_key("n8n", "stg", "BastionHost", "instance/id")
        );
        assert_ne!(build_key("a/b", "c", "X", "y"), build_key("a", "b/c", "X", "y"));
        assert_eq!(
            build_key("a/b", "100%", "Vpc", "Id").as_str(),
            "/a%2Fb/100%25/Vpc/Id"
        );
    }

    #[test]
    fn namespace_helpers() {
        let ns = Namespace::new("n8n", "Stg");
        assert_eq!(ns.root(), "/n8n/stg/");
        assert_eq!(ns.prefix(), "n8n-stg");
        assert_eq!(ns.stack_name("Network"), "N8nStgNetworkStack");
        assert!(ns.key("Efs", "Id").starts_with(&ns.root()));
    }
}
