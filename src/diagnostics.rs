// ABOUTME: Diagnostics accumulator for non-fatal warnings during planning and deployment.
// ABOUTME: Collects warnings that shouldn't fail a run but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during graph construction and deployment.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Move every warning of `other` into `self` without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// An eager read whose producer is only reachable through other units.
    pub fn implicit_ordering(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ImplicitOrdering,
            message: message.into(),
        }
    }

    /// A publish replaced a different earlier value.
    pub fn value_changed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ValueChanged,
            message: message.into(),
        }
    }

    /// A unit relied on a default the operator should review.
    pub fn credential_defaults(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CredentialDefaults,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Ordering of an eager read is guaranteed only transitively.
    ImplicitOrdering,
    /// A redeploy overwrote a fact with a different value.
    ValueChanged,
    /// Generated or default credentials are in use.
    CredentialDefaults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::implicit_ordering("database reads Efs/Id"));
        diag.warn(Warning::value_changed("/n8n/stg/Vpc/Id changed"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.count(WarningKind::ValueChanged), 1);
    }

    #[test]
    fn extend_merges_warnings() {
        let mut graph = Diagnostics::default();
        graph.warn(Warning::implicit_ordering("a"));
        let mut run = Diagnostics::default();
        run.warn(Warning::credential_defaults("b"));

        graph.extend(run);
        assert_eq!(graph.warnings().len(), 2);
        assert_eq!(graph.warnings()[1].kind, WarningKind::CredentialDefaults);
    }
}
