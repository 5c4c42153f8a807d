//! Deny/allow overrides for warning diagnostics.

use std::collections::HashSet;

use crate::catalog;
use crate::code::{DiagnosticCode, ParseCodeError};
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Adjusts diagnostics according to configured deny/allow lists.
///
/// Denied codes are promoted to error severity. Allowed codes are dropped,
/// unless the diagnostic is already an error: errors are never suppressed.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticPolicy {
    denied: HashSet<DiagnosticCode>,
    allowed: HashSet<DiagnosticCode>,
}

impl DiagnosticPolicy {
    /// Builds a policy from textual code lists such as `["W202"]`.
    ///
    /// Unknown or unparseable codes are rejected.
    pub fn from_lists(deny: &[String], allow: &[String]) -> Result<Self, ParseCodeError> {
        Ok(Self {
            denied: parse_known(deny)?,
            allowed: parse_known(allow)?,
        })
    }

    /// Returns `true` if no overrides are configured.
    pub fn is_empty(&self) -> bool {
        self.denied.is_empty() && self.allowed.is_empty()
    }

    /// Applies the policy to one diagnostic, returning `None` if it is suppressed.
    pub fn apply(&self, mut diag: Diagnostic) -> Option<Diagnostic> {
        if self.denied.contains(&diag.code) {
            diag.severity = Severity::Error;
            return Some(diag);
        }
        if self.allowed.contains(&diag.code) && !diag.severity.is_error() {
            return None;
        }
        Some(diag)
    }

    /// Applies the policy to a list of diagnostics, preserving order.
    pub fn apply_all(&self, diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diags.into_iter().filter_map(|d| self.apply(d)).collect()
    }
}

fn parse_known(codes: &[String]) -> Result<HashSet<DiagnosticCode>, ParseCodeError> {
    codes
        .iter()
        .map(|s| {
            let code: DiagnosticCode = s.parse()?;
            if catalog::is_known(code) {
                Ok(code)
            } else {
                Err(ParseCodeError(s.clone()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{E104, W201, W202};

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_policy_passes_through() {
        let policy = DiagnosticPolicy::default();
        assert!(policy.is_empty());
        let diag = Diagnostic::warning(W201, "stray");
        assert_eq!(policy.apply(diag.clone()), Some(diag));
    }

    #[test]
    fn deny_promotes_to_error() {
        let policy = DiagnosticPolicy::from_lists(&strings(&["W202"]), &[]).unwrap();
        let out = policy.apply(Diagnostic::warning(W202, "dup")).unwrap();
        assert_eq!(out.severity, Severity::Error);
    }

    #[test]
    fn allow_suppresses_warning() {
        let policy = DiagnosticPolicy::from_lists(&[], &strings(&["w201"])).unwrap();
        assert!(policy.apply(Diagnostic::warning(W201, "stray")).is_none());
    }

    #[test]
    fn allow_never_suppresses_errors() {
        let policy = DiagnosticPolicy::from_lists(&[], &strings(&["E104"])).unwrap();
        assert!(policy.apply(Diagnostic::error(E104, "failed")).is_some());
    }

    #[test]
    fn unknown_code_rejected() {
        assert!(DiagnosticPolicy::from_lists(&strings(&["W999"]), &[]).is_err());
        assert!(DiagnosticPolicy::from_lists(&[], &strings(&["nonsense"])).is_err());
    }

    #[test]
    fn apply_all_keeps_order() {
        let policy = DiagnosticPolicy::from_lists(&[], &strings(&["W201"])).unwrap();
        let out = policy.apply_all(vec![
            Diagnostic::warning(W202, "a"),
            Diagnostic::warning(W201, "b"),
            Diagnostic::error(E104, "c"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].code, W202);
        assert_eq!(out[1].code, E104);
    }
}
