//! Stable diagnostic codes and helper constructors.
//!
//! Error codes `E101`--`E108` cover failures that exclude a collection or an
//! option from the generated output (or indicate a generator bug). Warning
//! codes `W201`--`W204` cover recoverable problems where generation degrades
//! gracefully.

use crate::code::{Category, DiagnosticCode};
use crate::diagnostic::Diagnostic;
use optreg_common::SourceLocation;

/// Collection base type reference is missing or cannot be resolved.
pub const E101: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);

/// Two options in one collection share a logical name.
pub const E102: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);

/// Abstract lookup property has no override in the generated empty sentinel.
pub const E103: DiagnosticCode = DiagnosticCode::new(Category::Error, 103);

/// Generation failed for a specific option.
pub const E104: DiagnosticCode = DiagnosticCode::new(Category::Error, 104);

/// Internal invariant violated while emitting a registry.
pub const E105: DiagnosticCode = DiagnosticCode::new(Category::Error, 105);

/// Marker annotation argument is malformed.
pub const E106: DiagnosticCode = DiagnosticCode::new(Category::Error, 106);

/// Two collections would generate the same registry type.
pub const E107: DiagnosticCode = DiagnosticCode::new(Category::Error, 107);

/// The host symbol query failed and the generator pass was abandoned.
pub const E108: DiagnosticCode = DiagnosticCode::new(Category::Error, 108);

/// Option candidate does not derive from any collection base type.
pub const W201: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);

/// Two options share a key value on a single-valued lookup.
pub const W202: DiagnosticCode = DiagnosticCode::new(Category::Warning, 202);

/// Option from a referenced assembly is not publicly accessible.
pub const W203: DiagnosticCode = DiagnosticCode::new(Category::Warning, 203);

/// Target platform moniker was not recognised.
pub const W204: DiagnosticCode = DiagnosticCode::new(Category::Warning, 204);

/// Every code the generator can emit, with a one-line description.
pub const ALL: &[(DiagnosticCode, &str)] = &[
    (E101, "invalid collection base type"),
    (E102, "duplicate option name"),
    (E103, "abstract lookup property without empty override"),
    (E104, "option generation failed"),
    (E105, "internal emitter invariant violated"),
    (E106, "malformed marker argument"),
    (E107, "duplicate registry type"),
    (E108, "symbol query failed"),
    (W201, "candidate is not an option of any collection"),
    (W202, "duplicate lookup key value"),
    (W203, "inaccessible referenced option"),
    (W204, "unrecognised target moniker"),
];

/// Returns `true` if `code` is part of the stable catalogue.
pub fn is_known(code: DiagnosticCode) -> bool {
    ALL.iter().any(|(c, _)| *c == code)
}

/// Creates an `E101` diagnostic for an unusable collection base type.
pub fn error_invalid_base_type(
    collection: &str,
    detail: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(
        E101,
        format!("collection `{collection}` has an invalid base type: {detail}"),
    )
    .at(location)
    .with_help("pass the option base type as the first argument of the collection marker")
}

/// Creates an `E102` diagnostic for a logical name registered twice.
pub fn error_duplicate_option_name(
    collection: &str,
    name: &str,
    first_type: &str,
    second_type: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(
        E102,
        format!("option name `{name}` is registered more than once in collection `{collection}`"),
    )
    .at(location)
    .with_note(format!("first registered by `{first_type}`"))
    .with_note(format!("registered again by `{second_type}`"))
}

/// Creates an `E103` diagnostic for an abstract lookup property the empty
/// sentinel cannot implement.
pub fn error_abstract_lookup_without_override(
    collection: &str,
    property: &str,
    property_type: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(
        E103,
        format!(
            "abstract lookup property `{property}` has no override in the empty sentinel of `{collection}`"
        ),
    )
    .at(location)
    .with_note(format!("`{property_type}` has no implicit empty value"))
    .with_help("set `EmptyValue` on the lookup marker or make the property nullable")
}

/// Creates an `E104` diagnostic wrapping the reason an option could not be generated.
pub fn error_option_generation_failed(
    option: &str,
    reason: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(E104, format!("generation failed for option `{option}`"))
        .at(location)
        .with_note(reason.to_string())
}

/// Creates an `E105` diagnostic for an emitter invariant violation.
pub fn error_internal_invariant(collection: &str, detail: &str) -> Diagnostic {
    Diagnostic::of(
        E105,
        format!("internal error while emitting collection `{collection}`: {detail}"),
    )
}

/// Creates an `E106` diagnostic for a malformed marker argument.
pub fn error_malformed_marker(
    marker: &str,
    argument: &str,
    detail: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(
        E106,
        format!("malformed `{argument}` argument on `{marker}`: {detail}"),
    )
    .at(location)
}

/// Creates an `E107` diagnostic for two collections emitting the same type.
pub fn error_duplicate_registry(type_name: &str, location: Option<SourceLocation>) -> Diagnostic {
    Diagnostic::of(
        E107,
        format!("registry type `{type_name}` is declared by more than one collection"),
    )
    .at(location)
}

/// Creates an `E108` diagnostic for a failed host symbol query.
pub fn error_symbol_query_failed(generator: &str, detail: &str) -> Diagnostic {
    Diagnostic::of(
        E108,
        format!("generator `{generator}` failed to query symbols: {detail}"),
    )
}

/// Creates a `W201` diagnostic for a marked type outside every collection.
pub fn warning_not_an_option(type_name: &str, location: Option<SourceLocation>) -> Diagnostic {
    Diagnostic::of(
        W201,
        format!("`{type_name}` is marked as an option but does not derive from any collection base type"),
    )
    .at(location)
}

/// Creates a `W202` diagnostic for a key value shared by two options.
pub fn warning_duplicate_key_value(
    collection: &str,
    property: &str,
    value: &str,
    first: &str,
    second: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(
        W202,
        format!("options `{first}` and `{second}` share {property} = {value} in collection `{collection}`"),
    )
    .at(location)
    .with_note(format!("lookups by {property} return `{first}`"))
    .with_help("mark the lookup with `AllowMultiple = true` if keys may repeat")
}

/// Creates a `W203` diagnostic for a non-public option in a referenced assembly.
pub fn warning_inaccessible_reference(
    type_name: &str,
    assembly: &str,
    location: Option<SourceLocation>,
) -> Diagnostic {
    Diagnostic::of(
        W203,
        format!("option `{type_name}` in referenced assembly `{assembly}` is not public and was skipped"),
    )
    .at(location)
}

/// Creates a `W204` diagnostic for an unrecognised target moniker.
pub fn warning_unrecognized_moniker(moniker: &str) -> Diagnostic {
    Diagnostic::of(
        W204,
        format!("target platform `{moniker}` is not recognised; using per-key lookup dictionaries"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    #[test]
    fn codes_are_unique() {
        for (i, (a, _)) in ALL.iter().enumerate() {
            for (b, _) in &ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn category_matches_constructor_severity() {
        assert_eq!(
            error_option_generation_failed("Added", "no constructor", None).severity,
            Severity::Error
        );
        assert_eq!(
            warning_not_an_option("Stray", None).severity,
            Severity::Warning
        );
    }

    #[test]
    fn generation_failure_wraps_reason_as_note() {
        let diag = error_option_generation_failed("Added", "no usable constructor", None);
        assert_eq!(diag.code, E104);
        assert_eq!(diag.notes, vec!["no usable constructor".to_string()]);
    }

    #[test]
    fn is_known_recognizes_catalogue() {
        assert!(is_known(W202));
        assert!(!is_known(DiagnosticCode::new(Category::Warning, 999)));
    }
}
