//! Lookup Strategy Selector.
//!
//! The lookup code shape depends on what the target platform's collection
//! library offers: platforms from [`ALTERNATE_LOOKUP_MIN_MAJOR`] on can
//! query a string-keyed table with a borrowed character span, so one table
//! serves every string form of a key. Older or unknown platforms get one
//! dedicated table per key, queried with owned strings.

use optreg_diagnostics::{catalog, DiagnosticSink};
use optreg_model::{KeyKind, LookupShape, PropertyLookupInfo};

/// First platform major version with alternate-key lookups.
pub const ALTERNATE_LOOKUP_MIN_MAJOR: u32 = 8;

/// Platform family named by a target moniker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `net5.0` and later.
    Net,
    /// `netcoreapp1.0` through `netcoreapp3.1`.
    NetCoreApp,
    /// `netstandard1.x` and `netstandard2.x`.
    NetStandard,
    /// `net20` through `net481`.
    NetFramework,
}

/// A parsed target moniker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPlatform {
    /// Family.
    pub platform: Platform,
    /// Major version.
    pub major: u32,
}

impl TargetPlatform {
    /// Parses a moniker such as `net8.0`, `net9.0-windows`, `netcoreapp3.1`,
    /// `netstandard2.0` or `net48`. Returns `None` for anything else.
    pub fn parse(moniker: &str) -> Option<Self> {
        let lower = moniker.trim().to_ascii_lowercase();
        let bare = lower.split('-').next().unwrap_or_default();
        let (platform, major) = if let Some(rest) = bare.strip_prefix("netcoreapp") {
            (Platform::NetCoreApp, dotted_major(rest)?)
        } else if let Some(rest) = bare.strip_prefix("netstandard") {
            (Platform::NetStandard, dotted_major(rest)?)
        } else if let Some(rest) = bare.strip_prefix("net") {
            if rest.contains('.') {
                let major = dotted_major(rest)?;
                if major < 5 {
                    return None;
                }
                (Platform::Net, major)
            } else {
                (Platform::NetFramework, framework_major(rest)?)
            }
        } else {
            return None;
        };
        Some(Self { platform, major })
    }

    /// Returns `true` if the platform's dictionaries support span-keyed
    /// alternate lookups.
    pub fn supports_alternate_lookup(self) -> bool {
        self.platform == Platform::Net && self.major >= ALTERNATE_LOOKUP_MIN_MAJOR
    }
}

/// `8.0` -> 8. Both components must be numeric.
fn dotted_major(version: &str) -> Option<u32> {
    let (major, minor) = version.split_once('.')?;
    if minor.is_empty() || !minor.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    major.parse().ok()
}

/// `48` -> 4, `472` -> 4.
fn framework_major(digits: &str) -> Option<u32> {
    if !(2..=3).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits[..1].parse().ok()
}

/// Chooses the lookup shape for a target moniker.
///
/// An unrecognised moniker falls back to per-key tables and reports `W204`.
/// A missing moniker falls back silently.
pub fn select_shape(moniker: Option<&str>, sink: &DiagnosticSink) -> LookupShape {
    let Some(moniker) = moniker else {
        tracing::debug!("no target platform, using per-key lookup dictionaries");
        return LookupShape::PerKeyDictionary;
    };
    match TargetPlatform::parse(moniker) {
        Some(target) if target.supports_alternate_lookup() => LookupShape::AlternateLookup,
        Some(target) => {
            tracing::debug!(
                moniker,
                major = target.major,
                "target predates alternate lookups"
            );
            LookupShape::PerKeyDictionary
        }
        None => {
            sink.emit(catalog::warning_unrecognized_moniker(moniker));
            LookupShape::PerKeyDictionary
        }
    }
}

/// How one lookup property's table is built and queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// A table keyed by the property type, queried with the key as given.
    DirectDictionary,
    /// A string-keyed table queried through a span-keyed alternate view,
    /// with overloads for both strings and spans.
    AlternateView,
}

/// Chooses the strategy for `lookup` under `shape`.
///
/// Only string keys compared by a built-in comparison use the alternate
/// view; integer primary keys and keys with a custom comparer always use a
/// direct table.
pub fn select_strategy(lookup: &PropertyLookupInfo, shape: LookupShape) -> GenerationStrategy {
    match (shape, lookup.key_kind(), &lookup.comparer) {
        (LookupShape::AlternateLookup, KeyKind::String, None) => GenerationStrategy::AlternateView,
        _ => GenerationStrategy::DirectDictionary,
    }
}
