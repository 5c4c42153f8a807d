//! Target platform resolution: merging CLI, configuration and compilation settings.

use crate::types::ProjectConfig;

/// Where the resolved target moniker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    /// Passed on the command line.
    CommandLine,
    /// Set in `optreg.toml`.
    Config,
    /// Recorded in the compilation itself.
    Compilation,
}

/// Resolves the target platform moniker for a generation run.
///
/// Precedence: command-line override, then `target.framework` from the
/// configuration, then the moniker recorded in the compilation. Returns
/// `None` only if none of the three is set.
pub fn resolve_target_framework(
    config: Option<&ProjectConfig>,
    cli_override: Option<&str>,
    compilation_moniker: Option<&str>,
) -> Option<(String, TargetSource)> {
    if let Some(moniker) = cli_override.filter(|m| !m.trim().is_empty()) {
        return Some((moniker.trim().to_string(), TargetSource::CommandLine));
    }
    if let Some(moniker) = config.and_then(|c| c.target.framework.as_deref()) {
        return Some((moniker.trim().to_string(), TargetSource::Config));
    }
    compilation_moniker
        .filter(|m| !m.trim().is_empty())
        .map(|m| (m.trim().to_string(), TargetSource::Compilation))
}
