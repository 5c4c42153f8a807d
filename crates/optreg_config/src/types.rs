//! Configuration types deserialized from `optreg.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `optreg.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata and the symbol dump to generate from.
    pub project: ProjectMeta,
    /// Target platform settings.
    #[serde(default)]
    pub target: TargetConfig,
    /// Where generated units are written.
    #[serde(default)]
    pub output: OutputConfig,
    /// Deny/allow overrides for warning codes.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Core project metadata required in every `optreg.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Path (relative to the project directory) of the serialized compilation.
    pub compilation: String,
}

/// Target platform settings.
#[derive(Debug, Default, Deserialize)]
pub struct TargetConfig {
    /// Platform moniker overriding the one recorded in the compilation,
    /// e.g. `"net8.0"`.
    pub framework: Option<String>,
}

/// Output settings for generated units.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory (relative to the project directory) for generated units.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "generated".to_string()
}

/// Diagnostic overrides, given as codes such as `"W202"`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Warning codes promoted to errors.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Warning codes suppressed entirely.
    #[serde(default)]
    pub allow: Vec<String>,
}
