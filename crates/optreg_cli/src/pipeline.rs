//! Shared pipeline helpers for CLI commands.
//!
//! Project root resolution, configuration and compilation loading,
//! generator construction, diagnostic rendering and writing generated
//! units to disk.

use std::fs;
use std::path::{Path, PathBuf};

use optreg_common::ContentHash;
use optreg_config::{resolve_target_framework, ProjectConfig, TargetSource, CONFIG_FILE_NAME};
use optreg_diagnostics::{
    Diagnostic, DiagnosticPolicy, DiagnosticRenderer, JsonRenderer, Severity, TerminalRenderer,
};
use optreg_driver::RegistryGenerator;
use optreg_emit::SourceUnit;
use optreg_symbols::{Compilation, SymbolQuery};

use crate::{GlobalArgs, ReportFormat};

/// A loaded project: its directory, configuration and compilation.
pub struct Project {
    /// Directory containing `optreg.toml`.
    pub dir: PathBuf,
    /// Parsed configuration.
    pub config: ProjectConfig,
    /// The compilation named by `project.compilation`.
    pub compilation: Compilation,
}

/// Walks up from `start` looking for the nearest directory containing `optreg.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the configuration file from global CLI args.
///
/// `--config` may name the file itself or its directory. Without it, the
/// current directory and its parents are searched.
pub fn resolve_config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_dir() {
                Ok(p.join(CONFIG_FILE_NAME))
            } else {
                Ok(p)
            }
        }
        None => Ok(find_project_root(&std::env::current_dir()?)?.join(CONFIG_FILE_NAME)),
    }
}

/// Loads the configuration and the compilation it names.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let config_path = resolve_config_path(global)?;
    let dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = optreg_config::load_config_file(&config_path)?;
    let compilation = Compilation::load(&dir.join(&config.project.compilation))?;
    tracing::debug!(
        project = %config.project.name,
        types = compilation.types().len(),
        references = compilation.references().len(),
        "loaded project"
    );
    Ok(Project {
        dir,
        config,
        compilation,
    })
}

/// Builds the registry generator for `project`.
///
/// The target platform follows command line, then configuration, then the
/// compilation. Deny/allow lists come from the configuration.
pub fn build_generator(
    project: &Project,
    cli_target: Option<&str>,
) -> Result<RegistryGenerator, Box<dyn std::error::Error>> {
    let diagnostics = &project.config.diagnostics;
    let policy = DiagnosticPolicy::from_lists(&diagnostics.deny, &diagnostics.allow)?;
    let mut generator = RegistryGenerator::new().with_policy(policy);
    let resolved = resolve_target_framework(
        Some(&project.config),
        cli_target,
        project.compilation.target_framework(),
    );
    match resolved {
        Some((moniker, source)) => {
            tracing::debug!(moniker = %moniker, source = source_label(source), "target platform");
            generator = generator.with_target_framework(moniker);
        }
        None => tracing::debug!("no target platform configured"),
    }
    Ok(generator)
}

fn source_label(source: TargetSource) -> &'static str {
    match source {
        TargetSource::CommandLine => "command line",
        TargetSource::Config => "optreg.toml",
        TargetSource::Compilation => "compilation",
    }
}

/// Counts of errors and warnings in `diags`.
pub fn count_severities(diags: &[Diagnostic]) -> (usize, usize) {
    let errors = diags.iter().filter(|d| d.severity == Severity::Error).count();
    let warnings = diags
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    (errors, warnings)
}

/// Renders diagnostics to stderr (text) or stdout (JSON).
pub fn render_diagnostics(diags: &[Diagnostic], format: ReportFormat, global: &GlobalArgs) {
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in diags {
                if global.quiet && diag.severity != Severity::Error {
                    continue;
                }
                eprintln!("{}", renderer.render(diag));
            }
            if !global.quiet {
                let (errors, warnings) = count_severities(diags);
                eprintln!("   Result: {errors} error(s), {warnings} warning(s)");
            }
        }
        ReportFormat::Json => {
            println!("{}", JsonRenderer::new(true).render_all(diags));
        }
    }
}

/// What [`write_units`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Files created or overwritten.
    pub written: usize,
    /// Files whose content was already current.
    pub unchanged: usize,
}

/// Writes `units` into `dir`, skipping files whose content hash already
/// matches the unit.
pub fn write_units(dir: &Path, units: &[SourceUnit]) -> std::io::Result<WriteSummary> {
    fs::create_dir_all(dir)?;
    let mut summary = WriteSummary::default();
    for unit in units {
        let path = dir.join(&unit.hint_name);
        let current = fs::read(&path)
            .ok()
            .map(|bytes| ContentHash::from_bytes(&bytes));
        if current == Some(unit.content_hash) {
            summary.unchanged += 1;
            continue;
        }
        tracing::debug!(path = %path.display(), "writing unit");
        fs::write(&path, &unit.text)?;
        summary.written += 1;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_common::FingerprintBuilder;
    use optreg_emit::UnitStatus;
    use tempfile::TempDir;

    fn unit(hint: &str, text: &str) -> SourceUnit {
        SourceUnit {
            hint_name: hint.to_string(),
            collection: "Widgets".to_string(),
            text: text.to_string(),
            content_hash: ContentHash::from_bytes(text.as_bytes()),
            fingerprint: FingerprintBuilder::new("unit").finish(),
            status: UnitStatus::Fresh,
        }
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let sub = tmp.path().join("src").join("nested");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find optreg.toml"));
    }

    #[test]
    fn config_path_from_directory() {
        let tmp = TempDir::new().unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(tmp.path().display().to_string()),
        };
        assert_eq!(
            resolve_config_path(&global).unwrap(),
            tmp.path().join(CONFIG_FILE_NAME)
        );
    }

    #[test]
    fn writes_only_changed_units() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("generated");
        let units = vec![unit("Demo.A.g.cs", "a"), unit("Demo.B.g.cs", "b")];
        let first = write_units(&out, &units).unwrap();
        assert_eq!(first, WriteSummary { written: 2, unchanged: 0 });

        let changed = vec![unit("Demo.A.g.cs", "a"), unit("Demo.B.g.cs", "b2")];
        let second = write_units(&out, &changed).unwrap();
        assert_eq!(second, WriteSummary { written: 1, unchanged: 1 });
        assert_eq!(fs::read_to_string(out.join("Demo.B.g.cs")).unwrap(), "b2");
    }

    #[test]
    fn counts_severities() {
        let diags = vec![
            optreg_diagnostics::catalog::warning_unrecognized_moniker("uap10.0"),
            optreg_diagnostics::catalog::error_symbol_query_failed("optreg", "down"),
        ];
        assert_eq!(count_severities(&diags), (1, 1));
    }
}
