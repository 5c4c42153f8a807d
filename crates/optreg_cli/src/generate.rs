//! `optreg generate`: run the registry generator and write its units.
//!
//! 1. Load `optreg.toml` and the compilation it names
//! 2. Resolve the target platform and diagnostic policy
//! 3. Run the generator
//! 4. Render diagnostics
//! 5. Write every unit whose content differs from the file on disk

use std::path::PathBuf;

use optreg_driver::run_sequence;

use crate::pipeline::{build_generator, load_project, render_diagnostics, write_units};
use crate::{GenerateArgs, GlobalArgs, ReportFormat};

/// Runs the `optreg generate` command.
///
/// Units are written even when errors are reported, since every valid
/// collection still renders. Returns exit code 1 if there are errors.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!("   Generating {}", project.config.project.name);
    }

    let generator = build_generator(&project, args.target.as_deref())?;
    let result = run_sequence(&project.compilation, &[&generator]);
    render_diagnostics(&result.diagnostics, args.format, global);

    let out_dir = match args.out {
        Some(ref out) => PathBuf::from(out),
        None => project.dir.join(&project.config.output.dir),
    };
    let units = result
        .results
        .iter()
        .filter_map(|run| run.artifact.as_ref())
        .flat_map(|artifact| artifact.units.iter().cloned())
        .collect::<Vec<_>>();
    let summary = write_units(&out_dir, &units)?;

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "    Wrote {} unit(s), {} unchanged, in {}",
            summary.written,
            summary.unchanged,
            out_dir.display()
        );
    }

    Ok(if result.has_errors() { 1 } else { 0 })
}
