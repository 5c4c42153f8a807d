//! `optreg check`: run the registry generator without writing anything.

use optreg_driver::run_sequence;

use crate::pipeline::{build_generator, load_project, render_diagnostics};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `optreg check` command.
///
/// Returns exit code 0 if no errors, 1 if there are errors.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!("   Checking {}", project.config.project.name);
    }

    let generator = build_generator(&project, args.target.as_deref())?;
    let result = run_sequence(&project.compilation, &[&generator]);
    render_diagnostics(&result.diagnostics, args.format, global);

    Ok(if result.has_errors() { 1 } else { 0 })
}
