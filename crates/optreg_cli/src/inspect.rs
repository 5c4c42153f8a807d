//! `optreg inspect`: print the extracted collection models as JSON.

use optreg_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use tokio_util::sync::CancellationToken;

use crate::pipeline::{build_generator, load_project};
use crate::{GlobalArgs, InspectArgs};

/// Runs the `optreg inspect` command.
///
/// Models go to stdout; diagnostics raised while extracting them go to
/// stderr after the configured deny/allow policy. Nothing is rendered or
/// written.
pub fn run(args: &InspectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let generator = build_generator(&project, args.target.as_deref())?;
    let sink = DiagnosticSink::new();
    let analysis = generator.analyze(&project.compilation, &CancellationToken::new(), &sink)?;

    let report = serde_json::json!({
        "project": project.config.project.name,
        "shape": analysis.shape.label(),
        "collections": analysis.models,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    let renderer = TerminalRenderer::new(global.color);
    let diagnostics = generator.policy().apply_all(sink.take_all());
    for diag in &diagnostics {
        if !global.quiet || diag.severity.is_error() {
            eprintln!("{}", renderer.render(diag));
        }
    }
    Ok(if diagnostics.iter().any(|d| d.severity.is_error()) { 1 } else { 0 })
}
