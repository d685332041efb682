//! Per-module report tasks.
//!
//! Each status record found for a selected module is one task. A task
//! failure is logged and recorded; it never stops the remaining tasks.

use std::path::Path;

use tracing::{debug, error, info, info_span, warn};

use qc_core::ReportContext;
use qc_ingest::find_status_files;
use qc_model::ModuleKind;
use qc_report::{PdfConverter, Renderers, SectionBuilder, SectionRegistry, generate_report};

use crate::types::{RunResult, TaskOutcome, TaskResult};

/// Generates a report for every status record of every module in `modules`.
///
/// Modules are visited in the order given; records of one module in file
/// name order.
pub fn run_tasks(
    ctx: &ReportContext,
    renderers: &Renderers,
    converter: &dyn PdfConverter,
    registry: &SectionRegistry,
    modules: &[ModuleKind],
) -> RunResult {
    let mut result = RunResult::new(ctx.bids_id());
    let qc_dir = ctx.locator.qc_dir();

    for &module in modules {
        let Some(builder) = registry.get(module) else {
            warn!(module = module.tag(), "no section builder registered");
            continue;
        };
        let status_files = match find_status_files(&qc_dir, ctx.bids_id(), module) {
            Ok(files) => files,
            Err(error) => {
                warn!(module = module.tag(), %error, "status records unavailable");
                continue;
            }
        };
        if status_files.is_empty() {
            debug!(module = module.tag(), "no status record");
        }
        for status_file in status_files {
            let outcome = run_task(ctx, renderers, converter, builder, &status_file);
            result.tasks.push(TaskResult {
                module,
                status_file,
                outcome,
            });
        }
    }

    info!(
        rendered = result.rendered(),
        skipped = result.skipped(),
        failed = result.failed(),
        "QC reports finished"
    );
    result
}

fn run_task(
    ctx: &ReportContext,
    renderers: &Renderers,
    converter: &dyn PdfConverter,
    builder: &dyn SectionBuilder,
    status_file: &Path,
) -> TaskOutcome {
    let span = info_span!(
        "module",
        module = builder.module().tag(),
        status_file = %status_file.display()
    );
    let _guard = span.enter();
    match generate_report(ctx, renderers, converter, builder, status_file) {
        Ok(Some(report)) => TaskOutcome::Rendered(report),
        Ok(None) => TaskOutcome::Skipped,
        Err(error) => {
            let message = format!("{error:#}");
            error!(error = %message, "report generation failed");
            TaskOutcome::Failed(message)
        }
    }
}
