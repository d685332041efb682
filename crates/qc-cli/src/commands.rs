use std::fs;

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use qc_core::{ReportContext, ReportOptions};
use qc_ingest::{ArtifactLocator, PipelineResources};
use qc_model::SubjectIdentity;
use qc_report::{CommandPdfConverter, Renderers, default_registry};

use qc_cli::driver::run_tasks;
use qc_cli::types::RunResult;

use crate::cli::Cli;

pub fn run(cli: &Cli) -> Result<RunResult> {
    let subject =
        SubjectIdentity::new(&cli.sub, cli.ses.as_deref()).context("invalid subject/session")?;
    let span = info_span!("subject", bids_id = %subject.bids_id());
    let _guard = span.enter();

    fs::create_dir_all(&cli.tmp_dir)
        .with_context(|| format!("create temporary directory {}", cli.tmp_dir.display()))?;

    let mut locator = ArtifactLocator::new(&cli.out, &cli.bids, &cli.tmp_dir, subject);
    if let Some(root) = &cli.derivatives {
        locator = locator.with_derivatives_root(root);
    }
    debug!(
        subject_dir = %locator.subject_dir().display(),
        derivatives = %locator.derivatives_root().display(),
        "resolved layout"
    );
    let resources = PipelineResources::new(&cli.pipeline_root);

    let renderers = Renderers::commands(
        cli.capture_cmd
            .clone()
            .unwrap_or_else(|| resources.nifti_capture()),
        cli.surface_cmd
            .clone()
            .unwrap_or_else(|| resources.surface_plot()),
        cli.matrix_cmd
            .clone()
            .unwrap_or_else(|| resources.matrix_plot()),
    );
    let converter = CommandPdfConverter::new(&cli.pdf_cmd, &cli.tmp_dir);

    let ctx = ReportContext::new(locator, resources)
        .with_dataset_description()
        .with_streamlines(&cli.tracts)
        .with_options(ReportOptions {
            cleanup: !cli.nocleanup,
            keep_html: cli.keep_html,
        });

    Ok(run_tasks(
        &ctx,
        &renderers,
        &converter,
        default_registry(),
        &cli.selected_modules(),
    ))
}
