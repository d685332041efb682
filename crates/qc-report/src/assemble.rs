//! Report assembly and output.
//!
//! A report is the fixed header (banner, dataset name, subject line),
//! followed by the module header, the QC summary and the section body.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use qc_core::ReportContext;
use qc_ingest::report_path_for;

use crate::document::{Block, ReportDocument, Section};
use crate::pdf::PdfConverter;
use crate::render::Renderers;
use crate::sections::SectionBuilder;
use crate::sections::common::header_blocks;

/// Orders the header and `section` into a complete document.
pub fn assemble(ctx: &ReportContext, section: &Section) -> ReportDocument {
    let mut doc = ReportDocument::new(format!("{} {}", ctx.bids_id(), section.title));
    for block in header_blocks(ctx) {
        doc.push(block);
    }
    doc.push(Block::ModuleHeader(section.title.clone()));
    doc.push(Block::Heading("QC summary".to_string()));
    doc.push(Block::Table(section.summary.clone()));
    for block in section.blocks() {
        doc.push(block.clone());
    }
    doc.push(Block::Footer(format!(
        "Generated {} by qc-report {}",
        ctx.generated_at_display(),
        env!("CARGO_PKG_VERSION")
    )));
    doc
}

/// Serializes `doc` and converts it to a PDF at `dest`.
///
/// With `keep_html` the page is also written next to the PDF.
pub fn write_report(
    doc: &ReportDocument,
    dest: &Path,
    converter: &dyn PdfConverter,
    keep_html: bool,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }
    let html = doc.to_html()?;
    if keep_html {
        let page = dest.with_extension("html");
        fs::write(&page, &html).with_context(|| format!("write {}", page.display()))?;
    }
    converter
        .convert(&html, dest)
        .with_context(|| format!("convert report to {}", dest.display()))?;
    Ok(())
}

/// Removes intermediate figures. Files already gone are ignored.
pub fn remove_figures(figures: &[PathBuf]) {
    for figure in figures {
        if let Err(error) = fs::remove_file(figure)
            && error.kind() != std::io::ErrorKind::NotFound
        {
            debug!(path = %figure.display(), %error, "could not remove figure");
        }
    }
}

/// Builds, assembles and writes the report for one status file.
///
/// Returns the PDF path, or `None` when the module is not complete.
pub fn generate_report(
    ctx: &ReportContext,
    renderers: &Renderers,
    converter: &dyn PdfConverter,
    builder: &dyn SectionBuilder,
    status_path: &Path,
) -> Result<Option<PathBuf>> {
    let Some(section) = builder.build(ctx, renderers, status_path)? else {
        debug!(status_file = %status_path.display(), "module not complete, skipping");
        return Ok(None);
    };
    let doc = assemble(ctx, &section);
    let dest = report_path_for(status_path);
    let result = write_report(&doc, &dest, converter, ctx.options.keep_html);
    if ctx.options.cleanup {
        remove_figures(&section.figures);
    }
    result?;
    info!(
        report = %dest.display(),
        missing = doc.missing_count(),
        failed = doc.failed_count(),
        "report written"
    );
    Ok(Some(dest))
}
