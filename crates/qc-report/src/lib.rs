//! QC report composition.
//!
//! - [`document`]: typed report tree (blocks, tables, artifacts)
//! - [`html`]: one-shot HTML serialization of the tree
//! - [`render`]: volume, surface and matrix visualization collaborators
//! - [`pdf`]: HTML to PDF conversion
//! - [`sections`]: one builder per pipeline module
//! - [`assemble`]: header + section ordering and report output

pub mod assemble;
pub mod document;
pub mod html;
pub mod pdf;
pub mod render;
pub mod sections;

pub use assemble::{assemble, generate_report, remove_figures, write_report};
pub use document::{
    ArtifactBlock, Block, Cell, FAILED_PLACEHOLDER, Figure, MISSING_PLACEHOLDER, ReportDocument,
    Section, Table, TableKind,
};
pub use html::render_blocks;
pub use pdf::{CommandPdfConverter, DEFAULT_PDF_PROGRAM, PdfConverter};
pub use render::{
    ColorRange, CommandMatrixPlotter, CommandSurfacePlotter, CommandVolumeCapture, MatrixPlot,
    MatrixPlotter, PlotLayout, RenderError, Renderers, SurfaceData, SurfacePlot, SurfacePlotter,
    VolumeCapture, VolumeShot,
};
pub use sections::{SectionBuilder, SectionRegistry, default_registry};
