//! Building blocks shared by the section builders.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use qc_core::{ConnectomeProfile, ReportContext, map_to_labels};
use qc_ingest::{discover_atlases, read_json, read_labels, read_matrix};
use qc_model::{Matrix, ModuleKind, SurfDescriptor};

use crate::document::{ArtifactBlock, Block, Cell, Section};
use crate::render::{
    ColorRange, MatrixPlot, PlotLayout, Renderers, SurfaceData, SurfacePlot, VolumeShot,
};

/// Green-to-red colour map used for curvature.
pub const CURVATURE_CMAP: &str = "curvature";
/// Qualitative colour map for surface labels.
pub const LABEL_CMAP: &str = "labels";
/// Flat grey used for bare meshes.
pub const MESH_CMAP: &str = "grey";

/// Produces figures for one section and remembers every file it wrote.
pub struct Visualizer<'a> {
    ctx: &'a ReportContext,
    renderers: &'a Renderers,
    figures: Vec<PathBuf>,
}

impl<'a> Visualizer<'a> {
    pub fn new(ctx: &'a ReportContext, renderers: &'a Renderers) -> Self {
        Self {
            ctx,
            renderers,
            figures: Vec::new(),
        }
    }

    pub fn ctx(&self) -> &'a ReportContext {
        self.ctx
    }

    /// Scratch path for a figure named `name`.
    pub fn figure_path(&self, name: &str) -> PathBuf {
        self.ctx.locator.scratch(name)
    }

    /// Screenshot block for a volume, or a placeholder when it is absent.
    ///
    /// `reference` is drawn underneath when it exists. The screenshot is
    /// written to `<scratch>/<bids_id>_<figure>`.
    pub fn volume(
        &mut self,
        name: &str,
        volume: &Path,
        reference: Option<&Path>,
        roi: bool,
        figure: &str,
    ) -> Block {
        if !volume.is_file() {
            debug!(artifact = name, path = %volume.display(), "artifact missing");
            return Block::Artifact(ArtifactBlock::missing(name));
        }
        let shot = VolumeShot {
            volume: volume.to_path_buf(),
            reference: reference.filter(|path| path.is_file()).map(Path::to_path_buf),
            roi,
            output: self.ctx.locator.scratch_file(figure),
        };
        match self.renderers.volume.capture(&shot) {
            Ok(()) => {
                self.figures.push(shot.output.clone());
                Block::Artifact(ArtifactBlock::rendered(name, volume, shot.output))
            }
            Err(error) => {
                warn!(artifact = name, path = %volume.display(), %error, "volume capture failed");
                Block::Artifact(ArtifactBlock::failed(name, volume))
            }
        }
    }

    /// Block for an image the pipeline already rendered.
    pub fn existing_image(&self, name: &str, image: &Path) -> Block {
        if image.is_file() {
            Block::Artifact(ArtifactBlock::rendered(name, image, image.to_path_buf()))
        } else {
            Block::Artifact(ArtifactBlock::missing(name))
        }
    }

    /// Surface plot cell, or a placeholder when any input file is absent.
    pub fn surface(&mut self, plot: SurfacePlot) -> Cell {
        let inputs_present = plot.surfaces.exists()
            && match &plot.data {
                SurfaceData::Morphometry(pair)
                | SurfaceData::Annotation(pair)
                | SurfaceData::Gifti(pair) => pair.exists(),
                SurfaceData::Mesh | SurfaceData::Values(_) => true,
            };
        if !inputs_present {
            debug!(figure = %plot.output.display(), "surface inputs missing");
            return Cell::Missing;
        }
        match self.renderers.surface.plot(&plot) {
            Ok(()) => self.record(plot.output),
            Err(error) => {
                warn!(figure = %plot.output.display(), %error, "surface plot failed");
                Cell::Failed
            }
        }
    }

    /// Heat-map cell for a matrix.
    pub fn matrix(&mut self, matrix: &Matrix, cmap: &str, figure: &str) -> Cell {
        let output = self.figure_path(figure);
        let plot = MatrixPlot {
            matrix,
            cmap,
            output: output.clone(),
        };
        match self.renderers.matrix.plot(&plot) {
            Ok(()) => self.record(output),
            Err(error) => {
                warn!(figure = %output.display(), %error, "matrix plot failed");
                Cell::Failed
            }
        }
    }

    /// Heat-map cell for a matrix stored on disk, without normalization.
    pub fn matrix_file(&mut self, path: &Path, cmap: &str, figure: &str) -> Cell {
        if !path.is_file() {
            return Cell::Missing;
        }
        match read_matrix(path) {
            Ok(matrix) => self.matrix(&matrix, cmap, figure),
            Err(error) => {
                warn!(%error, "unreadable matrix");
                Cell::Failed
            }
        }
    }

    /// One `atlas | connectome | degree` row.
    ///
    /// Returns `None` when the atlas has no conte69 label file; such atlases
    /// are left out of the table.
    pub fn connectome_row(&mut self, row: &ConnectomeRow<'_>) -> Option<Vec<Cell>> {
        let labels_path = self.ctx.resources.conte69_labels(row.atlas);
        if !labels_path.is_file() {
            debug!(atlas = row.atlas, path = %labels_path.display(), "no surface labels, skipping atlas");
            return None;
        }

        if !row.matrix.is_file() {
            debug!(atlas = row.atlas, path = %row.matrix.display(), "connectome missing");
            return Some(vec![Cell::text(row.atlas), Cell::Missing, Cell::Missing]);
        }
        let normalized = match read_matrix(&row.matrix)
            .map_err(anyhow::Error::from)
            .and_then(|raw| row.profile.process(&raw).map_err(anyhow::Error::from))
        {
            Ok(normalized) => normalized,
            Err(error) => {
                warn!(atlas = row.atlas, path = %row.matrix.display(), error = %error, "connectome unusable");
                return Some(vec![Cell::text(row.atlas), Cell::Failed, Cell::Failed]);
            }
        };

        let matrix_cell = self.matrix(&normalized.matrix, row.cmap, &row.matrix_figure);
        let degree_cell = match read_labels(&labels_path)
            .map_err(anyhow::Error::from)
            .and_then(|labels| {
                map_to_labels(&normalized.degree, &labels).map_err(anyhow::Error::from)
            }) {
            Ok(values) => {
                let plot = SurfacePlot::new(
                    self.ctx.resources.conte69_inflated(),
                    SurfaceData::Values(values),
                    self.figure_path(&row.degree_figure),
                )
                .cmap(row.cmap)
                .range(row.degree_range)
                .layout(PlotLayout::Grid)
                .color_bar();
                self.surface(plot)
            }
            Err(error) => {
                warn!(atlas = row.atlas, error = %error, "degree cannot be mapped to the surface");
                Cell::Failed
            }
        };

        Some(vec![Cell::text(row.atlas), matrix_cell, degree_cell])
    }

    fn record(&mut self, output: PathBuf) -> Cell {
        self.figures.push(output.clone());
        Cell::Image(output)
    }

    /// Hands the recorded figures to `section`.
    pub fn finish(self, section: &mut Section) {
        section.figures.extend(self.figures);
    }
}

/// Inputs for [`Visualizer::connectome_row`].
pub struct ConnectomeRow<'a> {
    pub atlas: &'a str,
    pub matrix: PathBuf,
    pub profile: ConnectomeProfile,
    pub cmap: &'a str,
    pub degree_range: ColorRange,
    pub matrix_figure: String,
    pub degree_figure: String,
}

/// Report header: banner, dataset name and subject line.
pub fn header_blocks(ctx: &ReportContext) -> Vec<Block> {
    let mut blocks = Vec::new();
    let banner = ctx.resources.banner();
    if banner.is_file() {
        blocks.push(Block::Banner(banner));
    }
    blocks.push(Block::Title(ctx.dataset_name.clone()));
    blocks.push(Block::SubjectLine {
        subject: ctx.subject().subject().to_string(),
        session: ctx.subject().session_display().to_string(),
    });
    blocks
}

/// Qualifier from the status file name (`<tag>-<qualifier>.json`).
pub fn status_qualifier(ctx: &ReportContext, module: ModuleKind, status_path: &Path) -> Option<String> {
    let file_name = status_path.file_name()?.to_str()?;
    module
        .qualifier(ctx.bids_id(), file_name)
        .map(str::to_string)
}

/// File name without directories or the given extension suffix.
pub fn file_stem_without(path: &Path, suffix: &str) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    Some(name.strip_suffix(suffix).unwrap_or(name).to_string())
}

/// Atlases with surface labels for the subject's reconstruction.
///
/// A missing label directory yields an empty list.
pub fn subject_atlases(ctx: &ReportContext, recon: &str) -> Vec<String> {
    let label_dir = ctx.locator.label_dir(recon);
    match discover_atlases(&label_dir) {
        Ok(atlases) => atlases,
        Err(error) => {
            warn!(%error, "no parcellations found");
            Vec::new()
        }
    }
}

/// Reads the surface descriptor written by the surface reconstruction.
pub fn surf_descriptor(ctx: &ReportContext) -> anyhow::Result<SurfDescriptor> {
    let path = ctx.locator.surf_descriptor();
    read_json(&path).with_context(|| format!("read surface descriptor {}", path.display()))
}
