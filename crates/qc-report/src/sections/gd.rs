//! Geodesic distance connectomes.

use std::path::Path;

use anyhow::Result;

use qc_core::{ConnectomeProfile, ReportContext};
use qc_ingest::completed_status;
use qc_model::ModuleKind;

use super::SectionBuilder;
use super::common::{ConnectomeRow, Visualizer, subject_atlases, surf_descriptor};
use crate::document::{Block, Section, Table};
use crate::render::{ColorRange, Renderers};

pub struct GeodesicDistanceSection;

const GD_CMAP: &str = "Blues";

impl SectionBuilder for GeodesicDistanceSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::GeodesicDistance
    }

    fn build(
        &self,
        ctx: &ReportContext,
        renderers: &Renderers,
        status_path: &Path,
    ) -> Result<Option<Section>> {
        let Some(status) = completed_status(status_path)? else {
            return Ok(None);
        };
        let recon = surf_descriptor(ctx)?.surf_recon;

        let mut section = Section::new(self.module(), "Geodesic distance", &status);
        let mut viz = Visualizer::new(ctx, renderers);

        let mut table = Table::gallery().with_header(["Parcellation", "Connectomes", "Degree"]);
        for atlas in subject_atlases(ctx, &recon) {
            let stem = format!("{}_space-fsnative_atlas-{atlas}", ctx.bids_id());
            let row = ConnectomeRow {
                atlas: atlas.as_str(),
                matrix: ctx.locator.gd_matrix(&atlas),
                profile: ConnectomeProfile::Geodesic,
                cmap: GD_CMAP,
                degree_range: ColorRange::Auto,
                matrix_figure: format!("{stem}_gd.png"),
                degree_figure: format!("{stem}_gd_degree.png"),
            };
            if let Some(cells) = viz.connectome_row(&row) {
                table.push_row(cells);
            }
        }

        section.outputs = vec![
            Block::Heading("Main outputs".to_string()),
            Block::Heading("GD connectomes".to_string()),
            Block::Table(table),
        ];
        viz.finish(&mut section);
        Ok(Some(section))
    }
}
