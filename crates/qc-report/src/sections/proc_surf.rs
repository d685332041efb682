//! Surface reconstruction: native morphometry and atlas annotations.

use std::path::Path;

use anyhow::Result;

use qc_core::ReportContext;
use qc_ingest::{atlas_annot_name, completed_status};
use qc_model::ModuleKind;

use super::SectionBuilder;
use super::common::{CURVATURE_CMAP, LABEL_CMAP, Visualizer, surf_descriptor};
use crate::document::{Block, Cell, Section, Table};
use crate::render::{ColorRange, Renderers, SurfaceData, SurfacePlot};

pub struct ProcSurfSection;

/// Native morphometry rows: label, mesh, morphometry file, colour map, range, figure tag.
const MORPHOMETRY: [(&str, &str, &str, &str, ColorRange, &str); 3] = [
    ("Thickness", "pial", "thickness", "inferno", ColorRange::Fixed(1.5, 4.0), "thickness"),
    ("Curvature", "white", "curv", CURVATURE_CMAP, ColorRange::Fixed(-0.2, 0.2), "curv"),
    ("Sulcal depth", "white", "sulc", "cividis", ColorRange::Fixed(-5.0, 5.0), "sulc"),
];

/// Annotation rows drawn on the pial surface: label, atlas, figure tag.
const ANNOTATIONS: [(&str, &str, &str); 2] = [
    ("Destrieux Atlas (aparc.a2009s)", "aparc-a2009s", "a2009s"),
    ("Desikan-Killiany Atlas (aparc)", "aparc", "aparc"),
];

impl SectionBuilder for ProcSurfSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::ProcSurf
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
        let surf = surf_descriptor(ctx)?;
        let locator = &ctx.locator;

        let title = format!("{} ({})", self.module().tag(), surf.surf_recon);
        let mut section = Section::new(self.module(), title, &status);
        let mut viz = Visualizer::new(ctx, renderers);

        let mut table = Table::key_value();
        for (label, mesh, morph, cmap, range, tag) in MORPHOMETRY {
            let plot = SurfacePlot::new(
                locator.recon_surf(&surf.surface_dir, mesh),
                SurfaceData::Morphometry(locator.recon_surf(&surf.surface_dir, morph)),
                locator.scratch_file(&format!("space-fsnative_desc-surf_{tag}.png")),
            )
            .cmap(cmap)
            .range(range)
            .color_bar();
            table.push_row(vec![Cell::text(label), viz.surface(plot)]);
        }
        let pial = locator.recon_surf(&surf.surface_dir, "pial");
        for (label, atlas, tag) in ANNOTATIONS {
            let annot = locator.recon_annot(&surf.surface_dir, &atlas_annot_name(atlas));
            let plot = SurfacePlot::new(
                pial.clone(),
                SurfaceData::Annotation(annot),
                locator.scratch_file(&format!("space-fsnative_desc-surf_{tag}.png")),
            )
            .cmap(LABEL_CMAP);
            table.push_row(vec![Cell::text(label), viz.surface(plot)]);
        }

        section.outputs = vec![
            Block::Heading("Main outputs".to_string()),
            Block::Subheading("Native surfaces".to_string()),
            Block::Table(table),
        ];
        viz.finish(&mut section);
        Ok(Some(section))
    }
}
