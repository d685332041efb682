//! Post-structural processing: registrations, parcellations, surfaces and
//! morphological features on the template surfaces.

use std::path::Path;

use anyhow::{Context, Result};

use qc_core::ReportContext;
use qc_ingest::{HemiPair, atlas_annot_name, completed_status, read_json};
use qc_model::{ModuleKind, PostStructuralDescriptor};

use super::SectionBuilder;
use super::common::{
    CURVATURE_CMAP, LABEL_CMAP, MESH_CMAP, Visualizer, subject_atlases, surf_descriptor,
};
use crate::document::{Block, Cell, Section, Table};
use crate::render::{ColorRange, Renderers, SurfaceData, SurfacePlot};

pub struct PostStructuralSection;

/// Surfaces resampled into nativepro space.
const SURFACES: [&str; 4] = ["fsnative", "fsaverage5", "fsLR-32k", "fsLR-5k"];

/// Mesh rows per surface: label and file label.
const MESHES: [(&str, &str); 3] = [
    ("Pial surface", "pial"),
    ("Middle surface", "midthickness"),
    ("White surface", "white"),
];

impl SectionBuilder for PostStructuralSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::PostStructural
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
        let locator = &ctx.locator;
        let descriptor_path = locator.post_structural_descriptor();
        let descriptor: PostStructuralDescriptor = read_json(&descriptor_path).with_context(|| {
            format!("read post-structural descriptor {}", descriptor_path.display())
        })?;
        let surf = surf_descriptor(ctx)?;
        let recon = descriptor.surface_proc.as_str();

        let title = format!("{} ({recon})", self.module().tag());
        let mut section = Section::new(self.module(), title, &status);
        let mut viz = Visualizer::new(ctx, renderers);
        let mut outputs = vec![Block::Heading("Main outputs".to_string())];

        // Registrations and volumetric atlases
        let t1w = locator.nativepro_t1w();
        outputs.push(viz.volume(
            &format!("Registration: T1w nativepro in {recon} native space"),
            &descriptor.native_surf_space.file_name,
            Some(&locator.fsnative_t1w()),
            false,
            "nativepro_T1w_fsnative_screenshot.png",
        ));
        for atlas in ["cerebellum", "subcortical"] {
            outputs.push(viz.volume(
                &format!("T1w nativepro {atlas} atlas"),
                &locator.nativepro_atlas(atlas),
                Some(&t1w),
                true,
                &format!("nativepro_T1w_{atlas}_screenshot.png"),
            ));
        }

        // Parcellations on the native pial surface
        outputs.push(Block::Subheading("Parcellations".to_string()));
        let label_dir = locator.label_dir(recon);
        let pial = locator.recon_surf(&surf.surface_dir, "pial");
        let mut parcellations =
            Table::gallery().with_header(["Parcellation", "Surface labels"]);
        for atlas in subject_atlases(ctx, recon) {
            let annot = atlas_annot_name(&atlas);
            let files = HemiPair::from_fn(|hemi| {
                label_dir.join(format!("{}.{annot}.annot", hemi.fs_prefix()))
            });
            let plot = SurfacePlot::new(
                pial.clone(),
                SurfaceData::Annotation(files),
                locator.scratch_file(&format!("atlas-{annot}_desc-surf.png")),
            )
            .cmap(LABEL_CMAP);
            parcellations.push_row(vec![Cell::text(annot), viz.surface(plot)]);
        }
        outputs.push(Block::Table(parcellations));

        // Surfaces in nativepro space
        outputs.push(Block::Subheading("Surfaces".to_string()));
        for surface in SURFACES {
            let mut table = Table::key_value().with_title(surface);
            for (label, mesh) in MESHES {
                let plot = SurfacePlot::new(
                    locator.nativepro_surface(surface, mesh),
                    SurfaceData::Mesh,
                    locator.scratch_file(&format!(
                        "space-nativepro_surf-{surface}_label-{mesh}.png"
                    )),
                )
                .cmap(MESH_CMAP);
                table.push_row(vec![Cell::text(label), viz.surface(plot)]);
            }
            outputs.push(Block::Table(table));
        }

        // Morphological features
        outputs.push(Block::Subheading("Morphological features".to_string()));
        let inflated = [
            ("Fsnative", "fsnative", locator.recon_surf(&surf.surface_dir, "inflated")),
            (
                "Fsaverage5",
                "fsaverage5",
                locator.template_surf(&surf.surface_dir, "fsaverage5", "inflated"),
            ),
            ("FsLR (5k)", "fsLR-5k", locator.nativepro_surface("fsLR-5k", "midthickness")),
            ("FsLR (32k)", "fsLR-32k", ctx.resources.conte69_inflated()),
        ];
        for (feature, title, cmap, range) in [
            ("curv", "Curvature", CURVATURE_CMAP, ColorRange::Fixed(-0.2, 0.2)),
            ("thickness", "Thickness", "inferno", ColorRange::Fixed(1.5, 4.0)),
        ] {
            let mut table = Table::key_value().with_title(title);
            for (label, surface, mesh) in &inflated {
                let plot = SurfacePlot::new(
                    mesh.clone(),
                    SurfaceData::Gifti(locator.morphology_map(surface, feature)),
                    locator.scratch_file(&format!("surf-{surface}_label-{feature}.png")),
                )
                .cmap(cmap)
                .range(range)
                .color_bar();
                table.push_row(vec![Cell::text(*label), viz.surface(plot)]);
            }
            outputs.push(Block::Table(table));
        }

        section.outputs = outputs;
        viz.finish(&mut section);
        Ok(Some(section))
    }
}
