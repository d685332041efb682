//! Structural connectomes from tractography.

use std::path::Path;

use anyhow::{Context, Result};

use qc_core::{ConnectomeProfile, ReportContext};
use qc_ingest::{ConnectomeKind, completed_status, read_json};
use qc_model::{ModuleKind, TractographyDescriptor, display_value};

use super::SectionBuilder;
use super::common::{
    ConnectomeRow, Visualizer, file_stem_without, status_qualifier, subject_atlases,
    surf_descriptor,
};
use crate::document::{ArtifactBlock, Block, Section, Table};
use crate::render::{ColorRange, Renderers};

pub struct StructuralConnectomeSection;

const SC_CMAP: &str = "Purples";

impl SectionBuilder for StructuralConnectomeSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::StructuralConnectome
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
        let streamlines = status_qualifier(ctx, self.module(), status_path)
            .unwrap_or_else(|| ctx.streamlines.clone());
        let locator = &ctx.locator;
        let descriptor_path = locator.tractography_descriptor(&streamlines);
        let tractography: TractographyDescriptor = read_json(&descriptor_path)
            .with_context(|| format!("read tractography descriptor {}", descriptor_path.display()))?;
        let recon = surf_descriptor(ctx)?.surf_recon;

        let title = format!("Structural connectomes ({streamlines} streamlines)");
        let mut section = Section::new(self.module(), title, &status);
        let mut viz = Visualizer::new(ctx, renderers);

        let fod_name = "Fiber orientation distribution";
        let fod = match file_stem_without(&tractography.file_info.name, ".mif") {
            Some(stem) => viz.volume(
                fod_name,
                &locator.scratch(&format!("{stem}.nii.gz")),
                None,
                false,
                "dti_FOD.png",
            ),
            None => Block::Artifact(ArtifactBlock::missing(fod_name)),
        };
        section.inputs = vec![Block::Heading("Inputs".to_string()), fod];

        let mut outputs = vec![Block::Heading("Main outputs".to_string())];
        let mut info = Table::key_value().with_title("Tractography information");
        for (key, value) in &tractography.tractography {
            info.push_pair(key.as_str(), display_value(value));
        }
        outputs.push(Block::Table(info));
        outputs.push(viz.volume(
            &format!("Track density imaging ({streamlines} tracks)"),
            &locator.scratch_file(&format!("space-dwi_desc-iFOD2-{streamlines}_tdi_mean.nii.gz")),
            None,
            false,
            &format!("tdi_{streamlines}.png"),
        ));

        let mut kinds = vec![ConnectomeKind::Full, ConnectomeKind::EdgeLengths];
        if tractography.weighted_sc() {
            kinds.push(ConnectomeKind::Weighted);
        }
        let atlases = subject_atlases(ctx, &recon);
        for kind in kinds {
            outputs.push(Block::Heading(format!("{} ({streamlines})", kind.title())));
            let mut table = Table::gallery().with_header(["Parcellation", "Full connectomes", "Degree"]);
            for atlas in &atlases {
                let stem = format!(
                    "{}_space-dwi_atlas-{atlas}_desc-iFOD2-{streamlines}-SIFT2_{}",
                    ctx.bids_id(),
                    kind.file_tag()
                );
                let row = ConnectomeRow {
                    atlas: atlas.as_str(),
                    matrix: locator.sc_matrix(atlas, &streamlines, kind),
                    profile: ConnectomeProfile::Structural,
                    cmap: SC_CMAP,
                    degree_range: ColorRange::Symmetric,
                    matrix_figure: format!("{stem}.png"),
                    degree_figure: format!("{stem}_degree.png"),
                };
                if let Some(cells) = viz.connectome_row(&row) {
                    table.push_row(cells);
                }
            }
            outputs.push(Block::Table(table));
        }

        section.outputs = outputs;
        viz.finish(&mut section);
        Ok(Some(section))
    }
}
