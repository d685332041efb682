//! Microstructural profile covariance.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use qc_core::{ConnectomeProfile, ReportContext};
use qc_ingest::{completed_status, read_json};
use qc_model::{ModuleKind, MpcDescriptor};

use super::SectionBuilder;
use super::common::{
    ConnectomeRow, Visualizer, status_qualifier, subject_atlases, surf_descriptor,
};
use crate::document::{Block, Section, Table};
use crate::render::{ColorRange, Renderers};

pub struct MicrostructuralSection;

const MPC_CMAP: &str = "Greens";

impl SectionBuilder for MicrostructuralSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::Microstructural
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
        let acq = status_qualifier(ctx, self.module(), status_path)
            .ok_or_else(|| anyhow!("no acquisition in {}", status_path.display()))?;
        let locator = &ctx.locator;
        let descriptor_path = locator.mpc_descriptor(&acq);
        let descriptor: MpcDescriptor = read_json(&descriptor_path)
            .with_context(|| format!("read MPC descriptor {}", descriptor_path.display()))?;
        let recon = surf_descriptor(ctx)?.surf_recon;

        let title = format!("Microstructural profile covariance ({acq})");
        let mut section = Section::new(self.module(), title, &status);
        let mut viz = Visualizer::new(ctx, renderers);

        section.inputs = vec![
            Block::Heading("Main inputs".to_string()),
            viz.volume(
                "Microstructural image",
                &descriptor.microstructural_img,
                None,
                false,
                &format!("{acq}_microstructural_img.png"),
            ),
            viz.volume(
                "Microstructural registration",
                &descriptor.microstructural_reg,
                None,
                false,
                &format!("{acq}_microstructural_reg.png"),
            ),
        ];

        let mut outputs = vec![Block::Heading("Main outputs".to_string())];
        let mut info = Table::key_value();
        info.push_pair("Acquisition", acq.as_str());
        info.push_pair("Surface transformation", descriptor.surface_transformation.as_str());
        outputs.push(Block::Table(info));
        outputs.push(viz.volume(
            &format!("Registration: {acq} in {recon} native space"),
            &locator.fsnative_t1w(),
            Some(&locator.file("anat", &format!("space-fsnative_desc-{acq}.nii.gz"))),
            false,
            &format!("{acq}_fsnative_screenshot.png"),
        ));

        outputs.push(Block::Heading("MPC connectomes".to_string()));
        let mut table = Table::gallery().with_header([
            "Parcellation",
            "Intensity profiles",
            "Connectomes",
            "Degree",
        ]);
        for atlas in subject_atlases(ctx, &recon) {
            let stem = format!("{}_space-fsnative_atlas-{atlas}_desc-{acq}", ctx.bids_id());
            let row = ConnectomeRow {
                atlas: atlas.as_str(),
                matrix: locator.mpc_matrix(&acq, &atlas),
                profile: ConnectomeProfile::Microstructural,
                cmap: MPC_CMAP,
                degree_range: ColorRange::Symmetric,
                matrix_figure: format!("{stem}_mpc.png"),
                degree_figure: format!("{stem}_mpc_degree.png"),
            };
            let Some(mut cells) = viz.connectome_row(&row) else {
                continue;
            };
            let profiles = viz.matrix_file(
                &locator.intensity_profiles(&acq, &atlas),
                MPC_CMAP,
                &format!("{stem}_intensity_profiles.png"),
            );
            cells.insert(1, profiles);
            table.push_row(cells);
        }
        outputs.push(Block::Table(table));

        section.outputs = outputs;
        viz.finish(&mut section);
        Ok(Some(section))
    }
}
