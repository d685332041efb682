//! Functional processing: mean scans, registrations and functional connectomes.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use qc_core::{ConnectomeProfile, ReportContext};
use qc_ingest::{completed_status, find_first_matching, read_json};
use qc_model::{FuncCleanDescriptor, ModuleKind};

use super::SectionBuilder;
use super::common::{
    ConnectomeRow, Visualizer, file_stem_without, status_qualifier, subject_atlases,
    surf_descriptor,
};
use crate::document::{ArtifactBlock, Block, Section, Table};
use crate::render::{ColorRange, Renderers};

pub struct ProcFuncSection;

const FC_CMAP: &str = "Reds";

impl SectionBuilder for ProcFuncSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::ProcFunc
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
        let tag = status_qualifier(ctx, self.module(), status_path)
            .ok_or_else(|| anyhow!("no acquisition tag in {}", status_path.display()))?;
        let locator = &ctx.locator;

        let volumetric_dir = locator.func_volumetric_dir(&tag);
        let clean_path = find_first_matching(
            &volumetric_dir,
            &format!("{}_space-func_desc", ctx.bids_id()),
            "_clean.json",
        )?
        .ok_or_else(|| anyhow!("no clean descriptor in {}", volumetric_dir.display()))?;
        let clean: FuncCleanDescriptor = read_json(&clean_path)
            .with_context(|| format!("read functional descriptor {}", clean_path.display()))?;
        let recon = surf_descriptor(ctx)?.surf_recon;
        let acq = clean.acquisition.as_str();

        let title = format!("{} ({tag})", self.module().tag());
        let mut section = Section::new(self.module(), title, &status);
        let mut viz = Visualizer::new(ctx, renderers);

        // Inputs: temporal means written to the scratch directory
        let mut inputs = vec![Block::Heading("Inputs".to_string())];
        let main_scans = clean.preprocess.main_scans();
        for (index, scan) in main_scans.iter().enumerate() {
            let name = if main_scans.len() == 1 {
                "Main scan (mean)".to_string()
            } else {
                format!("Main scan - echo {} (mean)", index + 1)
            };
            inputs.push(mean_scan_block(
                &mut viz,
                &name,
                scan,
                &format!("fmri_mainScan{}.png", index + 1),
            ));
        }
        let phase_scans = [
            (
                "Main phase scan (mean)",
                &clean.preprocess.main_phase_scan,
                "fmri_mainPhaseScan.png",
            ),
            (
                "Reverse phase scan (mean)",
                &clean.preprocess.reverse_phase_scan,
                "fmri_reveresePhaseScan.png",
            ),
        ];
        for (name, scan, figure) in phase_scans {
            match scan {
                Some(scan) => inputs.push(mean_scan_block(&mut viz, name, scan, figure)),
                None => inputs.push(Block::Artifact(ArtifactBlock::missing(name))),
            }
        }
        section.inputs = inputs;

        // Outputs
        let brain = locator.func_volumetric(&tag, &format!("space-func_desc-{acq}_brain.nii.gz"));
        let mut outputs = vec![Block::Heading("Main outputs".to_string())];
        outputs.push(viz.volume("fMRI brain", &brain, None, false, "func_brain_screenshot.png"));
        outputs.push(viz.volume(
            &format!("Registration: fMRI in {recon} native space"),
            &locator.xfm(&format!(
                "from-{tag}_to-fsnative_bbr_mode-image_desc-bbregister.nii.gz"
            )),
            Some(&locator.fsnative_t1w()),
            false,
            "fmri_fsnative_screenshot.png",
        ));
        outputs.push(viz.volume(
            "Registration: fMRI in T1w nativepro space",
            &locator.file("anat", &format!("space-nativepro_desc-{tag}_mean.nii.gz")),
            Some(&locator.nativepro_t1w()),
            false,
            "fmri_nativepro_screenshot.png",
        ));
        outputs.push(viz.volume(
            "Registration: T1w nativepro in fMRI space",
            &locator.func_volumetric(&tag, "space-func_desc-T1w.nii.gz"),
            Some(&brain),
            false,
            "nativepro_T1w_fmri_screenshot.png",
        ));
        for (name, atlas) in [
            ("Cerebellum atlas in fMRI space", "cerebellum"),
            ("Subcortical atlas in fMRI space", "subcortical"),
        ] {
            outputs.push(viz.volume(
                name,
                &locator.func_volumetric(&tag, &format!("space-func_desc-{acq}_{atlas}.nii.gz")),
                Some(&brain),
                true,
                &format!("fMRI_{atlas}_screenshot.png"),
            ));
        }
        outputs.push(viz.existing_image(
            "Framewise displace: fMRI",
            &locator.func_volumetric(
                &tag,
                &format!("space-func_desc-{acq}_framewiseDisplacement.png"),
            ),
        ));

        outputs.push(Block::Heading("Functional connectomes".to_string()));
        let mut connectomes = Table::gallery().with_header(["Parcellation", "Connectome", "Degree"]);
        for atlas in subject_atlases(ctx, &recon) {
            let row = ConnectomeRow {
                atlas: &atlas,
                matrix: locator.fc_matrix(&tag, &atlas),
                profile: ConnectomeProfile::Functional,
                cmap: FC_CMAP,
                degree_range: ColorRange::Auto,
                matrix_figure: format!("{}_space-conte69-32k_atlas-{atlas}_fc.png", ctx.bids_id()),
                degree_figure: format!("{}_atlas-{atlas}_fc_degree.png", ctx.bids_id()),
            };
            if let Some(cells) = viz.connectome_row(&row) {
                connectomes.push_row(cells);
            }
        }
        outputs.push(Block::Table(connectomes));

        section.outputs = outputs;
        viz.finish(&mut section);
        Ok(Some(section))
    }
}

/// Block for the temporal mean of a raw scan, written as
/// `<scratch>/<scan name>_mean.nii.gz` by the pipeline.
fn mean_scan_block(viz: &mut Visualizer<'_>, name: &str, scan: &Path, figure: &str) -> Block {
    let Some(stem) = file_stem_without(scan, ".nii.gz") else {
        return Block::Artifact(ArtifactBlock::missing(name));
    };
    let mean = viz.ctx().locator.scratch(&format!("{stem}_mean.nii.gz"));
    viz.volume(name, &mean, None, false, figure)
}
