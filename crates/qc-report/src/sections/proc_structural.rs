//! Structural preprocessing: T1w nativepro, masks, 5TT and MNI152 registrations.

use std::path::Path;

use anyhow::{Context, Result};

use qc_core::ReportContext;
use qc_ingest::{completed_status, read_json};
use qc_model::{ModuleKind, NativeproDescriptor};

use super::SectionBuilder;
use super::common::Visualizer;
use crate::document::{Block, Section};
use crate::render::Renderers;

pub struct ProcStructuralSection;

impl SectionBuilder for ProcStructuralSection {
    fn module(&self) -> ModuleKind {
        ModuleKind::ProcStructural
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
        let descriptor_path = locator.nativepro_descriptor();
        let descriptor: NativeproDescriptor = read_json(&descriptor_path)
            .with_context(|| format!("read nativepro descriptor {}", descriptor_path.display()))?;

        let mut section = Section::new(self.module(), self.module().tag(), &status);
        section.inputs.push(Block::Heading("Inputs".to_string()));
        section.inputs.push(Block::BulletList(
            descriptor.inputs().into_iter().map(str::to_string).collect(),
        ));

        let t1w = locator.nativepro_t1w();
        let mut viz = Visualizer::new(ctx, renderers);
        let mut outputs = vec![Block::Heading("Main outputs".to_string())];
        outputs.push(viz.volume(
            "T1w nativepro",
            &t1w,
            None,
            false,
            "nativepro_T1w_screenshot.png",
        ));
        outputs.push(viz.volume(
            "T1w nativepro brain mask",
            &locator.file("anat", "space-nativepro_T1w_brain_mask.nii.gz"),
            Some(&t1w),
            false,
            "nativepro_T1w_brain_mask_screenshot.png",
        ));
        outputs.push(viz.volume(
            "T1w nativepro 5 tissue segmentation (5TT)",
            &locator.scratch("nativepro_T1w_brain_5tt.nii.gz"),
            Some(&t1w),
            false,
            "nativepro_T1w_brain_5tt_screenshot.png",
        ));
        for (resolution, label, figure) in [
            ("0.8mm", "0.8", "nativepro_T1w_brain_mni152_08_screenshot.png"),
            ("2mm", "2", "nativepro_T1w_brain_mni152_2_screenshot.png"),
        ] {
            let registered = locator.scratch_file(&format!("space-MNI152_{label}_T1w_brain.nii.gz"));
            outputs.push(viz.volume(
                &format!("Registration: T1w nativepro in MNI152 {resolution}"),
                &ctx.resources.mni152_mask(resolution),
                Some(&registered),
                false,
                figure,
            ));
        }
        outputs.push(viz.volume(
            "Partial volume: white matter",
            &locator.file("anat", "space-nativepro_T1w_brain_pve_2.nii.gz"),
            None,
            false,
            "nativepro_T1w_brain_pve_2_screenshot.png",
        ));

        section.outputs = outputs;
        viz.finish(&mut section);
        Ok(Some(section))
    }
}
