//! Artifact paths following the pipeline's derivative naming convention.
//!
//! [`ArtifactLocator`] is a pure path calculator: it never checks whether a
//! file exists. Callers pair it with an existence check and degrade to a
//! placeholder when the artifact is absent.
//!
//! # Layout
//!
//! ```text
//! <out>/<sub>/<ses>/anat/<bids_id>_space-nativepro_T1w.nii.gz
//! <out>/<sub>/<ses>/QC/<bids_id>_module-<tag>*.json
//! <derivatives>/<recon>/<bids_id>/label/lh.<atlas>_mics.annot
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use qc_model::SubjectIdentity;

/// Name prefix of the pipeline's own derivative directory.
pub const PIPELINE_DIR_PREFIX: &str = "micapipe_v";

/// Suffix appended to a status file stem to name its report.
pub const REPORT_SUFFIX: &str = "_qc-report.pdf";

/// Brain hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    /// FreeSurfer file prefix (`lh` / `rh`).
    pub fn fs_prefix(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }

    /// BIDS `hemi-` entity value (`L` / `R`).
    pub fn bids_label(&self) -> &'static str {
        match self {
            Hemisphere::Left => "L",
            Hemisphere::Right => "R",
        }
    }
}

/// Left/right pair of files describing one surface-level quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HemiPair {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl HemiPair {
    pub fn new(left: PathBuf, right: PathBuf) -> Self {
        Self { left, right }
    }

    /// Builds the pair by calling `f` once per hemisphere.
    pub fn from_fn(mut f: impl FnMut(Hemisphere) -> PathBuf) -> Self {
        Self {
            left: f(Hemisphere::Left),
            right: f(Hemisphere::Right),
        }
    }

    pub fn exists(&self) -> bool {
        self.left.is_file() && self.right.is_file()
    }
}

/// Structural connectome flavours written per atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectomeKind {
    Full,
    EdgeLengths,
    Weighted,
}

impl ConnectomeKind {
    pub fn file_tag(&self) -> &'static str {
        match self {
            ConnectomeKind::Full => "full-connectome",
            ConnectomeKind::EdgeLengths => "full-edgeLengths",
            ConnectomeKind::Weighted => "full-weighted_connectome",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ConnectomeKind::Full => "Structural connectomes",
            ConnectomeKind::EdgeLengths => "Edge length connectomes",
            ConnectomeKind::Weighted => "Weighted structural connectomes",
        }
    }
}

/// Computes expected input/output paths for one subject/session.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    out_root: PathBuf,
    derivatives_root: PathBuf,
    bids_root: PathBuf,
    scratch_dir: PathBuf,
    subject: SubjectIdentity,
    bids_id: String,
}

impl ArtifactLocator {
    pub fn new(
        out_root: impl Into<PathBuf>,
        bids_root: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        subject: SubjectIdentity,
    ) -> Self {
        let out_root = out_root.into();
        let derivatives_root = default_derivatives_root(&out_root);
        let bids_id = subject.bids_id();
        Self {
            out_root,
            derivatives_root,
            bids_root: bids_root.into(),
            scratch_dir: scratch_dir.into(),
            subject,
            bids_id,
        }
    }

    /// Overrides the derivatives root used for surface reconstructions.
    #[must_use]
    pub fn with_derivatives_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.derivatives_root = root.into();
        self
    }

    pub fn subject(&self) -> &SubjectIdentity {
        &self.subject
    }

    pub fn bids_id(&self) -> &str {
        &self.bids_id
    }

    pub fn out_root(&self) -> &Path {
        &self.out_root
    }

    pub fn derivatives_root(&self) -> &Path {
        &self.derivatives_root
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// `<out>/<sub>[/<ses>]`.
    pub fn subject_dir(&self) -> PathBuf {
        session_path(&self.out_root, &self.subject)
    }

    /// `<out>/<sub>[/<ses>]/<modality>`.
    pub fn modality_dir(&self, modality: &str) -> PathBuf {
        self.subject_dir().join(modality)
    }

    /// `<out>/<sub>[/<ses>]/<modality>/<bids_id>_<suffix>`.
    pub fn file(&self, modality: &str, suffix: &str) -> PathBuf {
        self.modality_dir(modality)
            .join(format!("{}_{suffix}", self.bids_id))
    }

    /// `<scratch>/<name>` for intermediate images and figures.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.scratch_dir.join(name)
    }

    /// `<scratch>/<bids_id>_<suffix>`.
    pub fn scratch_file(&self, suffix: &str) -> PathBuf {
        self.scratch_dir.join(format!("{}_{suffix}", self.bids_id))
    }

    // === Raw data ===

    /// `<bids>/dataset_description.json`.
    pub fn dataset_description(&self) -> PathBuf {
        self.bids_root.join("dataset_description.json")
    }

    // === QC ===

    pub fn qc_dir(&self) -> PathBuf {
        self.modality_dir("QC")
    }

    // === Structural ===

    pub fn nativepro_t1w(&self) -> PathBuf {
        self.file("anat", "space-nativepro_T1w.nii.gz")
    }

    pub fn nativepro_descriptor(&self) -> PathBuf {
        self.file("anat", "space-nativepro_T1w.json")
    }

    pub fn fsnative_t1w(&self) -> PathBuf {
        self.file("anat", "space-fsnative_T1w.nii.gz")
    }

    pub fn surf_descriptor(&self) -> PathBuf {
        self.file("surf", "proc_surf.json")
    }

    pub fn post_structural_descriptor(&self) -> PathBuf {
        self.file("anat", "post_structural.json")
    }

    /// Atlas volume in nativepro space, e.g. `cerebellum`.
    pub fn nativepro_atlas(&self, atlas: &str) -> PathBuf {
        self.file("parc", &format!("space-nativepro_T1w_atlas-{atlas}.nii.gz"))
    }

    // === Surfaces ===

    /// `<derivatives>/<recon>/<bids_id>/label`.
    pub fn label_dir(&self, recon: &str) -> PathBuf {
        self.derivatives_root
            .join(recon)
            .join(&self.bids_id)
            .join("label")
    }

    /// Reconstruction directory for this subject inside `surface_dir`.
    pub fn recon_subject_dir(&self, surface_dir: &Path) -> PathBuf {
        surface_dir.join(&self.bids_id)
    }

    /// FreeSurfer surface or morphometry file, e.g. `surf/lh.pial`.
    pub fn recon_surf(&self, surface_dir: &Path, name: &str) -> HemiPair {
        let dir = self.recon_subject_dir(surface_dir).join("surf");
        HemiPair::from_fn(|hemi| dir.join(format!("{}.{name}", hemi.fs_prefix())))
    }

    /// Surface of a template subject (e.g. `fsaverage5`) inside `surface_dir`.
    pub fn template_surf(&self, surface_dir: &Path, template: &str, name: &str) -> HemiPair {
        let dir = surface_dir.join(template).join("surf");
        HemiPair::from_fn(|hemi| dir.join(format!("{}.{name}", hemi.fs_prefix())))
    }

    /// FreeSurfer annotation pair, e.g. `label/lh.aparc_mics.annot`.
    pub fn recon_annot(&self, surface_dir: &Path, annot: &str) -> HemiPair {
        let dir = self.recon_subject_dir(surface_dir).join("label");
        HemiPair::from_fn(|hemi| dir.join(format!("{}.{annot}.annot", hemi.fs_prefix())))
    }

    /// GIFTI surface in nativepro space.
    pub fn nativepro_surface(&self, surface: &str, label: &str) -> HemiPair {
        HemiPair::from_fn(|hemi| {
            self.file(
                "surf",
                &format!(
                    "hemi-{}_space-nativepro_surf-{surface}_label-{label}.surf.gii",
                    hemi.bids_label()
                ),
            )
        })
    }

    /// Morphological feature map on a template surface.
    pub fn morphology_map(&self, surface: &str, feature: &str) -> HemiPair {
        HemiPair::from_fn(|hemi| {
            self.file(
                "maps",
                &format!(
                    "hemi-{}_surf-{surface}_label-{feature}.func.gii",
                    hemi.bids_label()
                ),
            )
        })
    }

    // === Functional ===

    /// `func/desc-<tag>`.
    pub fn func_dir(&self, tag: &str) -> PathBuf {
        self.modality_dir("func").join(format!("desc-{tag}"))
    }

    pub fn func_volumetric_dir(&self, tag: &str) -> PathBuf {
        self.func_dir(tag).join("volumetric")
    }

    /// `func/desc-<tag>/volumetric/<bids_id>_<suffix>`.
    pub fn func_volumetric(&self, tag: &str, suffix: &str) -> PathBuf {
        self.func_volumetric_dir(tag)
            .join(format!("{}_{suffix}", self.bids_id))
    }

    pub fn fc_matrix(&self, tag: &str, atlas: &str) -> PathBuf {
        self.func_dir(tag)
            .join("surf")
            .join(format!("{}_atlas-{atlas}_desc-FC.txt", self.bids_id))
    }

    /// `xfm/<bids_id>_<suffix>`.
    pub fn xfm(&self, suffix: &str) -> PathBuf {
        self.file("xfm", suffix)
    }

    // === Diffusion ===

    pub fn tractography_descriptor(&self, streamlines: &str) -> PathBuf {
        self.file(
            "dwi",
            &format!("space-dwi_desc-iFOD2-{streamlines}_tractography.json"),
        )
    }

    pub fn sc_matrix(&self, atlas: &str, streamlines: &str, kind: ConnectomeKind) -> PathBuf {
        self.modality_dir("dwi").join("connectomes").join(format!(
            "{}_space-dwi_atlas-{atlas}_desc-iFOD2-{streamlines}-SIFT2_{}.txt",
            self.bids_id,
            kind.file_tag()
        ))
    }

    // === Microstructure ===

    pub fn mpc_dir(&self, acquisition: &str) -> PathBuf {
        self.modality_dir("mpc").join(format!("acq-{acquisition}"))
    }

    pub fn mpc_descriptor(&self, acquisition: &str) -> PathBuf {
        self.mpc_dir(acquisition)
            .join(format!("{}_MPC-{acquisition}.json", self.bids_id))
    }

    pub fn intensity_profiles(&self, acquisition: &str, atlas: &str) -> PathBuf {
        self.mpc_dir(acquisition).join(format!(
            "{}_space-fsnative_atlas-{atlas}_desc-intensity_profiles.txt",
            self.bids_id
        ))
    }

    pub fn mpc_matrix(&self, acquisition: &str, atlas: &str) -> PathBuf {
        self.mpc_dir(acquisition).join(format!(
            "{}_space-fsnative_atlas-{atlas}_desc-MPC.txt",
            self.bids_id
        ))
    }

    // === Geodesic distance ===

    pub fn gd_matrix(&self, atlas: &str) -> PathBuf {
        self.file("dist", &format!("space-fsnative_atlas-{atlas}_GD.txt"))
    }
}

/// Shared resources shipped with the pipeline installation (`$MICAPIPE`).
#[derive(Debug, Clone)]
pub struct PipelineResources {
    root: PathBuf,
}

impl PipelineResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Banner image shown at the top of every report.
    pub fn banner(&self) -> PathBuf {
        self.root.join("docs/figures/micapipe_long.png")
    }

    /// MNI152 brain mask at the given resolution (`0.8mm`, `2mm`).
    pub fn mni152_mask(&self, resolution: &str) -> PathBuf {
        self.root
            .join("MNI152Volumes")
            .join(format!("MNI152_T1_{resolution}_brain_mask.nii.gz"))
    }

    /// Vertex-wise atlas labels on the conte69 32k surface.
    pub fn conte69_labels(&self, atlas: &str) -> PathBuf {
        self.root
            .join("parcellations")
            .join(format!("{atlas}_conte69.csv"))
    }

    /// Inflated conte69 template surfaces.
    pub fn conte69_inflated(&self) -> HemiPair {
        let dir = self.root.join("surfaces");
        HemiPair::from_fn(|hemi| dir.join(format!("{}.conte69.inflated.gii", hemi.fs_prefix())))
    }

    /// Companion volume screenshot utility.
    pub fn nifti_capture(&self) -> PathBuf {
        self.root.join("functions/nifti_capture.py")
    }

    /// Companion surface plotting utility.
    pub fn surface_plot(&self) -> PathBuf {
        self.root.join("functions/surface_plot.py")
    }

    /// Companion matrix plotting utility.
    pub fn matrix_plot(&self) -> PathBuf {
        self.root.join("functions/matrix_plot.py")
    }
}

/// Derivatives root holding the surface reconstructions.
///
/// When `out_root` is the pipeline's own `micapipe_v*` directory the
/// reconstructions live next to it, otherwise inside it.
pub fn default_derivatives_root(out_root: &Path) -> PathBuf {
    let is_pipeline_dir = out_root
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(PIPELINE_DIR_PREFIX));
    match out_root.parent() {
        Some(parent) if is_pipeline_dir => parent.to_path_buf(),
        _ => out_root.to_path_buf(),
    }
}

/// Report path for a status file: `<stem>_qc-report.pdf` in the same directory.
pub fn report_path_for(status_path: &Path) -> PathBuf {
    let stem = status_path
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    let mut name = stem;
    name.push(REPORT_SUFFIX);
    status_path.with_file_name(name)
}

fn session_path(root: &Path, subject: &SubjectIdentity) -> PathBuf {
    let subject_dir = root.join(subject.subject());
    match subject.session_dir() {
        Some(session) => subject_dir.join(session),
        None => subject_dir,
    }
}
