//! Provenance descriptors written next to module outputs.
//!
//! Only the fields the QC report reads are modelled; unknown fields are
//! ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `<bids>/dataset_description.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDescription {
    #[serde(rename = "Name")]
    pub name: String,
}

/// `anat/<bids_id>_space-nativepro_T1w.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeproDescriptor {
    #[serde(rename = "inputsRawdata")]
    pub inputs_rawdata: String,
}

impl NativeproDescriptor {
    /// Raw input files, space separated in the descriptor.
    pub fn inputs(&self) -> Vec<&str> {
        self.inputs_rawdata.split_whitespace().collect()
    }
}

/// `surf/<bids_id>_proc_surf.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfDescriptor {
    /// Reconstruction software, e.g. `freesurfer` or `fastsurfer`.
    #[serde(rename = "SurfRecon")]
    pub surf_recon: String,
    /// Directory holding the reconstruction subjects.
    #[serde(rename = "SurfaceDir")]
    pub surface_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "fileName")]
    pub file_name: PathBuf,
}

/// `anat/<bids_id>_post_structural.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStructuralDescriptor {
    #[serde(rename = "SurfaceProc")]
    pub surface_proc: String,
    #[serde(rename = "NativeSurfSpace")]
    pub native_surf_space: FileRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuncPreprocess {
    /// Main scan(s), space separated (one per echo).
    #[serde(rename = "MainScan")]
    pub main_scan: String,
    #[serde(rename = "MainPhaseScan", default)]
    pub main_phase_scan: Option<PathBuf>,
    #[serde(rename = "ReversePhaseScan", default)]
    pub reverse_phase_scan: Option<PathBuf>,
}

impl FuncPreprocess {
    pub fn main_scans(&self) -> Vec<PathBuf> {
        self.main_scan.split_whitespace().map(PathBuf::from).collect()
    }
}

/// `func/desc-<tag>/volumetric/<bids_id>_space-func_desc-<acq>_clean.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncCleanDescriptor {
    #[serde(rename = "Acquisition")]
    pub acquisition: String,
    #[serde(rename = "Preprocess")]
    pub preprocess: FuncPreprocess,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "Name")]
    pub name: PathBuf,
}

/// `dwi/<bids_id>_space-dwi_desc-iFOD2-<N>_tractography.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TractographyDescriptor {
    #[serde(rename = "fileInfo")]
    pub file_info: FileInfo,
    /// Tractography parameters, shown as a key/value table.
    #[serde(rename = "Tractography")]
    pub tractography: Map<String, Value>,
}

impl TractographyDescriptor {
    /// Whether weighted structural connectomes were generated.
    pub fn weighted_sc(&self) -> bool {
        match self.tractography.get("weighted_SC") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// `mpc/acq-<acq>/<bids_id>_MPC-<acq>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpcDescriptor {
    pub microstructural_img: PathBuf,
    pub microstructural_reg: PathBuf,
    #[serde(rename = "surfaceTransformation")]
    pub surface_transformation: String,
}
