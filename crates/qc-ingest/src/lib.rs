//! Pipeline output discovery for QC reports.
//!
//! - [`locator`]: expected artifact paths for a subject/session
//! - [`status`]: the completeness gate and JSON record loading
//! - [`discovery`]: status file enumeration and atlas discovery
//! - [`matrix`]: text matrix and label readers

pub mod discovery;
pub mod error;
pub mod locator;
pub mod matrix;
pub mod status;

pub use discovery::{
    atlas_annot_name, discover_atlases, find_first_matching, find_status_files, list_files,
};
pub use error::{IngestError, Result};
pub use locator::{
    ArtifactLocator, ConnectomeKind, HemiPair, Hemisphere, PipelineResources,
    default_derivatives_root, report_path_for,
};
pub use matrix::{read_csv_matrix, read_labels, read_matrix};
pub use status::{completed_status, is_module_complete, read_json, read_module_status};
