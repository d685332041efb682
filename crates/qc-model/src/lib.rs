//! Data model for pipeline QC reports.
//!
//! - [`SubjectIdentity`]: subject/session labels and the derived BIDS id
//! - [`ModuleKind`]: the pipeline modules that produce a report
//! - [`ModuleStatus`]: per-module status record gating report generation
//! - [`Matrix`]: dense matrix for connectomes
//! - [`descriptors`]: provenance JSON read by the section builders

pub mod descriptors;
pub mod error;
pub mod matrix;
pub mod module;
pub mod status;
pub mod subject;

pub use descriptors::{
    DatasetDescription, FuncCleanDescriptor, MpcDescriptor, NativeproDescriptor,
    PostStructuralDescriptor, SurfDescriptor, TractographyDescriptor,
};
pub use error::{ModelError, Result};
pub use matrix::Matrix;
pub use module::ModuleKind;
pub use status::{CompletionState, ModuleStatus, display_value};
pub use subject::{SESSION_NOT_DEFINED, SubjectIdentity};
