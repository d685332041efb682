//! Connectome numerics and report context.
//!
//! - [`connectome`]: per-module normalization and nodal degree
//! - [`labels`]: region-to-vertex projection for surface plots
//! - [`context`]: the read-only [`ReportContext`] shared by section builders

pub mod connectome;
pub mod context;
pub mod error;
pub mod labels;

pub use connectome::{
    ConnectomeProfile, NormalizedConnectome, SUBCORTICAL_OFFSET, degree, drop_leading, symmetrize,
};
pub use context::{DEFAULT_STREAMLINES, ReportContext, ReportOptions, UNKNOWN_DATASET};
pub use error::{ConnectomeError, Result};
pub use labels::{UNLABELLED, map_to_labels};
