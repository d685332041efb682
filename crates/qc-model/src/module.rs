//! Pipeline modules that produce a QC report.
//!
//! Each module writes a status record named
//! `<bids_id>_module-<tag>[-<qualifier>].json` into the subject's `QC/`
//! directory. The qualifier carries the functional acquisition tag, the
//! streamline count or the microstructural acquisition, depending on the
//! module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A discrete stage of the upstream processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    /// Structural preprocessing (T1w nativepro).
    ProcStructural,
    /// Surface reconstruction.
    ProcSurf,
    /// Post-structural processing (registrations, parcellations).
    PostStructural,
    /// Resting-state functional processing.
    ProcFunc,
    /// Structural connectomes from tractography.
    StructuralConnectome,
    /// Microstructural profile covariance.
    Microstructural,
    /// Geodesic distance.
    GeodesicDistance,
}

impl ModuleKind {
    /// All modules in driver order.
    pub const ALL: [ModuleKind; 7] = [
        ModuleKind::ProcStructural,
        ModuleKind::ProcSurf,
        ModuleKind::PostStructural,
        ModuleKind::ProcFunc,
        ModuleKind::StructuralConnectome,
        ModuleKind::Microstructural,
        ModuleKind::GeodesicDistance,
    ];

    /// Tag as it appears in status file names.
    pub fn tag(&self) -> &'static str {
        match self {
            ModuleKind::ProcStructural => "proc_structural",
            ModuleKind::ProcSurf => "proc_surf",
            ModuleKind::PostStructural => "post_structural",
            ModuleKind::ProcFunc => "proc_func",
            ModuleKind::StructuralConnectome => "SC",
            ModuleKind::Microstructural => "MPC",
            ModuleKind::GeodesicDistance => "GD",
        }
    }

    /// Human-readable name for summaries.
    pub fn description(&self) -> &'static str {
        match self {
            ModuleKind::ProcStructural => "Structural processing",
            ModuleKind::ProcSurf => "Surface reconstruction",
            ModuleKind::PostStructural => "Post-structural processing",
            ModuleKind::ProcFunc => "Functional processing",
            ModuleKind::StructuralConnectome => "Structural connectomes",
            ModuleKind::Microstructural => "Microstructural profile covariance",
            ModuleKind::GeodesicDistance => "Geodesic distance",
        }
    }

    /// Returns true for modules whose report carries per-atlas connectomes.
    pub fn has_connectomes(&self) -> bool {
        matches!(
            self,
            ModuleKind::ProcFunc
                | ModuleKind::StructuralConnectome
                | ModuleKind::Microstructural
                | ModuleKind::GeodesicDistance
        )
    }

    /// Extracts the qualifier that follows the module tag in a status file
    /// name, e.g. `rsfmri` from `sub-01_module-proc_func-desc-rsfmri.json`.
    ///
    /// Returns `None` when the file name does not belong to this module or
    /// carries no qualifier.
    pub fn qualifier<'a>(&self, bids_id: &str, file_name: &'a str) -> Option<&'a str> {
        let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
        let prefix = format!("{bids_id}_module-{}", self.tag());
        let rest = stem.strip_prefix(prefix.as_str())?;
        let rest = rest.strip_prefix('-')?;
        let rest = match self {
            ModuleKind::ProcFunc => rest.strip_prefix("desc-").unwrap_or(rest),
            _ => rest,
        };
        if rest.is_empty() { None } else { Some(rest) }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ModuleKind {
    type Err = ModelError;

    /// Parses a module tag (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| ModelError::UnknownModule(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("sc".parse::<ModuleKind>().unwrap(), ModuleKind::StructuralConnectome);
        assert_eq!("proc_surf".parse::<ModuleKind>().unwrap(), ModuleKind::ProcSurf);
        assert!("proc_dwi".parse::<ModuleKind>().is_err());
    }

    #[test]
    fn extracts_qualifiers() {
        let bids = "sub-01_ses-01";
        assert_eq!(
            ModuleKind::ProcFunc.qualifier(bids, "sub-01_ses-01_module-proc_func-desc-se_task-rest.json"),
            Some("se_task-rest")
        );
        assert_eq!(
            ModuleKind::StructuralConnectome.qualifier(bids, "sub-01_ses-01_module-SC-40M.json"),
            Some("40M")
        );
        assert_eq!(
            ModuleKind::Microstructural.qualifier(bids, "sub-01_ses-01_module-MPC-qT1.json"),
            Some("qT1")
        );
        assert_eq!(
            ModuleKind::GeodesicDistance.qualifier(bids, "sub-01_ses-01_module-GD.json"),
            None
        );
        assert_eq!(
            ModuleKind::Microstructural.qualifier(bids, "sub-02_module-MPC-qT1.json"),
            None
        );
    }
}
