//! Discovery of status records and parcellation atlases.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use qc_model::ModuleKind;

use crate::error::{IngestError, Result};

/// File name suffix of the annotation files that define the atlas list.
const ATLAS_ANNOT_SUFFIX: &str = "_mics.annot";

/// Left-hemisphere annotation prefix; each atlas is listed once.
const LEFT_ANNOT_PREFIX: &str = "lh.";

/// Lists the regular files in `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Finds the status records of `module` in the subject's QC directory.
///
/// Matches `<bids_id>_module-<tag>.json` and `<bids_id>_module-<tag>-*.json`.
/// The result is sorted by file name.
pub fn find_status_files(qc_dir: &Path, bids_id: &str, module: ModuleKind) -> Result<Vec<PathBuf>> {
    let prefix = format!("{bids_id}_module-{}", module.tag());
    let files = list_files(qc_dir)?
        .into_iter()
        .filter(|path| {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                return false;
            };
            match stem.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('-'),
                None => false,
            }
        })
        .collect();
    Ok(files)
}

/// Discovers the parcellation atlases available for a subject.
///
/// Scans `label_dir` for `lh.<atlas>_mics.annot` and returns the atlas
/// names, sorted and deduplicated. Given `lh.schaefer-400_mics.annot` and
/// `lh.aparc_mics.annot` this yields `["aparc", "schaefer-400"]`.
pub fn discover_atlases(label_dir: &Path) -> Result<Vec<String>> {
    let atlases: BTreeSet<String> = list_files(label_dir)?
        .iter()
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
        .filter_map(atlas_from_annot)
        .collect();
    Ok(atlases.into_iter().collect())
}

/// Extracts the atlas name from a left-hemisphere annotation file name.
fn atlas_from_annot(file_name: &str) -> Option<String> {
    let atlas = file_name
        .strip_prefix(LEFT_ANNOT_PREFIX)?
        .strip_suffix(ATLAS_ANNOT_SUFFIX)?;
    if atlas.is_empty() {
        None
    } else {
        Some(atlas.to_string())
    }
}

/// Annotation file stem for an atlas (`<atlas>_mics`).
pub fn atlas_annot_name(atlas: &str) -> String {
    let suffix = ATLAS_ANNOT_SUFFIX.trim_end_matches(".annot");
    format!("{atlas}{suffix}")
}

/// Returns the first file in `dir` whose name starts with `prefix` and
/// ends with `suffix`, in file name order.
pub fn find_first_matching(dir: &Path, prefix: &str, suffix: &str) -> Result<Option<PathBuf>> {
    let found = list_files(dir)?.into_iter().find(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(prefix) && name.ends_with(suffix))
    });
    Ok(found)
}
