//! Mapping of region-level values onto surface vertices.

use std::collections::BTreeMap;

use crate::error::{ConnectomeError, Result};

/// Label marking vertices outside every region (medial wall).
pub const UNLABELLED: i64 = 0;

/// Projects one value per region onto the vertices of a labelled surface.
///
/// Regions are the distinct non-zero labels in ascending order; `values[i]`
/// is assigned to every vertex carrying the `i`-th region label. Vertices
/// labelled [`UNLABELLED`] receive `NaN`.
///
/// # Errors
///
/// [`ConnectomeError::LabelMismatch`] when `values` and the number of
/// distinct regions differ in length.
pub fn map_to_labels(values: &[f64], labels: &[i64]) -> Result<Vec<f64>> {
    let mut regions: BTreeMap<i64, usize> = labels
        .iter()
        .copied()
        .filter(|&label| label != UNLABELLED)
        .map(|label| (label, 0))
        .collect();

    if regions.len() != values.len() {
        return Err(ConnectomeError::LabelMismatch {
            values: values.len(),
            labels: regions.len(),
        });
    }
    for (index, slot) in regions.values_mut().enumerate() {
        *slot = index;
    }

    let mapped = labels
        .iter()
        .map(|label| match regions.get(label) {
            Some(&index) => values[index],
            None => f64::NAN,
        })
        .collect();
    Ok(mapped)
}
