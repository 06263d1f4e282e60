//! Per-image tally of detections by class label

use crate::catalog::ClassCatalog;
use crate::error::{Error, Result};
use crate::types::Detection;
use serde::Serialize;

/// One `(label, count)` row of a [`CountTable`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
}

/// Count of detections for every label in a [`ClassCatalog`].
///
/// Every catalog label is present, zero when it was not observed, and the
/// rows keep catalog order. Only [`aggregate`] builds one and it is
/// read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountTable {
    rows: Vec<CountRow>,
}

impl CountTable {
    /// Count for a label, `None` when the label is not in the catalog
    pub fn get(&self, label: &str) -> Option<usize> {
        self.rows.iter().find(|row| row.label == label).map(|row| row.count)
    }

    /// Count for a label, treating labels outside the catalog as zero
    pub fn count_or_zero(&self, label: &str) -> usize {
        self.get(label).unwrap_or(0)
    }

    /// Sum over all rows; equals the number of aggregated detections
    pub fn total(&self) -> usize {
        self.rows.iter().map(|row| row.count).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.rows.iter().map(|row| (row.label.as_str(), row.count))
    }

    pub fn rows(&self) -> &[CountRow] {
        &self.rows
    }

    /// Labels with a non-zero count, in catalog order
    pub fn observed(&self) -> impl Iterator<Item = (&str, usize)> {
        self.iter().filter(|(_, count)| *count > 0)
    }
}

/// Fold one image's detections into a [`CountTable`].
///
/// Fails with [`Error::UnknownClass`] on the first detection whose label is
/// not in `catalog`; no partial table is returned.
pub fn aggregate(catalog: &ClassCatalog, detections: &[Detection]) -> Result<CountTable> {
    let mut counts = vec![0usize; catalog.len()];

    for detection in detections {
        let id = catalog
            .index_of(&detection.class_label)
            .ok_or_else(|| Error::UnknownClass {
                label: detection.class_label.clone(),
                catalog_size: catalog.len(),
            })?;
        counts[id] += 1;
    }

    let rows = catalog
        .iter()
        .zip(counts)
        .map(|(label, count)| CountRow {
            label: label.to_string(),
            count,
        })
        .collect();

    Ok(CountTable { rows })
}
