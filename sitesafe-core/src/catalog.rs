//! The fixed vocabulary of labels a detector can emit

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Ordered set of every class label a detector can produce.
///
/// Order is the detector's class-id order; [`CountTable`](crate::CountTable)
/// rows follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassCatalog {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassCatalog {
    /// Build a catalog from labels in class-id order.
    ///
    /// Rejects empty labels and duplicates, since either would make the
    /// label -> count mapping ambiguous.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());

        for (id, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!("class {} has an empty label", id)));
            }
            if index.insert(label.clone(), id).is_some() {
                return Err(Error::InvalidCatalog(format!("duplicate label '{}'", label)));
            }
        }

        Ok(Self { labels, index })
    }

    /// Build from an id -> label mapping, such as the `names` table exported
    /// with YOLO models. Ids must be contiguous from zero.
    pub fn from_indexed(names: &HashMap<usize, String>) -> Result<Self> {
        let ordered: BTreeMap<usize, &String> = names.iter().map(|(k, v)| (*k, v)).collect();
        for (expected, id) in ordered.keys().enumerate() {
            if *id != expected {
                return Err(Error::InvalidCatalog(format!(
                    "class ids are not contiguous: missing id {}",
                    expected
                )));
            }
        }
        Self::new(ordered.into_values().cloned())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Label for a class id
    pub fn label(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    /// Class id for a label
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl TryFrom<Vec<String>> for ClassCatalog {
    type Error = Error;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<ClassCatalog> for Vec<String> {
    fn from(catalog: ClassCatalog) -> Self {
        catalog.labels
    }
}
