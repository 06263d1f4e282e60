use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A detection carried a label the detector's catalog does not know.
    /// Signals a catalog/detector mismatch; the run for that image is aborted.
    #[error("Unknown class label '{label}' (catalog has {catalog_size} classes)")]
    UnknownClass { label: String, catalog_size: usize },

    #[error("Invalid class catalog: {0}")]
    InvalidCatalog(String),
}

pub type Result<T> = std::result::Result<T, Error>;
