//! sitesafe-core: detection tallies and safety verdicts
//!
//! The pure part of the inspection pipeline. A detector (see `sitesafe-eye`)
//! produces [`Detection`]s for one image; [`aggregate`] folds them into a
//! [`CountTable`] covering the whole [`ClassCatalog`], and [`evaluate`]
//! turns the table into a [`SafetyVerdict`].

pub mod catalog;
pub mod counts;
pub mod error;
pub mod safety;
pub mod types;

pub use catalog::ClassCatalog;
pub use counts::{aggregate, CountRow, CountTable};
pub use error::{Error, Result};
pub use safety::{evaluate, SafetyCounts, SafetyVerdict, Severity};
pub use types::{BoundingBox, Detection};
