//! Cases, experiments and the catalog built from a cases directory.
//!
//! A cases directory holds one sub-directory per case. Each case directory
//! contains a `meta.yaml` describing its experiments and, once scanned, a
//! `data.json` with their indexes.

pub mod case;
pub mod cases;
pub mod experiment;
pub mod selection;
pub mod summary;

pub use case::{read_meta, Case, CaseMeta, CaseScan, META_FILE};
pub use cases::{available_cases, Catalog};
pub use experiment::{Experiment, ExperimentMeta};
pub use selection::Selection;
pub use summary::{format_hm, group_by_hour};
