//! # nwpcat
//!
//! A catalog of archived numerical weather prediction output.
//!
//! Output files are described by templates mixing literal path parts with
//! date and lead-time directives, for example
//! `/archive/%Y/%m/%d/%H/ICMSHHARM+%LLLL`. The catalog scans an archive for
//! files matching such templates, keeps a compact index of which dates and
//! lead times exist, and turns that index back into concrete paths.
//!
//! ## Directives
//!
//! | Directive | Meaning                          | Width |
//! |-----------|----------------------------------|-------|
//! | `%Y`      | year                             | 4     |
//! | `%m`      | month                            | 2     |
//! | `%d`      | day                              | 2     |
//! | `%H`      | hour                             | 2     |
//! | `%M`      | minute                           | 2     |
//! | `*`       | wildcard                         | any   |
//! | `%LM`     | lead time minutes past the hour  | 2     |
//! | `%LLLL`   | lead time hours                  | 4     |
//! | `%LLL`    | lead time hours                  | 3     |
//! | `%LL`     | lead time hours                  | 2     |
//!
//! ## Architecture
//!
//! - **Templates**: [`template`] compiles templates, [`temporal`] parses and
//!   formats dates with lead times
//! - **Indexing**: [`scanner`] lists an archive into an [`index::Index`],
//!   [`index::merge`] folds it into the persisted [`index::MergedIndex`]
//! - **Queries**: [`reconstruct`] regenerates paths from an index
//! - **Catalog**: [`catalog`] ties cases, experiments, [`store`] and [`fs`]
//!   together

pub mod availability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fs;
pub mod index;
pub mod logging;
pub mod reconstruct;
pub mod scanner;
pub mod store;
pub mod template;
pub mod temporal;

pub use availability::{check_availability, MissingFile};
pub use catalog::{Case, Catalog, Experiment, Selection};
pub use config::{Action, Command, Config};
pub use error::{CatalogError, Result};
pub use fs::{Filesystem, LocalFilesystem};
pub use index::{merge, Index, MergedIndex};
pub use logging::{
    generate_operation_id, init_tracing, log_error, log_operation_end, log_operation_start,
    log_scan_stats, log_timed_operation,
};
pub use reconstruct::{reconstruct, ReconstructQuery};
pub use scanner::{scan, ScanOutcome};
pub use store::{IndexStore, JsonIndexStore};
pub use template::{CompiledTemplate, Directive};
pub use temporal::TemporalValue;
