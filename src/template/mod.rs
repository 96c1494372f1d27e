//! Date and lead-time path templates.
//!
//! This module provides the directive table and the template compiler used
//! to match listed files and to render paths from indexed dates.

pub mod compiler;
pub mod directive;

pub use compiler::{join_template, CompiledTemplate, Segment};
pub use directive::Directive;
