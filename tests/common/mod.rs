//! Common test utilities for nwpcat.
//!
//! This module provides shared fixtures and assertions for the integration
//! tests.

pub mod assertions;
pub mod test_data;
