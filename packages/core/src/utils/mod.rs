//! Utility functions for Formsmith Core
//!
//! This module provides common utility functions used across the codebase.

mod scope;

pub use scope::{ScopeParseError, ScopePath};
