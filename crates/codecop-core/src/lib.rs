//! Core infrastructure for codecop.
//!
//! This crate provides language-agnostic infrastructure:
//! - Patch IR for hash-anchored edits with atomic apply
//! - Symbol index for declarations and occurrences
//! - Error types and error codes
//! - Cooperative cancellation
//! - Text position utilities

pub mod cancel;
pub mod error;
pub mod index;
pub mod patch;
pub mod text;
pub mod types;
