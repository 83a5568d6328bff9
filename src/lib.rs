//! codecop: naming-convention linting and symbol-safe renames
//!
//! A rule engine that walks parsed trees, flags identifiers and bindings
//! that break naming conventions or are never read, and computes atomic
//! rename edits that touch every reference to a symbol exactly once.
//!
//! ```ignore
//! use codecop::cancel::CancellationToken;
//! use codecop::engine::{Analyzer, Compilation};
//!
//! let compilation = Compilation::from_sources(&[("Widget.cs", source)]);
//! let diagnostics = Analyzer::default().analyze(&compilation, &CancellationToken::new())?;
//! ```

// Core infrastructure - re-exported from codecop-core
pub use codecop_core::cancel;
pub use codecop_core::error;
pub use codecop_core::index;
pub use codecop_core::patch;
pub use codecop_core::text;
pub use codecop_core::types;

// Syntax front end
pub use codecop_syntax as syntax;

// Rule engine
pub mod case;
pub mod config;
pub mod dead_binding;
pub mod diagnostics;
pub mod engine;
pub mod logging;
pub mod rename;
pub mod rules;

// Error bridges - converts engine errors to CodecopError
mod error_bridges;
