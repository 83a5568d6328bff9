//! Compile-only test to verify public API surface.
//!
//! This file is a compile-time contract for the public API: if it fails to
//! compile, a public re-export has been removed or renamed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// patch module - hash-anchored edits with atomic apply
use codecop::patch::{
    ApplyResult, Conflict, ContentHash, EditSet, FileId, OutputEdit, Span, TextEdit,
};

// index module - symbols and occurrences
use codecop::index::{
    Occurrence, OccurrenceKind, SourceFile, Symbol, SymbolId, SymbolIndex, SymbolKind, Visibility,
};

// error module - error types and codes
use codecop::error::{CodecopError, OutputErrorCode};

// cancellation, positions, locations
use codecop::cancel::{CancellationToken, Cancelled};
use codecop::text::{byte_offset_to_position, LineIndex};
use codecop::types::{Location, NodeId, NodeRef};

// ============================================================================
// Syntax Front End
// ============================================================================

use codecop::syntax::bind::build_index;
use codecop::syntax::parser::{parse, parse_strict, ParseError};
use codecop::syntax::scope::{collect_scopes, Scope, ScopeCollector, ScopeKind};
use codecop::syntax::tree::{NodeKind, SyntaxNode, SyntaxTree, TreeBuilder};
use codecop::syntax::visitor::{walk, VisitResult, Visitor};

// ============================================================================
// Rule Engine
// ============================================================================

use codecop::case::{to_camel, to_pascal, to_upper_snake};
use codecop::config::{Config, ConfigError, DeadBindingConfig, RulesConfig};
use codecop::dead_binding::{DeadBindingDetector, DeadBindingRule};
use codecop::diagnostics::{
    Category, Diagnostic, DiagnosticRecord, DiagnosticSink, Severity, SuggestedFix,
};
use codecop::engine::{Analyzer, Compilation};
use codecop::logging::{init_logging, LogFormat};
use codecop::rename::{
    FixAllOutcome, NotApplicableReason, RenameEngine, RenameError, RenameOutcome, RenameRequest,
    SkipReason, SourceStore,
};
use codecop::rules::{Rule, RuleContext, RuleError, RuleMetadata, RuleRegistry};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // The imports above form the public API contract.
    let _ = std::any::type_name::<Span>();
    let _ = std::any::type_name::<SymbolIndex>();
    let _ = std::any::type_name::<CodecopError>();
    let _ = std::any::type_name::<SyntaxTree>();
    let _ = std::any::type_name::<RuleRegistry>();
    let _ = std::any::type_name::<RenameEngine>();
    let _ = std::any::type_name::<DiagnosticSink>();
}

#[test]
fn builtin_rule_ids_are_stable() {
    let ids: Vec<_> = RuleRegistry::with_default_rules()
        .metadata()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, ["CCS0001", "CCS0002", "CCS0003", "CCS0004", "CCS0005"]);
}
