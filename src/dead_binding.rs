//! Dead-binding (unused local) detection, rule CCS0005.
//!
//! Each method body and each lambda body is analyzed on its own:
//!
//! 1. declared: locals whose nearest enclosing scope owner is this scope
//!    (locals of nested lambdas belong to the lambda's own pass);
//! 2. read: symbols with a `Read` occurrence anywhere in the body, nested
//!    lambdas included;
//! 3. report `declared - read`, minus names starting with the unused marker.
//!
//! Sets are keyed by symbol identity, so a shadowing local never hides the
//! local it shadows. Bodies that contain a parse error are skipped.

use std::collections::HashSet;

use codecop_syntax::scope::{collect_scopes, owning_scope_node, scope_body, SCOPE_OWNERS};
use codecop_syntax::tree::{NodeKind, SyntaxTree};

use crate::cancel::{CancellationToken, Cancelled};
use crate::diagnostics::{Category, Diagnostic, Severity, SuggestedFix};
use crate::index::{SymbolIndex, SymbolKind};
use crate::rules::{Rule, RuleContext, RuleError, RuleMetadata};
use crate::text::LineIndex;
use crate::types::NodeId;

/// Default prefix marking a binding as intentionally unused.
pub const DEFAULT_UNUSED_PREFIX: &str = "_";

const METADATA: RuleMetadata = RuleMetadata {
    id: "CCS0005",
    title: "Local variable is declared but never read",
    category: Category::Usage,
    default_severity: Severity::Warning,
    has_fix: true,
};

/// Per-scope declared/read differencing.
#[derive(Debug, Clone)]
pub struct DeadBindingDetector {
    unused_prefix: String,
}

impl Default for DeadBindingDetector {
    fn default() -> Self {
        DeadBindingDetector::new(DEFAULT_UNUSED_PREFIX)
    }
}

impl DeadBindingDetector {
    pub fn new(unused_prefix: impl Into<String>) -> Self {
        DeadBindingDetector {
            unused_prefix: unused_prefix.into(),
        }
    }

    pub fn unused_prefix(&self) -> &str {
        &self.unused_prefix
    }

    /// Analyze every scope of `tree`. Cancellation is checked per scope.
    pub fn analyze(
        &self,
        tree: &SyntaxTree,
        index: &SymbolIndex,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let lines = LineIndex::new(&tree.source);
        let ctx = RuleContext::new(tree, index, &lines);
        let mut diagnostics = Vec::new();
        for scope in collect_scopes(tree) {
            cancel.check()?;
            diagnostics.extend(self.check_scope(scope.owner, &ctx));
        }
        Ok(diagnostics)
    }

    /// Dead bindings of the scope owned by `owner` (a method or lambda).
    pub fn check_scope(&self, owner: NodeId, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let tree = ctx.tree;
        let Some(body) = scope_body(tree, owner) else {
            tracing::debug!(file = %tree.path, owner = %owner, "scope has no body; skipped");
            return Vec::new();
        };
        if tree.contains_error(body) {
            tracing::debug!(file = %tree.path, owner = %owner, "scope body has parse errors; skipped");
            return Vec::new();
        }

        let read = ctx
            .index
            .symbols_read_within(tree.file_id, tree.node(body).span);

        let mut seen = HashSet::new();
        tree.descendants(body)
            .filter(|&n| is_local_declarator(tree, n))
            .filter(|&n| owning_scope_node(tree, n) == Some(owner))
            .filter_map(|n| ctx.declared_symbol(n))
            .filter(|symbol| symbol.kind == SymbolKind::LocalVariable)
            .filter(|symbol| !read.contains(&symbol.symbol_id))
            .filter(|symbol| !symbol.name.starts_with(&self.unused_prefix))
            .filter(|symbol| seen.insert(symbol.symbol_id))
            .map(|symbol| {
                let new_name = format!("{}{}", self.unused_prefix, symbol.name);
                Diagnostic::new(
                    METADATA.id,
                    METADATA.default_severity,
                    format!("Local variable '{}' is declared but never read", symbol.name),
                    ctx.location(symbol.decl_span),
                )
                .with_fix(SuggestedFix::rename(symbol.symbol_id, new_name))
            })
            .collect()
    }
}

fn is_local_declarator(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node) == NodeKind::Declarator
        && tree
            .parent(node)
            .is_some_and(|p| tree.kind(p) == NodeKind::LocalDecl)
}

/// [`DeadBindingDetector`] as a walker rule on scope owners.
#[derive(Debug, Clone, Default)]
pub struct DeadBindingRule {
    detector: DeadBindingDetector,
}

impl DeadBindingRule {
    pub fn new(unused_prefix: impl Into<String>) -> Self {
        DeadBindingRule {
            detector: DeadBindingDetector::new(unused_prefix),
        }
    }
}

impl Rule for DeadBindingRule {
    fn metadata(&self) -> RuleMetadata {
        METADATA
    }

    fn kinds(&self) -> &'static [NodeKind] {
        SCOPE_OWNERS
    }

    fn check(&self, node: NodeId, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        Ok(self.detector.check_scope(node, ctx))
    }
}
