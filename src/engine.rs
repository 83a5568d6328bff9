//! Analysis driver.
//!
//! A [`Compilation`] owns the parsed trees and the symbol index built from
//! them; the index is built once and shared through an `Arc`. An
//! [`Analyzer`] walks each tree in pre-order and calls every rule registered
//! for the visited node's kind.
//!
//! Rule failures are contained: a handler that returns an error or panics is
//! logged and produces nothing, and the walk carries on with the next rule
//! and the next node. Cancellation is checked at every node; a cancelled
//! analysis returns `Err(Cancelled)` and no diagnostics.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

use codecop_syntax::bind::build_index;
use codecop_syntax::parser::{parse, ParseError};
use codecop_syntax::tree::SyntaxTree;
use codecop_syntax::visitor::{walk, VisitResult, Visitor};

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::{Config, ConfigError};
use crate::diagnostics::{sort_diagnostics, Diagnostic, DiagnosticSink};
use crate::index::SymbolIndex;
use crate::patch::FileId;
use crate::rules::{Rule, RuleContext, RuleError, RuleRegistry};
use crate::text::LineIndex;
use crate::types::NodeId;

// ============================================================================
// Compilation
// ============================================================================

/// Parsed trees plus the shared symbol index.
#[derive(Debug, Clone)]
pub struct Compilation {
    trees: Vec<SyntaxTree>,
    index: Arc<SymbolIndex>,
}

impl Compilation {
    /// Build the index for already-parsed trees.
    pub fn new(trees: Vec<SyntaxTree>) -> Self {
        let index = Arc::new(build_index(&trees));
        Compilation { trees, index }
    }

    /// Parse `(path, text)` pairs; file ids follow input order.
    pub fn from_sources<P, S>(sources: &[(P, S)]) -> Self
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        let trees = sources
            .iter()
            .enumerate()
            .map(|(i, (path, text))| parse(FileId::new(i as u32), path.as_ref(), text.as_ref()))
            .collect();
        Compilation::new(trees)
    }

    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    pub fn tree(&self, file_id: FileId) -> Option<&SyntaxTree> {
        self.trees.iter().find(|t| t.file_id == file_id)
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.trees.iter().find(|t| t.path == path).map(|t| t.file_id)
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    /// Current text of every file, keyed by id.
    pub fn sources(&self) -> HashMap<FileId, String> {
        self.trees
            .iter()
            .map(|t| (t.file_id, t.source.clone()))
            .collect()
    }

    /// Syntax errors across all files, in file order.
    pub fn parse_errors(&self) -> impl Iterator<Item = &ParseError> {
        self.trees.iter().flat_map(|t| t.errors().iter())
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Runs a [`RuleRegistry`] over trees.
#[derive(Debug, Default)]
pub struct Analyzer {
    registry: RuleRegistry,
}

impl Analyzer {
    pub fn new(registry: RuleRegistry) -> Self {
        Analyzer { registry }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Analyzer::new(RuleRegistry::from_config(config)?))
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Analyze one file against `index`, returning diagnostics in report order.
    pub fn analyze_file(
        &self,
        tree: &SyntaxTree,
        index: &SymbolIndex,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut diagnostics = self.walk_file(tree, index, cancel)?;
        sort_diagnostics(&mut diagnostics);
        Ok(diagnostics)
    }

    /// Analyze every file of a compilation in parallel.
    pub fn analyze(
        &self,
        compilation: &Compilation,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let span = tracing::info_span!("analyze", files = compilation.trees().len());
        let _guard = span.enter();

        let sink = DiagnosticSink::new();
        let index = compilation.index();
        compilation.trees().par_iter().try_for_each(|tree| {
            let diagnostics = self.walk_file(tree, index, cancel)?;
            sink.extend(diagnostics);
            Ok::<(), Cancelled>(())
        })?;

        let diagnostics = sink.into_sorted();
        tracing::info!(diagnostics = diagnostics.len(), "analysis complete");
        Ok(diagnostics)
    }

    fn walk_file(
        &self,
        tree: &SyntaxTree,
        index: &SymbolIndex,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let lines = LineIndex::new(&tree.source);
        let mut dispatch = Dispatch {
            registry: &self.registry,
            ctx: RuleContext::new(tree, index, &lines),
            cancel,
            diagnostics: Vec::new(),
            cancelled: false,
        };
        walk(tree, &mut dispatch);
        if dispatch.cancelled {
            tracing::debug!(file = %tree.path, "analysis cancelled");
            return Err(Cancelled);
        }
        Ok(dispatch.diagnostics)
    }
}

/// Per-file walk state: the dispatch table plus collected findings.
struct Dispatch<'a> {
    registry: &'a RuleRegistry,
    ctx: RuleContext<'a>,
    cancel: &'a CancellationToken,
    diagnostics: Vec<Diagnostic>,
    cancelled: bool,
}

impl Dispatch<'_> {
    /// Run one rule, containing errors and panics. Returns false on cancellation.
    fn run_rule(&mut self, rule: &dyn Rule, node: NodeId) -> bool {
        let meta = rule.metadata();
        let ctx = &self.ctx;
        match panic::catch_unwind(AssertUnwindSafe(|| rule.check(node, ctx))) {
            Ok(Ok(found)) => {
                let severity = self.registry.severity_for(&meta);
                self.diagnostics.extend(found.into_iter().map(|mut d| {
                    d.severity = severity;
                    d
                }));
            }
            Ok(Err(RuleError::Cancelled(_))) => return false,
            Ok(Err(err)) => {
                tracing::warn!(
                    rule = meta.id,
                    file = %self.ctx.tree.path,
                    node = %node,
                    error = %err,
                    "rule failed; skipping"
                );
            }
            Err(payload) => {
                tracing::warn!(
                    rule = meta.id,
                    file = %self.ctx.tree.path,
                    node = %node,
                    panic = panic_message(payload.as_ref()),
                    "rule panicked; skipping"
                );
            }
        }
        true
    }
}

impl Visitor for Dispatch<'_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitResult {
        if self.cancel.is_cancelled() {
            self.cancelled = true;
            return VisitResult::Stop;
        }
        let registry = self.registry;
        for rule in registry.rules_for(tree.kind(node)) {
            if !self.run_rule(rule, node) {
                self.cancelled = true;
                return VisitResult::Stop;
            }
        }
        VisitResult::Continue
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
