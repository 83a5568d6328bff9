//! Rule trait, rule context and the rule registry.
//!
//! A rule declares which node kinds it inspects and is called once per node
//! of those kinds by the analysis walk. Rules are stateless with respect to
//! the walk: everything they need arrives through [`RuleContext`].
//!
//! The [`RuleRegistry`] is an explicit value built from a list of rules. It
//! owns the per-kind dispatch table and any severity overrides loaded from
//! configuration.

pub mod naming;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use codecop_syntax::tree::{NodeKind, SyntaxTree};

use crate::cancel::Cancelled;
use crate::config::{Config, ConfigError};
use crate::dead_binding::DeadBindingRule;
use crate::diagnostics::{Category, Diagnostic, Severity};
use crate::index::{Symbol, SymbolIndex};
use crate::patch::Span;
use crate::text::LineIndex;
use crate::types::{Location, NodeId, NodeRef};

pub use naming::{ConstantNameRule, InterfaceNameRule, MethodTypeNameRule, PrivateFieldNameRule};

// ============================================================================
// Metadata
// ============================================================================

/// Static description of a rule, queryable without running an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub default_severity: Severity,
    pub has_fix: bool,
}

/// Ids of every built-in rule.
pub const BUILTIN_RULE_IDS: &[&str] = &["CCS0001", "CCS0002", "CCS0003", "CCS0004", "CCS0005"];

// ============================================================================
// Rule
// ============================================================================

/// Failure inside a rule handler.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The node does not have the shape the rule expects.
    #[error("unexpected {kind} node: {message}")]
    MalformedNode { kind: NodeKind, message: String },

    /// The analysis was cancelled while the rule was running.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl RuleError {
    pub fn malformed(kind: NodeKind, message: impl Into<String>) -> Self {
        RuleError::MalformedNode {
            kind,
            message: message.into(),
        }
    }
}

/// Everything a rule may look at for one node.
pub struct RuleContext<'a> {
    pub tree: &'a SyntaxTree,
    pub index: &'a SymbolIndex,
    pub lines: &'a LineIndex,
}

impl<'a> RuleContext<'a> {
    pub fn new(tree: &'a SyntaxTree, index: &'a SymbolIndex, lines: &'a LineIndex) -> Self {
        RuleContext { tree, index, lines }
    }

    /// Location of `span` in this file, with line/column projections.
    pub fn location(&self, span: Span) -> Location {
        let (line, col, end_line, end_col) = self.lines.span_position(&self.tree.source, span);
        Location::new(self.tree.path.clone(), line, col)
            .with_end(end_line, end_col)
            .with_bytes(span.start, span.end)
    }

    /// The symbol declared by `node`, if the index has one.
    pub fn declared_symbol(&self, node: NodeId) -> Option<&'a Symbol> {
        self.index
            .symbol_declared_by(NodeRef::new(self.tree.file_id, node))
    }
}

/// A structural rule dispatched by node kind.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;

    /// Node kinds this rule is called for.
    fn kinds(&self) -> &'static [NodeKind];

    /// Inspect one node.
    fn check(&self, node: NodeId, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError>;
}

// ============================================================================
// Registry
// ============================================================================

/// The set of active rules plus per-kind dispatch.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    by_kind: Vec<Vec<usize>>,
    severity_overrides: HashMap<String, Severity>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rules.iter().map(|r| r.metadata().id).collect::<Vec<_>>())
            .field("severity_overrides", &self.severity_overrides)
            .finish()
    }
}

impl RuleRegistry {
    /// Build a registry from an explicit rule list.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        let mut by_kind = vec![Vec::new(); NodeKind::COUNT];
        for (i, rule) in rules.iter().enumerate() {
            for kind in rule.kinds() {
                by_kind[kind.index()].push(i);
            }
        }
        RuleRegistry {
            rules,
            by_kind,
            severity_overrides: HashMap::new(),
        }
    }

    /// All built-in rules with default settings.
    pub fn with_default_rules() -> Self {
        RuleRegistry::new(default_rules("_"))
    }

    /// Built-in rules filtered and tuned by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = default_rules(&config.dead_binding.unused_prefix)
            .into_iter()
            .filter(|rule| !config.rules.disabled.iter().any(|id| id == rule.metadata().id))
            .collect();
        let mut registry = RuleRegistry::new(rules);
        for (id, severity) in &config.rules.severity {
            registry.set_severity(id.clone(), *severity);
        }
        Ok(registry)
    }

    /// Override the severity reported for `rule_id`.
    pub fn set_severity(&mut self, rule_id: impl Into<String>, severity: Severity) {
        self.severity_overrides.insert(rule_id.into(), severity);
    }

    /// Severity to report for a rule: the override, else its default.
    pub fn severity_for(&self, metadata: &RuleMetadata) -> Severity {
        self.severity_overrides
            .get(metadata.id)
            .copied()
            .unwrap_or(metadata.default_severity)
    }

    /// Rules registered for `kind`, in registration order.
    pub fn rules_for(&self, kind: NodeKind) -> impl Iterator<Item = &dyn Rule> {
        self.by_kind[kind.index()]
            .iter()
            .map(|&i| self.rules[i].as_ref())
    }

    /// Metadata for every active rule, sorted by id.
    pub fn metadata(&self) -> Vec<RuleMetadata> {
        let mut all: Vec<RuleMetadata> = self.rules.iter().map(|r| r.metadata()).collect();
        all.sort_by_key(|m| m.id);
        all
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.iter().any(|r| r.metadata().id == rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        RuleRegistry::with_default_rules()
    }
}

/// The built-in rule list.
pub fn default_rules(unused_prefix: &str) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MethodTypeNameRule),
        Box::new(InterfaceNameRule),
        Box::new(PrivateFieldNameRule),
        Box::new(ConstantNameRule),
        Box::new(DeadBindingRule::new(unused_prefix)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    mod registry_tests {
        use super::*;

        #[test]
        fn default_registry_covers_builtin_ids() {
            let registry = RuleRegistry::with_default_rules();
            let ids: Vec<_> = registry.metadata().iter().map(|m| m.id).collect();
            assert_eq!(ids, BUILTIN_RULE_IDS);
        }

        #[test]
        fn dispatch_table_follows_declared_kinds() {
            let registry = RuleRegistry::with_default_rules();
            let for_declarators: Vec<_> = registry
                .rules_for(NodeKind::Declarator)
                .map(|r| r.metadata().id)
                .collect();
            assert_eq!(for_declarators, vec!["CCS0003", "CCS0004"]);

            let for_methods: Vec<_> = registry
                .rules_for(NodeKind::MethodDecl)
                .map(|r| r.metadata().id)
                .collect();
            assert_eq!(for_methods, vec!["CCS0001", "CCS0005"]);

            assert_eq!(registry.rules_for(NodeKind::Binary).count(), 0);
        }

        #[test]
        fn config_disables_rules_and_overrides_severity() {
            let config = Config::from_toml_str(
                "[rules]\ndisabled = [\"CCS0004\"]\n[rules.severity]\nCCS0001 = \"error\"\n",
            )
            .unwrap();
            let registry = RuleRegistry::from_config(&config).unwrap();

            assert!(!registry.contains("CCS0004"));
            assert_eq!(registry.len(), 4);
            let method_rule = registry
                .metadata()
                .into_iter()
                .find(|m| m.id == "CCS0001")
                .unwrap();
            assert_eq!(registry.severity_for(&method_rule), Severity::Error);
        }

        #[test]
        fn metadata_serializes_for_rule_listing() {
            let registry = RuleRegistry::with_default_rules();
            let json = serde_json::to_value(registry.metadata()).unwrap();
            assert_eq!(json[4]["id"], "CCS0005");
            assert_eq!(json[4]["category"], "usage");
            assert_eq!(json[4]["defaultSeverity"], "Warning");
            assert_eq!(json[4]["hasFix"], true);
        }
    }
}
