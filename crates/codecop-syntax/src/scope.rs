// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! ScopeCollector visitor for method and closure scopes.
//!
//! Each method declaration and each lambda opens a [`Scope`]. Scopes record
//! the owning node, the body node (absent for bodiless methods) and the
//! enclosing scope, so a closure nested in a method points back at it.
//!
//! # Usage
//!
//! ```ignore
//! let tree = parse(file_id, "A.cs", source);
//! for scope in collect_scopes(&tree) {
//!     println!("{} {:?} parent={:?}", scope.id, scope.kind, scope.parent);
//! }
//! ```

use std::fmt;

use codecop_core::patch::Span;
use codecop_core::types::NodeId;
use serde::Serialize;

use crate::tree::{NodeKind, SyntaxTree};
use crate::visitor::{walk, VisitResult, Visitor};

/// The kind of analysis scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// A method body.
    Method,
    /// A lambda body.
    Closure,
}

impl ScopeKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Method => "method",
            ScopeKind::Closure => "closure",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a scope within one tree, in pre-order of the owning nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope_{}", self.0)
    }
}

/// A method or closure scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The `MethodDecl` or `Lambda` node.
    pub owner: NodeId,
    /// The enclosing scope, if any.
    pub parent: Option<ScopeId>,
    /// The body (`Block` or expression); `None` for `M();` declarations.
    pub body: Option<NodeId>,
}

impl Scope {
    /// Byte span of the body.
    pub fn body_span(&self, tree: &SyntaxTree) -> Option<Span> {
        self.body.map(|b| tree.node(b).span)
    }
}

/// The node kinds that open a scope.
pub const SCOPE_OWNERS: &[NodeKind] = &[NodeKind::MethodDecl, NodeKind::Lambda];

/// Nearest scope owner strictly above `node`.
pub fn owning_scope_node(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node)
        .find(|&n| SCOPE_OWNERS.contains(&tree.kind(n)))
}

/// The body of a scope-owning node.
///
/// Methods keep their body after the parameter list; lambdas keep it as the
/// second child.
pub fn scope_body(tree: &SyntaxTree, owner: NodeId) -> Option<NodeId> {
    let children = tree.children(owner);
    match tree.kind(owner) {
        NodeKind::Lambda => children.get(1).copied(),
        NodeKind::MethodDecl => children.last().copied().filter(|&last| {
            !matches!(
                tree.kind(last),
                NodeKind::ParamList | NodeKind::TypeRef | NodeKind::TypeParams
            )
        }),
        _ => None,
    }
}

/// A visitor that collects method and closure scopes.
#[derive(Debug, Default)]
pub struct ScopeCollector {
    /// Collected scopes.
    scopes: Vec<Scope>,
    /// Stack of scope IDs for tracking the current scope.
    scope_stack: Vec<ScopeId>,
}

impl ScopeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every scope in `tree`, outer scopes first.
    pub fn collect(tree: &SyntaxTree) -> Vec<Scope> {
        let mut collector = ScopeCollector::new();
        walk(tree, &mut collector);
        collector.scopes
    }

    /// Get the collected scopes, consuming the collector.
    pub fn into_scopes(self) -> Vec<Scope> {
        self.scopes
    }
}

impl Visitor for ScopeCollector {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitResult {
        let kind = match tree.kind(node) {
            NodeKind::MethodDecl => ScopeKind::Method,
            NodeKind::Lambda => ScopeKind::Closure,
            _ => return VisitResult::Continue,
        };
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            kind,
            owner: node,
            parent: self.scope_stack.last().copied(),
            body: scope_body(tree, node),
        });
        self.scope_stack.push(id);
        VisitResult::Continue
    }

    fn leave(&mut self, tree: &SyntaxTree, node: NodeId) {
        if SCOPE_OWNERS.contains(&tree.kind(node)) {
            self.scope_stack.pop();
        }
    }
}

/// Collect every scope in `tree`. See [`ScopeCollector::collect`].
pub fn collect_scopes(tree: &SyntaxTree) -> Vec<Scope> {
    ScopeCollector::collect(tree)
}
