// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arena syntax tree.
//!
//! Every node lives in a single `Vec<SyntaxNode>` owned by its [`SyntaxTree`]
//! and is addressed by [`NodeId`]. Children are stored in source order; the
//! parent is an index back into the same arena, so the tree is acyclic by
//! construction and there are no ownership cycles.
//!
//! # Node shapes
//!
//! | Kind | `name` | Children |
//! |------|--------|----------|
//! | `ClassDecl`/`StructDecl`/`InterfaceDecl` | type name | `TypeParams`?, `BaseList`?, members |
//! | `FieldDecl`/`ConstDecl` | - | `TypeRef`, `Declarator`+ |
//! | `MethodDecl` | method name | `TypeRef`, `TypeParams`?, `ParamList`, `Block`? |
//! | `Parameter` | parameter name | `TypeRef`? |
//! | `Declarator` | bound name | initializer? |
//! | `LocalDecl`/`LocalConstDecl` | - | `TypeRef`, `Declarator`+ |
//! | `Lambda` | - | `ParamList`, body (`Block` or expression) |
//! | `Identifier` | identifier | - |
//! | `MemberAccess` | member name | receiver |
//! | `TypeRef` | type name | generic argument `TypeRef`s |
//! | `New` | - | `TypeRef`, arguments |
//! | `Assign` | - | target, value |
//! | `CompoundAssign` | - | target, value (`+=`, `-=`, `*=`, `/=`) |
//! | `Call` | - | callee, arguments |

use std::fmt;

use codecop_core::index::Visibility;
use serde::{Deserialize, Serialize};
use codecop_core::patch::{FileId, Span};
use codecop_core::types::NodeId;

use crate::parser::ParseError;

// ============================================================================
// NodeKind
// ============================================================================

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    CompilationUnit,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    BaseList,
    TypeParams,
    FieldDecl,
    ConstDecl,
    MethodDecl,
    ParamList,
    Parameter,
    Declarator,
    LocalDecl,
    LocalConstDecl,
    Block,
    ReturnStmt,
    ExprStmt,
    IfStmt,
    Lambda,
    Identifier,
    Literal,
    Unary,
    Binary,
    Assign,
    /// `x += y` and friends: the target is read, then written.
    CompoundAssign,
    Call,
    MemberAccess,
    New,
    This,
    TypeRef,
    Error,
}

impl NodeKind {
    /// Number of node kinds.
    pub const COUNT: usize = 31;

    /// Every kind, in `index()` order.
    pub const ALL: [NodeKind; NodeKind::COUNT] = [
        NodeKind::CompilationUnit,
        NodeKind::ClassDecl,
        NodeKind::StructDecl,
        NodeKind::InterfaceDecl,
        NodeKind::BaseList,
        NodeKind::TypeParams,
        NodeKind::FieldDecl,
        NodeKind::ConstDecl,
        NodeKind::MethodDecl,
        NodeKind::ParamList,
        NodeKind::Parameter,
        NodeKind::Declarator,
        NodeKind::LocalDecl,
        NodeKind::LocalConstDecl,
        NodeKind::Block,
        NodeKind::ReturnStmt,
        NodeKind::ExprStmt,
        NodeKind::IfStmt,
        NodeKind::Lambda,
        NodeKind::Identifier,
        NodeKind::Literal,
        NodeKind::Unary,
        NodeKind::Binary,
        NodeKind::Assign,
        NodeKind::CompoundAssign,
        NodeKind::Call,
        NodeKind::MemberAccess,
        NodeKind::New,
        NodeKind::This,
        NodeKind::TypeRef,
        NodeKind::Error,
    ];

    /// Dense index for per-kind dispatch tables.
    pub fn index(self) -> usize {
        match self {
            NodeKind::CompilationUnit => 0,
            NodeKind::ClassDecl => 1,
            NodeKind::StructDecl => 2,
            NodeKind::InterfaceDecl => 3,
            NodeKind::BaseList => 4,
            NodeKind::TypeParams => 5,
            NodeKind::FieldDecl => 6,
            NodeKind::ConstDecl => 7,
            NodeKind::MethodDecl => 8,
            NodeKind::ParamList => 9,
            NodeKind::Parameter => 10,
            NodeKind::Declarator => 11,
            NodeKind::LocalDecl => 12,
            NodeKind::LocalConstDecl => 13,
            NodeKind::Block => 14,
            NodeKind::ReturnStmt => 15,
            NodeKind::ExprStmt => 16,
            NodeKind::IfStmt => 17,
            NodeKind::Lambda => 18,
            NodeKind::Identifier => 19,
            NodeKind::Literal => 20,
            NodeKind::Unary => 21,
            NodeKind::Binary => 22,
            NodeKind::Assign => 23,
            NodeKind::CompoundAssign => 24,
            NodeKind::Call => 25,
            NodeKind::MemberAccess => 26,
            NodeKind::New => 27,
            NodeKind::This => 28,
            NodeKind::TypeRef => 29,
            NodeKind::Error => 30,
        }
    }

    /// Class, struct or interface declaration.
    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            NodeKind::ClassDecl | NodeKind::StructDecl | NodeKind::InterfaceDecl
        )
    }

    /// Declarations that carry `Declarator` children.
    pub fn is_multi_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::FieldDecl
                | NodeKind::ConstDecl
                | NodeKind::LocalDecl
                | NodeKind::LocalConstDecl
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Ident and Modifiers
// ============================================================================

/// An identifier token: its text and where it sits in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

impl Ident {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Ident {
            text: text.into(),
            span,
        }
    }
}

/// Declaration modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub public: bool,
    pub private: bool,
    pub protected: bool,
    pub internal: bool,
    pub is_static: bool,
    pub is_const: bool,
    pub readonly: bool,
}

impl Modifiers {
    /// Set the flag for a modifier keyword. Returns false for non-modifiers.
    pub fn set(&mut self, keyword: &str) -> bool {
        let flag = match keyword {
            "public" => &mut self.public,
            "private" => &mut self.private,
            "protected" => &mut self.protected,
            "internal" => &mut self.internal,
            "static" => &mut self.is_static,
            "const" => &mut self.is_const,
            "readonly" => &mut self.readonly,
            _ => return false,
        };
        *flag = true;
        true
    }

    /// Is `keyword` a declaration modifier?
    pub fn is_modifier(keyword: &str) -> bool {
        Modifiers::default().set(keyword)
    }

    /// Explicit accessibility, if any access modifier was written.
    pub fn declared_visibility(&self) -> Option<Visibility> {
        match (self.public, self.protected, self.internal, self.private) {
            (true, ..) => Some(Visibility::Public),
            (_, true, true, _) => Some(Visibility::ProtectedInternal),
            (_, true, _, _) => Some(Visibility::Protected),
            (_, _, true, _) => Some(Visibility::Internal),
            (_, _, _, true) => Some(Visibility::Private),
            _ => None,
        }
    }

    /// Accessibility with `default` applied when none was written.
    pub fn visibility_or(&self, default: Visibility) -> Visibility {
        self.declared_visibility().unwrap_or(default)
    }
}

// ============================================================================
// SyntaxNode and SyntaxTree
// ============================================================================

/// One node in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub name: Option<Ident>,
    pub modifiers: Modifiers,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl SyntaxNode {
    /// Text of the node's identifier, if it has one.
    pub fn name_text(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.text.as_str())
    }
}

/// A parsed file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub file_id: FileId,
    pub path: String,
    pub source: String,
    nodes: Vec<SyntaxNode>,
    root: NodeId,
    errors: Vec<ParseError>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Node by id, `None` for foreign ids.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Syntax errors recovered from while parsing.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Nearest ancestor (or `id` itself) of one of `kinds`.
    pub fn enclosing(&self, id: NodeId, kinds: &[NodeKind]) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| kinds.contains(&self.kind(n)))
    }

    /// First child of `kind`.
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    /// Does the subtree at `id` contain a parse-error node?
    pub fn contains_error(&self, id: NodeId) -> bool {
        self.descendants(id)
            .any(|n| self.kind(n) == NodeKind::Error)
    }
}

/// Iterator over ancestors. See [`SyntaxTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree. See [`SyntaxTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Bottom-up arena construction: children are added before their parent.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and adopt `children`.
    pub fn add(
        &mut self,
        kind: NodeKind,
        span: Span,
        name: Option<Ident>,
        modifiers: Modifiers,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(SyntaxNode {
            kind,
            span,
            name,
            modifiers,
            children,
            parent: None,
        });
        id
    }

    /// Add a childless node.
    pub fn leaf(&mut self, kind: NodeKind, span: Span, name: Option<Ident>) -> NodeId {
        self.add(kind, span, name, Modifiers::default(), Vec::new())
    }

    /// Span of an already added node.
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Arena length, usable as a rollback mark.
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Discard every node added after `mark`.
    ///
    /// Nodes after the mark have not been adopted by any node before it, so
    /// truncation never leaves a dangling child index.
    pub fn rollback(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    /// Finish the tree with `root` as its root node.
    pub fn finish(
        self,
        file_id: FileId,
        path: impl Into<String>,
        source: impl Into<String>,
        root: NodeId,
        errors: Vec<ParseError>,
    ) -> SyntaxTree {
        SyntaxTree {
            file_id,
            path: path.into(),
            source: source.into(),
            nodes: self.nodes,
            root,
            errors,
        }
    }
}
