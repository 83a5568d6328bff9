// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Binder: builds a [`SymbolIndex`] from parsed trees.
//!
//! # Passes
//!
//! 1. **Declare**: every type (nested types included) and every member
//!    (methods, fields, constants) becomes a symbol. Members are keyed per
//!    containing type.
//! 2. **Link**: base lists and the declared types of members are resolved by
//!    name, so member lookup can follow inheritance and `a.b.C()` chains can
//!    find `C` through the declared type of `b`.
//! 3. **Bind**: bodies and initializers are walked with a lexical environment
//!    (method, block, lambda). Parameters and locals are declared as they
//!    appear; identifiers resolve through the environment, then members of
//!    the enclosing types (and their bases), then global types.
//!
//! Assignment targets record `Write` occurrences and compound assignment
//! targets `ReadWrite`; names in type position record `TypeReference`;
//! everything else records `Read`. Calls pick among overloads by argument
//! count. Unresolved or ambiguous names record nothing.

use std::collections::{HashMap, HashSet};

use codecop_core::index::{
    OccurrenceKind, SourceFile, Symbol, SymbolId, SymbolIndex, SymbolKind, Visibility,
};
use codecop_core::types::{NodeId, NodeRef};

use crate::tree::{Ident, NodeKind, SyntaxTree};

/// Build the symbol index for a compilation.
pub fn build_index(trees: &[SyntaxTree]) -> SymbolIndex {
    let mut binder = Binder::default();

    for tree in trees {
        binder
            .index
            .insert_file(SourceFile::new(tree.file_id, &tree.path, &tree.source));
    }
    for tree in trees {
        for &child in tree.children(tree.root()) {
            if tree.kind(child).is_type_decl() {
                binder.declare_type(tree, child, None);
            }
        }
    }
    binder.link();
    for tree in trees {
        let mut file = FileBinder {
            binder: &mut binder,
            tree,
            type_stack: Vec::new(),
            env: Vec::new(),
        };
        file.bind_declaration(tree.root());
    }

    tracing::debug!(
        files = trees.len(),
        symbols = binder.index.symbol_count(),
        occurrences = binder.index.occurrence_count(),
        "symbol index built"
    );
    binder.index
}

// ============================================================================
// Declaration and linking
// ============================================================================

#[derive(Default)]
struct Binder {
    index: SymbolIndex,
    types_by_name: HashMap<String, Vec<SymbolId>>,
    type_by_node: HashMap<NodeRef, SymbolId>,
    /// type → member name → members (overloads share a name)
    members: HashMap<SymbolId, HashMap<String, Vec<SymbolId>>>,
    bases: HashMap<SymbolId, Vec<SymbolId>>,
    /// value symbol → the type symbol it was declared with
    declared_type: HashMap<SymbolId, SymbolId>,
    /// method → parameter count
    arity: HashMap<SymbolId, usize>,
    pending_bases: Vec<(SymbolId, Vec<String>)>,
    pending_member_types: Vec<(SymbolId, String, SymbolId)>,
}

impl Binder {
    fn declare_type(&mut self, tree: &SyntaxTree, node: NodeId, container: Option<SymbolId>) {
        let decl = tree.node(node);
        let Some(name) = decl.name.clone() else {
            return;
        };
        let kind = if decl.kind == NodeKind::InterfaceDecl {
            SymbolKind::Interface
        } else {
            SymbolKind::Type
        };
        let default_visibility = if container.is_some() {
            Visibility::Private
        } else {
            Visibility::Internal
        };

        let id = self.declare(
            tree,
            node,
            &name,
            kind,
            decl.modifiers.visibility_or(default_visibility),
            container,
        );
        self.types_by_name
            .entry(name.text.clone())
            .or_default()
            .push(id);
        self.type_by_node.insert(NodeRef::new(tree.file_id, node), id);

        let member_default = if kind == SymbolKind::Interface {
            Visibility::Public
        } else {
            Visibility::Private
        };

        for &child in tree.children(node) {
            let member = tree.node(child);
            match member.kind {
                k if k.is_type_decl() => self.declare_type(tree, child, Some(id)),
                NodeKind::BaseList => {
                    let names = type_ref_names(tree, child);
                    self.pending_bases.push((id, names));
                }
                NodeKind::MethodDecl => {
                    let Some(method_name) = member.name.clone() else {
                        continue;
                    };
                    let visibility = member.modifiers.visibility_or(member_default);
                    let method = self.declare(
                        tree,
                        child,
                        &method_name,
                        SymbolKind::Method,
                        visibility,
                        Some(id),
                    );
                    let params = tree
                        .child_of_kind(child, NodeKind::ParamList)
                        .map_or(0, |list| tree.children(list).len());
                    self.arity.insert(method, params);
                    self.pend_member_type(tree, child, method, id);
                }
                NodeKind::FieldDecl | NodeKind::ConstDecl => {
                    let symbol_kind = if member.kind == NodeKind::ConstDecl {
                        SymbolKind::Constant
                    } else {
                        SymbolKind::Field
                    };
                    let visibility = member.modifiers.visibility_or(member_default);
                    for &declarator in tree.children(child) {
                        if tree.kind(declarator) != NodeKind::Declarator {
                            continue;
                        }
                        let Some(field_name) = tree.node(declarator).name.clone() else {
                            continue;
                        };
                        let field = self.declare(
                            tree,
                            declarator,
                            &field_name,
                            symbol_kind,
                            visibility,
                            Some(id),
                        );
                        self.pend_member_type(tree, child, field, id);
                    }
                }
                _ => {}
            }
        }
    }

    fn declare(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        name: &Ident,
        kind: SymbolKind,
        visibility: Visibility,
        container: Option<SymbolId>,
    ) -> SymbolId {
        let id = self.index.next_symbol_id();
        let mut symbol = Symbol::new(
            id,
            kind,
            name.text.clone(),
            NodeRef::new(tree.file_id, node),
            name.span,
        )
        .with_visibility(visibility);
        if let Some(container) = container {
            symbol = symbol.with_container(container);
            self.members
                .entry(container)
                .or_default()
                .entry(name.text.clone())
                .or_default()
                .push(id);
        }
        self.index.insert_symbol(symbol)
    }

    fn pend_member_type(&mut self, tree: &SyntaxTree, decl: NodeId, member: SymbolId, container: SymbolId) {
        if let Some(type_name) = tree
            .child_of_kind(decl, NodeKind::TypeRef)
            .and_then(|t| tree.node(t).name_text())
        {
            self.pending_member_types
                .push((member, type_name.to_string(), container));
        }
    }

    fn link(&mut self) {
        for (ty, names) in std::mem::take(&mut self.pending_bases) {
            let context = self.container_of(ty);
            let resolved: Vec<SymbolId> = names
                .iter()
                .filter_map(|name| self.resolve_type_name(name, context))
                .collect();
            self.bases.insert(ty, resolved);
        }
        for (member, type_name, container) in std::mem::take(&mut self.pending_member_types) {
            if let Some(ty) = self.resolve_type_name(&type_name, Some(container)) {
                self.declared_type.insert(member, ty);
            }
        }
    }

    fn container_of(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.index.symbol(symbol).and_then(|s| s.container)
    }

    fn is_type_like(&self, symbol: SymbolId) -> bool {
        self.index
            .symbol(symbol)
            .is_some_and(|s| s.kind.is_type_like())
    }

    /// A member of `ty` or of any of its bases.
    ///
    /// The nearest type declaring `name` wins. With `arity`, only methods
    /// taking that many parameters (and non-method members) qualify; when
    /// none do, the search continues into the bases. More than one
    /// qualifying member is ambiguous.
    fn lookup_member(&self, ty: SymbolId, name: &str, arity: Option<usize>) -> MemberLookup {
        let mut visited = HashSet::new();
        let mut pending = vec![ty];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(ids) = self.members.get(&current).and_then(|m| m.get(name)) {
                let mut candidates = ids.iter().filter(|&&id| self.accepts(id, arity));
                match (candidates.next(), candidates.next()) {
                    (Some(&found), None) => return MemberLookup::Found(found),
                    (Some(_), Some(_)) => return MemberLookup::Ambiguous,
                    (None, _) => {}
                }
            }
            if let Some(bases) = self.bases.get(&current) {
                pending.extend(bases.iter().rev().copied());
            }
        }
        MemberLookup::Missing
    }

    fn accepts(&self, member: SymbolId, arity: Option<usize>) -> bool {
        match (arity, self.arity.get(&member)) {
            (Some(args), Some(&params)) => args == params,
            _ => true,
        }
    }

    /// Nested types of the enclosing types first, then global types.
    fn resolve_type_name(&self, name: &str, context: Option<SymbolId>) -> Option<SymbolId> {
        let mut current = context;
        while let Some(ty) = current {
            if let Some(found) = self
                .lookup_member(ty, name, None)
                .found()
                .filter(|&m| self.is_type_like(m))
            {
                return Some(found);
            }
            current = self.container_of(ty);
        }
        self.types_by_name
            .get(name)
            .and_then(|ids| ids.first())
            .copied()
    }
}

/// Outcome of a member lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberLookup {
    Missing,
    Found(SymbolId),
    /// Several overloads qualify.
    Ambiguous,
}

impl MemberLookup {
    fn found(self) -> Option<SymbolId> {
        match self {
            MemberLookup::Found(id) => Some(id),
            MemberLookup::Missing | MemberLookup::Ambiguous => None,
        }
    }
}

fn type_ref_names(tree: &SyntaxTree, node: NodeId) -> Vec<String> {
    tree.children(node)
        .iter()
        .filter(|&&c| tree.kind(c) == NodeKind::TypeRef)
        .filter_map(|&c| tree.node(c).name_text().map(str::to_string))
        .collect()
}

// ============================================================================
// Body binding
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    ReadWrite,
}

/// What an expression evaluates to, as far as member lookup cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    Unknown,
    /// A value of the given type.
    Instance(SymbolId),
    /// The type itself (`TypeName.Member`).
    Static(SymbolId),
}

impl Receiver {
    fn type_symbol(self) -> Option<SymbolId> {
        match self {
            Receiver::Instance(t) | Receiver::Static(t) => Some(t),
            Receiver::Unknown => None,
        }
    }
}

struct FileBinder<'a> {
    binder: &'a mut Binder,
    tree: &'a SyntaxTree,
    type_stack: Vec<SymbolId>,
    env: Vec<HashMap<String, SymbolId>>,
}

impl FileBinder<'_> {
    fn record(&mut self, symbol: SymbolId, node: NodeId, name: &Ident, kind: OccurrenceKind) {
        self.binder
            .index
            .add_occurrence(symbol, self.tree.file_id, node, name.span, kind);
    }

    fn occurrence_kind(&self, symbol: SymbolId, access: Access) -> OccurrenceKind {
        if self.binder.is_type_like(symbol) {
            OccurrenceKind::TypeReference
        } else {
            match access {
                Access::Read => OccurrenceKind::Read,
                Access::Write => OccurrenceKind::Write,
                Access::ReadWrite => OccurrenceKind::ReadWrite,
            }
        }
    }

    fn receiver_for(&self, symbol: SymbolId) -> Receiver {
        if self.binder.is_type_like(symbol) {
            Receiver::Static(symbol)
        } else {
            self.binder
                .declared_type
                .get(&symbol)
                .map_or(Receiver::Unknown, |&t| Receiver::Instance(t))
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn bind_declaration(&mut self, node: NodeId) {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::CompilationUnit => {
                for &child in tree.children(node) {
                    self.bind_declaration(child);
                }
            }
            k if k.is_type_decl() => {
                let Some(&ty) = self
                    .binder
                    .type_by_node
                    .get(&NodeRef::new(tree.file_id, node))
                else {
                    return;
                };
                self.type_stack.push(ty);
                for &child in tree.children(node) {
                    match tree.kind(child) {
                        NodeKind::BaseList => {
                            for &base in tree.children(child) {
                                self.bind_type(base);
                            }
                        }
                        NodeKind::TypeParams => {}
                        _ => self.bind_declaration(child),
                    }
                }
                self.type_stack.pop();
            }
            NodeKind::MethodDecl => {
                self.env.push(HashMap::new());
                for &child in tree.children(node) {
                    match tree.kind(child) {
                        NodeKind::TypeRef => {
                            self.bind_type(child);
                        }
                        NodeKind::TypeParams => {}
                        NodeKind::ParamList => self.declare_params(child),
                        _ => self.bind_body(child),
                    }
                }
                self.env.pop();
            }
            NodeKind::FieldDecl | NodeKind::ConstDecl => {
                for &child in tree.children(node) {
                    match tree.kind(child) {
                        NodeKind::TypeRef => {
                            self.bind_type(child);
                        }
                        NodeKind::Declarator => {
                            for &init in tree.children(child) {
                                self.bind_expr(init, Access::Read);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn declare_local(&mut self, node: NodeId, kind: SymbolKind, declared_type: Option<SymbolId>) {
        let Some(name) = self.tree.node(node).name.clone() else {
            return;
        };
        let id = self
            .binder
            .declare(self.tree, node, &name, kind, Visibility::Private, None);
        if let Some(ty) = declared_type {
            self.binder.declared_type.insert(id, ty);
        }
        if let Some(scope) = self.env.last_mut() {
            scope.insert(name.text, id);
        }
    }

    fn declare_params(&mut self, param_list: NodeId) {
        for &param in self.tree.children(param_list) {
            let ty = self
                .tree
                .child_of_kind(param, NodeKind::TypeRef)
                .and_then(|t| self.bind_type(t));
            self.declare_local(param, SymbolKind::Parameter, ty);
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn bind_body(&mut self, node: NodeId) {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Block => {
                self.env.push(HashMap::new());
                for &child in tree.children(node) {
                    self.bind_body(child);
                }
                self.env.pop();
            }
            NodeKind::LocalDecl | NodeKind::LocalConstDecl => {
                let kind = if tree.kind(node) == NodeKind::LocalConstDecl {
                    SymbolKind::Constant
                } else {
                    SymbolKind::LocalVariable
                };
                let mut declared = None;
                for &child in tree.children(node) {
                    match tree.kind(child) {
                        NodeKind::TypeRef => declared = self.bind_type(child),
                        NodeKind::Declarator => {
                            let mut ty = declared;
                            for &init in tree.children(child) {
                                if let Receiver::Instance(t) = self.bind_expr(init, Access::Read) {
                                    ty = ty.or(Some(t));
                                }
                            }
                            self.declare_local(child, kind, ty);
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::ReturnStmt | NodeKind::ExprStmt | NodeKind::IfStmt => {
                for &child in tree.children(node) {
                    self.bind_body(child);
                }
            }
            NodeKind::Error => {}
            _ => {
                self.bind_expr(node, Access::Read);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn bind_expr(&mut self, node: NodeId, access: Access) -> Receiver {
        let tree = self.tree;
        let syntax = tree.node(node);
        match syntax.kind {
            NodeKind::Identifier | NodeKind::MemberAccess => self.bind_name(node, access, None),
            NodeKind::This => self
                .type_stack
                .last()
                .map_or(Receiver::Unknown, |&t| Receiver::Instance(t)),
            NodeKind::New => {
                let mut result = Receiver::Unknown;
                for &child in tree.children(node) {
                    if tree.kind(child) == NodeKind::TypeRef {
                        if let Some(ty) = self.bind_type(child) {
                            result = Receiver::Instance(ty);
                        }
                    } else {
                        self.bind_expr(child, Access::Read);
                    }
                }
                result
            }
            NodeKind::Call => {
                let Some((&callee, args)) = tree.children(node).split_first() else {
                    return Receiver::Unknown;
                };
                let result = match tree.kind(callee) {
                    NodeKind::Identifier | NodeKind::MemberAccess => {
                        self.bind_name(callee, Access::Read, Some(args.len()))
                    }
                    _ => self.bind_expr(callee, Access::Read),
                };
                for &arg in args {
                    self.bind_expr(arg, Access::Read);
                }
                result
            }
            NodeKind::Assign | NodeKind::CompoundAssign => {
                let children = tree.children(node);
                let target_access = if syntax.kind == NodeKind::Assign {
                    Access::Write
                } else {
                    Access::ReadWrite
                };
                if let Some(&target) = children.first() {
                    self.bind_expr(target, target_access);
                }
                for &value in children.iter().skip(1) {
                    self.bind_expr(value, Access::Read);
                }
                Receiver::Unknown
            }
            NodeKind::Lambda => {
                self.env.push(HashMap::new());
                for &child in tree.children(node) {
                    if tree.kind(child) == NodeKind::ParamList {
                        self.declare_params(child);
                    } else {
                        self.bind_body(child);
                    }
                }
                self.env.pop();
                Receiver::Unknown
            }
            NodeKind::TypeRef => {
                self.bind_type(node);
                Receiver::Unknown
            }
            NodeKind::Block | NodeKind::LocalDecl | NodeKind::LocalConstDecl => {
                self.bind_body(node);
                Receiver::Unknown
            }
            NodeKind::Error => Receiver::Unknown,
            _ => {
                for &child in tree.children(node) {
                    self.bind_expr(child, Access::Read);
                }
                Receiver::Unknown
            }
        }
    }

    /// An identifier or `receiver.name`. `arity` is the argument count when
    /// the name is being called.
    fn bind_name(&mut self, node: NodeId, access: Access, arity: Option<usize>) -> Receiver {
        let tree = self.tree;
        let syntax = tree.node(node);
        let resolved = if syntax.kind == NodeKind::MemberAccess {
            let receiver = syntax
                .children
                .first()
                .map_or(Receiver::Unknown, |&r| self.bind_expr(r, Access::Read));
            syntax.name.as_ref().and_then(|name| {
                receiver.type_symbol().and_then(|ty| {
                    self.binder.lookup_member(ty, &name.text, arity).found()
                })
            })
        } else {
            syntax
                .name
                .as_ref()
                .and_then(|name| self.resolve_value(&name.text, arity))
        };
        let (Some(symbol), Some(name)) = (resolved, syntax.name.clone()) else {
            return Receiver::Unknown;
        };
        let kind = self.occurrence_kind(symbol, access);
        self.record(symbol, node, &name, kind);
        self.receiver_for(symbol)
    }

    /// Environment (innermost first), then members of enclosing types, then
    /// global types.
    fn resolve_value(&self, name: &str, arity: Option<usize>) -> Option<SymbolId> {
        if let Some(&local) = self.env.iter().rev().find_map(|scope| scope.get(name)) {
            return Some(local);
        }
        for &ty in self.type_stack.iter().rev() {
            match self.binder.lookup_member(ty, name, arity) {
                MemberLookup::Found(member) => return Some(member),
                MemberLookup::Ambiguous => return None,
                MemberLookup::Missing => {}
            }
        }
        self.binder
            .types_by_name
            .get(name)
            .and_then(|ids| ids.first())
            .copied()
    }

    /// Resolve a `TypeRef` (and its generic arguments), recording occurrences.
    fn bind_type(&mut self, node: NodeId) -> Option<SymbolId> {
        let tree = self.tree;
        for &arg in tree.children(node) {
            self.bind_type(arg);
        }
        let name = tree.node(node).name.clone()?;
        let resolved = self
            .binder
            .resolve_type_name(&name.text, self.type_stack.last().copied())?;
        self.record(resolved, node, &name, OccurrenceKind::TypeReference);
        Some(resolved)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use codecop_core::patch::FileId;

    fn index_for(sources: &[(&str, &str)]) -> (Vec<SyntaxTree>, SymbolIndex) {
        let trees: Vec<SyntaxTree> = sources
            .iter()
            .enumerate()
            .map(|(i, (path, source))| {
                let tree = parse(FileId::new(i as u32), path, source);
                assert!(!tree.has_errors(), "{:?}", tree.errors());
                tree
            })
            .collect();
        let index = build_index(&trees);
        (trees, index)
    }

    fn only(index: &SymbolIndex, name: &str) -> SymbolId {
        let found = index.symbols_named(name);
        assert_eq!(found.len(), 1, "expected exactly one symbol named {}", name);
        found[0].symbol_id
    }

    fn kinds(index: &SymbolIndex, symbol: SymbolId) -> Vec<OccurrenceKind> {
        index.occurrences_of(symbol).iter().map(|o| o.kind).collect()
    }

    mod declaration_tests {
        use super::*;

        #[test]
        fn declares_types_members_and_locals() {
            let (_, index) = index_for(&[(
                "a.cs",
                "public interface IShape { int Area(); }\n\
                 class Widget : IShape {\n\
                 private int count;\n\
                 const int maxSize = 10, minSize = 1;\n\
                 public int Area() { var local = count; return local; }\n\
                 }",
            )]);

            let shape = index.symbol(only(&index, "IShape")).unwrap();
            assert_eq!(shape.kind, SymbolKind::Interface);
            assert_eq!(shape.visibility, Visibility::Public);

            let widget = index.symbol(only(&index, "Widget")).unwrap();
            assert_eq!(widget.visibility, Visibility::Internal);

            let count = index.symbol(only(&index, "count")).unwrap();
            assert_eq!(count.kind, SymbolKind::Field);
            assert_eq!(count.container, Some(widget.symbol_id));

            assert_eq!(index.symbol(only(&index, "maxSize")).unwrap().kind, SymbolKind::Constant);
            assert_eq!(index.symbol(only(&index, "minSize")).unwrap().kind, SymbolKind::Constant);
            assert_eq!(index.symbol(only(&index, "local")).unwrap().kind, SymbolKind::LocalVariable);

            // Interface members default to public, class members to private.
            let areas = index.symbols_named("Area");
            assert_eq!(areas.len(), 2);
            assert!(areas.iter().all(|s| s.visibility == Visibility::Public));
        }
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn type_references_in_bases_generics_and_new() {
            let (_, index) = index_for(&[
                (
                    "widget.cs",
                    "class Widget : Base { List<Widget> items; Widget Make() { return new Widget(); } }",
                ),
                ("base.cs", "class Base { }"),
            ]);
            let widget = only(&index, "Widget");
            assert_eq!(
                kinds(&index, widget),
                vec![
                    OccurrenceKind::Declaration,
                    OccurrenceKind::TypeReference,
                    OccurrenceKind::TypeReference,
                    OccurrenceKind::TypeReference,
                ]
            );
            let base = only(&index, "Base");
            assert_eq!(index.occurrences_of(base).len(), 2);
        }

        #[test]
        fn reads_writes_and_this_access() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class Counter { int count; void Bump() { count = count + 1; this.count = 0; } }",
            )]);
            let count = only(&index, "count");
            assert_eq!(
                kinds(&index, count),
                vec![
                    OccurrenceKind::Declaration,
                    OccurrenceKind::Write,
                    OccurrenceKind::Read,
                    OccurrenceKind::Write,
                ]
            );
        }

        #[test]
        fn compound_assignment_reads_and_writes_its_target() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class Counter { int count; void Bump() { count += 2; this.count -= 1; } }",
            )]);
            let count = only(&index, "count");
            assert_eq!(
                kinds(&index, count),
                vec![
                    OccurrenceKind::Declaration,
                    OccurrenceKind::ReadWrite,
                    OccurrenceKind::ReadWrite,
                ]
            );
        }

        #[test]
        fn calls_pick_overloads_by_argument_count() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class Printer {\n\
                 void Print(int x) { }\n\
                 void Print(string s, int width) { }\n\
                 void M() { Print(1); Print(\"s\", 2); this.Print(3); }\n\
                 }",
            )]);
            let prints = index.symbols_named("Print");
            assert_eq!(prints.len(), 2);
            let one = prints[0].symbol_id;
            let two = prints[1].symbol_id;
            assert_eq!(index.occurrences_of(one).len(), 3);
            assert_eq!(index.occurrences_of(two).len(), 2);
        }

        #[test]
        fn ambiguous_overloads_record_nothing() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class Printer { void Print(int x) { } void Print(string s) { } void M() { Print(1); Run(Print); } }",
            )]);
            for print in index.symbols_named("Print") {
                assert_eq!(index.occurrences_of(print.symbol_id).len(), 1);
            }
        }

        #[test]
        fn arity_mismatch_falls_back_to_base_overload() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class Base { public void Log(int a, int b) { } }\n\
                 class Derived : Base { public void Log(int a) { } void M() { Log(1, 2); Log(3); } }",
            )]);
            for log in index.symbols_named("Log") {
                assert_eq!(index.occurrences_of(log.symbol_id).len(), 2);
            }
        }

        #[test]
        fn locals_shadow_members_by_identity() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class A { int value; int M() { int value = 1; return value; } int N() { return value; } }",
            )]);
            let values = index.symbols_named("value");
            assert_eq!(values.len(), 2);
            let field = values.iter().find(|s| s.kind == SymbolKind::Field).unwrap();
            let local = values
                .iter()
                .find(|s| s.kind == SymbolKind::LocalVariable)
                .unwrap();
            assert_eq!(index.occurrences_of(local.symbol_id).len(), 2);
            assert_eq!(index.occurrences_of(field.symbol_id).len(), 2);
        }

        #[test]
        fn member_access_through_declared_types_and_bases() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class Shape { public void Draw() { } }\n\
                 class Circle : Shape { }\n\
                 class Canvas { Circle main; void Paint(Circle c) {\n\
                 c.Draw(); main.Draw(); var other = new Circle(); other.Draw(); Helper.Run();\n\
                 } }\n\
                 class Helper { public static void Run() { } }",
            )]);
            let draw = only(&index, "Draw");
            assert_eq!(index.occurrences_of(draw).len(), 4);
            let run = only(&index, "Run");
            assert_eq!(index.occurrences_of(run).len(), 2);
            let helper = only(&index, "Helper");
            assert_eq!(kinds(&index, helper)[1], OccurrenceKind::TypeReference);
        }

        #[test]
        fn lambda_parameters_and_locals_are_scoped() {
            let (_, index) = index_for(&[(
                "a.cs",
                "class A { void M() { Run(x => { var y = x; return y; }); var x = 2; } }",
            )]);
            let xs = index.symbols_named("x");
            assert_eq!(xs.len(), 2);
            let param = xs.iter().find(|s| s.kind == SymbolKind::Parameter).unwrap();
            assert_eq!(index.occurrences_of(param.symbol_id).len(), 2);
            let local = xs
                .iter()
                .find(|s| s.kind == SymbolKind::LocalVariable)
                .unwrap();
            assert_eq!(index.occurrences_of(local.symbol_id).len(), 1);
        }

        #[test]
        fn unresolved_names_record_nothing() {
            let (_, index) = index_for(&[("a.cs", "class A { void M() { Console.WriteLine(missing); } }")]);
            assert!(index.symbols_named("missing").is_empty());
            // A, M, plus their declaration occurrences only.
            assert_eq!(index.occurrence_count(), 2);
        }
    }
}
