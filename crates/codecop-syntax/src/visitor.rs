// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait and walk functions for syntax tree traversal.
//!
//! - **Pre-order**: `visit` is called before descending into children
//! - **Post-order**: `leave` is called after all children have been visited
//! - **Source order**: children are visited in the order they appear
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave` called)

use codecop_core::types::NodeId;

use crate::tree::SyntaxTree;

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    SkipChildren,

    /// Stop traversal entirely.
    Stop,
}

/// Callbacks for [`walk`]. Both methods default to no-ops.
pub trait Visitor {
    /// Called before the node's children.
    #[allow(unused_variables)]
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> VisitResult {
        VisitResult::Continue
    }

    /// Called after the node's children.
    #[allow(unused_variables)]
    fn leave(&mut self, tree: &SyntaxTree, node: NodeId) {}
}

/// Walk the whole tree from its root.
pub fn walk<V: Visitor + ?Sized>(tree: &SyntaxTree, visitor: &mut V) -> VisitResult {
    walk_node(tree, tree.root(), visitor)
}

/// Walk the subtree rooted at `node`.
pub fn walk_node<V: Visitor + ?Sized>(tree: &SyntaxTree, node: NodeId, visitor: &mut V) -> VisitResult {
    match visitor.visit(tree, node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for &child in tree.children(node) {
                if walk_node(tree, child, visitor) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
        }
    }
    visitor.leave(tree, node);
    VisitResult::Continue
}
