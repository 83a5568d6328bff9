// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax front end for codecop.
//!
//! This crate turns source text into something the rule engine can analyze:
//! - `token` / `parser`: a recovering parser for the C#-like fixture language
//! - `tree`: arena syntax trees with parent links and error nodes
//! - `visitor`: pre/post-order traversal with skip/stop control
//! - `scope`: method and closure scopes
//! - `bind`: symbol declaration, resolution and occurrence recording

pub mod bind;
pub mod parser;
pub mod scope;
pub mod token;
pub mod tree;
pub mod visitor;

pub use bind::build_index;
pub use parser::{parse, parse_strict, ParseError};
pub use tree::{NodeKind, SyntaxNode, SyntaxTree};
pub use visitor::{walk, VisitResult, Visitor};
