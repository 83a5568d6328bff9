// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser for the fixture language.
//!
//! The language is a small C#-like subset: classes, structs and interfaces
//! with generic parameters and base lists; fields, constants and methods;
//! local declarations, `return`, `if`/`else`, blocks and expression
//! statements; lambdas, calls, member access, `new`, assignment, unary and
//! binary operators, and literals.
//!
//! # Error Recovery
//!
//! [`parse`] always returns a tree. A syntax error inside a statement, member
//! or top-level declaration discards the nodes built for that construct,
//! skips to the next `;` (consumed) or `}` (left for the enclosing block) and
//! leaves a single `Error` node in its place. The errors themselves are kept
//! on the tree ([`SyntaxTree::errors`]). Use [`parse_strict`] when any syntax
//! error should fail the parse.

use thiserror::Error;

use codecop_core::error::CodecopError;
use codecop_core::patch::{FileId, Span};
use codecop_core::text::LineIndex;
use codecop_core::types::NodeId;

use crate::token::{is_keyword, tokenize, Token, TokenKind, PREDEFINED_TYPES};
use crate::tree::{Ident, Modifiers, NodeKind, SyntaxTree, TreeBuilder};

/// A syntax error with its position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}:{line}:{col}: {message}")]
pub struct ParseError {
    pub path: String,
    pub line: u32,
    pub col: u32,
    pub span: Span,
    pub message: String,
}

impl From<ParseError> for CodecopError {
    fn from(err: ParseError) -> Self {
        CodecopError::ParseError {
            file: err.path,
            line: err.line,
            col: err.col,
            message: err.message,
        }
    }
}

/// Parse `source`, recovering from syntax errors.
pub fn parse(file_id: FileId, path: &str, source: &str) -> SyntaxTree {
    let (tokens, lex_errors) = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.errors.extend(lex_errors.into_iter().map(|e| SyntaxError {
        message: e.message.to_string(),
        span: e.span,
    }));

    let root = parser.parse_unit();

    let lines = LineIndex::new(source);
    let mut errors: Vec<ParseError> = parser
        .errors
        .into_iter()
        .map(|e| {
            let (line, col) = lines.position(source, e.span.start);
            ParseError {
                path: path.to_string(),
                line,
                col,
                span: e.span,
                message: e.message,
            }
        })
        .collect();
    errors.sort_by_key(|e| e.span.start);

    parser.builder.finish(file_id, path, source, root, errors)
}

/// Parse `source`, failing on the first syntax error.
pub fn parse_strict(file_id: FileId, path: &str, source: &str) -> Result<SyntaxTree, ParseError> {
    let tree = parse(file_id, path, source);
    match tree.errors().first() {
        Some(err) => Err(err.clone()),
        None => Ok(tree),
    }
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug)]
struct SyntaxError {
    message: String,
    span: Span,
}

type PResult<T> = Result<T, SyntaxError>;

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/="];

fn binary_precedence(op: &str) -> Option<u8> {
    let prec = match op {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" => 3,
        "<" | ">" | "<=" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        _ => return None,
    };
    Some(prec)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    last_end: usize,
    builder: TreeBuilder,
    errors: Vec<SyntaxError>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
            last_end: 0,
            builder: TreeBuilder::new(),
            errors: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------------

    fn peek(&self) -> Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    fn text(&self, token: Token) -> &'src str {
        &self.source[token.span.start..token.span.end]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_punct(&self, p: &str) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Punct && self.text(tok) == p
    }

    fn at_word(&self, w: &str) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Word && self.text(tok) == w
    }

    fn is_name(&self, token: Token) -> bool {
        token.kind == TokenKind::Word && !is_keyword(self.text(token))
    }

    fn is_type_start(&self, token: Token) -> bool {
        self.is_name(token)
            || (token.kind == TokenKind::Word && PREDEFINED_TYPES.contains(&self.text(token)))
    }

    fn bump(&mut self) -> Token {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_end = tok.span.end;
        }
        tok
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            span: self.peek().span,
        }
    }

    fn expect_punct(&mut self, p: &str) -> PResult<Token> {
        if self.at_punct(p) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected '{}'", p)))
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        let tok = self.peek();
        if self.is_name(tok) {
            self.bump();
            Ok(Ident::new(self.text(tok), tok.span))
        } else {
            Err(self.error_here("expected identifier"))
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn node(&mut self, kind: NodeKind, start: usize, name: Option<Ident>, children: Vec<NodeId>) -> NodeId {
        let span = self.span_from(start);
        self.builder
            .add(kind, span, name, Modifiers::default(), children)
    }

    // ------------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------------

    /// Run `f`; on failure discard its nodes, skip to a recovery point and
    /// return an `Error` node covering the skipped text.
    fn recover(&mut self, f: impl FnOnce(&mut Self) -> PResult<NodeId>) -> NodeId {
        let mark = self.builder.mark();
        let start_pos = self.pos;
        let start = self.peek().span.start;

        match f(self) {
            Ok(id) => id,
            Err(err) => {
                self.builder.rollback(mark);
                self.errors.push(err);

                if self.pos == start_pos {
                    self.bump();
                }
                while !self.at_eof() && !self.at_punct("}") && !self.at_declaration_start() {
                    if self.bump_is(";") {
                        break;
                    }
                }

                let span = self.span_from(start);
                self.builder.leaf(NodeKind::Error, span, None)
            }
        }
    }

    /// Type keywords and modifiers never appear inside a statement.
    fn at_declaration_start(&self) -> bool {
        let tok = self.peek();
        if tok.kind != TokenKind::Word {
            return false;
        }
        let text = self.text(tok);
        matches!(text, "class" | "struct" | "interface") || Modifiers::is_modifier(text)
    }

    fn bump_is(&mut self, p: &str) -> bool {
        let tok = self.bump();
        tok.kind == TokenKind::Punct && self.text(tok) == p
    }

    /// Consume a closing brace, recording (not failing on) its absence.
    fn close_brace(&mut self) {
        if self.at_punct("}") {
            self.bump();
        } else {
            let err = self.error_here("expected '}'");
            self.errors.push(err);
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn parse_unit(&mut self) -> NodeId {
        let mut children = Vec::new();
        while !self.at_eof() {
            children.push(self.recover(|p| p.parse_type_decl()));
        }
        self.builder.add(
            NodeKind::CompilationUnit,
            Span::new(0, self.source.len()),
            None,
            Modifiers::default(),
            children,
        )
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        while self.peek().kind == TokenKind::Word && modifiers.set(self.text(self.peek())) {
            self.bump();
        }
        modifiers
    }

    fn parse_type_decl(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;
        let modifiers = self.parse_modifiers();
        self.parse_type_decl_body(start, modifiers)
    }

    fn parse_type_decl_body(&mut self, start: usize, modifiers: Modifiers) -> PResult<NodeId> {
        let kind = if self.at_word("class") {
            NodeKind::ClassDecl
        } else if self.at_word("struct") {
            NodeKind::StructDecl
        } else if self.at_word("interface") {
            NodeKind::InterfaceDecl
        } else {
            return Err(self.error_here("expected 'class', 'struct' or 'interface'"));
        };
        self.bump();

        let name = self.expect_ident()?;
        let mut children = Vec::new();
        if self.at_punct("<") {
            children.push(self.parse_type_params()?);
        }
        if self.at_punct(":") {
            children.push(self.parse_base_list()?);
        }

        self.expect_punct("{")?;
        while !self.at_eof() && !self.at_punct("}") {
            children.push(self.recover(|p| p.parse_member()));
        }
        self.close_brace();

        let span = self.span_from(start);
        Ok(self.builder.add(kind, span, Some(name), modifiers, children))
    }

    fn parse_type_params(&mut self) -> PResult<NodeId> {
        let start = self.expect_punct("<")?.span.start;
        let mut params = Vec::new();
        loop {
            let name = self.expect_ident()?;
            params.push(self.builder.leaf(NodeKind::Identifier, name.span, Some(name)));
            if self.at_punct(",") {
                self.bump();
            } else {
                break;
            }
        }
        self.expect_punct(">")?;
        Ok(self.node(NodeKind::TypeParams, start, None, params))
    }

    fn parse_base_list(&mut self) -> PResult<NodeId> {
        let start = self.expect_punct(":")?.span.start;
        let mut bases = vec![self.parse_type()?];
        while self.at_punct(",") {
            self.bump();
            bases.push(self.parse_type()?);
        }
        Ok(self.node(NodeKind::BaseList, start, None, bases))
    }

    fn parse_member(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;
        let modifiers = self.parse_modifiers();

        if self.at_word("class") || self.at_word("struct") || self.at_word("interface") {
            return self.parse_type_decl_body(start, modifiers);
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        let (kind, mut rest) = if modifiers.is_const {
            (NodeKind::ConstDecl, self.parse_declarators(Some(name))?)
        } else if self.at_punct("(") || self.at_punct("<") {
            return self.parse_method(start, modifiers, ty, name);
        } else {
            (NodeKind::FieldDecl, self.parse_declarators(Some(name))?)
        };
        self.expect_punct(";")?;

        let mut children = vec![ty];
        children.append(&mut rest);
        let span = self.span_from(start);
        Ok(self.builder.add(kind, span, None, modifiers, children))
    }

    fn parse_method(
        &mut self,
        start: usize,
        modifiers: Modifiers,
        return_type: NodeId,
        name: Ident,
    ) -> PResult<NodeId> {
        let mut children = vec![return_type];
        if self.at_punct("<") {
            children.push(self.parse_type_params()?);
        }
        children.push(self.parse_param_list()?);

        if self.at_punct("{") {
            children.push(self.parse_block()?);
        } else if self.at_punct("=>") {
            self.bump();
            children.push(self.parse_expr()?);
            self.expect_punct(";")?;
        } else {
            self.expect_punct(";")?;
        }

        let span = self.span_from(start);
        Ok(self
            .builder
            .add(NodeKind::MethodDecl, span, Some(name), modifiers, children))
    }

    fn parse_param_list(&mut self) -> PResult<NodeId> {
        let start = self.expect_punct("(")?.span.start;
        let mut params = Vec::new();
        if !self.at_punct(")") {
            loop {
                let param_start = self.peek().span.start;
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                params.push(self.node(NodeKind::Parameter, param_start, Some(name), vec![ty]));
                if self.at_punct(",") {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        Ok(self.node(NodeKind::ParamList, start, None, params))
    }

    /// `name (= init)? (, name (= init)?)*`, with `first` already consumed.
    fn parse_declarators(&mut self, mut first: Option<Ident>) -> PResult<Vec<NodeId>> {
        let mut declarators = Vec::new();
        loop {
            let name = match first.take() {
                Some(name) => name,
                None => self.expect_ident()?,
            };
            let start = name.span.start;
            let mut children = Vec::new();
            if self.at_punct("=") {
                self.bump();
                children.push(self.parse_expr()?);
            }
            declarators.push(self.node(NodeKind::Declarator, start, Some(name), children));

            if self.at_punct(",") {
                self.bump();
            } else {
                break;
            }
        }
        Ok(declarators)
    }

    fn parse_type(&mut self) -> PResult<NodeId> {
        let tok = self.peek();
        if !self.is_type_start(tok) {
            return Err(self.error_here("expected type"));
        }
        self.bump();
        let name = Ident::new(self.text(tok), tok.span);

        let mut args = Vec::new();
        if self.at_punct("<") {
            self.bump();
            loop {
                args.push(self.parse_type()?);
                if self.at_punct(",") {
                    self.bump();
                } else {
                    break;
                }
            }
            self.expect_punct(">")?;
        }
        if self.at_punct("[") {
            self.bump();
            self.expect_punct("]")?;
        }

        Ok(self.node(NodeKind::TypeRef, tok.span.start, Some(name), args))
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn parse_block(&mut self) -> PResult<NodeId> {
        let start = self.expect_punct("{")?.span.start;
        let mut statements = Vec::new();
        while !self.at_eof() && !self.at_punct("}") {
            statements.push(self.recover(|p| p.parse_statement()));
        }
        self.close_brace();
        Ok(self.node(NodeKind::Block, start, None, statements))
    }

    fn parse_statement(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;

        if self.at_punct("{") {
            return self.parse_block();
        }

        if self.at_word("return") {
            self.bump();
            let mut children = Vec::new();
            if !self.at_punct(";") {
                children.push(self.parse_expr()?);
            }
            self.expect_punct(";")?;
            return Ok(self.node(NodeKind::ReturnStmt, start, None, children));
        }

        if self.at_word("if") {
            self.bump();
            self.expect_punct("(")?;
            let cond = self.parse_expr()?;
            self.expect_punct(")")?;
            let mut children = vec![cond, self.parse_statement()?];
            if self.at_word("else") {
                self.bump();
                children.push(self.parse_statement()?);
            }
            return Ok(self.node(NodeKind::IfStmt, start, None, children));
        }

        if self.at_word("const") {
            self.bump();
            return self.parse_local_decl(start, NodeKind::LocalConstDecl);
        }

        if self.looks_like_local_decl() {
            return self.parse_local_decl(start, NodeKind::LocalDecl);
        }

        let expr = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(self.node(NodeKind::ExprStmt, start, None, vec![expr]))
    }

    fn parse_local_decl(&mut self, start: usize, kind: NodeKind) -> PResult<NodeId> {
        let mut children = vec![self.parse_type()?];
        children.extend(self.parse_declarators(None)?);
        self.expect_punct(";")?;
        let modifiers = Modifiers {
            is_const: kind == NodeKind::LocalConstDecl,
            ..Modifiers::default()
        };
        let span = self.span_from(start);
        Ok(self.builder.add(kind, span, None, modifiers, children))
    }

    /// Does a type followed by a name start here (`int x`, `List<T> x`)?
    fn looks_like_local_decl(&self) -> bool {
        if !self.is_type_start(self.peek()) {
            return false;
        }
        let mut i = 1;
        let is = |i: usize, p: &str| {
            let tok = self.peek_at(i);
            tok.kind == TokenKind::Punct && self.text(tok) == p
        };

        if is(i, "<") {
            let mut depth = 0usize;
            loop {
                let tok = self.peek_at(i);
                match (tok.kind, self.text(tok)) {
                    (TokenKind::Punct, "<") => depth += 1,
                    (TokenKind::Punct, ">") => {
                        depth -= 1;
                        if depth == 0 {
                            i += 1;
                            break;
                        }
                    }
                    (TokenKind::Punct, "," | "[" | "]") | (TokenKind::Word, _) => {}
                    _ => return false,
                }
                i += 1;
            }
        }
        if is(i, "[") && is(i + 1, "]") {
            i += 2;
        }
        self.is_name(self.peek_at(i))
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn parse_expr(&mut self) -> PResult<NodeId> {
        if self.lambda_ahead() {
            return self.parse_lambda();
        }

        let lhs = self.parse_binary(1)?;
        let tok = self.peek();
        if tok.kind == TokenKind::Punct && ASSIGN_OPS.contains(&self.text(tok)) {
            let kind = if self.text(tok) == "=" {
                NodeKind::Assign
            } else {
                NodeKind::CompoundAssign
            };
            self.bump();
            let rhs = self.parse_expr()?;
            let start = self.builder.span(lhs).start;
            return Ok(self.node(kind, start, None, vec![lhs, rhs]));
        }
        Ok(lhs)
    }

    /// `x =>` or `(a, b) =>` or `() =>`.
    fn lambda_ahead(&self) -> bool {
        let is = |i: usize, p: &str| {
            let tok = self.peek_at(i);
            tok.kind == TokenKind::Punct && self.text(tok) == p
        };

        if self.is_name(self.peek()) {
            return is(1, "=>");
        }
        if !is(0, "(") {
            return false;
        }
        let mut i = 1;
        if is(i, ")") {
            return is(i + 1, "=>");
        }
        loop {
            if !self.is_name(self.peek_at(i)) {
                return false;
            }
            i += 1;
            if is(i, ",") {
                i += 1;
            } else if is(i, ")") {
                return is(i + 1, "=>");
            } else {
                return false;
            }
        }
    }

    fn parse_lambda(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;
        let mut params = Vec::new();

        if self.at_punct("(") {
            self.bump();
            while !self.at_punct(")") {
                let name = self.expect_ident()?;
                let param_start = name.span.start;
                params.push(self.node(NodeKind::Parameter, param_start, Some(name), Vec::new()));
                if self.at_punct(",") {
                    self.bump();
                }
            }
            self.bump();
        } else {
            let name = self.expect_ident()?;
            let param_start = name.span.start;
            params.push(self.node(NodeKind::Parameter, param_start, Some(name), Vec::new()));
        }
        let param_list = self.node(NodeKind::ParamList, start, None, params);

        self.expect_punct("=>")?;
        let body = if self.at_punct("{") {
            self.parse_block()?
        } else {
            self.parse_expr()?
        };
        Ok(self.node(NodeKind::Lambda, start, None, vec![param_list, body]))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<NodeId> {
        let mut lhs = self.parse_unary()?;
        loop {
            let tok = self.peek();
            if tok.kind != TokenKind::Punct {
                break;
            }
            let Some(prec) = binary_precedence(self.text(tok)) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1)?;
            let start = self.builder.span(lhs).start;
            lhs = self.node(NodeKind::Binary, start, None, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        if ["!", "-", "++", "--"].iter().any(|op| self.at_punct(op)) {
            let start = self.bump().span.start;
            let operand = self.parse_unary()?;
            return Ok(self.node(NodeKind::Unary, start, None, vec![operand]));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = self.builder.span(expr).start;
            if self.at_punct(".") {
                self.bump();
                let member = self.expect_ident()?;
                expr = self.node(NodeKind::MemberAccess, start, Some(member), vec![expr]);
            } else if self.at_punct("(") {
                let mut children = vec![expr];
                children.extend(self.parse_args()?);
                expr = self.node(NodeKind::Call, start, None, children);
            } else if self.at_punct("++") || self.at_punct("--") {
                self.bump();
                expr = self.node(NodeKind::Unary, start, None, vec![expr]);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> PResult<Vec<NodeId>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.at_punct(")") {
            loop {
                args.push(self.parse_expr()?);
                if self.at_punct(",") {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let tok = self.peek();
        let start = tok.span.start;
        match (tok.kind, self.text(tok)) {
            (TokenKind::Number | TokenKind::Str, _) | (TokenKind::Word, "true" | "false" | "null") => {
                self.bump();
                Ok(self.node(NodeKind::Literal, start, None, Vec::new()))
            }
            (TokenKind::Word, "this") => {
                self.bump();
                Ok(self.node(NodeKind::This, start, None, Vec::new()))
            }
            (TokenKind::Word, "new") => {
                self.bump();
                let mut children = vec![self.parse_type()?];
                children.extend(self.parse_args()?);
                Ok(self.node(NodeKind::New, start, None, children))
            }
            (TokenKind::Punct, "(") => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            _ if self.is_name(tok) => {
                let name = self.expect_ident()?;
                Ok(self.node(NodeKind::Identifier, start, Some(name), Vec::new()))
            }
            _ => Err(self.error_here("expected expression")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> SyntaxTree {
        let tree = parse(FileId::new(0), "test.cs", source);
        assert!(tree.errors().is_empty(), "unexpected errors: {:?}", tree.errors());
        tree
    }

    fn kinds_of(tree: &SyntaxTree) -> Vec<NodeKind> {
        tree.descendants(tree.root()).map(|n| tree.kind(n)).collect()
    }

    fn names_of(tree: &SyntaxTree, kind: NodeKind) -> Vec<String> {
        tree.descendants(tree.root())
            .filter(|&n| tree.kind(n) == kind)
            .filter_map(|n| tree.node(n).name_text().map(str::to_string))
            .collect()
    }

    mod declaration_tests {
        use super::*;

        #[test]
        fn class_with_members() {
            let tree = parse_ok(
                "public class Widget<T> : Base, IShape {\n\
                 private int count, total = 2;\n\
                 const int maxSize = 10;\n\
                 public void Draw(int x, List<T> items) { }\n\
                 int Area();\n\
                 }",
            );
            assert_eq!(names_of(&tree, NodeKind::ClassDecl), vec!["Widget"]);
            assert_eq!(names_of(&tree, NodeKind::Declarator), vec!["count", "total", "maxSize"]);
            assert_eq!(names_of(&tree, NodeKind::MethodDecl), vec!["Draw", "Area"]);
            assert_eq!(names_of(&tree, NodeKind::Parameter), vec!["x", "items"]);

            let class = tree.children(tree.root())[0];
            assert!(tree.node(class).modifiers.public);
            assert!(tree.child_of_kind(class, NodeKind::TypeParams).is_some());
            let bases = tree.child_of_kind(class, NodeKind::BaseList).unwrap();
            assert_eq!(tree.children(bases).len(), 2);
        }

        #[test]
        fn method_without_body_has_no_block() {
            let tree = parse_ok("interface IShape { int Area(); }");
            let method = tree
                .descendants(tree.root())
                .find(|&n| tree.kind(n) == NodeKind::MethodDecl)
                .unwrap();
            assert!(tree.child_of_kind(method, NodeKind::Block).is_none());
        }

        #[test]
        fn nested_types_and_generic_type_refs() {
            let tree = parse_ok("class Outer { struct Inner { Dictionary<string, List<int>> map; } }");
            assert_eq!(names_of(&tree, NodeKind::StructDecl), vec!["Inner"]);
            assert_eq!(
                names_of(&tree, NodeKind::TypeRef),
                vec!["Dictionary", "string", "List", "int"]
            );
        }

        #[test]
        fn spans_cover_identifiers_exactly() {
            let source = "class Widget { }";
            let tree = parse_ok(source);
            let class = tree.children(tree.root())[0];
            let name = tree.node(class).name.as_ref().unwrap();
            assert_eq!(&source[name.span.start..name.span.end], "Widget");
            assert_eq!(tree.node(class).span, Span::new(0, source.len()));
        }
    }

    mod statement_tests {
        use super::*;

        #[test]
        fn locals_returns_and_ifs() {
            let tree = parse_ok(
                "class A { int M(int a) {\n\
                 var x = a * 2 + 1;\n\
                 const int limit = 3;\n\
                 List<int> items = new List<int>();\n\
                 if (x > limit) { return x; } else return 0;\n\
                 } }",
            );
            let kinds = kinds_of(&tree);
            assert!(kinds.contains(&NodeKind::LocalDecl));
            assert!(kinds.contains(&NodeKind::LocalConstDecl));
            assert!(kinds.contains(&NodeKind::New));
            assert!(kinds.contains(&NodeKind::IfStmt));
            assert_eq!(
                names_of(&tree, NodeKind::Declarator),
                vec!["x", "limit", "items"]
            );
        }

        #[test]
        fn comparison_is_not_a_local_declaration() {
            let tree = parse_ok("class A { void M() { a < b; x = y; } }");
            assert!(!kinds_of(&tree).contains(&NodeKind::LocalDecl));
            assert!(kinds_of(&tree).contains(&NodeKind::Assign));
        }

        #[test]
        fn compound_assignment_keeps_its_kind() {
            let tree = parse_ok("class A { void M() { x += 1; y -= 2; z = 3; } }");
            let kinds = kinds_of(&tree);
            let compound = kinds.iter().filter(|k| **k == NodeKind::CompoundAssign).count();
            let plain = kinds.iter().filter(|k| **k == NodeKind::Assign).count();
            assert_eq!((compound, plain), (2, 1));
        }

        #[test]
        fn lambdas_in_all_forms() {
            let tree = parse_ok(
                "class A { void M() {\n\
                 Run(x => x + 1);\n\
                 Run((a, b) => { var t = a; return t; });\n\
                 Run(() => 0);\n\
                 } }",
            );
            let lambdas = kinds_of(&tree)
                .into_iter()
                .filter(|k| *k == NodeKind::Lambda)
                .count();
            assert_eq!(lambdas, 3);
            assert_eq!(names_of(&tree, NodeKind::Parameter), vec!["x", "a", "b"]);
        }

        #[test]
        fn member_access_and_calls() {
            let tree = parse_ok("class A { void M() { this.count = Helper.Compute(count).Value; } }");
            assert_eq!(
                names_of(&tree, NodeKind::MemberAccess),
                vec!["count", "Value", "Compute"]
            );
        }
    }

    mod recovery_tests {
        use super::*;

        #[test]
        fn bad_statement_leaves_error_node_and_keeps_siblings() {
            let tree = parse(
                FileId::new(0),
                "bad.cs",
                "class A { void M() { int x = ; int y = 2; } }",
            );
            assert_eq!(tree.errors().len(), 1);
            assert_eq!(tree.errors()[0].message, "expected expression");
            assert_eq!(tree.errors()[0].line, 1);
            assert!(kinds_of(&tree).contains(&NodeKind::Error));
            assert_eq!(names_of(&tree, NodeKind::Declarator), vec!["y"]);
        }

        #[test]
        fn every_node_has_one_parent_after_recovery() {
            let tree = parse(
                FileId::new(0),
                "bad.cs",
                "class A { void M() { if (x { y(); } } int ; } class B { }",
            );
            assert!(tree.has_errors());
            for id in tree.descendants(tree.root()) {
                if id != tree.root() {
                    let parent = tree.parent(id).unwrap();
                    assert!(tree.children(parent).contains(&id));
                }
            }
            assert_eq!(names_of(&tree, NodeKind::ClassDecl), vec!["A", "B"]);
        }

        #[test]
        fn stray_tokens_at_top_level_make_progress() {
            let tree = parse(FileId::new(0), "bad.cs", "} # class C { }");
            assert!(tree.has_errors());
            assert_eq!(names_of(&tree, NodeKind::ClassDecl), vec!["C"]);
        }

        #[test]
        fn strict_parse_reports_first_error() {
            let err = parse_strict(FileId::new(0), "bad.cs", "class { }").unwrap_err();
            assert_eq!(err.message, "expected identifier");
            assert_eq!(err.to_string(), "bad.cs:1:7: expected identifier");
            let bridged: CodecopError = err.into();
            assert_eq!(bridged.error_code().code(), 2);
        }
    }
}
