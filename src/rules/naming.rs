//! Naming-convention rules.
//!
//! | Id | Checks | Valid when |
//! |----|--------|------------|
//! | CCS0001 | method, class and struct names | empty, or uppercase first character |
//! | CCS0002 | interface names | `I`, or `I` followed by an uppercase letter or digit |
//! | CCS0003 | private/internal non-constant fields | `_` or lowercase first character |
//! | CCS0004 | constants (members and locals) | uppercase first character |
//!
//! Field and constant rules run on `Declarator` nodes, so each name of a
//! multi-name declaration is reported on its own.

use codecop_syntax::tree::{Ident, NodeKind};

use crate::case::{to_camel, to_pascal, to_upper_snake};
use crate::diagnostics::{Category, Diagnostic, Severity, SuggestedFix};
use crate::index::Visibility;
use crate::types::NodeId;

use super::{Rule, RuleContext, RuleError, RuleMetadata};

fn declared_name<'t>(node: NodeId, ctx: &RuleContext<'t>) -> Result<&'t Ident, RuleError> {
    let syntax = ctx.tree.node(node);
    syntax
        .name
        .as_ref()
        .ok_or_else(|| RuleError::malformed(syntax.kind, "declaration without a name"))
}

fn first_char(name: &str) -> Option<char> {
    name.chars().next()
}

/// A diagnostic at the declared identifier, with one rename fix per proposal.
///
/// Fixes are left off when the index has no symbol for the declaration.
fn report(
    meta: RuleMetadata,
    node: NodeId,
    ident: &Ident,
    message: String,
    proposals: &[(String, Option<&str>)],
    ctx: &RuleContext<'_>,
) -> Diagnostic {
    let mut diagnostic = Diagnostic::new(
        meta.id,
        meta.default_severity,
        message,
        ctx.location(ident.span),
    );
    match ctx.declared_symbol(node) {
        Some(symbol) => {
            for (new_name, style) in proposals {
                let mut fix = SuggestedFix::rename(symbol.symbol_id, new_name.clone());
                if let Some(style) = style {
                    fix = fix.with_label(format!("Rename to '{}' ({})", new_name, style));
                }
                diagnostic = diagnostic.with_fix(fix);
            }
        }
        None => {
            tracing::debug!(rule = meta.id, name = %ident.text, "no symbol for declaration; fix omitted");
        }
    }
    diagnostic
}

// ============================================================================
// CCS0001
// ============================================================================

/// Methods, classes and structs use PascalCase.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodTypeNameRule;

impl Rule for MethodTypeNameRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "CCS0001",
            title: "Method and type names should be PascalCase",
            category: Category::Naming,
            default_severity: Severity::Warning,
            has_fix: true,
        }
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::MethodDecl, NodeKind::ClassDecl, NodeKind::StructDecl]
    }

    fn check(&self, node: NodeId, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let ident = declared_name(node, ctx)?;
        match first_char(&ident.text) {
            None => return Ok(Vec::new()),
            Some(c) if c.is_uppercase() => return Ok(Vec::new()),
            Some(_) => {}
        }
        let what = if ctx.tree.kind(node) == NodeKind::MethodDecl {
            "Method"
        } else {
            "Type"
        };
        let message = format!(
            "{} name '{}' should start with an uppercase letter",
            what, ident.text
        );
        let fix = (to_pascal(&ident.text), None);
        Ok(vec![report(self.metadata(), node, ident, message, &[fix], ctx)])
    }
}

// ============================================================================
// CCS0002
// ============================================================================

/// Interfaces are named `I` + PascalCase.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceNameRule;

impl InterfaceNameRule {
    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some('I'), None) => true,
            (Some('I'), Some(second)) => second.is_uppercase() || second.is_ascii_digit(),
            _ => false,
        }
    }

    /// `iService` → `IService`; anything else gets an `I` in front of its
    /// PascalCase form, including `Iservice` → `IIservice`.
    pub fn suggest(name: &str) -> String {
        let mut chars = name.chars();
        if let Some('i') = chars.next() {
            let mut fixed = String::with_capacity(name.len());
            fixed.push('I');
            if let Some(second) = chars.next() {
                fixed.extend(second.to_uppercase());
            }
            fixed.extend(chars);
            fixed
        } else {
            format!("I{}", to_pascal(name))
        }
    }
}

impl Rule for InterfaceNameRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "CCS0002",
            title: "Interface names should start with 'I'",
            category: Category::Naming,
            default_severity: Severity::Warning,
            has_fix: true,
        }
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::InterfaceDecl]
    }

    fn check(&self, node: NodeId, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let ident = declared_name(node, ctx)?;
        if ident.text.is_empty() || Self::is_valid(&ident.text) {
            return Ok(Vec::new());
        }
        let message = format!(
            "Interface name '{}' should start with 'I' followed by an uppercase letter",
            ident.text
        );
        let fix = (Self::suggest(&ident.text), None);
        Ok(vec![report(self.metadata(), node, ident, message, &[fix], ctx)])
    }
}

// ============================================================================
// CCS0003
// ============================================================================

/// Private and internal fields are `_prefixed` or camelCase.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivateFieldNameRule;

impl Rule for PrivateFieldNameRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "CCS0003",
            title: "Private field names should be camelCase",
            category: Category::Naming,
            default_severity: Severity::Warning,
            has_fix: true,
        }
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Declarator]
    }

    fn check(&self, node: NodeId, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let Some(parent) = ctx.tree.parent(node) else {
            return Err(RuleError::malformed(NodeKind::Declarator, "declarator without a declaration"));
        };
        let declaration = ctx.tree.node(parent);
        if declaration.kind != NodeKind::FieldDecl || declaration.modifiers.is_const {
            return Ok(Vec::new());
        }

        let visibility = ctx
            .declared_symbol(node)
            .map(|s| s.visibility)
            .unwrap_or_else(|| declaration.modifiers.visibility_or(Visibility::Private));
        if !visibility.is_private_or_internal() {
            return Ok(Vec::new());
        }

        let ident = declared_name(node, ctx)?;
        match first_char(&ident.text) {
            None | Some('_') => return Ok(Vec::new()),
            Some(c) if c.is_lowercase() => return Ok(Vec::new()),
            Some(_) => {}
        }
        let message = format!(
            "Private field '{}' should start with '_' or a lowercase letter",
            ident.text
        );
        let fix = (to_camel(&ident.text), None);
        Ok(vec![report(self.metadata(), node, ident, message, &[fix], ctx)])
    }
}

// ============================================================================
// CCS0004
// ============================================================================

/// Constants are PascalCase or UPPER_SNAKE_CASE.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantNameRule;

impl Rule for ConstantNameRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "CCS0004",
            title: "Constant names should start with an uppercase letter",
            category: Category::Naming,
            default_severity: Severity::Warning,
            has_fix: true,
        }
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Declarator]
    }

    fn check(&self, node: NodeId, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let Some(parent) = ctx.tree.parent(node) else {
            return Err(RuleError::malformed(NodeKind::Declarator, "declarator without a declaration"));
        };
        if !matches!(
            ctx.tree.kind(parent),
            NodeKind::ConstDecl | NodeKind::LocalConstDecl
        ) {
            return Ok(Vec::new());
        }

        let ident = declared_name(node, ctx)?;
        match first_char(&ident.text) {
            None => return Ok(Vec::new()),
            Some(c) if c.is_uppercase() => return Ok(Vec::new()),
            Some(_) => {}
        }
        let message = format!(
            "Constant '{}' should start with an uppercase letter",
            ident.text
        );
        let fixes = [
            (to_pascal(&ident.text), Some("PascalCase")),
            (to_upper_snake(&ident.text), Some("UPPER_SNAKE_CASE")),
        ];
        Ok(vec![report(self.metadata(), node, ident, message, &fixes, ctx)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::FileId;
    use crate::text::LineIndex;
    use codecop_syntax::bind::build_index;
    use codecop_syntax::parser::parse;
    use codecop_syntax::tree::SyntaxTree;

    /// Run `rule` over every node of its kinds in `source`.
    fn run(rule: &dyn Rule, source: &str) -> Vec<Diagnostic> {
        let tree = parse(FileId::new(0), "Fixture.cs", source);
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let index = build_index(std::slice::from_ref(&tree));
        let lines = LineIndex::new(&tree.source);
        let ctx = RuleContext::new(&tree, &index, &lines);
        collect(rule, &tree, &ctx)
    }

    fn collect(rule: &dyn Rule, tree: &SyntaxTree, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        tree.descendants(tree.root())
            .filter(|&n| rule.kinds().contains(&tree.kind(n)))
            .flat_map(|n| rule.check(n, ctx).unwrap())
            .collect()
    }

    fn fix_names(d: &Diagnostic) -> Vec<&str> {
        d.fixes.iter().map(|f| f.new_name.as_str()).collect()
    }

    mod method_type_tests {
        use super::*;

        #[test]
        fn lowercase_method_and_class_are_flagged() {
            let diags = run(
                &MethodTypeNameRule,
                "class widget { void doWork() { } void Run() { } }\nstruct Point { }",
            );
            assert_eq!(diags.len(), 2);
            assert_eq!(diags[0].message, "Type name 'widget' should start with an uppercase letter");
            assert_eq!(fix_names(&diags[0]), vec!["Widget"]);
            assert_eq!(fix_names(&diags[1]), vec!["DoWork"]);
        }

        #[test]
        fn location_points_at_the_identifier() {
            let diags = run(&MethodTypeNameRule, "class A {\n  void maxSize() { }\n}");
            let loc = &diags[0].location;
            assert_eq!((loc.line, loc.col, loc.end_line, loc.end_col), (2, 8, 2, 15));
            assert_eq!(loc.byte_start, Some(17));
        }
    }

    mod interface_tests {
        use super::*;

        #[test]
        fn validity() {
            assert!(InterfaceNameRule::is_valid("I"));
            assert!(InterfaceNameRule::is_valid("IService"));
            assert!(InterfaceNameRule::is_valid("I2D"));
            assert!(!InterfaceNameRule::is_valid("Iservice"));
            assert!(!InterfaceNameRule::is_valid("service"));
            assert!(!InterfaceNameRule::is_valid("iService"));
        }

        #[test]
        fn suggestions() {
            assert_eq!(InterfaceNameRule::suggest("service"), "IService");
            assert_eq!(InterfaceNameRule::suggest("iService"), "IService");
            assert_eq!(InterfaceNameRule::suggest("iservice"), "IService");
            assert_eq!(InterfaceNameRule::suggest("Service"), "IService");
            assert_eq!(InterfaceNameRule::suggest("Iservice"), "IIservice");
            assert_eq!(InterfaceNameRule::suggest("i"), "I");
        }

        #[test]
        fn rule_reports_with_fix() {
            let diags = run(
                &InterfaceNameRule,
                "interface service { } interface IRepository { } interface iStore { }",
            );
            assert_eq!(diags.len(), 2);
            assert_eq!(fix_names(&diags[0]), vec!["IService"]);
            assert_eq!(fix_names(&diags[1]), vec!["IStore"]);
        }
    }

    mod private_field_tests {
        use super::*;

        #[test]
        fn uppercase_private_and_internal_fields_are_flagged() {
            let diags = run(
                &PrivateFieldNameRule,
                "class A {\n\
                 int NUMBER;\n\
                 internal int Count;\n\
                 private int _ok, fine, Bad;\n\
                 public int Visible;\n\
                 protected int Guarded;\n\
                 protected internal int Shared;\n\
                 }",
            );
            let flagged: Vec<_> = diags.iter().map(|d| fix_names(d)[0]).collect();
            assert_eq!(flagged, vec!["nUMBER", "count", "bad"]);
        }

        #[test]
        fn constants_are_not_fields() {
            let diags = run(&PrivateFieldNameRule, "class A { const int Max = 1; }");
            assert!(diags.is_empty());
        }

        #[test]
        fn interface_fields_default_to_public() {
            let diags = run(&PrivateFieldNameRule, "interface IA { int Value; }");
            assert!(diags.is_empty());
        }
    }

    mod constant_tests {
        use super::*;

        #[test]
        fn lowercase_constant_gets_two_fixes() {
            let diags = run(&ConstantNameRule, "class A { const string apiKey = \"k\"; }");
            assert_eq!(diags.len(), 1);
            assert_eq!(fix_names(&diags[0]), vec!["ApiKey", "API_KEY"]);
            assert_eq!(diags[0].fixes[1].label, "Rename to 'API_KEY' (UPPER_SNAKE_CASE)");
            assert_eq!(diags[0].fixes[0].symbol_id, diags[0].fixes[1].symbol_id);
        }

        #[test]
        fn each_declarator_is_reported() {
            let diags = run(
                &ConstantNameRule,
                "class A { const int maxSize = 10, MinSize = 1, retryCount = 3; void M() { const int localLimit = 2; } }",
            );
            let names: Vec<_> = diags.iter().map(|d| fix_names(d)[1]).collect();
            assert_eq!(names, vec!["MAX_SIZE", "RETRY_COUNT", "LOCAL_LIMIT"]);
        }
    }
}
