//! End-to-end scenarios: analyze fixtures, pick fixes, apply renames.

use std::collections::HashMap;
use std::sync::Arc;

use codecop::cancel::CancellationToken;
use codecop::case::{to_camel, to_pascal, to_upper_snake};
use codecop::diagnostics::Diagnostic;
use codecop::engine::{Analyzer, Compilation};
use codecop::patch::FileId;
use codecop::rename::{RenameEngine, RenameOutcome, RenameRequest, SourceStore};

fn analyze(sources: &[(&str, &str)]) -> (Compilation, Vec<Diagnostic>) {
    let compilation = Compilation::from_sources(sources);
    assert_eq!(compilation.parse_errors().count(), 0);
    let diagnostics = Analyzer::default()
        .analyze(&compilation, &CancellationToken::new())
        .unwrap();
    (compilation, diagnostics)
}

fn by_rule<'a>(diagnostics: &'a [Diagnostic], rule_id: &str) -> Vec<&'a Diagnostic> {
    diagnostics.iter().filter(|d| d.rule_id == rule_id).collect()
}

fn fix_names(d: &Diagnostic) -> Vec<&str> {
    d.fixes.iter().map(|f| f.new_name.as_str()).collect()
}

// ============================================================================
// Case conversion
// ============================================================================

#[test]
fn pascal_case_of_max_size() {
    assert_eq!(to_pascal("maxSize"), "MaxSize");
}

#[test]
fn conversions_are_idempotent() {
    for s in ["", "maxSize", "MaxSize", "apiKey", "API_KEY", "HTTPClient", "x1y2", "_a"] {
        assert_eq!(to_pascal(&to_pascal(s)), to_pascal(s));
        assert_eq!(to_camel(&to_camel(s)), to_camel(s));
        assert_eq!(to_upper_snake(&to_upper_snake(s)), to_upper_snake(s));
    }
}

// ============================================================================
// Naming rules
// ============================================================================

#[test]
fn constant_api_key_gets_two_suggestions() {
    let (_, diags) = analyze(&[("Keys.cs", "class Keys { const string apiKey = \"secret\"; }")]);
    let constants = by_rule(&diags, "CCS0004");
    assert_eq!(constants.len(), 1);
    assert_eq!(fix_names(constants[0]), vec!["ApiKey", "API_KEY"]);
}

#[test]
fn interface_name_suggestions() {
    let (_, diags) = analyze(&[(
        "Services.cs",
        "interface service { }\ninterface iService { }\ninterface Iservice { }",
    )]);
    let suggestions: Vec<_> = by_rule(&diags, "CCS0002")
        .iter()
        .map(|d| fix_names(d)[0])
        .collect();
    assert_eq!(suggestions, vec!["IService", "IService", "IIservice"]);
}

#[test]
fn private_all_caps_field_gets_minimal_fix() {
    let (_, diags) = analyze(&[("Counter.cs", "class Counter { private int NUMBER; }")]);
    let fields = by_rule(&diags, "CCS0003");
    assert_eq!(fields.len(), 1);
    assert_eq!(fix_names(fields[0]), vec!["nUMBER"]);
}

#[test]
fn uppercase_private_fields_always_suggest_camel() {
    let names = ["Count", "HTTPClient", "X", "Total_Sum"];
    let body: String = names.iter().map(|n| format!("int {};\n", n)).collect();
    let source = format!("class Holder {{\n{}}}", body);
    let (_, diags) = analyze(&[("Holder.cs", &source)]);
    let fields = by_rule(&diags, "CCS0003");
    assert_eq!(fields.len(), names.len());
    for (d, name) in fields.iter().zip(names) {
        assert_eq!(fix_names(d), vec![to_camel(name)]);
    }
}

// ============================================================================
// Dead bindings
// ============================================================================

#[test]
fn unused_local_reported_once_at_declaration() {
    let source = "class Program {\n  void Main() {\n    int unusedVar = 5;\n  }\n}";
    let (_, diags) = analyze(&[("Program.cs", source)]);
    let dead = by_rule(&diags, "CCS0005");
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].location.line, 3);
    assert_eq!(dead[0].location.col, 9);
    assert_eq!(dead[0].message, "Local variable 'unusedVar' is declared but never read");
}

#[test]
fn read_local_is_clean() {
    let (_, diags) = analyze(&[("Program.cs", "class Program { int Get() { int x = 1; return x; } }")]);
    assert!(by_rule(&diags, "CCS0005").is_empty());
}

#[test]
fn closure_local_is_reported_by_the_closure_only() {
    let source = "class Program {\n\
                  void Main() {\n\
                  Run(() => { int inner = 1; });\n\
                  }\n\
                  }";
    let compilation = Compilation::from_sources(&[("Program.cs", source)]);
    let diags = Analyzer::default()
        .analyze(&compilation, &CancellationToken::new())
        .unwrap();
    let dead = by_rule(&diags, "CCS0005");
    assert_eq!(dead.len(), 1);
    assert_eq!(fix_names(dead[0]), vec!["_inner"]);
}

#[test]
fn variable_read_only_inside_closure_is_live() {
    let (_, diags) = analyze(&[(
        "Program.cs",
        "class Program { void Main() { int seed = 4; Run(() => Use(seed)); } }",
    )]);
    assert!(by_rule(&diags, "CCS0005").is_empty());
}

#[test]
fn compound_assignment_and_increment_keep_locals_live() {
    let (_, diags) = analyze(&[(
        "Program.cs",
        "class Program { void M() { int total = 0; total += 5; } void N() { int n = 0; n++; } }",
    )]);
    assert!(by_rule(&diags, "CCS0005").is_empty());
}

// ============================================================================
// Renames
// ============================================================================

const SHOP: &[(&str, &str)] = &[
    (
        "Cart.cs",
        "class Cart : ICheckout {\n\
         \x20   private int Total; // running total\n\
         \x20   public void Add(int price) { Total = Total + price; }\n\
         \x20   public int Pay() { var receipt = new Receipt(); receipt.Print(Total); return this.Total; }\n\
         }",
    ),
    (
        "Receipt.cs",
        "class Receipt { public void Print(int amount) { } }\ninterface ICheckout { int Pay(); }",
    ),
];

#[test]
fn fix_rename_touches_every_occurrence_once() {
    let (compilation, diags) = analyze(SHOP);
    let field = by_rule(&diags, "CCS0003");
    assert_eq!(field.len(), 1);
    let fix = &field[0].fixes[0];
    assert_eq!(fix.new_name, "total");

    let index = compilation.index();
    let original = index.occurrences_of(fix.symbol_id).len();
    assert_eq!(original, 5);

    let engine = RenameEngine::new(Arc::clone(index));
    let sources = compilation.sources();
    let edits = fix
        .apply(&engine, None, &sources, &CancellationToken::new())
        .unwrap()
        .into_edit_set()
        .unwrap();
    assert_eq!(edits.edit_count(), original);

    let store = SourceStore::new(sources);
    store.apply(&edits).unwrap();
    let cart = store.get(FileId::new(0)).unwrap();
    for occurrence in index.occurrences_of(fix.symbol_id) {
        assert_eq!(&cart[occurrence.span.start..occurrence.span.start + 5], "total");
    }
    assert_eq!(cart.matches("Total").count(), 0);
    assert!(cart.contains("// running total"));
}

#[test]
fn method_rename_reaches_other_files_through_declared_types() {
    let (compilation, _) = analyze(SHOP);
    let index = compilation.index();
    let print = index.symbols_named("Print")[0].symbol_id;
    let engine = RenameEngine::new(Arc::clone(index));
    let store = SourceStore::new(compilation.sources());

    let outcome = engine
        .rename_and_apply(print, "Emit", &store, &CancellationToken::new())
        .unwrap();
    assert!(outcome.is_applicable());
    assert!(store.get(FileId::new(0)).unwrap().contains("receipt.Emit(Total)"));
    assert!(store.get(FileId::new(1)).unwrap().contains("public void Emit(int amount)"));
}

#[test]
fn rename_after_text_change_is_not_applicable() {
    let (compilation, _) = analyze(SHOP);
    let index = compilation.index();
    let engine = RenameEngine::new(Arc::clone(index));
    let checkout = index.symbols_named("ICheckout")[0].symbol_id;

    let mut sources: HashMap<FileId, String> = compilation.sources();
    if let Some(text) = sources.get_mut(&FileId::new(1)) {
        text.insert_str(0, "// header\n");
    }
    let outcome = engine
        .rename(checkout, "IPayable", &sources, &CancellationToken::new())
        .unwrap();
    assert!(matches!(outcome, RenameOutcome::NotApplicable(_)));
}

#[test]
fn fix_all_for_one_rule() {
    let source = "class Limits {\n\
                  const int maxSize = 10, minSize = 1;\n\
                  int Clamp(int v) { if (v > maxSize) return maxSize; return v; }\n\
                  }";
    let compilation = Compilation::from_sources(&[("Limits.cs", source)]);
    let diags = Analyzer::default()
        .analyze(&compilation, &CancellationToken::new())
        .unwrap();
    let requests = RenameRequest::from_diagnostics(&diags, "CCS0004");
    assert_eq!(requests.len(), 2);

    let engine = RenameEngine::new(Arc::clone(compilation.index()));
    let sources = compilation.sources();
    let outcome = engine
        .fix_all(&requests, &sources, &CancellationToken::new())
        .unwrap();
    assert!(outcome.skipped.is_empty());

    let store = SourceStore::new(sources);
    store.apply(&outcome.edits).unwrap();
    let text = store.get(FileId::new(0)).unwrap();
    assert!(text.contains("const int MaxSize = 10, MinSize = 1;"));
    assert!(text.contains("if (v > MaxSize) return MaxSize;"));
}

#[test]
fn renaming_one_overload_leaves_the_other_alone() {
    let source = "class Util { void Foo(int x) { } void Foo(string s, int n) { } void M() { Foo(1); Foo(\"s\", 2); } }";
    let (compilation, _) = analyze(&[("Util.cs", source)]);
    let index = compilation.index();
    let overloads = index.symbols_named("Foo");
    assert_eq!(overloads.len(), 2);
    assert_eq!(index.occurrences_of(overloads[0].symbol_id).len(), 2);
    assert_eq!(index.occurrences_of(overloads[1].symbol_id).len(), 2);

    let engine = RenameEngine::new(Arc::clone(index));
    let store = SourceStore::new(compilation.sources());
    engine
        .rename_and_apply(overloads[0].symbol_id, "Bar", &store, &CancellationToken::new())
        .unwrap();
    assert_eq!(
        store.get(FileId::new(0)).unwrap(),
        "class Util { void Bar(int x) { } void Foo(string s, int n) { } void M() { Bar(1); Foo(\"s\", 2); } }"
    );
}

#[test]
fn captured_variable_renames_inside_the_closure() {
    let source = "class Job { void Run() { int seed = 4; Each(x => Use(seed, x)); } }";
    let (compilation, _) = analyze(&[("Job.cs", source)]);
    let index = compilation.index();
    let seed = index.symbols_named("seed")[0].symbol_id;
    let engine = RenameEngine::new(Arc::clone(index));
    let store = SourceStore::new(compilation.sources());
    engine
        .rename_and_apply(seed, "origin", &store, &CancellationToken::new())
        .unwrap();
    assert_eq!(
        store.get(FileId::new(0)).unwrap(),
        "class Job { void Run() { int origin = 4; Each(x => Use(origin, x)); } }"
    );
}
