//! Symbol Index: declared entities and every occurrence that refers to them.
//!
//! The index is built once per compilation (see `codecop_syntax::bind`) and is
//! read-only afterwards. It provides:
//! - [`SourceFile`]: files with the content hash the index was built from
//! - [`Symbol`]: declared entities (types, members, locals, parameters)
//! - [`Occurrence`]: declaration, read, write and type-reference sites
//!
//! The [`SymbolIndex`] stores tables in `BTreeMap`s for deterministic
//! iteration and keeps postings lists for the lookups rules and refactors make
//! (symbol → occurrences, file → symbols, declaring node → symbol).
//!
//! # Staleness
//!
//! An index answers questions about the text it was built from. Call
//! [`SymbolIndex::is_current`] before trusting spans against newer text.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::patch::{ContentHash, FileId, Span};
use crate::types::{NodeId, NodeRef};

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a symbol within a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Create a new symbol ID.
    pub fn new(id: u32) -> Self {
        SymbolId(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Kind of declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Method of a type.
    Method,
    /// Class or struct.
    Type,
    /// Interface.
    Interface,
    /// Non-constant field.
    Field,
    /// Constant field or constant local.
    Constant,
    /// Local variable (including lambda-scoped locals).
    LocalVariable,
    /// Method or lambda parameter.
    Parameter,
}

impl SymbolKind {
    /// Kinds that name a type (valid targets for type references).
    pub fn is_type_like(self) -> bool {
        matches!(self, SymbolKind::Type | SymbolKind::Interface)
    }

    /// Kinds declared as members of a type.
    pub fn is_member(self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Field | SymbolKind::Constant
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Method => "method",
            SymbolKind::Type => "type",
            SymbolKind::Interface => "interface",
            SymbolKind::Field => "field",
            SymbolKind::Constant => "constant",
            SymbolKind::LocalVariable => "local variable",
            SymbolKind::Parameter => "parameter",
        };
        f.write_str(s)
    }
}

/// Effective accessibility of a declaration.
///
/// Members without an access modifier are `Private`; top-level types without
/// one are `Internal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    ProtectedInternal,
    Private,
}

impl Visibility {
    /// Private, or internal without protected access.
    pub fn is_private_or_internal(self) -> bool {
        matches!(self, Visibility::Private | Visibility::Internal)
    }
}

/// How an occurrence uses its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
    /// The declaring identifier.
    Declaration,
    /// A value read (including calls and member access).
    Read,
    /// An assignment target.
    Write,
    /// A compound assignment target (`x += 1`): read, then written.
    ReadWrite,
    /// A type position (declared types, base lists, generic arguments, `new`).
    TypeReference,
}

impl OccurrenceKind {
    /// Does this occurrence observe the symbol's value?
    pub fn is_read(self) -> bool {
        matches!(self, OccurrenceKind::Read | OccurrenceKind::ReadWrite)
    }
}

// ============================================================================
// Tables
// ============================================================================

/// A source file the index was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Unique identifier for this file.
    pub file_id: FileId,
    /// Path as supplied by the host.
    pub path: String,
    /// SHA-256 hash of the content the index was built from.
    pub content_hash: ContentHash,
}

impl SourceFile {
    /// Create a file entry, hashing `content`.
    pub fn new(file_id: FileId, path: impl Into<String>, content: &str) -> Self {
        SourceFile {
            file_id,
            path: path.into(),
            content_hash: ContentHash::compute(content.as_bytes()),
        }
    }
}

/// A declared entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique identifier for this symbol.
    pub symbol_id: SymbolId,
    /// Kind of symbol.
    pub kind: SymbolKind,
    /// Declared name.
    pub name: String,
    /// The declaring node (declarator, parameter or type/method declaration).
    pub decl: NodeRef,
    /// Byte span of the declared identifier.
    pub decl_span: Span,
    /// Effective visibility.
    pub visibility: Visibility,
    /// Containing type for members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<SymbolId>,
}

impl Symbol {
    /// Create a new symbol entry.
    ///
    /// Visibility defaults to `Private`. Use `with_visibility()` to set it.
    pub fn new(
        symbol_id: SymbolId,
        kind: SymbolKind,
        name: impl Into<String>,
        decl: NodeRef,
        decl_span: Span,
    ) -> Self {
        Symbol {
            symbol_id,
            kind,
            name: name.into(),
            decl,
            decl_span,
            visibility: Visibility::Private,
            container: None,
        }
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the containing type.
    pub fn with_container(mut self, container: SymbolId) -> Self {
        self.container = Some(container);
        self
    }

    /// File the symbol is declared in.
    pub fn file_id(&self) -> FileId {
        self.decl.file_id
    }
}

/// One textual appearance of a symbol's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// The symbol this occurrence refers to.
    pub symbol_id: SymbolId,
    /// File containing the occurrence.
    pub file_id: FileId,
    /// The identifier node.
    pub node_id: NodeId,
    /// Byte span of the identifier token.
    pub span: Span,
    /// How the symbol is used here.
    pub kind: OccurrenceKind,
}

// ============================================================================
// SymbolIndex
// ============================================================================

/// In-memory symbol index for one compilation.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    // Primary storage (BTreeMap for deterministic iteration)
    files: BTreeMap<FileId, SourceFile>,
    symbols: BTreeMap<SymbolId, Symbol>,
    occurrences: Vec<Occurrence>,

    // Secondary indexes
    file_by_path: HashMap<String, FileId>,
    symbols_by_name: HashMap<String, Vec<SymbolId>>,
    symbol_by_decl: HashMap<NodeRef, SymbolId>,
    symbol_by_occurrence_node: HashMap<NodeRef, SymbolId>,

    // Postings lists (indices into `occurrences`)
    occurrences_by_symbol: HashMap<SymbolId, Vec<usize>>,
    occurrences_by_file: HashMap<FileId, Vec<usize>>,
    symbols_by_file: HashMap<FileId, Vec<SymbolId>>,
    occurrence_sites: HashSet<(SymbolId, FileId, Span)>,

    next_file_id: u32,
    next_symbol_id: u32,
}

impl SymbolIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // ID generation
    // ------------------------------------------------------------------------

    /// Allocate the next file ID.
    pub fn next_file_id(&mut self) -> FileId {
        let id = FileId::new(self.next_file_id);
        self.next_file_id += 1;
        id
    }

    /// Allocate the next symbol ID.
    pub fn next_symbol_id(&mut self) -> SymbolId {
        let id = SymbolId::new(self.next_symbol_id);
        self.next_symbol_id += 1;
        id
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Register a source file.
    pub fn insert_file(&mut self, file: SourceFile) {
        self.next_file_id = self.next_file_id.max(file.file_id.0 + 1);
        self.file_by_path.insert(file.path.clone(), file.file_id);
        self.files.insert(file.file_id, file);
    }

    /// Register a symbol and its declaration occurrence.
    pub fn insert_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = symbol.symbol_id;
        self.next_symbol_id = self.next_symbol_id.max(id.0 + 1);

        self.symbols_by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(id);
        self.symbols_by_file
            .entry(symbol.file_id())
            .or_default()
            .push(id);
        self.symbol_by_decl.insert(symbol.decl, id);

        let declaration = Occurrence {
            symbol_id: id,
            file_id: symbol.file_id(),
            node_id: symbol.decl.node_id,
            span: symbol.decl_span,
            kind: OccurrenceKind::Declaration,
        };
        self.symbols.insert(id, symbol);
        self.push_occurrence(declaration);
        id
    }

    /// Record a use of `symbol_id`.
    ///
    /// A second occurrence at the same file and span is ignored, so every
    /// textual site is recorded exactly once.
    pub fn add_occurrence(
        &mut self,
        symbol_id: SymbolId,
        file_id: FileId,
        node_id: NodeId,
        span: Span,
        kind: OccurrenceKind,
    ) {
        if self.occurrence_sites.contains(&(symbol_id, file_id, span)) {
            return;
        }
        self.push_occurrence(Occurrence {
            symbol_id,
            file_id,
            node_id,
            span,
            kind,
        });
    }

    fn push_occurrence(&mut self, occurrence: Occurrence) {
        let idx = self.occurrences.len();
        self.occurrence_sites
            .insert((occurrence.symbol_id, occurrence.file_id, occurrence.span));
        self.occurrences_by_symbol
            .entry(occurrence.symbol_id)
            .or_default()
            .push(idx);
        self.occurrences_by_file
            .entry(occurrence.file_id)
            .or_default()
            .push(idx);
        self.symbol_by_occurrence_node.insert(
            NodeRef::new(occurrence.file_id, occurrence.node_id),
            occurrence.symbol_id,
        );
        self.occurrences.push(occurrence);
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    pub fn file(&self, file_id: FileId) -> Option<&SourceFile> {
        self.files.get(&file_id)
    }

    pub fn file_by_path(&self, path: &str) -> Option<&SourceFile> {
        self.file_by_path
            .get(path)
            .and_then(|id| self.files.get(id))
    }

    /// All files in FileId order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    /// Does `content` still hash to what the index was built from?
    ///
    /// Unknown files are never current.
    pub fn is_current(&self, file_id: FileId, content: &str) -> bool {
        self.files
            .get(&file_id)
            .is_some_and(|f| f.content_hash == ContentHash::compute(content.as_bytes()))
    }

    // ------------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------------

    pub fn symbol(&self, symbol_id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&symbol_id)
    }

    /// All symbols in SymbolId order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Symbols declared with `name`, in declaration order.
    pub fn symbols_named(&self, name: &str) -> Vec<&Symbol> {
        self.symbols_by_name
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.symbols.get(id)).collect())
            .unwrap_or_default()
    }

    /// Symbols declared in `file_id`, in declaration order.
    pub fn symbols_in_file(&self, file_id: FileId) -> Vec<&Symbol> {
        self.symbols_by_file
            .get(&file_id)
            .map(|ids| ids.iter().filter_map(|id| self.symbols.get(id)).collect())
            .unwrap_or_default()
    }

    /// The symbol declared by `decl` (a declarator, parameter or declaration node).
    pub fn symbol_declared_by(&self, decl: NodeRef) -> Option<&Symbol> {
        self.symbol_by_decl
            .get(&decl)
            .and_then(|id| self.symbols.get(id))
    }

    /// The symbol an identifier node refers to (or declares).
    pub fn symbol_at_node(&self, node: NodeRef) -> Option<&Symbol> {
        self.symbol_by_occurrence_node
            .get(&node)
            .and_then(|id| self.symbols.get(id))
    }

    /// The symbol whose occurrence span contains `offset`.
    pub fn symbol_at(&self, file_id: FileId, offset: usize) -> Option<&Symbol> {
        self.occurrences_by_file
            .get(&file_id)?
            .iter()
            .map(|&i| &self.occurrences[i])
            .find(|o| o.span.start <= offset && offset < o.span.end)
            .and_then(|o| self.symbols.get(&o.symbol_id))
    }

    // ------------------------------------------------------------------------
    // Occurrences
    // ------------------------------------------------------------------------

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    /// Every occurrence of `symbol_id`, sorted by (file, start offset).
    pub fn occurrences_of(&self, symbol_id: SymbolId) -> Vec<&Occurrence> {
        let mut result: Vec<&Occurrence> = self
            .occurrences_by_symbol
            .get(&symbol_id)
            .map(|ids| ids.iter().map(|&i| &self.occurrences[i]).collect())
            .unwrap_or_default();
        result.sort_by_key(|o| (o.file_id, o.span.start));
        result
    }

    /// Every occurrence in `file_id`, sorted by start offset.
    pub fn occurrences_in_file(&self, file_id: FileId) -> Vec<&Occurrence> {
        let mut result: Vec<&Occurrence> = self
            .occurrences_by_file
            .get(&file_id)
            .map(|ids| ids.iter().map(|&i| &self.occurrences[i]).collect())
            .unwrap_or_default();
        result.sort_by_key(|o| (o.span.start, o.symbol_id));
        result
    }

    /// Symbols with at least one `Read` or `ReadWrite` occurrence inside
    /// `region`.
    pub fn symbols_read_within(&self, file_id: FileId, region: Span) -> HashSet<SymbolId> {
        self.occurrences_by_file
            .get(&file_id)
            .map(|ids| {
                ids.iter()
                    .map(|&i| &self.occurrences[i])
                    .filter(|o| o.kind.is_read() && region.contains(&o.span))
                    .map(|o| o.symbol_id)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
