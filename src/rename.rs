//! Symbol-safe rename.
//!
//! [`RenameEngine::rename`] turns a symbol and a new name into one
//! [`EditSet`] covering every occurrence the index recorded for the symbol:
//! the declaration, reads, writes and type references (base lists, generic
//! arguments, `new T()`). Each edit replaces exactly the identifier span and
//! is anchored to the hash of the text it replaces.
//!
//! Outcomes:
//! - `Applicable(edits)`: apply all edits or none. Renaming to the current
//!   name yields an empty edit set.
//! - `NotApplicable(reason)`: the symbol is unknown or the text moved on
//!   since the index was built. This is a normal result, not an error.
//! - `Err(..)`: an invalid new name, cancellation, or conflicting apply.
//!
//! Renames that touch a common occurrence are serialized through a claim
//! table; renames with disjoint occurrence sets run concurrently.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};
use thiserror::Error;

use codecop_syntax::token::is_keyword;

use crate::cancel::{CancellationToken, Cancelled};
use crate::diagnostics::{Diagnostic, SuggestedFix};
use crate::index::{SymbolId, SymbolIndex};
use crate::patch::{ApplyResult, Conflict, EditSet, FileId, Span, TextEdit};
use crate::text::extract_span;

// ============================================================================
// Errors and outcomes
// ============================================================================

/// A rename the caller must not retry unchanged.
#[derive(Debug, Error)]
pub enum RenameError {
    /// The new name is not a legal identifier.
    #[error("invalid name '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// The edits no longer fit the text they were computed for.
    #[error("edits could not be applied ({} conflict(s))", .0.len())]
    Conflicts(Vec<Conflict>),
}

/// Why a rename was not produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotApplicableReason {
    /// The index has no such symbol.
    UnknownSymbol(SymbolId),
    /// A file the symbol occurs in changed since the index was built.
    StaleIndex { path: String },
    /// The declaration no longer spells the symbol's name.
    DeclarationMismatch { expected: String, found: String },
    /// No text was supplied for a file the symbol occurs in.
    MissingSource { file_id: FileId },
}

impl fmt::Display for NotApplicableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotApplicableReason::UnknownSymbol(id) => write!(f, "unknown symbol {}", id),
            NotApplicableReason::StaleIndex { path } => write!(f, "index is stale for {}", path),
            NotApplicableReason::DeclarationMismatch { expected, found } => {
                write!(f, "declaration reads '{}', expected '{}'", found, expected)
            }
            NotApplicableReason::MissingSource { file_id } => {
                write!(f, "no source text for {}", file_id)
            }
        }
    }
}

/// Result of a rename request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Applicable(EditSet),
    NotApplicable(NotApplicableReason),
}

impl RenameOutcome {
    pub fn is_applicable(&self) -> bool {
        matches!(self, RenameOutcome::Applicable(_))
    }

    pub fn edit_set(&self) -> Option<&EditSet> {
        match self {
            RenameOutcome::Applicable(edits) => Some(edits),
            RenameOutcome::NotApplicable(_) => None,
        }
    }

    pub fn into_edit_set(self) -> Option<EditSet> {
        match self {
            RenameOutcome::Applicable(edits) => Some(edits),
            RenameOutcome::NotApplicable(_) => None,
        }
    }
}

// ============================================================================
// Identifier validation
// ============================================================================

/// Check that `name` can replace an identifier.
///
/// Non-empty, starts with a letter or underscore, continues with letters,
/// digits or underscores, and is not a keyword.
pub fn validate_identifier(name: &str) -> Result<(), RenameError> {
    let invalid = |reason: String| RenameError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("name cannot be empty".to_string()));
    };
    if !first.is_alphabetic() && first != '_' {
        return Err(invalid("must start with letter or underscore".to_string()));
    }
    if let Some(bad) = chars.find(|&ch| !ch.is_alphanumeric() && ch != '_') {
        return Err(invalid(format!("invalid character: '{}'", bad)));
    }
    if is_keyword(name) {
        return Err(invalid("cannot be a keyword".to_string()));
    }
    Ok(())
}

// ============================================================================
// Source store
// ============================================================================

/// In-memory text model with atomic multi-file apply.
#[derive(Debug, Default)]
pub struct SourceStore {
    files: RwLock<HashMap<FileId, String>>,
}

impl SourceStore {
    pub fn new(files: HashMap<FileId, String>) -> Self {
        SourceStore {
            files: RwLock::new(files),
        }
    }

    pub fn get(&self, file_id: FileId) -> Option<String> {
        self.files.read().get(&file_id).cloned()
    }

    /// Copy of every file's current text.
    pub fn snapshot(&self) -> HashMap<FileId, String> {
        self.files.read().clone()
    }

    /// Apply `edits` to every file or to none.
    pub fn apply(&self, edits: &EditSet) -> Result<(), Vec<Conflict>> {
        let mut files = self.files.write();
        apply_to(&mut files, edits)
    }
}

fn apply_to(files: &mut HashMap<FileId, String>, edits: &EditSet) -> Result<(), Vec<Conflict>> {
    match edits.apply(files) {
        ApplyResult::Success { modified_files } => {
            files.extend(modified_files);
            Ok(())
        }
        ApplyResult::Failed { conflicts } => Err(conflicts),
    }
}

// ============================================================================
// Claims
// ============================================================================

type ClaimKey = (FileId, Span);

/// Occurrence spans held by in-flight renames.
#[derive(Debug, Default)]
struct ClaimTable {
    held: Mutex<HashSet<ClaimKey>>,
    released: Condvar,
}

impl ClaimTable {
    /// Block until none of `keys` is held, then hold them all.
    fn acquire(&self, keys: Vec<ClaimKey>) -> Claim<'_> {
        let mut held = self.held.lock();
        while keys.iter().any(|k| held.contains(k)) {
            self.released.wait(&mut held);
        }
        held.extend(keys.iter().copied());
        Claim { table: self, keys }
    }
}

/// Releases its keys on drop.
struct Claim<'a> {
    table: &'a ClaimTable,
    keys: Vec<ClaimKey>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut held = self.table.held.lock();
        for key in &self.keys {
            held.remove(key);
        }
        self.table.released.notify_all();
    }
}

// ============================================================================
// Rename engine
// ============================================================================

/// One rename in a fix-all batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub symbol_id: SymbolId,
    pub new_name: String,
}

impl RenameRequest {
    pub fn new(symbol_id: SymbolId, new_name: impl Into<String>) -> Self {
        RenameRequest {
            symbol_id,
            new_name: new_name.into(),
        }
    }

    /// The first fix of every diagnostic from `rule_id`.
    pub fn from_diagnostics(diagnostics: &[Diagnostic], rule_id: &str) -> Vec<RenameRequest> {
        diagnostics
            .iter()
            .filter(|d| d.rule_id == rule_id)
            .filter_map(|d| d.fixes.first())
            .map(|fix| RenameRequest::new(fix.symbol_id, fix.new_name.clone()))
            .collect()
    }
}

/// Why a fix-all request was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotApplicable(NotApplicableReason),
    /// Its edits overlap edits already accepted in the batch.
    Overlap,
}

/// Result of [`RenameEngine::fix_all`].
#[derive(Debug, Clone, Default)]
pub struct FixAllOutcome {
    /// Every accepted rename, merged and sorted.
    pub edits: EditSet,
    pub applied: Vec<RenameRequest>,
    pub skipped: Vec<(RenameRequest, SkipReason)>,
}

/// Computes renames against one shared index.
#[derive(Debug)]
pub struct RenameEngine {
    index: Arc<SymbolIndex>,
    claims: ClaimTable,
}

impl RenameEngine {
    pub fn new(index: Arc<SymbolIndex>) -> Self {
        RenameEngine {
            index,
            claims: ClaimTable::default(),
        }
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Compute the edits that rename `symbol_id` to `new_name`.
    ///
    /// `sources` must hold the current text of every file the symbol occurs
    /// in. Nothing is modified.
    pub fn rename(
        &self,
        symbol_id: SymbolId,
        new_name: &str,
        sources: &HashMap<FileId, String>,
        cancel: &CancellationToken,
    ) -> Result<RenameOutcome, RenameError> {
        validate_identifier(new_name)?;

        let Some(symbol) = self.index.symbol(symbol_id) else {
            return Ok(RenameOutcome::NotApplicable(
                NotApplicableReason::UnknownSymbol(symbol_id),
            ));
        };
        let occurrences = self.index.occurrences_of(symbol_id);

        let files: BTreeSet<FileId> = occurrences.iter().map(|o| o.file_id).collect();
        for &file_id in &files {
            let Some(text) = sources.get(&file_id) else {
                return Ok(RenameOutcome::NotApplicable(
                    NotApplicableReason::MissingSource { file_id },
                ));
            };
            if !self.index.is_current(file_id, text) {
                return Ok(RenameOutcome::NotApplicable(NotApplicableReason::StaleIndex {
                    path: self.path_of(file_id),
                }));
            }
        }

        let decl_text = sources
            .get(&symbol.file_id())
            .and_then(|text| extract_span(text, symbol.decl_span))
            .unwrap_or_default();
        if decl_text != symbol.name {
            return Ok(RenameOutcome::NotApplicable(
                NotApplicableReason::DeclarationMismatch {
                    expected: symbol.name.clone(),
                    found: decl_text.to_string(),
                },
            ));
        }

        if new_name == symbol.name {
            return Ok(RenameOutcome::Applicable(EditSet::empty()));
        }

        let mut edits = EditSet::new(format!("rename {} to {}", symbol.name, new_name));
        for &file_id in &files {
            edits = edits.with_file_path(file_id, self.path_of(file_id));
        }
        for occurrence in &occurrences {
            cancel.check()?;
            let before = sources
                .get(&occurrence.file_id)
                .and_then(|text| extract_span(text, occurrence.span))
                .unwrap_or_default();
            if before != symbol.name {
                return Ok(RenameOutcome::NotApplicable(NotApplicableReason::StaleIndex {
                    path: self.path_of(occurrence.file_id),
                }));
            }
            edits.push(TextEdit::replace(
                occurrence.file_id,
                occurrence.span,
                before.as_bytes(),
                new_name,
            ));
        }
        cancel.check()?;
        edits.sort_edits();

        tracing::debug!(
            symbol = %symbol_id,
            from = %symbol.name,
            to = new_name,
            edits = edits.edit_count(),
            files = edits.file_count(),
            "rename computed"
        );
        Ok(RenameOutcome::Applicable(edits))
    }

    /// Compute and apply a rename against `store`.
    ///
    /// Blocks while another rename holds any of this symbol's occurrences.
    /// The store is checked against the index again under its write lock, so
    /// a file changed by a concurrent rename yields `StaleIndex` instead of a
    /// misplaced edit.
    pub fn rename_and_apply(
        &self,
        symbol_id: SymbolId,
        new_name: &str,
        store: &SourceStore,
        cancel: &CancellationToken,
    ) -> Result<RenameOutcome, RenameError> {
        let keys = self
            .index
            .occurrences_of(symbol_id)
            .iter()
            .map(|o| (o.file_id, o.span))
            .collect();
        let _claim = self.claims.acquire(keys);

        let outcome = self.rename(symbol_id, new_name, &store.snapshot(), cancel)?;
        let RenameOutcome::Applicable(edits) = &outcome else {
            return Ok(outcome);
        };
        if !edits.has_edits() {
            return Ok(outcome);
        }
        cancel.check()?;

        let mut files = store.files.write();
        for &file_id in edits.file_paths.keys() {
            let current = files
                .get(&file_id)
                .is_some_and(|text| self.index.is_current(file_id, text));
            if !current {
                return Ok(RenameOutcome::NotApplicable(NotApplicableReason::StaleIndex {
                    path: self.path_of(file_id),
                }));
            }
        }
        apply_to(&mut files, edits).map_err(RenameError::Conflicts)?;
        Ok(outcome)
    }

    /// Merge many renames computed against one snapshot into one edit set.
    ///
    /// Requests are taken in order; a request whose edits overlap an already
    /// accepted one is skipped. Two symbols renamed to the same name are
    /// accepted with a warning.
    pub fn fix_all(
        &self,
        requests: &[RenameRequest],
        sources: &HashMap<FileId, String>,
        cancel: &CancellationToken,
    ) -> Result<FixAllOutcome, RenameError> {
        let mut outcome = FixAllOutcome {
            edits: EditSet::new("fix all"),
            ..FixAllOutcome::default()
        };
        let mut targets: HashMap<&str, SymbolId> = HashMap::new();

        for request in requests {
            cancel.check()?;
            let edits = match self.rename(request.symbol_id, &request.new_name, sources, cancel)? {
                RenameOutcome::Applicable(edits) => edits,
                RenameOutcome::NotApplicable(reason) => {
                    outcome
                        .skipped
                        .push((request.clone(), SkipReason::NotApplicable(reason)));
                    continue;
                }
            };
            if outcome.edits.overlaps(&edits) {
                outcome.skipped.push((request.clone(), SkipReason::Overlap));
                continue;
            }
            if let Some(&other) = targets.get(request.new_name.as_str()) {
                if other != request.symbol_id {
                    tracing::warn!(
                        name = %request.new_name,
                        first = %other,
                        second = %request.symbol_id,
                        "fix-all renames two symbols to the same name"
                    );
                }
            }
            targets.insert(&request.new_name, request.symbol_id);
            outcome.edits.merge(edits);
            outcome.applied.push(request.clone());
        }

        outcome.edits.sort_edits();
        Ok(outcome)
    }

    fn path_of(&self, file_id: FileId) -> String {
        self.index
            .file(file_id)
            .map_or_else(|| file_id.to_string(), |f| f.path.clone())
    }
}

impl SuggestedFix {
    /// Compute this fix through `engine`, optionally with a caller-chosen name.
    pub fn apply(
        &self,
        engine: &RenameEngine,
        new_name: Option<&str>,
        sources: &HashMap<FileId, String>,
        cancel: &CancellationToken,
    ) -> Result<RenameOutcome, RenameError> {
        engine.rename(
            self.symbol_id,
            new_name.unwrap_or(&self.new_name),
            sources,
            cancel,
        )
    }
}
