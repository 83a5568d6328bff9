//! Patch IR: Span, TextEdit, EditSet for atomic rename transactions.
//!
//! This module implements the edit infrastructure shared by every refactor:
//! - Hash-anchored text edits (each edit remembers what it replaces)
//! - Conflict detection (overlapping spans, stale anchors)
//! - Atomic apply semantics (all-or-nothing)
//! - Edit materialization for hosts (`OutputEdit`)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }

    /// Create from an existing hex string without validation.
    ///
    /// Use only when the input is known to be valid (e.g., in tests).
    pub fn from_hex_unchecked(hex: &str) -> Self {
        ContentHash(hex.to_string())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Core Types
// ============================================================================

/// Stable file identifier within a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID.
    pub fn new(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Edits
// ============================================================================

/// A single text replacement anchored in one file.
///
/// The edit records the hash of the bytes it expects to replace, so applying
/// it against text that changed since the edit was computed is detected
/// instead of silently corrupting the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// The file this edit applies to.
    pub file_id: FileId,
    /// The byte range being replaced.
    pub span: Span,
    /// SHA-256 of the bytes in `span` before the edit.
    pub expected_before_hash: ContentHash,
    /// Replacement text.
    pub replacement: String,
}

impl TextEdit {
    /// Create a replacement edit for `span`, anchored to `before` (the current bytes).
    pub fn replace(file_id: FileId, span: Span, before: &[u8], replacement: impl Into<String>) -> Self {
        TextEdit {
            file_id,
            span,
            expected_before_hash: ContentHash::compute(before),
            replacement: replacement.into(),
        }
    }
}

/// A detected overlap or invalidation that prevents apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    /// Two edits have overlapping spans in the same file.
    OverlappingSpans {
        file_id: FileId,
        edit1_span: Span,
        edit2_span: Span,
    },

    /// The bytes at the edit span no longer match what the edit expects.
    AnchorHashMismatch {
        file_id: FileId,
        span: Span,
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Span is out of bounds for the file.
    SpanOutOfBounds {
        file_id: FileId,
        span: Span,
        file_len: usize,
    },

    /// File not found in the supplied contents.
    FileMissing { file_id: FileId },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::OverlappingSpans {
                file_id,
                edit1_span,
                edit2_span,
            } => write!(f, "overlapping edits in {}: {} and {}", file_id, edit1_span, edit2_span),
            Conflict::AnchorHashMismatch { file_id, span, .. } => {
                write!(f, "content changed under edit at {} {}", file_id, span)
            }
            Conflict::SpanOutOfBounds {
                file_id,
                span,
                file_len,
            } => write!(
                f,
                "edit span {} out of bounds in {} (length {})",
                span, file_id, file_len
            ),
            Conflict::FileMissing { file_id } => write!(f, "file {} not available", file_id),
        }
    }
}

// ============================================================================
// EditSet
// ============================================================================

/// An ordered set of edits representing one atomic refactor.
///
/// Either every edit applies or none does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSet {
    /// Human-readable description of the refactor.
    pub label: String,
    /// The edits, in deterministic order after [`EditSet::sort_edits`].
    pub edits: Vec<TextEdit>,
    /// Mapping from FileId to file path (for materialization).
    pub file_paths: BTreeMap<FileId, String>,
}

impl EditSet {
    /// Create a new empty EditSet.
    pub fn new(label: impl Into<String>) -> Self {
        EditSet {
            label: label.into(),
            edits: Vec::new(),
            file_paths: BTreeMap::new(),
        }
    }

    /// An EditSet with no label and no edits (the result of a no-op rename).
    pub fn empty() -> Self {
        EditSet::default()
    }

    /// Add an edit.
    pub fn with_edit(mut self, edit: TextEdit) -> Self {
        self.edits.push(edit);
        self
    }

    /// Register a file path mapping.
    pub fn with_file_path(mut self, file_id: FileId, path: impl Into<String>) -> Self {
        self.file_paths.insert(file_id, path.into());
        self
    }

    /// Add an edit in place.
    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Check if this EditSet contains any edits.
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Number of edits.
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Number of unique files touched.
    pub fn file_count(&self) -> usize {
        self.edits
            .iter()
            .map(|e| e.file_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Sort edits in deterministic order: by file path, then by span start.
    pub fn sort_edits(&mut self) {
        let paths = &self.file_paths;
        self.edits.sort_by(|a, b| {
            let path_a = paths.get(&a.file_id).map(String::as_str);
            let path_b = paths.get(&b.file_id).map(String::as_str);
            path_a
                .cmp(&path_b)
                .then(a.file_id.cmp(&b.file_id))
                .then(a.span.start.cmp(&b.span.start))
                .then(a.span.end.cmp(&b.span.end))
        });
    }

    /// Does any edit of `self` overlap any edit of `other` in the same file?
    pub fn overlaps(&self, other: &EditSet) -> bool {
        self.edits.iter().any(|a| {
            other
                .edits
                .iter()
                .any(|b| a.file_id == b.file_id && a.span.overlaps(&b.span))
        })
    }

    /// Move all edits and path mappings from `other` into `self`.
    pub fn merge(&mut self, other: EditSet) {
        self.file_paths.extend(other.file_paths);
        self.edits.extend(other.edits);
    }

    /// Detect conflicts within this EditSet.
    ///
    /// An empty list means no conflicts.
    #[must_use]
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let mut edits_by_file: BTreeMap<FileId, Vec<&TextEdit>> = BTreeMap::new();
        for edit in &self.edits {
            edits_by_file.entry(edit.file_id).or_default().push(edit);
        }

        for (file_id, edits) in edits_by_file {
            for i in 0..edits.len() {
                for j in (i + 1)..edits.len() {
                    if edits[i].span.overlaps(&edits[j].span) {
                        conflicts.push(Conflict::OverlappingSpans {
                            file_id,
                            edit1_span: edits[i].span,
                            edit2_span: edits[j].span,
                        });
                    }
                }
            }
        }

        conflicts
    }

    /// Materialize the edits in the host-facing output shape.
    pub fn to_output(&self) -> Vec<OutputEdit> {
        let mut sorted = self.clone();
        sorted.sort_edits();
        sorted
            .edits
            .iter()
            .map(|edit| OutputEdit {
                file: self
                    .file_paths
                    .get(&edit.file_id)
                    .cloned()
                    .unwrap_or_else(|| edit.file_id.to_string()),
                start_offset: edit.span.start,
                end_offset: edit.span.end,
                replacement_text: edit.replacement.clone(),
            })
            .collect()
    }
}

// ============================================================================
// Atomic Apply
// ============================================================================

/// Result of attempting to apply an EditSet.
#[derive(Debug, Clone)]
pub enum ApplyResult {
    /// All edits applied successfully.
    Success {
        /// The new content for each modified file.
        modified_files: HashMap<FileId, String>,
    },

    /// Apply failed; nothing was modified.
    Failed {
        /// The conflicts that prevented apply.
        conflicts: Vec<Conflict>,
    },
}

impl ApplyResult {
    /// Returns true for [`ApplyResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ApplyResult::Success { .. })
    }
}

impl EditSet {
    /// Apply this EditSet atomically to the given file contents.
    ///
    /// Either all edits apply successfully, or none do. Edits are applied in
    /// reverse offset order within each file to preserve span validity.
    #[must_use]
    pub fn apply(&self, file_contents: &HashMap<FileId, String>) -> ApplyResult {
        let mut conflicts = self.detect_conflicts();

        for edit in &self.edits {
            let Some(content) = file_contents.get(&edit.file_id) else {
                conflicts.push(Conflict::FileMissing {
                    file_id: edit.file_id,
                });
                continue;
            };

            let Some(before) = content.as_bytes().get(edit.span.start..edit.span.end) else {
                conflicts.push(Conflict::SpanOutOfBounds {
                    file_id: edit.file_id,
                    span: edit.span,
                    file_len: content.len(),
                });
                continue;
            };

            let actual = ContentHash::compute(before);
            if actual != edit.expected_before_hash {
                conflicts.push(Conflict::AnchorHashMismatch {
                    file_id: edit.file_id,
                    span: edit.span,
                    expected: edit.expected_before_hash.clone(),
                    actual,
                });
            }
        }

        if !conflicts.is_empty() {
            return ApplyResult::Failed { conflicts };
        }

        let mut edits_by_file: HashMap<FileId, Vec<&TextEdit>> = HashMap::new();
        for edit in &self.edits {
            edits_by_file.entry(edit.file_id).or_default().push(edit);
        }

        let mut modified_files = HashMap::new();
        for (file_id, mut file_edits) in edits_by_file {
            let Some(original) = file_contents.get(&file_id) else {
                continue;
            };
            let mut content = original.clone();

            file_edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
            for edit in file_edits {
                content.replace_range(edit.span.start..edit.span.end, &edit.replacement);
            }

            modified_files.insert(file_id, content);
        }

        ApplyResult::Success { modified_files }
    }
}

// ============================================================================
// Materialization
// ============================================================================

/// A single edit as handed to the host's text model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEdit {
    /// File path (or `file_N` when no path is registered).
    pub file: String,
    /// Start byte offset (inclusive).
    pub start_offset: usize,
    /// End byte offset (exclusive).
    pub end_offset: usize,
    /// Replacement text.
    pub replacement_text: String,
}

// ============================================================================
// Tests
// ============================================================================
