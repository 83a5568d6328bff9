//! Common types shared between the index, diagnostics and error modules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::patch::FileId;

// ============================================================================
// Node Identity
// ============================================================================

/// Index of a node within one syntax tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID.
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// The arena slot this id addresses.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// A node addressed across a compilation: the file's tree plus the node in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeRef {
    pub file_id: FileId,
    pub node_id: NodeId,
}

impl NodeRef {
    pub fn new(file_id: FileId, node_id: NodeId) -> Self {
        NodeRef { file_id, node_id }
    }
}

// ============================================================================
// Location Type
// ============================================================================

/// Location of a span in a source file.
///
/// - `file`: path as registered with the index
/// - `line`/`col`: 1-indexed start position (columns count chars)
/// - `end_line`/`end_col`: 1-indexed exclusive end position
/// - `byte_start`/`byte_end`: byte offsets (optional)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// File path.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    #[serde(rename = "column")]
    pub col: u32,
    /// End line number (1-indexed).
    pub end_line: u32,
    /// End column number (1-indexed, exclusive).
    #[serde(rename = "endColumn")]
    pub end_col: u32,
    /// Byte offset from file start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<usize>,
    /// Byte offset end, exclusive (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<usize>,
}

impl Location {
    /// Create a single-point location without byte offsets.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            end_line: line,
            end_col: col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Attach the covered range.
    pub fn with_end(mut self, end_line: u32, end_col: u32) -> Self {
        self.end_line = end_line;
        self.end_col = end_col;
        self
    }

    /// Attach byte offsets.
    pub fn with_bytes(mut self, byte_start: usize, byte_end: usize) -> Self {
        self.byte_start = Some(byte_start);
        self.byte_end = Some(byte_end);
        self
    }

    /// Comparison key for deterministic sorting: (file, start offset, line, col).
    fn sort_key(&self) -> (&str, usize, u32, u32) {
        (
            &self.file,
            self.byte_start.unwrap_or_default(),
            self.line,
            self.col,
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| (self.end_line, self.end_col).cmp(&(other.end_line, other.end_col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_orders_by_file_then_offset() {
        let a = Location::new("a.cs", 9, 1).with_bytes(40, 45);
        let b = Location::new("a.cs", 2, 1).with_bytes(50, 55);
        let c = Location::new("b.cs", 1, 1).with_bytes(0, 3);
        let mut locs = vec![c.clone(), b.clone(), a.clone()];
        locs.sort();
        assert_eq!(locs, vec![a, b, c]);
    }

    #[test]
    fn location_serializes_camel_case() {
        let loc = Location::new("w.cs", 3, 7).with_end(3, 12);
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["column"], 7);
        assert_eq!(json["endLine"], 3);
        assert_eq!(json["endColumn"], 12);
        assert!(json.get("byteStart").is_none());
        assert_eq!(loc.to_string(), "w.cs:3:7");
    }
}
