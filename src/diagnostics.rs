//! Diagnostics, suggested fixes and the shared diagnostic sink.
//!
//! Rules and the dead-binding detector produce [`Diagnostic`] values. During
//! a parallel analysis every worker appends to one [`DiagnosticSink`]; the
//! sink imposes no order until [`DiagnosticSink::into_sorted`], which yields
//! the deterministic report: by file path, then start offset, then rule id.

use std::cmp::Ordering;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::index::SymbolId;
use crate::types::Location;

// ============================================================================
// Severity / Category
// ============================================================================

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "error")]
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// Rule grouping used in rule metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Naming conventions.
    Naming,
    /// Unused or redundant code.
    Usage,
}

// ============================================================================
// Diagnostic
// ============================================================================

/// A proposed rename that would resolve a diagnostic.
///
/// Applying it is a call into the rename engine (see
/// [`SuggestedFix::apply`](crate::rename)); the fix itself holds no state
/// beyond the target and the proposed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedFix {
    pub label: String,
    pub symbol_id: SymbolId,
    pub new_name: String,
}

impl SuggestedFix {
    pub fn rename(symbol_id: SymbolId, new_name: impl Into<String>) -> Self {
        let new_name = new_name.into();
        SuggestedFix {
            label: format!("Rename to '{}'", new_name),
            symbol_id,
            new_name,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable rule id, e.g. `CCS0001`.
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// The identifier token the finding is about.
    pub location: Location,
    pub fixes: Vec<SuggestedFix>,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Diagnostic {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
            fixes: Vec::new(),
        }
    }

    /// Attach a fix.
    pub fn with_fix(mut self, fix: SuggestedFix) -> Self {
        self.fixes.push(fix);
        self
    }

    /// Start byte of the primary location (0 when unknown).
    pub fn start_offset(&self) -> usize {
        self.location.byte_start.unwrap_or_default()
    }

    /// The host-facing record.
    pub fn to_record(&self) -> DiagnosticRecord {
        DiagnosticRecord {
            rule_id: self.rule_id.clone(),
            severity: self.severity,
            message: self.message.clone(),
            file: self.location.file.clone(),
            line: self.location.line,
            column: self.location.col,
            end_line: self.location.end_line,
            end_column: self.location.end_col,
            suggested_fixes: self
                .fixes
                .iter()
                .map(|fix| FixRecord {
                    label: fix.label.clone(),
                    new_name: fix.new_name.clone(),
                })
                .collect(),
        }
    }

    fn report_order(&self, other: &Self) -> Ordering {
        self.location
            .file
            .cmp(&other.location.file)
            .then(self.start_offset().cmp(&other.start_offset()))
            .then(self.location.line.cmp(&other.location.line))
            .then(self.location.col.cmp(&other.location.col))
            .then(self.rule_id.cmp(&other.rule_id))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.location, self.severity, self.rule_id, self.message
        )
    }
}

/// Sort diagnostics into report order: (file, start offset, rule id).
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(Diagnostic::report_order);
}

// ============================================================================
// Records
// ============================================================================

/// Serialized shape of a diagnostic for the reporting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub suggested_fixes: Vec<FixRecord>,
}

/// Serialized shape of a suggested fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixRecord {
    pub label: String,
    pub new_name: String,
}

// ============================================================================
// Sink
// ============================================================================

/// Thread-safe collector for diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }

    pub fn extend(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.lock().extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Consume the sink and return its contents in report order.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.into_inner();
        sort_diagnostics(&mut diagnostics);
        diagnostics
    }
}
