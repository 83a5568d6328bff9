//! Error bridge implementations for engine errors.
//!
//! `impl From<X> for CodecopError` conversions from the error types defined
//! in this crate to the unified `CodecopError`. They live here rather than in
//! `codecop-core` because the source types belong to the root crate.

use codecop_core::error::CodecopError;

use crate::config::ConfigError;
use crate::rename::{NotApplicableReason, RenameError};
use crate::rules::RuleError;

// ============================================================================
// Bridge: RenameError -> CodecopError
// ============================================================================

impl From<RenameError> for CodecopError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::InvalidIdentifier { name, reason } => {
                CodecopError::InvalidIdentifier { name, reason }
            }
            RenameError::Cancelled(_) => CodecopError::Cancelled,
            RenameError::Conflicts(conflicts) => CodecopError::from(conflicts),
        }
    }
}

// ============================================================================
// Bridge: NotApplicableReason -> CodecopError
// ============================================================================

/// For hosts that surface a non-applicable rename as a failure.
impl From<NotApplicableReason> for CodecopError {
    fn from(reason: NotApplicableReason) -> Self {
        match reason {
            NotApplicableReason::UnknownSymbol(id) => CodecopError::symbol_not_found(id),
            NotApplicableReason::StaleIndex { path } => CodecopError::StaleIndex { path },
            NotApplicableReason::DeclarationMismatch { expected, .. } => {
                CodecopError::symbol_not_found(expected)
            }
            NotApplicableReason::MissingSource { file_id } => CodecopError::ApplyError {
                message: format!("no source text for {}", file_id),
                file: None,
            },
        }
    }
}

// ============================================================================
// Bridge: ConfigError -> CodecopError
// ============================================================================

impl From<ConfigError> for CodecopError {
    fn from(err: ConfigError) -> Self {
        CodecopError::ConfigError {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Bridge: RuleError -> CodecopError
// ============================================================================

impl From<RuleError> for CodecopError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::Cancelled(_) => CodecopError::Cancelled,
            other => CodecopError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecop_core::cancel::Cancelled;
    use codecop_core::error::OutputErrorCode;
    use codecop_core::index::SymbolId;

    #[test]
    fn rename_errors_map_to_output_codes() {
        let invalid: CodecopError = RenameError::InvalidIdentifier {
            name: "1x".to_string(),
            reason: "must start with letter or underscore".to_string(),
        }
        .into();
        assert_eq!(invalid.error_code(), OutputErrorCode::InvalidArguments);
        assert_eq!(
            invalid.to_string(),
            "invalid identifier '1x': must start with letter or underscore"
        );

        let cancelled: CodecopError = RenameError::Cancelled(Cancelled).into();
        assert_eq!(cancelled.error_code().code(), 6);

        let conflicts: CodecopError = RenameError::Conflicts(Vec::new()).into();
        assert_eq!(conflicts.error_code(), OutputErrorCode::ApplyError);
    }

    #[test]
    fn not_applicable_reasons_map_to_resolution_errors() {
        let unknown: CodecopError = NotApplicableReason::UnknownSymbol(SymbolId::new(3)).into();
        assert_eq!(unknown.to_string(), "symbol not found: sym_3");
        let stale: CodecopError = NotApplicableReason::StaleIndex {
            path: "a.cs".to_string(),
        }
        .into();
        assert_eq!(stale.error_code(), OutputErrorCode::ResolutionError);
    }

    #[test]
    fn config_errors_are_invalid_arguments() {
        let err: CodecopError = ConfigError::UnknownRule {
            rule_id: "CCS9".to_string(),
        }
        .into();
        assert_eq!(err.error_code().code(), 2);
        assert_eq!(err.to_string(), "configuration error: unknown rule id 'CCS9'");
    }
}
