//! Error types for rule validation and legacy encoding.

use thiserror::Error;

/// Which slot of a rule a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    /// The branch pattern.
    Branch,
    /// The user or group name.
    Principal,
}

impl RuleField {
    /// Get the string representation of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleField::Branch => "branch",
            RuleField::Principal => "principal",
        }
    }
}

impl std::fmt::Display for RuleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule that cannot be stored or written in the legacy format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRuleError {
    /// Field is empty
    #[error("{0} must not be empty")]
    EmptyField(RuleField),

    /// Field contains one of the legacy separators
    #[error("{field} must not contain '{character}'")]
    ReservedCharacter {
        /// Offending field.
        field: RuleField,
        /// The separator found in the field.
        character: char,
    },

    /// Field starts with the character the legacy format reads as a sigil
    #[error("{field} must not start with '{sigil}'")]
    LeadingSigil {
        /// Offending field.
        field: RuleField,
        /// The sigil the field starts with.
        sigil: char,
    },
}

impl InvalidRuleError {
    /// The field the error refers to.
    pub fn field(&self) -> RuleField {
        match self {
            InvalidRuleError::EmptyField(field) => *field,
            InvalidRuleError::ReservedCharacter { field, .. } => *field,
            InvalidRuleError::LeadingSigil { field, .. } => *field,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            InvalidRuleError::EmptyField(_) => "EMPTY_FIELD",
            InvalidRuleError::ReservedCharacter { .. } => "RESERVED_CHARACTER",
            InvalidRuleError::LeadingSigil { .. } => "LEADING_SIGIL",
        }
    }
}

/// Legacy codec error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A rule of the set cannot be encoded
    #[error("rule {index} cannot be encoded: {source}")]
    InvalidRule {
        /// Position of the rule in the set.
        index: usize,
        /// Why the rule was rejected.
        #[source]
        source: InvalidRuleError,
    },
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
