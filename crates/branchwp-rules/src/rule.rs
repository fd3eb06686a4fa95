//! # Rules
//!
//! A branch write protection rule grants or refuses write access on the
//! branches matching a glob pattern to a single user or group.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidRuleError, RuleField};
use crate::legacy::{DENY_SIGIL, FIELD_SEPARATOR, GROUP_SIGIL, RULE_SEPARATOR};

/// Polarity of a rule as stored by the host configuration store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// The principal may write the matching branches.
    Allow,
    /// The principal must not write the matching branches.
    Deny,
}

impl RuleType {
    /// Map a deny flag to a rule type.
    pub fn from_deny(is_deny: bool) -> Self {
        if is_deny {
            RuleType::Deny
        } else {
            RuleType::Allow
        }
    }

    /// Get the string representation of the rule type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Allow => "ALLOW",
            RuleType::Deny => "DENY",
        }
    }
}

/// A single branch write protection rule.
///
/// The branch pattern may embed the `{username}` and `{mail}` placeholders.
/// They are kept verbatim here and only substituted when the rule is
/// evaluated against a user.
///
/// Serialized in the shape the host stores its structured configuration:
///
/// ```
/// use branchwp_rules::Rule;
///
/// let rule = Rule::deny_group("release/*", "interns");
/// let json = serde_json::to_string(&rule).unwrap();
/// assert_eq!(json, r#"{"branch":"release/*","name":"interns","group":true,"type":"DENY"}"#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Glob pattern of the protected branches.
    pub branch: String,

    /// User or group name.
    #[serde(rename = "name")]
    pub principal: String,

    /// Whether `principal` names a group.
    #[serde(rename = "group", default)]
    pub is_group: bool,

    /// Whether the rule refuses write access.
    #[serde(rename = "type", with = "rule_type")]
    pub is_deny: bool,
}

impl Rule {
    /// Create a rule from its four components.
    pub fn new(
        branch: impl Into<String>,
        principal: impl Into<String>,
        is_group: bool,
        is_deny: bool,
    ) -> Self {
        Self {
            branch: branch.into(),
            principal: principal.into(),
            is_group,
            is_deny,
        }
    }

    /// Allow a user to write the matching branches.
    pub fn allow_user(branch: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(branch, user, false, false)
    }

    /// Allow the members of a group to write the matching branches.
    pub fn allow_group(branch: impl Into<String>, group: impl Into<String>) -> Self {
        Self::new(branch, group, true, false)
    }

    /// Refuse a user write access to the matching branches.
    pub fn deny_user(branch: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(branch, user, false, true)
    }

    /// Refuse the members of a group write access to the matching branches.
    pub fn deny_group(branch: impl Into<String>, group: impl Into<String>) -> Self {
        Self::new(branch, group, true, true)
    }

    /// The polarity of this rule.
    pub fn rule_type(&self) -> RuleType {
        RuleType::from_deny(self.is_deny)
    }

    /// Check that the rule can be stored and written in the legacy format.
    ///
    /// A rule is rejected if:
    /// - either field is empty
    /// - either field contains `,` or `;`
    /// - an allow rule's branch starts with `!`, or a user rule's principal
    ///   starts with `@`, and more follows; the legacy format would read the
    ///   leading character back as a sigil
    ///
    /// Whitespace is ordinary field content. Forms that want to refuse
    /// blank input check that themselves.
    ///
    /// # Example
    ///
    /// ```
    /// use branchwp_rules::{InvalidRuleError, Rule, RuleField};
    ///
    /// assert!(Rule::allow_user("main", "trillian").validate().is_ok());
    ///
    /// let err = Rule::allow_user("a;b", "trillian").validate().unwrap_err();
    /// assert_eq!(
    ///     err,
    ///     InvalidRuleError::ReservedCharacter { field: RuleField::Branch, character: ';' }
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), InvalidRuleError> {
        check_field(RuleField::Branch, &self.branch, DENY_SIGIL, self.is_deny)?;
        check_field(RuleField::Principal, &self.principal, GROUP_SIGIL, self.is_group)
    }

    /// Check if the rule passes [`Rule::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} on {}",
            if self.is_deny { "deny" } else { "allow" },
            if self.is_group { "group" } else { "user" },
            self.principal,
            self.branch
        )
    }
}

/// `flagged` is whether the encoder writes `sigil` in front of `value`.
fn check_field(
    field: RuleField,
    value: &str,
    sigil: char,
    flagged: bool,
) -> Result<(), InvalidRuleError> {
    if value.is_empty() {
        return Err(InvalidRuleError::EmptyField(field));
    }

    if let Some(character) = value
        .chars()
        .find(|c| *c == FIELD_SEPARATOR || *c == RULE_SEPARATOR)
    {
        return Err(InvalidRuleError::ReservedCharacter { field, character });
    }

    // A lone sigil decodes as itself, there is nothing left to strip it from
    if !flagged && value.starts_with(sigil) && value.len() > sigil.len_utf8() {
        return Err(InvalidRuleError::LeadingSigil { field, sigil });
    }

    Ok(())
}

mod rule_type {
    use super::RuleType;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(is_deny: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        RuleType::from_deny(*is_deny).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(RuleType::deserialize(deserializer)? == RuleType::Deny)
    }
}
