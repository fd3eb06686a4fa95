//! # Settings Form
//!
//! State of the repository settings panel: the enabled checkbox, the rule
//! table and the "add rule" form. Every accepted edit is reported to an
//! optional change listener together with the form's validity, which is
//! what the host's configuration binder needs to enable its save button.

use branchwp_rules::{InvalidRuleError, Rule, RuleField};
use branchwp_service::BranchWritePermissions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Settings form error types.
#[derive(Debug, Error)]
pub enum FormError {
    /// The form is read only
    #[error("Form is read only")]
    ReadOnly,

    /// The rule cannot be added
    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] InvalidRuleError),

    /// No rule at that position
    #[error("No rule at index {0}")]
    NoSuchRule(usize),

    /// A field of the entered rule is blank
    #[error("{0} must not be blank")]
    BlankField(RuleField),
}

/// Result type for form operations.
pub type FormResult<T> = Result<T, FormError>;

/// Autocomplete endpoints the host offers for principal lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteLinks {
    /// User search endpoint.
    pub users: Option<String>,
    /// Group search endpoint.
    pub groups: Option<String>,
}

/// The "add rule" sub-form.
///
/// Starts out as an allow rule for a user, with nothing selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDraft {
    /// Branch pattern being typed.
    pub branch: String,
    /// Selected principal, if any.
    pub principal: Option<String>,
    /// Whether the draft targets a group.
    pub is_group: bool,
    /// Whether the draft denies.
    pub is_deny: bool,
}

impl RuleDraft {
    /// Switch between user and group scope.
    ///
    /// The selected principal belongs to the previous scope and is cleared.
    pub fn set_group(&mut self, is_group: bool) {
        if self.is_group != is_group {
            self.is_group = is_group;
            self.principal = None;
        }
    }

    /// Check if the draft has everything a rule needs.
    pub fn is_complete(&self) -> bool {
        !self.branch.trim().is_empty()
            && self
                .principal
                .as_deref()
                .map(|p| !p.trim().is_empty())
                .unwrap_or(false)
    }

    fn to_rule(&self) -> Rule {
        Rule::new(
            self.branch.clone(),
            self.principal.clone().unwrap_or_default(),
            self.is_group,
            self.is_deny,
        )
    }
}

type ChangeListener = Box<dyn Fn(&BranchWritePermissions, bool) + Send + Sync>;

/// Settings form for one repository.
pub struct PermissionsForm {
    configuration: BranchWritePermissions,
    draft: RuleDraft,
    read_only: bool,
    links: AutocompleteLinks,
    on_change: Option<ChangeListener>,
}

impl std::fmt::Debug for PermissionsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionsForm")
            .field("configuration", &self.configuration)
            .field("draft", &self.draft)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl PermissionsForm {
    /// Create a form over an initial configuration.
    pub fn new(configuration: BranchWritePermissions) -> Self {
        Self {
            configuration,
            draft: RuleDraft::default(),
            read_only: false,
            links: AutocompleteLinks::default(),
            on_change: None,
        }
    }

    /// Make the form read only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the autocomplete endpoints.
    pub fn with_links(mut self, links: AutocompleteLinks) -> Self {
        self.links = links;
        self
    }

    /// Register the listener called after every accepted edit.
    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: Fn(&BranchWritePermissions, bool) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(listener));
        self
    }

    /// Current configuration.
    pub fn configuration(&self) -> &BranchWritePermissions {
        &self.configuration
    }

    /// Consume the form, returning its configuration.
    pub fn into_configuration(self) -> BranchWritePermissions {
        self.configuration
    }

    /// Replace the configuration, e.g. after the host reloaded it.
    ///
    /// Does not notify the change listener.
    pub fn reset(&mut self, configuration: BranchWritePermissions) {
        self.configuration = configuration;
        self.draft = RuleDraft::default();
    }

    /// Check if the form is read only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The rule table and the add form are only shown while enabled.
    pub fn shows_rules(&self) -> bool {
        self.configuration.enabled
    }

    /// Check if every rule in the table can be saved.
    ///
    /// Rules loaded from storage may have blank fields; they stay savable.
    pub fn is_valid(&self) -> bool {
        self.configuration.permissions.iter().all(Rule::is_valid)
    }

    /// The add form's state.
    pub fn draft(&self) -> &RuleDraft {
        &self.draft
    }

    /// Edit the add form's state.
    pub fn draft_mut(&mut self) -> &mut RuleDraft {
        &mut self.draft
    }

    /// The autocomplete endpoint matching the draft's scope.
    pub fn autocomplete_link(&self) -> Option<&str> {
        if self.draft.is_group {
            self.links.groups.as_deref()
        } else {
            self.links.users.as_deref()
        }
    }

    /// Check if the add button is enabled.
    pub fn can_add(&self) -> bool {
        !self.read_only && self.draft.is_complete()
    }

    /// Toggle protection.
    pub fn set_enabled(&mut self, enabled: bool) -> FormResult<()> {
        self.ensure_writable()?;
        self.configuration.enabled = enabled;
        self.notify();
        Ok(())
    }

    /// Append the drafted rule and reset the draft.
    pub fn submit_draft(&mut self) -> FormResult<()> {
        self.ensure_writable()?;
        let rule = self.draft.to_rule();
        self.add_rule(rule)?;
        self.draft = RuleDraft::default();
        Ok(())
    }

    /// Append a rule.
    ///
    /// Entered rules must not have blank fields, on top of what
    /// [`Rule::validate`] requires.
    pub fn add_rule(&mut self, rule: Rule) -> FormResult<()> {
        self.ensure_writable()?;
        check_entered(&rule)?;

        debug!(rule = %rule, "adding branchwp rule");
        self.configuration.permissions.push(rule);
        self.notify();
        Ok(())
    }

    /// Replace the rule at `index`.
    pub fn change_rule(&mut self, index: usize, rule: Rule) -> FormResult<()> {
        self.ensure_writable()?;
        check_entered(&rule)?;

        self.configuration
            .permissions
            .replace(index, rule)
            .ok_or(FormError::NoSuchRule(index))?;
        self.notify();
        Ok(())
    }

    /// Delete the rule at `index`.
    pub fn delete_rule(&mut self, index: usize) -> FormResult<Rule> {
        self.ensure_writable()?;
        let removed = self
            .configuration
            .permissions
            .remove(index)
            .ok_or(FormError::NoSuchRule(index))?;

        debug!(rule = %removed, "deleted branchwp rule");
        self.notify();
        Ok(removed)
    }

    /// Delete the first rule equal to `rule`.
    ///
    /// # Returns
    ///
    /// `true` if a rule was deleted
    pub fn delete_matching(&mut self, rule: &Rule) -> FormResult<bool> {
        self.ensure_writable()?;
        let removed = self.configuration.permissions.remove_rule(rule);
        if removed {
            self.notify();
        }
        Ok(removed)
    }

    fn ensure_writable(&self) -> FormResult<()> {
        if self.read_only {
            Err(FormError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn notify(&self) {
        if let Some(listener) = &self.on_change {
            listener(&self.configuration, self.is_valid());
        }
    }
}

fn check_entered(rule: &Rule) -> FormResult<()> {
    if rule.branch.trim().is_empty() {
        return Err(FormError::BlankField(RuleField::Branch));
    }
    if rule.principal.trim().is_empty() {
        return Err(FormError::BlankField(RuleField::Principal));
    }
    rule.validate()?;
    Ok(())
}
