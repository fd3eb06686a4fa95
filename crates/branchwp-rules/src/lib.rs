//! # Branch Write Protection Rules
//!
//! This crate provides the rule model for branch write protection,
//! shared by the permission service and the settings plugin.
//!
//! ## Overview
//!
//! The branchwp-rules crate handles:
//! - **Rules**: user-or-group, branch glob, allow/deny
//! - **Rule Sets**: ordered rule lists as edited and stored per repository
//! - **Validation**: what a rule may contain to be stored
//! - **Legacy Codec**: the flat `[!]branch,[@]principal;` property string
//!
//! ## Architecture
//!
//! ```text
//! Rule = branch glob + principal + is_group + is_deny
//!
//! Legacy encoding:
//!   "master,dent;"            - allow user dent on master
//!   "!release/*,@interns;"    - deny group interns on release/*
//!   "{username}/*,@devs;"     - allow group devs on their own branches
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use branchwp_rules::{legacy, Rule, RuleSet};
//!
//! let mut rules = RuleSet::new();
//! rules.push(Rule::allow_user("master", "dent"));
//! rules.push(Rule::deny_group("release/*", "interns"));
//!
//! let stored = legacy::encode(&rules).unwrap();
//! assert_eq!(stored, "master,dent;!release/*,@interns;");
//! assert_eq!(legacy::decode(&stored), rules);
//! ```

pub mod error;
pub mod legacy;
pub mod rule;
pub mod rule_set;

// Re-export main types for convenience
pub use error::{CodecError, CodecResult, InvalidRuleError, RuleField};
pub use legacy::DecodeReport;
pub use rule::{Rule, RuleType};
pub use rule_set::RuleSet;
