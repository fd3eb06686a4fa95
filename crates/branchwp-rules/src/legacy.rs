//! # Legacy Permission List Codec
//!
//! Before rules were stored as structured records, a repository kept its
//! whole rule list in a single property as a flat delimited string:
//!
//! ```text
//! ruleset   = *record
//! record    = ["!"] branch "," ["@"] principal ";"
//! branch    = 1*(any char except "," and ";")
//! principal = 1*(any char except "," and ";")
//! ```
//!
//! `!` marks a deny rule, `@` marks a group principal. The sigils never
//! leave this module: decoded rules carry them as `is_deny` / `is_group`.
//!
//! ```
//! use branchwp_rules::{legacy, Rule};
//!
//! let rules = legacy::decode("master,dent;!develop,@vogons;");
//! assert_eq!(rules.get(0), Some(&Rule::allow_user("master", "dent")));
//! assert_eq!(rules.get(1), Some(&Rule::deny_group("develop", "vogons")));
//!
//! assert_eq!(legacy::encode(&rules).unwrap(), "master,dent;!develop,@vogons;");
//! ```

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::error::{CodecError, CodecResult};
use crate::rule::Rule;
use crate::rule_set::RuleSet;

/// Property key the legacy rule list is stored under.
pub const PERMISSIONS_PROPERTY: &str = "branchwp.permissions";

/// Terminates every record.
pub const RULE_SEPARATOR: char = ';';

/// Separates the branch slot from the principal slot.
pub const FIELD_SEPARATOR: char = ',';

/// Leading marker of a deny rule's branch slot.
pub const DENY_SIGIL: char = '!';

/// Leading marker of a group principal.
pub const GROUP_SIGIL: char = '@';

/// Result of decoding a legacy string, including what had to be dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Rules of every well-formed record, in input order.
    pub rules: RuleSet,
    /// Number of non-empty fragments that did not form a record.
    pub skipped: usize,
}

fn record_pattern() -> &'static Regex {
    static RECORD_RE: OnceLock<Regex> = OnceLock::new();
    RECORD_RE.get_or_init(|| Regex::new(r"[^,;]+,[^,;]+;").expect("valid regex"))
}

/// Decode a legacy permission string.
///
/// Never fails. Text that does not form a record is dropped; the number of
/// dropped fragments is logged, see [`decode_with_report`] to get it.
pub fn decode(input: &str) -> RuleSet {
    decode_with_report(input).rules
}

/// Decode a legacy permission string and report skipped fragments.
///
/// # Example
///
/// ```
/// use branchwp_rules::legacy;
///
/// let report = legacy::decode_with_report("garbage;main,trillian;");
/// assert_eq!(report.rules.len(), 1);
/// assert_eq!(report.skipped, 1);
/// ```
pub fn decode_with_report(input: &str) -> DecodeReport {
    trace!(input, "decoding legacy permission string");

    let mut rules = RuleSet::new();
    let mut skipped = 0;
    let mut cursor = 0;

    for record in record_pattern().find_iter(input) {
        skipped += count_fragments(&input[cursor..record.start()]);
        cursor = record.end();

        let rule = decode_record(record.as_str());
        debug!(rule = %rule, "decoded legacy permission");
        rules.push(rule);
    }
    skipped += count_fragments(&input[cursor..]);

    if skipped > 0 {
        warn!(
            skipped,
            decoded = rules.len(),
            "dropped malformed fragments from legacy permission string"
        );
    }

    DecodeReport { rules, skipped }
}

/// Decode one matched record, `[!]branch,[@]principal;`.
fn decode_record(record: &str) -> Rule {
    let record = record.strip_suffix(RULE_SEPARATOR).unwrap_or(record);
    let (branch, principal) = record
        .split_once(FIELD_SEPARATOR)
        .unwrap_or((record, ""));

    let (branch, is_deny) = strip_sigil(branch, DENY_SIGIL);
    let (principal, is_group) = strip_sigil(principal, GROUP_SIGIL);

    Rule::new(branch, principal, is_group, is_deny)
}

/// Strip one leading sigil, unless it is the whole field.
fn strip_sigil(field: &str, sigil: char) -> (&str, bool) {
    match field.strip_prefix(sigil) {
        Some(rest) if !rest.is_empty() => (rest, true),
        _ => (field, false),
    }
}

fn count_fragments(gap: &str) -> usize {
    gap.split(RULE_SEPARATOR)
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

/// Encode a rule set into the legacy permission string.
///
/// Every rule is validated first; the legacy format has no escaping, so a
/// rule that would not decode back to itself is refused and nothing is
/// written.
///
/// # Example
///
/// ```
/// use branchwp_rules::{legacy, CodecError, Rule, RuleSet};
///
/// let rules: RuleSet = vec![Rule::allow_user("a", "b"), Rule::deny_group("c", "d")].into();
/// assert_eq!(legacy::encode(&rules).unwrap(), "a,b;!c,@d;");
/// assert_eq!(legacy::encode(&RuleSet::new()).unwrap(), "");
///
/// let broken: RuleSet = vec![Rule::allow_user("a;b", "c")].into();
/// assert!(matches!(legacy::encode(&broken), Err(CodecError::InvalidRule { index: 0, .. })));
/// ```
pub fn encode(rules: &RuleSet) -> CodecResult<String> {
    rules.validate().map_err(|err| {
        warn!(error = %err, "refusing to encode invalid rule");
        err
    })?;

    let mut out = String::new();
    for rule in rules {
        encode_record(&mut out, rule);
    }
    Ok(out)
}

fn encode_record(out: &mut String, rule: &Rule) {
    if rule.is_deny {
        out.push(DENY_SIGIL);
    }
    out.push_str(&rule.branch);
    out.push(FIELD_SEPARATOR);
    if rule.is_group {
        out.push(GROUP_SIGIL);
    }
    out.push_str(&rule.principal);
    out.push(RULE_SEPARATOR);
}
