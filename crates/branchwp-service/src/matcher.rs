//! Branch pattern matching.
//!
//! A rule's branch pattern is a glob that may contain the `{username}` and
//! `{mail}` placeholders. Placeholders are substituted with the writing
//! user's values before the glob is compiled, so
//! `{username}/*` protects every user's own branch namespace.
//!
//! `*` matches across `/`: `feature/*` covers `feature/a/b`.

use globset::GlobBuilder;
use tracing::warn;

use crate::user::User;

/// Placeholder replaced with the user's login name.
pub const VAR_USERNAME: &str = "{username}";

/// Placeholder replaced with the user's mail address (empty if unknown).
pub const VAR_MAIL: &str = "{mail}";

/// Substitute the user placeholders of a branch pattern.
pub fn expand_placeholders(pattern: &str, user: &User) -> String {
    pattern
        .replace(VAR_USERNAME, &user.name)
        .replace(VAR_MAIL, user.mail.as_deref().unwrap_or(""))
}

/// Check if `branch` matches `pattern` for `user`.
///
/// Patterns that do not compile never match.
pub fn matches_branch(pattern: &str, branch: &str, user: &User) -> bool {
    let expanded = expand_placeholders(pattern, user);

    match GlobBuilder::new(&expanded).literal_separator(false).build() {
        Ok(glob) => glob.compile_matcher().is_match(branch),
        Err(e) => {
            warn!(pattern = %expanded, error = %e, "invalid branch pattern never matches");
            false
        }
    }
}
