//! Destination name derivation for conversion jobs.
//!
//! A source unit's archive name is either the source name with the default
//! `.cbz` suffix appended, or the result of applying a user-supplied
//! pattern/replacement rule. Rule application is pure and deterministic:
//! the same `(source_name, rule)` input always produces the same output.

use regex::Regex;

use crate::error::{Error, Result};

/// Suffix appended to a source name when no rename rule is given.
pub const DEFAULT_ARCHIVE_SUFFIX: &str = ".cbz";

/// An optional pattern/replacement pair used to compute destination names.
///
/// The replacement template may reference captured groups with `$1`, `${1}`
/// or `$name`. Note the usual `regex` crate caveat: `$1_v2` reads as the
/// (nonexistent) group `1_v2`, so write `${1}_v2` when a literal follows a
/// group reference. References to groups the pattern does not define are
/// rejected at construction time.
#[derive(Debug, Clone)]
pub struct NamingRule {
    pattern: Regex,
    replacement: String,
    match_only: bool,
}

impl NamingRule {
    /// Compiles `pattern` and validates `replacement` against its capture
    /// groups.
    ///
    /// # Errors
    ///
    /// * `Error::Regex` if the pattern fails to compile.
    /// * `Error::MalformedRule` if the replacement references an unknown group.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        validate_template(&pattern, replacement)?;

        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
            match_only: false,
        })
    }

    /// Enables or disables match-only mode.
    ///
    /// In match-only mode, source names that do not match the pattern are
    /// excluded from planning entirely instead of falling through unchanged.
    pub fn match_only(mut self, enabled: bool) -> Self {
        self.match_only = enabled;
        self
    }

    /// Returns true if `source_name` matches the rule's pattern.
    pub fn is_match(&self, source_name: &str) -> bool {
        self.pattern.is_match(source_name)
    }

    /// Applies the rule to `source_name`, substituting all non-overlapping
    /// matches left to right.
    ///
    /// Returns `None` only in match-only mode for a non-matching name. A
    /// non-matching name outside match-only mode passes through unchanged,
    /// mirroring regex substitution semantics.
    pub fn apply(&self, source_name: &str) -> Option<String> {
        if self.match_only && !self.is_match(source_name) {
            return None;
        }
        Some(
            self.pattern
                .replace_all(source_name, self.replacement.as_str())
                .into_owned(),
        )
    }
}

/// Computes the destination name for a source unit.
///
/// With no rule, this is `source_name` plus [`DEFAULT_ARCHIVE_SUFFIX`]. With a
/// rule, the rule is applied; `None` means the name was excluded by match-only
/// mode and no job should be planned for it.
pub fn derive_destination_name(source_name: &str, rule: Option<&NamingRule>) -> Option<String> {
    match rule {
        None => Some(format!("{}{}", source_name, DEFAULT_ARCHIVE_SUFFIX)),
        Some(rule) => rule.apply(source_name),
    }
}

/// Checks every `$` group reference in `template` against the groups `pattern`
/// actually defines. Follows the `regex` crate's expansion syntax: `$$` is a
/// literal dollar, `${name}` is braced, and a bare `$name` consumes the
/// longest possible run of `[0-9A-Za-z_]`.
fn validate_template(pattern: &Regex, template: &str) -> Result<()> {
    let group_count = pattern.captures_len(); // includes implicit group 0
    let group_names: Vec<&str> = pattern.capture_names().flatten().collect();

    let mut rest = template;
    while let Some(dollar) = rest.find('$') {
        rest = &rest[dollar + 1..];

        if let Some(stripped) = rest.strip_prefix('$') {
            // "$$" escapes a literal dollar sign
            rest = stripped;
            continue;
        }

        let (name, remainder) = if let Some(braced) = rest.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| {
                Error::MalformedRule(format!("unterminated group reference in '{}'", template))
            })?;
            (&braced[..end], &braced[end + 1..])
        } else {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            (&rest[..end], &rest[end..])
        };
        rest = remainder;

        if name.is_empty() {
            // A lone '$' expands to itself
            continue;
        }

        let known = match name.parse::<usize>() {
            Ok(index) => index < group_count,
            Err(_) => group_names.contains(&name),
        };
        if !known {
            return Err(Error::MalformedRule(format!(
                "replacement '{}' references group '{}' which pattern '{}' does not define",
                template,
                name,
                pattern.as_str()
            )));
        }
    }

    Ok(())
}
