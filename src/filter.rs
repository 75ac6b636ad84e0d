//! Exclusion rules: pattern guards consulted before descending into a
//! module-typed member.
//!
//! Rules are regular expressions, supplied from configuration or the command
//! line. The set is append-only: rules may be added until the scan starts,
//! never removed. An empty set excludes nothing. A matched name is suppressed
//! entirely: nothing is created for it and nothing below it is visited.

use regex::Regex;

use crate::error::{OrbwebError, Result};

/// An append-only set of compiled exclusion rules.
#[derive(Debug, Default)]
pub struct ExclusionFilter {
    rules: Vec<Regex>,
}

impl ExclusionFilter {
    /// An empty filter, matching nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a filter from a list of patterns.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new();
        for pattern in patterns {
            filter.add_rule(pattern.as_ref())?;
        }
        Ok(filter)
    }

    /// Compile and append one rule. A bad pattern is a configuration error,
    /// raised here rather than mid-traversal.
    pub fn add_rule(&mut self, pattern: &str) -> Result<()> {
        let rule = Regex::new(pattern).map_err(|source| OrbwebError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.push(rule);
        Ok(())
    }

    /// True if any rule matches `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(name))
    }

    /// Number of installed rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = ExclusionFilter::new();
        assert!(!filter.matches("anything"));
        assert!(!filter.matches(""));
    }

    #[test]
    fn anchored_pattern_matches_prefix_only() {
        let filter = ExclusionFilter::from_patterns(["^secret"]).unwrap();
        assert!(filter.matches("secret_mod"));
        assert!(filter.matches("secret"));
        assert!(!filter.matches("not_secret"));
    }

    #[test]
    fn unanchored_pattern_matches_anywhere() {
        let filter = ExclusionFilter::from_patterns(["_test$", "internal"]).unwrap();
        assert!(filter.matches("pkg.helpers_test"));
        assert!(filter.matches("pkg.internal.util"));
        assert!(!filter.matches("pkg.api"));
    }

    #[test]
    fn rules_are_append_only() {
        let mut filter = ExclusionFilter::new();
        filter.add_rule("^a").unwrap();
        assert_eq!(filter.len(), 1);
        filter.add_rule("^b").unwrap();
        assert_eq!(filter.len(), 2);
        assert!(filter.matches("a1"));
        assert!(filter.matches("b1"));
    }

    #[test]
    fn bad_pattern_is_a_setup_error() {
        let mut filter = ExclusionFilter::new();
        let err = filter.add_rule("(unclosed").unwrap_err();
        assert!(err.to_string().contains("invalid exclusion pattern"));
        assert_eq!(filter.len(), 0);
    }
}
