//! Copy name matchers and the identifier rule set.
//!
//! Naming conventions decide which copy is production, DR, or test. A rule is either a
//! plain substring or a regular expression; both sit behind [`NameMatcher`] so the
//! classifier and resolver never branch on the strategy.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use regex::Regex;

/// Capability to decide whether a copy name satisfies a naming rule.
pub trait NameMatcher: Send + Sync {
    /// Whether `name` satisfies the rule.
    fn matches(&self, name: &str) -> bool;

    /// Rule text as configured.
    fn pattern(&self) -> &str;
}

/// Matches names containing a fixed substring.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    needle: String,
}

impl SubstringMatcher {
    /// Create a matcher for `needle`.
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl NameMatcher for SubstringMatcher {
    fn matches(&self, name: &str) -> bool {
        name.contains(&self.needle)
    }

    fn pattern(&self) -> &str {
        &self.needle
    }
}

/// Matches names against a compiled regular expression.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex error when the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl NameMatcher for PatternMatcher {
    fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// A single configured identifier rule.
#[derive(Clone)]
pub struct IdentifierRule {
    matcher: Arc<dyn NameMatcher>,
}

impl IdentifierRule {
    /// Wrap an arbitrary matcher.
    pub fn new(matcher: impl NameMatcher + 'static) -> Self {
        Self {
            matcher: Arc::new(matcher),
        }
    }

    /// Substring rule.
    #[must_use]
    pub fn substring(needle: impl Into<String>) -> Self {
        Self::new(SubstringMatcher::new(needle))
    }

    /// Regular expression rule.
    ///
    /// # Errors
    ///
    /// Returns the regex error when the pattern does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(PatternMatcher::new(pattern)?))
    }

    /// Whether `name` satisfies the rule.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.matches(name)
    }

    /// Rule text as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.matcher.pattern()
    }
}

impl Debug for IdentifierRule {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("IdentifierRule")
            .field(&self.as_str())
            .finish()
    }
}

/// The three naming rules used to classify copies.
#[derive(Debug, Clone)]
pub struct Identifiers {
    /// Marks the production copy.
    pub production: IdentifierRule,
    /// Marks disaster recovery copies.
    pub dr: IdentifierRule,
    /// Marks test copies.
    pub test: IdentifierRule,
}

impl Identifiers {
    /// Build an identifier set from three rules.
    #[must_use]
    pub const fn new(production: IdentifierRule, dr: IdentifierRule, test: IdentifierRule) -> Self {
        Self {
            production,
            dr,
            test,
        }
    }

    /// Whether `name` is the production copy.
    #[must_use]
    pub fn is_production(&self, name: &str) -> bool {
        self.production.matches(name)
    }

    /// Whether `name` is a test copy.
    #[must_use]
    pub fn is_test(&self, name: &str) -> bool {
        self.test.matches(name)
    }
}
