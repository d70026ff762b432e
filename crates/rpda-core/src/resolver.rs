//! Selection of the single non-production copy an operation should target.

use crate::error::ResolutionError;
use crate::matcher::{IdentifierRule, Identifiers};
use crate::model::{Copy, RoleToken, SelectionIntent};

/// Resolves a selection intent against a group's copies.
#[derive(Debug, Clone, Copy)]
pub struct CopyResolver<'a> {
    identifiers: &'a Identifiers,
}

impl<'a> CopyResolver<'a> {
    /// Resolver bound to an identifier set.
    #[must_use]
    pub const fn new(identifiers: &'a Identifiers) -> Self {
        Self { identifiers }
    }

    /// Pick the copy named by `intent`, scanning in the given order.
    ///
    /// Production copies are never eligible. A role intent other than `test` skips copies
    /// that also match the test rule, so a loose DR pattern cannot land on a test copy.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] listing every eligible copy name when nothing matches.
    pub fn resolve<'c>(
        &self,
        copies: &'c [Copy],
        intent: &SelectionIntent,
    ) -> Result<&'c Copy, ResolutionError> {
        let mut eligible = copies
            .iter()
            .filter(|copy| !self.identifiers.is_production(&copy.name));

        let found = match intent {
            SelectionIntent::Named(name) => eligible.find(|copy| copy.name == *name),
            SelectionIntent::Role(token) => {
                let rule = self.rule_for(*token);
                let exclude_test = *token != RoleToken::Test;
                eligible.find(|copy| {
                    rule.matches(&copy.name)
                        && !(exclude_test && self.identifiers.is_test(&copy.name))
                })
            }
        };

        found.ok_or_else(|| ResolutionError {
            requested: self.describe(intent),
            available: self.eligible_names(copies),
        })
    }

    /// Names of every copy that is not production, in input order.
    #[must_use]
    pub fn eligible_names(&self, copies: &[Copy]) -> Vec<String> {
        copies
            .iter()
            .filter(|copy| !self.identifiers.is_production(&copy.name))
            .map(|copy| copy.name.clone())
            .collect()
    }

    const fn rule_for(&self, token: RoleToken) -> &IdentifierRule {
        match token {
            RoleToken::Test => &self.identifiers.test,
            RoleToken::Dr => &self.identifiers.dr,
        }
    }

    fn describe(&self, intent: &SelectionIntent) -> String {
        match intent {
            SelectionIntent::Named(_) => intent.to_string(),
            SelectionIntent::Role(token) => {
                format!("{intent} (rule '{}')", self.rule_for(*token).as_str())
            }
        }
    }
}
