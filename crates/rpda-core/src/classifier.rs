//! Stable ordering of a group's copies by naming role.

use serde::{Deserialize, Serialize};

use crate::matcher::Identifiers;
use crate::model::Copy;

/// Naming class a copy falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyClass {
    /// Matches the production rule.
    Production,
    /// Matches neither the production nor the test rule.
    Replica,
    /// Matches the test rule (and not the production rule).
    Test,
}

impl CopyClass {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Replica => "replica",
            Self::Test => "test",
        }
    }
}

/// Orders copies as production first, test last, everything else in between.
#[derive(Debug, Clone, Copy)]
pub struct CopyClassifier<'a> {
    identifiers: &'a Identifiers,
}

impl<'a> CopyClassifier<'a> {
    /// Classifier bound to an identifier set.
    #[must_use]
    pub const fn new(identifiers: &'a Identifiers) -> Self {
        Self { identifiers }
    }

    /// Class of a single copy name. Production wins over test when both match.
    #[must_use]
    pub fn class_of(&self, name: &str) -> CopyClass {
        if self.identifiers.is_production(name) {
            CopyClass::Production
        } else if self.identifiers.is_test(name) {
            CopyClass::Test
        } else {
            CopyClass::Replica
        }
    }

    /// Stable partition into production, replica, test. Order within a bucket is the
    /// input order.
    #[must_use]
    pub fn order(&self, copies: &[Copy]) -> Vec<Copy> {
        let mut ordered = Vec::with_capacity(copies.len());
        for class in [CopyClass::Production, CopyClass::Replica, CopyClass::Test] {
            ordered.extend(
                copies
                    .iter()
                    .filter(|copy| self.class_of(&copy.name) == class)
                    .cloned(),
            );
        }
        ordered
    }
}
