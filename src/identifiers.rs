// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for remote policy resources
//!
//! Every remote resource family is addressed by a numeric id. Each family gets
//! its own newtype so a Condition id can never be passed where a Policy id is
//! expected. Domain entities reuse the id of the resource that backs them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create from a raw remote id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw remote id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }
    };
}

remote_id!(
    /// Policy id, also the public id of a Classification
    PolicyId
);
remote_id!(
    /// Condition id, also the public id of a Rule Condition
    ConditionId
);
remote_id!(
    /// Collection id, also the public id of a Rule Classification
    CollectionId
);
remote_id!(
    /// Collection sequence id, also the public id of a Classification Rule
    CollectionSequenceId
);
remote_id!(
    /// Sequence workflow id, also the public id of a Workflow
    WorkflowId
);
remote_id!(
    /// Lexicon id, also the public id of a Term List
    LexiconId
);
remote_id!(
    /// Lexicon expression id, also the public id of a Term
    LexiconExpressionId
);

/// Public id of a Classification
pub type ClassificationId = PolicyId;
/// Public id of a Classification Rule
pub type ClassificationRuleId = CollectionSequenceId;
/// Public id of a Rule Classification
pub type RuleClassificationId = CollectionId;
/// Public id of a Rule Condition
pub type RuleConditionId = ConditionId;
/// Public id of a Term List
pub type TermListId = LexiconId;
/// Public id of a Term
pub type TermId = LexiconExpressionId;

/// Tenant scope of every remote call
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a project id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the project id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_id_serializes_as_number() {
        let id = ConditionId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: PolicyId = serde_json::from_str("17").unwrap();
        assert_eq!(parsed.get(), 17);
    }

    #[test]
    fn test_remote_id_display_and_parse() {
        let id: LexiconId = "9".parse().unwrap();
        assert_eq!(id, LexiconId::new(9));
        assert_eq!(id.to_string(), "9");
        assert!("nine".parse::<LexiconId>().is_err());
    }

    #[test]
    fn test_project_id() {
        let project = ProjectId::from("tenant-a");
        assert_eq!(project.as_str(), "tenant-a");
        assert_eq!(serde_json::to_string(&project).unwrap(), "\"tenant-a\"");
    }
}
