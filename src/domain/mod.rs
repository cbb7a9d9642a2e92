// Copyright 2025 Cowboy AI, LLC.

//! Public domain model
//!
//! None of these entities is stored as such. Each is assembled from one or
//! more remote resources by the services in [`crate::services`].

pub mod classification;
pub mod condition;
pub mod rule;
pub mod term;
pub mod workflow;

pub use classification::{Classification, ClassificationInput};
pub use condition::{
    ClassificationTarget, Comparison, Condition, ConditionAdditional, ConditionBody, Passthrough,
};
pub use rule::{
    ClassificationRule, ClassificationRuleInput, RuleClassification, RuleClassificationInput,
    RuleCondition, RuleConditionInput,
};
pub use term::{Term, TermList, TermListInput, TermType};
pub use workflow::{Workflow, WorkflowInput};
