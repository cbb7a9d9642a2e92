// Copyright 2025 Cowboy AI, LLC.

//! # Classification Service
//!
//! Composite classification entities over a remote policy-management service.
//!
//! The public domain model is not stored anywhere as such. Each entity is
//! synthesized from resources owned by the remote service, which only offers
//! single-resource operations:
//! - **Classification**: one Policy linked to one Condition tree
//! - **Classification Rule**: a collection sequence ordered on a Workflow, with a root Condition
//! - **Rule Classification**: a collection applying one Classification within a rule
//! - **Rule Condition**: a Condition below the rule's root Condition
//! - **Term List** / **Term**: a Lexicon and its expressions
//! - **Workflow**: a sequence workflow
//!
//! ## Building blocks
//!
//! 1. **Transcoding**: condition trees move between the public and the remote schema
//! 2. **Linkage**: cross-references live in name and notes fields of the resources
//! 3. **Sagas**: multi-resource mutations compensate applied steps on failure
//! 4. **Paging**: collections the remote service cannot page are paged locally
//! 5. **Caching**: Policies are cached per project
//!
//! ```no_run
//! use classification_service::{ClassificationService, ProjectId, ServiceConfig, WorkflowInput};
//!
//! # async fn run() -> classification_service::ClassificationResult<()> {
//! let service = ClassificationService::from_config(ServiceConfig::from_env())?;
//! let project = ProjectId::new("tenant-a");
//! let workflow = service
//!     .create_workflow(&project, WorkflowInput {
//!         name: "Inbound mail".to_string(),
//!         description: None,
//!         notes: None,
//!     })
//!     .await?;
//! println!("created workflow {}", workflow.id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod identifiers;
pub mod linkage;
pub mod paging;
pub mod policy_api;
pub mod saga;
pub mod services;
pub mod transcoder;

// Re-export core types
pub use cache::{PolicyCache, ResultCache};
pub use config::ServiceConfig;
pub use domain::{
    Classification, ClassificationInput, ClassificationRule, ClassificationRuleInput,
    ClassificationTarget, Condition, ConditionAdditional, ConditionBody, RuleClassification,
    RuleClassificationInput, RuleCondition, RuleConditionInput, Term, TermList, TermListInput,
    TermType, Workflow, WorkflowInput,
};
pub use errors::{ClassificationError, ClassificationResult, CompensationFailure, ErrorKind, RemoteFailure};
pub use identifiers::{
    ClassificationId, ClassificationRuleId, ProjectId, RuleClassificationId, RuleConditionId,
    TermId, TermListId, WorkflowId,
};
pub use paging::{Page, PageRequest};
pub use policy_api::{HttpPolicyApi, InMemoryPolicyApi, PolicyApi, PolicyClient};
pub use saga::{Compensation, Saga};
pub use services::ClassificationService;
pub use transcoder::ConditionTranscoder;
