// Copyright 2025 Cowboy AI, LLC.

//! Term Lists and Terms

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{TermId, TermListId};
use crate::policy_api::resources::{LexiconExpressionResource, LexiconResource};

/// A named list of Terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TermList {
    /// Id, the id of the backing lexicon
    pub id: TermListId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&LexiconResource> for TermList {
    fn from(lexicon: &LexiconResource) -> Self {
        Self {
            id: lexicon.id,
            name: lexicon.name.clone(),
            description: lexicon.description.clone(),
        }
    }
}

/// Caller payload creating or updating a Term List
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TermListInput {
    /// Name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// How a Term is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TermType {
    /// Literal text
    Text,
    /// Regular expression
    Regex,
}

impl TermType {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            TermType::Text => "text",
            TermType::Regex => "regex",
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expression on a Term List
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Term {
    /// Id, absent on Terms about to be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TermId>,
    /// Expression text
    pub expression: String,
    /// How the expression is matched
    #[serde(rename = "type")]
    pub kind: TermType,
}

impl Term {
    /// A Term not yet stored
    pub fn new(expression: impl Into<String>, kind: TermType) -> Self {
        Self {
            id: None,
            expression: expression.into(),
            kind,
        }
    }

    /// Assemble from a lexicon expression
    pub fn from_expression(expression: &LexiconExpressionResource) -> ClassificationResult<Self> {
        let kind = match expression.additional.kind.as_str() {
            "text" => TermType::Text,
            "regex" => TermType::Regex,
            other => {
                return Err(ClassificationError::server(format!(
                    "Unrecognised Term type '{other}' on Lexicon Expression"
                )))
            }
        };
        Ok(Self {
            id: expression.id,
            expression: expression.additional.expression.clone(),
            kind,
        })
    }

    /// Lexicon expression storing this Term on `term_list_id`
    pub fn to_expression(&self, term_list_id: TermListId) -> LexiconExpressionResource {
        LexiconExpressionResource::new(self.id, term_list_id, self.expression.clone(), self.kind.as_str())
    }
}
