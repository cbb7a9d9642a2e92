// Copyright 2025 Cowboy AI, LLC.

//! HTTP transport to the remote policy service

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{PolicyApi, PolicyRequest, Verb};
use crate::config::ServiceConfig;
use crate::errors::{ClassificationError, ClassificationResult, RemoteFailure};

/// Error body returned with a non-success status
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    correlation_code: Option<String>,
}

/// [`PolicyApi`] over HTTP
///
/// Retrieves are sent as `GET` with the envelope flattened into query
/// parameters. Every other verb `POST`s the envelope as JSON.
#[derive(Debug, Clone)]
pub struct HttpPolicyApi {
    client: Client,
    base_url: String,
}

impl HttpPolicyApi {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, config: &ServiceConfig) -> ClassificationResult<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for the configured service
    pub fn from_config(config: &ServiceConfig) -> ClassificationResult<Self> {
        Self::new(&config.policy_api_url, config)
    }

    async fn get(&self, path: &str, request: &PolicyRequest) -> ClassificationResult<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let query = query_parameters(request)?;
        let response = self.client.get(&url).query(&query).send().await?;
        self.handle_response(response).await
    }

    async fn post(&self, path: &str, request: &PolicyRequest) -> ClassificationResult<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.post(&url).json(request).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> ClassificationResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
            message: Some(text.clone()),
            ..ErrorBody::default()
        });
        warn!(
            status = status.as_u16(),
            reason = body.reason.as_deref().unwrap_or(""),
            correlation_code = body.correlation_code.as_deref().unwrap_or(""),
            "Policy API returned an error"
        );
        Err(ClassificationError::Remote(RemoteFailure {
            status: status.as_u16(),
            reason: body.reason,
            message: body.message,
            correlation_code: body.correlation_code,
        }))
    }
}

#[async_trait]
impl PolicyApi for HttpPolicyApi {
    async fn call(&self, verb: Verb, request: PolicyRequest) -> ClassificationResult<Value> {
        let path = request.endpoint(verb).path();
        debug!(
            project_id = %request.project_id,
            endpoint = %path,
            kind = %request.kind,
            "Calling Policy API"
        );
        match verb {
            Verb::Retrieve => self.get(&path, &request).await,
            _ => self.post(&path, &request).await,
        }
    }
}

/// Flatten the envelope into query parameters
///
/// Strings and numbers are sent as is, objects and id lists JSON encoded.
fn query_parameters(request: &PolicyRequest) -> ClassificationResult<Vec<(String, String)>> {
    let Value::Object(fields) = serde_json::to_value(request)? else {
        return Err(ClassificationError::Serialization(
            "Policy API request did not serialize to an object".to_string(),
        ));
    };
    let mut query = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let rendered = match value {
            Value::Null => continue,
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => serde_json::to_string(&other)?,
        };
        query.push((key, rendered));
    }
    Ok(query)
}
