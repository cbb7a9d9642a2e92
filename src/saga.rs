// Copyright 2025 Cowboy AI, LLC.

//! Step executor for multi-resource mutations
//!
//! The remote policy service has no transactions, so a composite mutation is
//! run as a saga: an ordered list of forward steps, each of which may register
//! a compensating action once it has succeeded. When a later step fails the
//! registered compensations run in reverse order. Compensation is best effort:
//! a failed compensation is logged and attached to the surfaced error, it never
//! replaces the error that aborted the saga.

use std::future::Future;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::{ClassificationError, ClassificationResult, CompensationFailure};

/// Action undoing a completed step
pub struct Compensation {
    description: String,
    action: BoxFuture<'static, ClassificationResult<()>>,
}

impl Compensation {
    /// Wrap a compensating remote call
    pub fn new<F>(description: impl Into<String>, action: F) -> Self
    where
        F: Future<Output = ClassificationResult<()>> + Send + 'static,
    {
        Self {
            description: description.into(),
            action: action.boxed(),
        }
    }

    /// What the compensation undoes
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for Compensation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compensation")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A running saga
#[derive(Debug)]
pub struct Saga {
    id: Uuid,
    name: &'static str,
    started_at: DateTime<Utc>,
    completed_steps: Vec<&'static str>,
    compensations: Vec<(&'static str, Compensation)>,
}

impl Saga {
    /// Start a saga
    pub fn new(name: &'static str) -> Self {
        let saga = Self {
            id: Uuid::new_v4(),
            name,
            started_at: Utc::now(),
            completed_steps: Vec::new(),
            compensations: Vec::new(),
        };
        debug!(saga = name, run_id = %saga.id, "Saga started");
        saga
    }

    /// Run id of this saga
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Steps that completed, in order
    pub fn completed_steps(&self) -> &[&'static str] {
        &self.completed_steps
    }

    /// Number of compensations waiting to run if the saga aborts
    pub fn pending_compensations(&self) -> usize {
        self.compensations.len()
    }

    /// Run a forward step
    ///
    /// On success `compensate` is given the step's output and may return the
    /// action undoing it. On failure every registered compensation runs, most
    /// recent first, and the step's error is returned.
    pub async fn step<T, Fut, C>(
        &mut self,
        step: &'static str,
        forward: Fut,
        compensate: C,
    ) -> ClassificationResult<T>
    where
        Fut: Future<Output = ClassificationResult<T>>,
        C: FnOnce(&T) -> Option<Compensation>,
    {
        debug!(saga = self.name, run_id = %self.id, step, "Executing saga step");
        match forward.await {
            Ok(output) => {
                if let Some(compensation) = compensate(&output) {
                    self.compensations.push((step, compensation));
                }
                self.completed_steps.push(step);
                Ok(output)
            }
            Err(err) => {
                error!(saga = self.name, run_id = %self.id, step, error = %err, "Saga step failed");
                Err(self.abort(err).await)
            }
        }
    }

    /// Run a forward step that needs no compensation
    pub async fn run<T, Fut>(&mut self, step: &'static str, forward: Fut) -> ClassificationResult<T>
    where
        Fut: Future<Output = ClassificationResult<T>>,
    {
        self.step(step, forward, |_| None).await
    }

    /// Roll back every completed step and return the error to surface
    ///
    /// Without compensation failures this is `primary` itself, otherwise
    /// [`ClassificationError::Compensated`] wrapping it.
    pub async fn abort(&mut self, primary: ClassificationError) -> ClassificationError {
        let mut failures = Vec::new();
        while let Some((step, compensation)) = self.compensations.pop() {
            let Compensation {
                description,
                action,
            } = compensation;
            debug!(saga = self.name, run_id = %self.id, step, compensation = %description, "Compensating");
            if let Err(err) = action.await {
                error!(
                    saga = self.name,
                    run_id = %self.id,
                    step,
                    compensation = %description,
                    error = %err,
                    "Compensation failed"
                );
                failures.push(CompensationFailure {
                    step: step.to_string(),
                    error: err.to_string(),
                });
            }
        }

        if failures.is_empty() {
            info!(saga = self.name, run_id = %self.id, "Saga rolled back");
            return primary;
        }
        warn!(
            saga = self.name,
            run_id = %self.id,
            failed_compensations = failures.len(),
            "Saga rolled back partially, remote resources may be left behind"
        );
        ClassificationError::Compensated {
            primary: Box::new(primary),
            compensation_failures: failures,
        }
    }

    /// Finish the saga, discarding its compensations
    pub fn complete(self) {
        let elapsed = Utc::now() - self.started_at;
        info!(
            saga = self.name,
            run_id = %self.id,
            steps = self.completed_steps.len(),
            elapsed_ms = elapsed.num_milliseconds(),
            "Saga completed"
        );
    }
}
