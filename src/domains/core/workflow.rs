use crate::errors::ServiceError;
use log::{info, warn};

/// Progress of a multi-step operation whose steps commit independently.
/// A failed step does not undo the steps before it.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    workflow: &'static str,
    completed: Vec<String>,
}

impl WorkflowReport {
    pub fn start(workflow: &'static str) -> Self {
        Self {
            workflow,
            completed: Vec::new(),
        }
    }

    pub fn workflow(&self) -> &'static str {
        self.workflow
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Records the outcome of one step.
    ///
    /// A failure before anything committed is returned as-is. A failure after
    /// some steps committed becomes `ServiceError::PartialFailure` naming them;
    /// those steps are left in place.
    pub fn step<T, E: Into<ServiceError>>(
        &mut self,
        name: &str,
        outcome: Result<T, E>,
    ) -> Result<T, ServiceError> {
        match outcome {
            Ok(value) => {
                self.completed.push(name.to_string());
                Ok(value)
            }
            Err(e) => Err(self.fail(name, e.into())),
        }
    }

    pub fn fail(&self, step: &str, error: ServiceError) -> ServiceError {
        if self.completed.is_empty() {
            warn!("Workflow '{}' failed at first step '{}': {}", self.workflow, step, error);
            return error;
        }
        warn!(
            "Workflow '{}' failed at '{}', not rolling back {:?}: {}",
            self.workflow, step, self.completed, error
        );
        ServiceError::PartialFailure {
            workflow: self.workflow.to_string(),
            completed: self.completed.clone(),
            failed_step: step.to_string(),
            reason: error.to_string(),
        }
    }

    pub fn finish(self) {
        info!("Workflow '{}' completed: {:?}", self.workflow, self.completed);
    }
}
