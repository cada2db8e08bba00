// File: src/state.rs
// Purpose: In-memory form component state: interaction and submission lifecycle

use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, SubmitPolicy};
use crate::error::FormError;
use crate::form::{FieldErrors, FormValues, InputEvent};
use crate::schema::{is_form_valid, validate_field};
use crate::submission::{RegistrationClient, SubmissionOutcome, SubmissionStatus};

/// State of one mounted registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: FormValues,
    errors: FieldErrors,
    status: SubmissionStatus,
    submitting: bool,
    submit_enabled: bool,
}

impl FormState {
    /// Fresh state: default values, no errors, submit disabled
    pub fn mount() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Handle a change on one input
    ///
    /// The changed field is validated on its own and its error stored, then the
    /// value is stored and whole-form validity recomputed from the new values.
    pub fn on_change(&mut self, event: InputEvent) {
        let value = event.normalize();
        let result = validate_field(event.field, &value);
        debug!(field = %event.field, error = ?result.as_ref().err(), "field changed");

        self.errors.record(event.field, result);
        self.values.set(event.field, value);
        self.refresh();
    }

    /// Start a submission: disable the control and hand out the values to send
    pub fn begin_submit(&mut self) -> Result<FormValues, FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }
        if !self.submit_enabled {
            return Err(FormError::SubmitDisabled);
        }

        self.submitting = true;
        self.submit_enabled = false;
        Ok(self.values.clone())
    }

    /// Apply the outcome of the in-flight submission
    pub fn finish_submit(&mut self, outcome: SubmissionOutcome, policy: &SubmitPolicy) {
        if !self.submitting {
            warn!("submission outcome arrived with nothing in flight");
        }

        match outcome {
            SubmissionOutcome::Accepted(message) => {
                info!(%message, "submission succeeded");
                self.status = SubmissionStatus::Success(message);
                self.reset_fields();
            }
            SubmissionOutcome::Rejected(message) => {
                info!(%message, "submission failed");
                self.status = SubmissionStatus::Failure(message);
                if policy.on_failure == FailurePolicy::Reset {
                    self.reset_fields();
                }
            }
        }

        self.submitting = false;
        self.refresh();
    }

    /// Send the current values and apply the result
    pub async fn submit(
        &mut self,
        client: &dyn RegistrationClient,
        policy: &SubmitPolicy,
    ) -> Result<(), FormError> {
        let values = self.begin_submit()?;
        let result = client.register(&values).await;
        self.finish_submit(
            SubmissionOutcome::from_result(result, policy.message_source),
            policy,
        );
        Ok(())
    }

    fn reset_fields(&mut self) {
        self.values = FormValues::default();
        self.errors = FieldErrors::default();
    }

    fn refresh(&mut self) {
        self.submit_enabled = !self.submitting && is_form_valid(&self.values);
    }
}
