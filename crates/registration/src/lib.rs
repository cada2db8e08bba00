// Registration - a single registration form component
// Field model, rule schema, submission lifecycle and Maud views

pub mod config;
pub mod error;
pub mod form;
pub mod schema;
pub mod state;
pub mod submission;
pub mod view;

pub use config::{Config, FailurePolicy, MessageSource, SubmitPolicy};
pub use error::{ClientError, FormError};
pub use form::{Field, FieldErrors, FieldValue, FormValues, InputEvent, InputKind};
pub use schema::{is_form_valid, validate_all, validate_field, validate_value};
pub use state::FormState;
pub use submission::{
    HttpRegistrationClient, RegistrationClient, RegistrationResponse, SubmissionOutcome,
    SubmissionStatus,
};
