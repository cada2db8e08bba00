// File: src/schema.rs
// Purpose: Registration rules per field and whole-form validity

use once_cell::sync::Lazy;
use registration_validation::FieldRules;
use tracing::debug;

use crate::form::{Field, FieldErrors, FieldValue, FormValues};

pub const USERNAME_REQUIRED: &str = "username is required";
pub const USERNAME_MIN: &str = "username must be at least 3 characters";
pub const USERNAME_MAX: &str = "username cannot exceed 20 characters";
pub const FAV_LANGUAGE_REQUIRED: &str = "favLanguage is required";
pub const FAV_LANGUAGE_OPTIONS: &str = "favLanguage must be either javascript or rust";
pub const FAV_FOOD_REQUIRED: &str = "favFood is required";
pub const FAV_FOOD_OPTIONS: &str = "favFood must be either broccoli, spaghetti or pizza";
pub const AGREEMENT_REQUIRED: &str = "agreement is required";
pub const AGREEMENT_OPTIONS: &str = "agreement must be accepted";

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 20;

const LANGUAGE_VALUES: &[&str] = &["javascript", "rust"];
const FOOD_VALUES: &[&str] = &["pizza", "spaghetti", "broccoli"];

struct RegistrationSchema {
    username: FieldRules<str>,
    fav_language: FieldRules<str>,
    fav_food: FieldRules<str>,
    agreement: FieldRules<Option<bool>>,
}

static SCHEMA: Lazy<RegistrationSchema> = Lazy::new(|| RegistrationSchema {
    username: FieldRules::<str>::new()
        .trimmed()
        .required(USERNAME_REQUIRED)
        .min_chars(USERNAME_MIN_CHARS, USERNAME_MIN)
        .max_chars(USERNAME_MAX_CHARS, USERNAME_MAX),
    fav_language: FieldRules::<str>::new()
        .required(FAV_LANGUAGE_REQUIRED)
        .one_of(LANGUAGE_VALUES, FAV_LANGUAGE_OPTIONS),
    fav_food: FieldRules::<str>::new()
        .required(FAV_FOOD_REQUIRED)
        .one_of(FOOD_VALUES, FAV_FOOD_OPTIONS),
    agreement: FieldRules::<Option<bool>>::new()
        .required(AGREEMENT_REQUIRED)
        .is_true(AGREEMENT_OPTIONS),
});

/// Validate one field's payload against its rules
///
/// Returns the message of the first failing rule. Pure: the same input always
/// yields the same result.
pub fn validate_field(field: Field, value: &FieldValue) -> Result<(), String> {
    let schema = &*SCHEMA;
    let result = match field {
        Field::Agreement => schema.agreement.validate(value.as_flag()),
        _ => {
            let text = match value {
                FieldValue::Text(text) => text.clone(),
                FieldValue::Flag(flag) => flag.to_string(),
            };
            let rules = match field {
                Field::Username => &schema.username,
                Field::FavLanguage => &schema.fav_language,
                _ => &schema.fav_food,
            };
            rules.validate(&text)
        }
    };

    debug!(field = %field, valid = result.is_ok(), "validated field");
    result
}

/// Validate the current value of `field` within `values`
pub fn validate_value(field: Field, values: &FormValues) -> Result<(), String> {
    validate_field(field, &values.get(field))
}

/// Whole-form validity: every field passes at once
pub fn is_form_valid(values: &FormValues) -> bool {
    Field::ALL
        .iter()
        .all(|field| validate_value(*field, values).is_ok())
}

/// Errors for every field at once
pub fn validate_all(values: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in Field::ALL {
        errors.record(field, validate_value(field, values));
    }
    errors
}
