// File: src/form.rs
// Purpose: Form fields, values, normalized input payloads and per-field errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// A selectable option: submitted value plus display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

pub const LANGUAGES: &[Choice] = &[
    Choice { value: "javascript", label: "JavaScript" },
    Choice { value: "rust", label: "Rust" },
];

pub const FOODS: &[Choice] = &[
    Choice { value: "pizza", label: "Pizza" },
    Choice { value: "spaghetti", label: "Spaghetti" },
    Choice { value: "broccoli", label: "Broccoli" },
];

/// One named input of the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    FavLanguage,
    FavFood,
    Agreement,
}

impl Field {
    /// All fields in display order
    pub const ALL: [Field; 4] = [
        Field::Username,
        Field::FavLanguage,
        Field::FavFood,
        Field::Agreement,
    ];

    /// Name used in HTML inputs and the JSON body
    pub fn name(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::FavLanguage => "favLanguage",
            Field::FavFood => "favFood",
            Field::Agreement => "agreement",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// How the field's input reports its value
    pub fn input_kind(self) -> InputKind {
        match self {
            Field::Username => InputKind::Text,
            Field::FavLanguage | Field::FavFood => InputKind::Choice,
            Field::Agreement => InputKind::Checkbox,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current values of the form, also the outbound request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub username: String,
    pub fav_language: String,
    pub fav_food: String,
    pub agreement: bool,
}

impl FormValues {
    /// Current value of a field as a normalized payload
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Username => FieldValue::Text(self.username.clone()),
            Field::FavLanguage => FieldValue::Text(self.fav_language.clone()),
            Field::FavFood => FieldValue::Text(self.fav_food.clone()),
            Field::Agreement => FieldValue::Flag(self.agreement),
        }
    }

    /// Store a payload under a field, coercing mismatched payload types
    pub fn set(&mut self, field: Field, value: FieldValue) {
        match field {
            Field::Username => self.username = value.into_text(),
            Field::FavLanguage => self.fav_language = value.into_text(),
            Field::FavFood => self.fav_food = value.into_text(),
            Field::Agreement => self.agreement = value.as_flag() == Some(true),
        }
    }
}

/// A normalized input payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Flag(flag) => flag.to_string(),
        }
    }

    /// Boolean reading of the payload. `None` means the value is missing.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            FieldValue::Text(text) if text.is_empty() => None,
            FieldValue::Text(text) => Some(text == "true"),
        }
    }
}

/// The kind of control an input event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Choice,
    Checkbox,
}

/// A raw change event from one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub field: Field,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
}

impl InputEvent {
    pub fn text(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            kind: InputKind::Text,
            value: value.into(),
            checked: false,
        }
    }

    pub fn choice(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            kind: InputKind::Choice,
            value: value.into(),
            checked: false,
        }
    }

    pub fn checkbox(field: Field, checked: bool) -> Self {
        Self {
            field,
            kind: InputKind::Checkbox,
            value: String::new(),
            checked,
        }
    }

    /// Checkboxes report their checked flag, everything else its raw string
    pub fn normalize(&self) -> FieldValue {
        match self.kind {
            InputKind::Checkbox => FieldValue::Flag(self.checked),
            InputKind::Text | InputKind::Choice => FieldValue::Text(self.value.clone()),
        }
    }
}

/// Error string per field, empty meaning no error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub username: String,
    pub fav_language: String,
    pub fav_food: String,
    pub agreement: String,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::FavLanguage => &self.fav_language,
            Field::FavFood => &self.fav_food,
            Field::Agreement => &self.agreement,
        }
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        let slot = match field {
            Field::Username => &mut self.username,
            Field::FavLanguage => &mut self.fav_language,
            Field::FavFood => &mut self.fav_food,
            Field::Agreement => &mut self.agreement,
        };
        *slot = message.into();
    }

    /// Store the outcome of one field validation
    pub fn record(&mut self, field: Field, result: Result<(), String>) {
        self.set(field, result.err().unwrap_or_default());
    }

    /// True when no field shows an error
    pub fn is_clear(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_empty())
    }
}
