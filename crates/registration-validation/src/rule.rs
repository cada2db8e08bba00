//! Rule objects and per-field rule lists

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::string::{has_max_chars, has_min_chars, is_one_of, is_present};

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A single check paired with the message reported when it fails
pub struct Rule<T: ?Sized> {
    check: Predicate<T>,
    message: String,
}

impl<T: ?Sized> Rule<T> {
    pub fn new(check: impl Fn(&T) -> bool + Send + Sync + 'static, message: impl Into<String>) -> Self {
        Self {
            check: Box::new(check),
            message: message.into(),
        }
    }

    /// Returns the rule's message when `value` fails the check
    pub fn apply(&self, value: &T) -> Result<(), String> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<T: ?Sized> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("message", &self.message).finish()
    }
}

/// Ordered rules for one field. The first failing rule wins.
pub struct FieldRules<T: ?Sized> {
    rules: Vec<Rule<T>>,
    trim: bool,
}

impl<T: ?Sized> FieldRules<T> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            trim: false,
        }
    }

    /// Append a custom rule
    pub fn rule(mut self, check: impl Fn(&T) -> bool + Send + Sync + 'static, message: impl Into<String>) -> Self {
        self.rules.push(Rule::new(check, message));
        self
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn run(&self, value: &T) -> Result<(), String> {
        self.rules.iter().try_for_each(|rule| rule.apply(value))
    }
}

impl<T: ?Sized> Default for FieldRules<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for FieldRules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("rules", &self.rules)
            .field("trim", &self.trim)
            .finish()
    }
}

impl FieldRules<str> {
    /// Trim surrounding whitespace before any rule sees the value
    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(is_present, message)
    }

    pub fn min_chars(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(move |s: &str| has_min_chars(s, min), message)
    }

    pub fn max_chars(self, max: usize, message: impl Into<String>) -> Self {
        self.rule(move |s: &str| has_max_chars(s, max), message)
    }

    pub fn one_of(self, allowed: &'static [&'static str], message: impl Into<String>) -> Self {
        self.rule(move |s: &str| is_one_of(s, allowed), message)
    }

    pub fn validate(&self, value: &str) -> Result<(), String> {
        if self.trim {
            self.run(value.trim())
        } else {
            self.run(value)
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.validate(value).is_ok()
    }
}

/// Rules for a boolean that may be missing entirely
impl FieldRules<Option<bool>> {
    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(|v: &Option<bool>| v.is_some(), message)
    }

    pub fn is_true(self, message: impl Into<String>) -> Self {
        self.rule(|v: &Option<bool>| *v == Some(true), message)
    }

    pub fn validate(&self, value: Option<bool>) -> Result<(), String> {
        self.run(&value)
    }

    pub fn is_valid(&self, value: Option<bool>) -> bool {
        self.validate(value).is_ok()
    }
}
