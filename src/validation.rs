use crate::errors::{DomainError, DomainResult, FormErrors, ValidationError};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// A trait that entities and form payloads implement for validation.
pub trait Validate {
    /// Validates the payload and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

// Common regex patterns
fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn cnpj_regex() -> &'static Regex {
    static CNPJ_REGEX: OnceLock<Regex> = OnceLock::new();
    CNPJ_REGEX.get_or_init(|| {
        Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").expect("registration pattern is valid")
    })
}

fn hex_color_regex() -> &'static Regex {
    static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    COLOR_REGEX.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("color pattern is valid"))
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Collects every failing field of a form so all of them can be shown at once.
#[derive(Default)]
pub struct FormValidator {
    errors: FormErrors,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.insert(error.field(), error.to_string());
    }

    /// Records the first error of a finished builder, if any.
    pub fn check<T>(&mut self, builder: ValidationBuilder<T>) {
        if let Some(error) = builder.errors.into_iter().next() {
            self.add_error(error);
        }
    }

    pub fn validate(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Form(self.errors))
        }
    }
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(err) => Err(DomainError::Validation(err)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    /// Fails on a missing value or one that is empty after trimming.
    pub fn required(mut self) -> Self {
        let blank = self.value.as_ref().map_or(true, |v| v.trim().is_empty());
        if blank {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    /// Pattern checks only apply to non-empty values; emptiness is `required`'s job.
    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !value.trim().is_empty() && !pattern.is_match(value.trim()) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn email(self) -> Self {
        self.matches_pattern(email_regex(), "must be a valid email address")
    }

    pub fn cnpj(self) -> Self {
        self.matches_pattern(cnpj_regex(), "must use the format XX.XXX.XXX/XXXX-XX")
    }

    pub fn hex_color(self) -> Self {
        self.matches_pattern(hex_color_regex(), "must be a color like #4B9EFF")
    }

    /// The value must parse as a non-negative decimal number.
    pub fn non_negative_decimal(mut self) -> Self {
        if let Some(value) = &self.value {
            match parse_decimal(value) {
                Some(d) if d >= Decimal::ZERO => {}
                _ => self.errors.push(ValidationError::format(
                    &self.field_name,
                    "must be a non-negative number",
                )),
            }
        }
        self
    }
}

/// Numeric validations
impl<T> ValidationBuilder<T>
where
    T: PartialOrd + std::fmt::Display,
{
    /// Values that do not compare (NaN) fail as out of range.
    pub fn range(mut self, min: T, max: T) -> Self {
        if let Some(value) = &self.value {
            let comparable = value.partial_cmp(&min).is_some() && value.partial_cmp(&max).is_some();
            if !comparable || value < &min || value > &max {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    max.to_string(),
                ));
            }
        }
        self
    }
}

/// Parses user-entered numbers, accepting a decimal comma ("95,00").
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Helper for validating file sizes
pub fn validate_file_size(size: usize, max_size: usize) -> bool {
    size <= max_size
}

/// Strongly typed wrapper models for validated input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email(pub String);

impl Email {
    pub fn new(email: &str) -> Result<Self, ValidationError> {
        let trimmed = email.trim();
        if email_regex().is_match(trimmed) {
            Ok(Email(trimmed.to_string()))
        } else {
            Err(ValidationError::format("email", "must be a valid email address"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
