//! Field Validation Errors
//!
//! [`FieldErrors`] collects per-field messages in the order rules were
//! evaluated and serializes as `{"field": ["message", ...]}`.
//! The [`messages`] module renders the standard rule messages.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered collection of validation messages keyed by field name.
///
/// ## Examples
/// ```rust
/// use kernel::validation::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("email", "The email field is required.");
/// errors.add("password", "The password field is required.");
///
/// assert_eq!(
///     errors.summary(),
///     "The email field is required. (and 1 more error)"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to `field`, keeping first-seen field order.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field, vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `field` has at least one message.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Total number of messages across all fields.
    pub fn count(&self) -> usize {
        self.fields.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn first_message(&self) -> Option<&str> {
        self.fields
            .first()
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    /// Top-level message for a 422 body: the first message, plus a count
    /// of the remaining ones.
    pub fn summary(&self) -> String {
        let Some(first) = self.first_message() else {
            return "The given data was invalid.".to_string();
        };

        match self.count() - 1 {
            0 => first.to_string(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for FieldErrors {}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Standard rule messages. Field names are shown with underscores as spaces.
pub mod messages {
    fn attribute(field: &str) -> String {
        field.replace('_', " ")
    }

    pub fn required(field: &str) -> String {
        format!("The {} field is required.", attribute(field))
    }

    pub fn email(field: &str) -> String {
        format!("The {} field must be a valid email address.", attribute(field))
    }

    pub fn max_chars(field: &str, max: usize) -> String {
        format!(
            "The {} field must not be greater than {} characters.",
            attribute(field),
            max
        )
    }

    pub fn min_chars(field: &str, min: usize) -> String {
        format!(
            "The {} field must be at least {} characters.",
            attribute(field),
            min
        )
    }

    pub fn confirmed(field: &str) -> String {
        format!("The {} field confirmation does not match.", attribute(field))
    }

    pub fn unique(field: &str) -> String {
        format!("The {} has already been taken.", attribute(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_grouped_by_field_in_insertion_order() {
        let mut errors = FieldErrors::new();
        errors.add("password", "first");
        errors.add("email", "second");
        errors.add("password", "third");

        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["password", "email"]);
        assert_eq!(errors.get("password").unwrap(), ["first", "third"]);
        assert_eq!(errors.count(), 3);
    }

    #[test]
    fn test_summary_pluralization() {
        let mut errors = FieldErrors::new();
        errors.add("name", messages::required("name"));
        assert_eq!(errors.summary(), "The name field is required.");

        errors.add("email", messages::required("email"));
        assert_eq!(
            errors.summary(),
            "The name field is required. (and 1 more error)"
        );

        errors.add("password", messages::required("password"));
        assert_eq!(
            errors.summary(),
            "The name field is required. (and 2 more errors)"
        );
    }

    #[test]
    fn test_serializes_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("email", messages::unique("email"));

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "email": ["The email has already been taken."] })
        );
    }

    #[test]
    fn test_rule_messages() {
        assert_eq!(
            messages::email("email"),
            "The email field must be a valid email address."
        );
        assert_eq!(
            messages::max_chars("name", 255),
            "The name field must not be greater than 255 characters."
        );
        assert_eq!(
            messages::min_chars("password", 8),
            "The password field must be at least 8 characters."
        );
        assert_eq!(
            messages::confirmed("password"),
            "The password field confirmation does not match."
        );
        assert_eq!(
            messages::required("password_confirmation"),
            "The password confirmation field is required."
        );
    }
}
