//! Cacheable records.
//!
//! A record has no identity field: its identity is the content hash of its
//! canonical encoding. Validation happens when a record is constructed, so a
//! value of a record type is always well formed.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::ValidationError;

/// Marker trait for types that can be stored in the cache.
///
/// # Implementation Requirements
///
/// - `Serialize` must emit fields in a fixed order (derive on a struct does)
/// - `Deserialize` must reject values that `validate` would reject
/// - `validate` must be a pure check with no side effects
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Short name used in tracing spans and error messages.
    const KIND: &'static str;

    /// Re-check the field constraints of an already constructed record.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A person, the record type served over the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(try_from = "PersonFields")]
pub struct Person {
    /// The person's first name.
    first_name: String,
    /// The person's last name.
    last_name: String,
    /// The person's email address. Not checked for email syntax.
    email: String,
    /// The person's age.
    age: i64,
}

/// Wire shape of a [`Person`] before validation.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PersonFields {
    first_name: String,
    last_name: String,
    email: String,
    age: i64,
}

impl Person {
    /// Create a validated person.
    ///
    /// # Errors
    ///
    /// - `RequiredFieldMissing` if a text field is empty or whitespace-only
    /// - `InvalidValue` if `age` is negative
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        age: i64,
    ) -> Result<Self, ValidationError> {
        let person = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            age,
        };
        person.validate()?;
        Ok(person)
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> i64 {
        self.age
    }
}

fn require_non_blank(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    Ok(())
}

impl Record for Person {
    const KIND: &'static str = "person";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(&self.first_name, "first_name")?;
        require_non_blank(&self.last_name, "last_name")?;
        require_non_blank(&self.email, "email")?;
        if self.age < 0 {
            return Err(ValidationError::InvalidValue {
                field: "age".to_string(),
                reason: format!("must be non-negative, got {}", self.age),
            });
        }
        Ok(())
    }
}

impl TryFrom<PersonFields> for Person {
    type Error = ValidationError;

    fn try_from(fields: PersonFields) -> Result<Self, Self::Error> {
        Person::new(fields.first_name, fields.last_name, fields.email, fields.age)
    }
}
