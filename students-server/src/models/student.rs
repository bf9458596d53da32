//! Student records
//!
//! `NewStudent` is the validated candidate that the storage engine accepts;
//! `Student` is a persisted row.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum length for student names (characters, after trimming)
pub const MAX_NAME_LEN: usize = 128;

/// Maximum length for email addresses (RFC 5321 path limit)
pub const MAX_EMAIL_LEN: usize = 254;

/// Upper bound for age; lower bound is zero
pub const MAX_AGE: i64 = 150;

/// Store-assigned student identifier, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(i64);

impl StudentId {
    /// Wrap a raw row id. Returns `None` for zero or negative values.
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Parse a path segment into an id.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::new)
            .ok_or(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be a positive integer",
            })
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Persisted student row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Validated student ready to be inserted.
///
/// Fields are private so the only way to obtain one is through
/// [`NewStudent::new`], which enforces the input rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    name: String,
    email: String,
    age: i64,
}

impl NewStudent {
    /// Create a new student candidate.
    ///
    /// # Rules
    /// - `name`: non-empty after trimming, at most 128 characters
    /// - `email`: non-empty after trimming, at most 254 characters
    /// - `age`: between 0 and 150 inclusive
    ///
    /// # Example
    /// ```
    /// use students_server::models::NewStudent;
    ///
    /// let s = NewStudent::new("  Alice ", "alice@example.com", 21).unwrap();
    /// assert_eq!(s.name(), "Alice");
    /// assert!(NewStudent::new("   ", "a@b.c", 21).is_err());
    /// assert!(NewStudent::new("Bob", "b@c.d", -1).is_err());
    /// ```
    pub fn new(name: &str, email: &str, age: i64) -> Result<Self, ValidationError> {
        let name = bounded_text("name", name, MAX_NAME_LEN)?;
        let email = bounded_text("email", email, MAX_EMAIL_LEN)?;

        if !(0..=MAX_AGE).contains(&age) {
            return Err(ValidationError::OutOfRange {
                field: "age",
                min: 0,
                max: MAX_AGE,
            });
        }

        Ok(Self { name, email, age })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    /// Attach the id assigned by the store.
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id: id.get(),
            name: self.name,
            email: self.email,
            age: self.age,
        }
    }
}

fn bounded_text(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_name_and_email() {
        let s = NewStudent::new("  Alice  ", "\talice@example.com\n", 21).unwrap();
        assert_eq!(s.name(), "Alice");
        assert_eq!(s.email(), "alice@example.com");
        assert_eq!(s.age(), 21);
    }

    #[test]
    fn rejects_blank_fields() {
        assert_eq!(
            NewStudent::new("   ", "a@b.c", 20),
            Err(ValidationError::Empty { field: "name" })
        );
        assert_eq!(
            NewStudent::new("Alice", "", 20),
            Err(ValidationError::Empty { field: "email" })
        );
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(NewStudent::new("A", "a@b.c", 0).is_ok());
        assert!(NewStudent::new("A", "a@b.c", MAX_AGE).is_ok());
        assert!(matches!(
            NewStudent::new("A", "a@b.c", -1),
            Err(ValidationError::OutOfRange { field: "age", .. })
        ));
        assert!(NewStudent::new("A", "a@b.c", MAX_AGE + 1).is_err());
    }

    #[test]
    fn name_length_counts_chars_not_bytes() {
        // 128 multi-byte chars is within the limit even though it is > 128 bytes
        let name = "é".repeat(MAX_NAME_LEN);
        assert!(NewStudent::new(&name, "a@b.c", 30).is_ok());

        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            NewStudent::new(&too_long, "a@b.c", 30),
            Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN
            })
        );
    }

    #[test]
    fn student_id_rejects_non_positive() {
        assert!(StudentId::new(0).is_none());
        assert!(StudentId::new(-4).is_none());
        assert_eq!(StudentId::new(7).map(StudentId::get), Some(7));
    }

    #[test]
    fn student_id_parse() {
        assert_eq!(StudentId::parse("42").unwrap().get(), 42);
        assert!(StudentId::parse("0").is_err());
        assert!(StudentId::parse("abc").is_err());
        assert!(StudentId::parse("-3").is_err());
    }

    #[test]
    fn id_serializes_as_plain_number() {
        let id = StudentId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
    }
}
