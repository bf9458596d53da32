//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod student;
pub mod validation;

pub use student::{NewStudent, Student, StudentId, MAX_AGE, MAX_EMAIL_LEN, MAX_NAME_LEN};
pub use validation::ValidationError;
