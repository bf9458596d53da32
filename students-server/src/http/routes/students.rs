//! Student endpoints
//!
//! Each request runs Received -> Decoded -> Validated -> Persisted -> Responded,
//! leaving early with an error response at any gate. Nothing is kept between
//! requests.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::models::{NewStudent, Student, StudentId, ValidationError};
use crate::state::AppState;

/// Create student request.
///
/// Fields are optional at the decode stage so that an absent field is reported
/// as a validation error naming it, rather than a generic decode failure.
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

impl CreateStudentRequest {
    /// Check required fields and build a storable student.
    pub fn validate(self) -> Result<NewStudent, ValidationError> {
        let name = self.name.ok_or(ValidationError::Missing { field: "name" })?;
        let email = self.email.ok_or(ValidationError::Missing { field: "email" })?;
        let age = self.age.ok_or(ValidationError::Missing { field: "age" })?;
        NewStudent::new(&name, &email, age)
    }
}

/// Create student response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateStudentResponse {
    pub id: StudentId,
}

/// POST /api/students - create a new student
async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateStudentResponse>), ApiError> {
    let Json(req) = payload?;
    let student = req.validate()?;

    let id = state.store().create_student(&student).await?;
    tracing::info!(student_id = %id, "student created");

    Ok((StatusCode::CREATED, Json(CreateStudentResponse { id })))
}

/// GET /api/students - list all students
async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.store().list_students().await?;
    Ok(Json(students))
}

/// GET /api/students/{id} - get a single student
async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let id = StudentId::parse(&raw_id)?;
    let student = state.store().get_student(id).await?;
    Ok(Json(student))
}

/// Student routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/{id}", get(get_student))
}
