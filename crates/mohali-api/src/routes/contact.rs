//! Contact form routes

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, patch},
};
use mohali_db::{ContactStatus, NewContactSubmission};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{CurrentUser, RequireAdmin};
use super::types::{
    ContactCreatedResponse, ContactDetailResponse, ContactListResponse, ContactRequest,
    ContactResponse, UpdateContactStatusRequest,
};
use super::validation::{is_valid_contact_email, present};

/// POST /api/contact
async fn submit_contact(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactCreatedResponse>), ApiError> {
    let Json(request) = payload?;

    let (Some(name), Some(email), Some(subject), Some(message)) = (
        present(&request.name),
        present(&request.email),
        present(&request.subject),
        present(&request.message),
    ) else {
        return Err(ApiError::BadRequest("All fields are required.".to_string()));
    };

    if !is_valid_contact_email(email) {
        return Err(ApiError::BadRequest("Invalid email address.".to_string()));
    }

    let contact = state
        .db
        .insert_contact(NewContactSubmission {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            user_id: user.map(|u| u.id),
        })
        .await?;

    metrics::counter!("mohali_contact_submissions_total").increment(1);
    info!("Stored contact submission {}", contact.id);

    Ok((
        StatusCode::CREATED,
        Json(ContactCreatedResponse {
            success: true,
            message: "Contact form submitted successfully.".to_string(),
            id: contact.id,
        }),
    ))
}

/// GET /api/contact (Admin only)
async fn list_contacts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let contacts = state.db.list_contacts().await?;

    Ok(Json(ContactListResponse {
        success: true,
        data: contacts.into_iter().map(ContactResponse::from).collect(),
    }))
}

/// PATCH /api/contact/{id} (Admin only)
async fn update_contact_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateContactStatusRequest>, JsonRejection>,
) -> Result<Json<ContactDetailResponse>, ApiError> {
    let Json(request) = payload?;

    let status = ContactStatus::from_str(request.status.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid status: {}", request.status)))?;

    if !state.db.update_contact_status(&id, status).await? {
        return Err(ApiError::NotFound("Contact submission not found".to_string()));
    }

    let contact = state
        .db
        .get_contact(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact submission not found".to_string()))?;

    info!("{} marked contact {} as {}", admin.email, id, status.as_str());

    Ok(Json(ContactDetailResponse {
        success: true,
        data: ContactResponse::from(contact),
    }))
}

/// Create contact routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", get(list_contacts).post(submit_contact))
        .route("/api/contact/{id}", patch(update_contact_status))
}
