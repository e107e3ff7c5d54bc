//! Contact submission operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{ContactStatus, ContactSubmission, NewContactSubmission};
use crate::utils::{new_id, normalize_email};

use super::Database;

impl Database {
    /// Store a contact form submission
    pub async fn insert_contact(
        &self,
        contact: NewContactSubmission,
    ) -> Result<ContactSubmission, DbError> {
        let now = Utc::now();
        let id = new_id();
        let submission = ContactSubmission {
            id,
            name: contact.name.trim().to_string(),
            email: normalize_email(&contact.email),
            subject: contact.subject.trim().to_string(),
            message: contact.message.trim().to_string(),
            status: ContactStatus::Unread,
            user_id: contact.user_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO contacts (id, name, email, subject, message, status, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.id)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.subject)
        .bind(&submission.message)
        .bind(submission.status.as_str())
        .bind(&submission.user_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Get a contact submission by ID
    pub async fn get_contact(&self, id: &str) -> Result<Option<ContactSubmission>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, subject, message, status, user_id, created_at, updated_at
            FROM contacts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| ContactSubmission::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List all contact submissions, newest first
    pub async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, subject, message, status, user_id, created_at, updated_at
            FROM contacts
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| ContactSubmission::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update the processing status of a submission
    pub async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
