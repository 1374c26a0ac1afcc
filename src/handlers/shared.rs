use validator::ValidationErrors;

use crate::{
    db::LinkStore,
    error::{AppError, AppResult},
    models::LinkRecord,
};

/// Fetch a saved link by URL, returning 404 if it is not stored.
pub async fn fetch_link(store: &LinkStore, url: &str) -> AppResult<LinkRecord> {
    store
        .get(url)
        .await?
        .ok_or_else(|| AppError::NotFound("Link not found".into()))
}

/// Flatten validator field errors into one 400 message.
pub fn validation_error(e: ValidationErrors) -> AppError {
    AppError::Validation(
        e.field_errors()
            .values()
            .flat_map(|v| v.iter())
            .filter_map(|e| e.message.as_ref())
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    )
}
