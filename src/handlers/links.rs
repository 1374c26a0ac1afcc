use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::shared::{fetch_link, validation_error};
use crate::{
    error::{AppError, AppResult},
    extractor::ValidatedUrl,
    models::{AddLinkRequest, LinkPreviewDto, LinkRecord, PreviewQuery, SaveOutcome},
    state::AppState,
};

const ALREADY_EXISTS: &str = "Link already exists";

/// POST /links — validate, extract metadata, and save a new link.
///
/// A URL that is already stored is answered with 409 before any fetch. The
/// insert itself is still conflict-checked, so a racing duplicate also ends
/// in 409. Pages that cannot be fetched are saved with degraded metadata.
pub async fn add_link(
    State(state): State<AppState>,
    Json(req): Json<AddLinkRequest>,
) -> AppResult<(StatusCode, Json<LinkRecord>)> {
    req.validate().map_err(validation_error)?;
    let url = ValidatedUrl::parse(&req.url)?;

    if state.store.contains(url.as_str()).await? {
        return Err(AppError::Conflict(ALREADY_EXISTS.into()));
    }

    let extraction = state.extractor.extract_validated(url).await;
    if extraction.is_degraded() {
        tracing::info!(
            url = %extraction.url,
            status = %extraction.status(),
            "Saving link with placeholder metadata"
        );
    }

    match state
        .store
        .save(&extraction.url, &extraction.metadata)
        .await?
    {
        SaveOutcome::Saved(record) => Ok((StatusCode::CREATED, Json(record))),
        SaveOutcome::AlreadyExists => Err(AppError::Conflict(ALREADY_EXISTS.into())),
    }
}

/// GET /links — all saved links, newest first.
pub async fn list_links(State(state): State<AppState>) -> AppResult<Json<Vec<LinkRecord>>> {
    let links = state.store.get_all().await?;
    Ok(Json(links))
}

/// GET /links/lookup?url=<encoded-url> — a single saved link.
pub async fn get_link(
    State(state): State<AppState>,
    Query(params): Query<PreviewQuery>,
) -> AppResult<Json<LinkRecord>> {
    let link = fetch_link(&state.store, &params.url).await?;
    Ok(Json(link))
}

/// GET /links/preview?url=<encoded-url> — extracted metadata, not saved.
pub async fn preview_link(
    State(state): State<AppState>,
    Query(params): Query<PreviewQuery>,
) -> AppResult<Json<LinkPreviewDto>> {
    let extraction = state.extractor.extract(&params.url).await?;
    let status = extraction.status();
    Ok(Json(LinkPreviewDto::new(
        &extraction.url,
        extraction.metadata,
        status,
    )))
}
