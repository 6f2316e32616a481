//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use cat_ratings_core::domain::{self, Cat};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::RequestError;
use crate::web::session;
use crate::web::state::AppState;

/// Hard cap on image parts per upload; the transport rejects anything above
/// it before records are created.
pub const MAX_UPLOAD_IMAGES: usize = 3;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        csrf_token_handler,
        top_rated_handler,
        cat_to_rate_handler,
        submit_rating_handler,
        upload_cats_handler,
    ),
    components(
        schemas(CsrfTokenResponse, TopRatedResponse, CatResponse, RateCandidate, RatingRequest)
    ),
    tags(
        (name = "Cat Ratings API", description = "API endpoints for rating and uploading cats.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The anti-forgery token bound to the caller's session.
#[derive(Serialize, ToSchema)]
pub struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// One full cat record as stored.
#[derive(Serialize, ToSchema)]
pub struct CatResponse {
    id: String,
    title: String,
    image: String,
    date: DateTime<Utc>,
    rating_sum: f64,
    rating_count: u64,
    rating: f64,
}

impl From<&Cat> for CatResponse {
    fn from(cat: &Cat) -> Self {
        Self {
            id: cat.id.clone(),
            title: cat.title.clone(),
            image: cat.image.clone(),
            date: cat.date,
            rating_sum: cat.rating_sum,
            rating_count: cat.rating_count,
            rating: cat.rating,
        }
    }
}

/// The whole collection, best rated first.
#[derive(Serialize, ToSchema)]
pub struct TopRatedResponse {
    cats: Vec<CatResponse>,
}

/// The subset of a record shown to a caller about to rate it.
#[derive(Serialize, ToSchema)]
pub struct RateCandidate {
    id: String,
    image: String,
    title: String,
    date: DateTime<Utc>,
}

/// A rating submission. Both fields are required; presence is validated in
/// the handler so a missing field reports 400 rather than a serde error.
#[derive(Deserialize, ToSchema)]
pub struct RatingRequest {
    id: Option<String>,
    rating: Option<f64>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Get the anti-forgery token for the caller's session.
///
/// Creates a session (via a `session` cookie) on first contact. Re-requesting
/// the token never rotates it.
#[utoipa::path(
    get,
    path = "/csrf-token",
    responses(
        (status = 200, description = "The session's CSRF token", body = CsrfTokenResponse)
    )
)]
pub async fn csrf_token_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    // 1. Reuse the caller's session if the cookie is present, else mint one.
    let (session_id, is_new_session) = match session::session_id(&headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    // 2. Issue (or re-read) the session's token.
    let token = state.sessions.issue(&session_id).await;
    let body = Json(CsrfTokenResponse { csrf_token: token });

    // 3. Bind new sessions to the caller.
    if is_new_session {
        let cookie = session::new_session_cookie(&session_id);
        ([(header::SET_COOKIE, cookie)], body).into_response()
    } else {
        body.into_response()
    }
}

/// List every cat, sorted by rating in descending order.
#[utoipa::path(
    get,
    path = "/cats/top-rated",
    responses(
        (status = 200, description = "All cats, best rated first", body = TopRatedResponse),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key")
    )
)]
pub async fn top_rated_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TopRatedResponse>, RequestError> {
    // Read-only: a whole-file parse is already consistent, no lock needed.
    let mut cats = state.store.load().await?;
    domain::sort_top_rated(&mut cats);
    let cats = cats.iter().map(CatResponse::from).collect();
    Ok(Json(TopRatedResponse { cats }))
}

/// Pick one cat uniformly at random for the caller to rate.
#[utoipa::path(
    get,
    path = "/cats/rate",
    responses(
        (status = 200, description = "A randomly chosen cat", body = RateCandidate),
        (status = 404, description = "The collection is empty")
    )
)]
pub async fn cat_to_rate_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateCandidate>, RequestError> {
    let cats = state.store.load().await?;
    if cats.is_empty() {
        return Err(RequestError::NotFound("no cats found".to_string()));
    }

    let cat = &cats[rand::thread_rng().gen_range(0..cats.len())];
    Ok(Json(RateCandidate {
        id: cat.id.clone(),
        image: cat.image.clone(),
        title: cat.title.clone(),
        date: cat.date,
    }))
}

/// Apply a rating to one cat and persist the collection.
#[utoipa::path(
    post,
    path = "/cat/rating",
    request_body = RatingRequest,
    responses(
        (status = 200, description = "The updated record", body = CatResponse),
        (status = 400, description = "Missing cat id or rating"),
        (status = 404, description = "No cat with the given id")
    )
)]
pub async fn submit_rating_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Result<Json<CatResponse>, RequestError> {
    // 1. Schema-validate the payload at the boundary. Malformed bodies and
    //    absent fields both report 400.
    let Json(request) = payload.map_err(|e| RequestError::Validation(e.body_text()))?;
    let id = request
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RequestError::Validation("missing cat id or rating".to_string()))?;
    let rating = request
        .rating
        .ok_or_else(|| RequestError::Validation("missing cat id or rating".to_string()))?;

    // 2. One read-modify-write cycle, serialized against all other mutations.
    let _guard = state.mutations.acquire().await;
    let mut cats = state.store.load().await?;
    let updated = domain::rate_cat(&mut cats, &id, rating)?;
    state.store.save(&cats).await?;

    Ok(Json(CatResponse::from(&updated)))
}

/// Upload up to three images, creating one new cat record per image.
#[utoipa::path(
    post,
    path = "/cats/upload",
    request_body(content_type = "multipart/form-data", description = "Up to 3 `image` file parts plus a `title` field."),
    responses(
        (status = 201, description = "The newly created records", body = [CatResponse]),
        (status = 400, description = "Missing images or title")
    )
)]
pub async fn upload_cats_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<CatResponse>>), RequestError> {
    // 1. Drain the multipart stream: one optional title, up to 3 images.
    let mut title: Option<String> = None;
    let mut images: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::Validation(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| RequestError::Validation(e.to_string()))?,
                );
            }
            Some("image") => {
                if images.len() == MAX_UPLOAD_IMAGES {
                    return Err(RequestError::Validation(format!(
                        "at most {MAX_UPLOAD_IMAGES} images per upload"
                    )));
                }
                let extension = image_extension(field.file_name());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| RequestError::Validation(e.to_string()))?;
                images.push((extension, data));
            }
            _ => {}
        }
    }

    // 2. Validate before touching the disk.
    let title = title.unwrap_or_default();
    if title.trim().is_empty() || images.is_empty() {
        return Err(RequestError::Validation("missing images or title".to_string()));
    }

    // 3. Persist the image assets under fresh names.
    let images_dir = state.config.images_dir();
    let mut image_urls = Vec::with_capacity(images.len());
    for (extension, data) in images {
        let filename = format!("{}{}", Uuid::new_v4(), extension);
        tokio::fs::write(images_dir.join(&filename), &data)
            .await
            .map_err(|e| RequestError::Storage(e.to_string()))?;
        image_urls.push(format!("/cat/image/{filename}"));
    }

    // 4. Build the records and append them under exclusive access.
    let new_cats = domain::new_litter(&title, image_urls)?;
    let _guard = state.mutations.acquire().await;
    let mut cats = state.store.load().await?;
    cats.extend(new_cats.iter().cloned());
    state.store.save(&cats).await?;

    let body = new_cats.iter().map(CatResponse::from).collect();
    Ok((StatusCode::CREATED, Json(body)))
}

/// Keeps the stored filename's extension when it looks like a plain one,
/// discarding anything that could smuggle path syntax.
fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_keeps_simple_suffixes() {
        assert_eq!(image_extension(Some("whiskers.JPG")), ".jpg");
        assert_eq!(image_extension(Some("archive.tar.gz")), ".gz");
    }

    #[test]
    fn image_extension_drops_odd_names() {
        assert_eq!(image_extension(None), "");
        assert_eq!(image_extension(Some("noext")), "");
        assert_eq!(image_extension(Some("weird.j%g")), "");
        assert_eq!(image_extension(Some("long.extension")), "");
    }
}
