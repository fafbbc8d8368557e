use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;

use super::error::ApiError;
use super::models::{BookInfoRequest, BookInfoResponse};
use super::state::HttpState;

pub async fn get_books_info(
    State(state): State<HttpState>,
    payload: Result<Json<BookInfoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request("Invalid request body", Some(rejection.body_text()))
    })?;

    let books = state.books.get_books_info(&request.ids).await?;
    Ok(Json(BookInfoResponse { books }))
}

pub async fn healthz() -> &'static str {
    "ok"
}
