// Word handlers
// HTTP handlers for storing and listing words

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use tracing::info;

use crate::{
    db::SharedGateway,
    error::{ApiError, ApiResult},
    models::word::StoreWordRequest,
};

pub const INSERT_WORD: &str = "INSERT INTO words (word) VALUES ($1)";
pub const SELECT_WORDS: &str = "SELECT word FROM words";

const STORE_FAILED: &str = "Could not store the word";
const LIST_FAILED: &str = "Could not list words";

/// Store a single word
/// POST /store
///
/// The body is read raw so any unparseable payload is a 400, whatever the
/// content type.
pub async fn store_word(
    State(gateway): State<SharedGateway>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let request: StoreWordRequest = serde_json::from_slice(&body).map_err(ApiError::malformed)?;
    let word = request.into_word().map_err(ApiError::validation)?;

    info!("Storing word: {}", word.text());

    gateway
        .execute(INSERT_WORD, &[word.text()])
        .await
        .map_err(|e| ApiError::persistence(STORE_FAILED, e))?;

    Ok(StatusCode::CREATED)
}

/// List every stored word as a JSON array of strings
/// GET /list
pub async fn list_words(State(gateway): State<SharedGateway>) -> ApiResult<impl IntoResponse> {
    let rows = gateway
        .query(SELECT_WORDS, &[])
        .await
        .map_err(|e| ApiError::persistence(LIST_FAILED, e))?;

    let words = rows
        .iter()
        .map(|row| row.get(0).map(str::to_owned))
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| ApiError::persistence(LIST_FAILED, e))?;

    // Serialize up front so a failure can still become a clean 500.
    let body = serde_json::to_vec(&words).map_err(|e| ApiError::encoding(LIST_FAILED, e))?;

    info!("Retrieved {} words", words.len());
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    ))
}
