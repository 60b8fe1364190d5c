use crate::models::{AskRequest, AskResponse};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;

/// `POST /api/ask`
///
/// The body is parsed by hand rather than with `Json<T>` so that a missing
/// content type or loosely typed fields are still accepted.
pub async fn ask(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AskResponse>, AppError> {
    let request = AskRequest::from_body(&body, &state.config.models.default_model)?;

    tracing::info!(
        model = %request.model,
        prompt_len = request.prompt.chars().count(),
        "Received question"
    );

    Ok(Json(state.gateway.ask(request).await))
}
