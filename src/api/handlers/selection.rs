//! Best-photo selection endpoints. All categories share one flow and differ
//! only in the rubric.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::api::{ApiError, AppState};
use crate::category::Category;
use crate::selection::{SelectionOutcome, SelectionRequest};

/// `POST /api/gemini`, `/api/gemini-animals`, `/api/gemini-landscapes`
pub async fn select(
    category: Category,
    State(state): State<AppState>,
    body: Result<Json<SelectionRequest>, JsonRejection>,
) -> Result<Json<SelectionOutcome>, ApiError> {
    let Json(mut request) = body?;
    request.files = request.files.into_iter().map(|f| f.with_guessed_type()).collect();
    info!(%category, files = request.files.len(), "selection request received");

    let outcome = state.selector.select(category, &request).await?;
    Ok(Json(outcome))
}
