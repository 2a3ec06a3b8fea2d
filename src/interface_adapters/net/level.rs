use crate::domain::{Coordinate, GridError, StorageError};
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{
    PlaceElementRequest, PlacementResponse, SaveLevelResponse, SnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::EditError;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, warn};

fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// `GET /level`: the full world as a new viewer would see it.
pub async fn get_level_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.game.snapshot().await;
    Json(SnapshotDto::from(snapshot))
}

/// `PUT /level`: persists the current terrain.
pub async fn save_level_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.game.save_level().await {
        Ok(saved) => (StatusCode::OK, Json(SaveLevelResponse { saved })).into_response(),
        Err(err) => {
            error!(error = %err, "failed to save level");
            let status = match err {
                StorageError::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
                StorageError::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, err)
        }
    }
}

/// `POST /elements`: level-editor placement while paused.
pub async fn place_element_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaceElementRequest>,
) -> impl IntoResponse {
    let coordinate = Coordinate::new(payload.top, payload.left);
    match state
        .game
        .place_element(payload.material.into(), coordinate)
        .await
    {
        Ok(placement) => {
            (StatusCode::CREATED, Json(PlacementResponse::from(placement))).into_response()
        }
        Err(err) => {
            warn!(
                material = ?payload.material,
                top = payload.top,
                left = payload.left,
                error = %err,
                "placement rejected"
            );
            let status = match err {
                EditError::NotPaused | EditError::Grid(GridError::Occupied) => StatusCode::CONFLICT,
                EditError::NotEditable(_)
                | EditError::Grid(
                    GridError::Unaligned | GridError::OutOfBounds | GridError::NothingPlaced,
                ) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            error_response(status, err)
        }
    }
}
