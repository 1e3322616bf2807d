//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{HealthDto, RoomDetailDto, RoomSummaryDto, UserDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Get registered users, sorted as in `users:update`
pub async fn get_users(State(state): State<Arc<AppState>>) -> Json<Vec<UserDto>> {
    let users = state.presence_usecase.users().await;

    // Domain Model から DTO への変換
    let users = users
        .into_iter()
        .map(|user| UserDto {
            username: user.name.into_string(),
            id: user.connection_id.into_string(),
        })
        .collect();

    Json(users)
}

/// Get every non-empty room with its member count
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let summaries = state.room_usecase.summaries().await;

    let rooms = summaries
        .into_iter()
        .map(|(room, members)| RoomSummaryDto {
            room: room.into_string(),
            members,
        })
        .collect();

    Json(rooms)
}

/// Get room detail by name
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.room_usecase.detail(&room).await {
        Ok(snapshot) => Ok(Json(RoomDetailDto {
            room: snapshot.room.into_string(),
            members: snapshot.member_ids.len(),
            member_ids: snapshot
                .member_ids
                .into_iter()
                .map(|id| id.into_string())
                .collect(),
        })),
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}
