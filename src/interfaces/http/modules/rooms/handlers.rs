//! Room HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use crate::application::{AvailabilityChecker, RoomCatalog};
use crate::domain::identity::Identity;
use crate::domain::room::RoomType;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct RoomAppState {
    pub catalog: Arc<RoomCatalog>,
    pub availability: Arc<AvailabilityChecker>,
}

type RoomResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn to_dtos(rooms: Vec<crate::domain::room::Room>) -> Vec<RoomDto> {
    rooms.into_iter().map(RoomDto::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    responses((status = 200, description = "All rooms, newest first", body = ApiResponse<Vec<RoomDto>>))
)]
pub async fn list_rooms(State(state): State<RoomAppState>) -> RoomResult<Vec<RoomDto>> {
    let rooms = state.catalog.list_rooms().await?;
    Ok(Json(ApiResponse::success(to_dtos(rooms))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/types",
    tag = "Rooms",
    responses((status = 200, description = "Room categories", body = ApiResponse<Vec<RoomType>>))
)]
pub async fn list_room_types(State(state): State<RoomAppState>) -> Json<ApiResponse<Vec<RoomType>>> {
    Json(ApiResponse::success(state.catalog.room_types()))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/search",
    tag = "Rooms",
    params(RoomSearchQuery),
    responses((status = 200, description = "Matching rooms", body = ApiResponse<Vec<RoomDto>>))
)]
pub async fn search_rooms(
    State(state): State<RoomAppState>,
    Query(query): Query<RoomSearchQuery>,
) -> RoomResult<Vec<RoomDto>> {
    let rooms = state.availability.search(&query.input).await?;
    Ok(Json(ApiResponse::success(to_dtos(rooms))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/available",
    tag = "Rooms",
    params(AvailableRoomsQuery),
    responses(
        (status = 200, description = "Rooms free for the whole stay", body = ApiResponse<Vec<RoomDto>>),
        (status = 400, description = "Invalid date range or room type")
    )
)]
pub async fn list_available_rooms(
    State(state): State<RoomAppState>,
    Query(query): Query<AvailableRoomsQuery>,
) -> RoomResult<Vec<RoomDto>> {
    let room_type = query.room_type()?;
    let rooms = state
        .availability
        .list_available(query.check_in_date, query.check_out_date, room_type)
        .await?;
    Ok(Json(ApiResponse::success(to_dtos(rooms))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    params(("id" = i32, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room", body = ApiResponse<RoomDto>),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(State(state): State<RoomAppState>, Path(id): Path<i32>) -> RoomResult<RoomDto> {
    let room = state.catalog.get_room(id).await?;
    Ok(Json(ApiResponse::success(room.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = ApiResponse<RoomDto>),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Room number already in use")
    )
)]
pub async fn create_room(
    State(state): State<RoomAppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<CreateRoomRequest>,
) -> RoomResult<RoomDto> {
    let room = state.catalog.add_room(&identity, request.into()).await?;
    Ok(Json(ApiResponse::success(room.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = ApiResponse<RoomDto>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn update_room(
    State(state): State<RoomAppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateRoomRequest>,
) -> RoomResult<RoomDto> {
    let room = state.catalog.update_room(&identity, id, request.into()).await?;
    Ok(Json(ApiResponse::success(room.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room deleted"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Room has active bookings")
    )
)]
pub async fn delete_room(
    State(state): State<RoomAppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> RoomResult<()> {
    state.catalog.delete_room(&identity, id).await?;
    Ok(Json(ApiResponse::success(())))
}
