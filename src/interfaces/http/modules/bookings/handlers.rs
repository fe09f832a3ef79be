//! Booking HTTP handlers. Every route requires a bearer token.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use crate::application::ReservationLedger;
use crate::domain::booking::Booking;
use crate::domain::identity::Identity;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct BookingAppState {
    pub ledger: Arc<ReservationLedger>,
}

type BookingResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn summaries(bookings: Vec<Booking>) -> Vec<BookingSummaryDto> {
    bookings.into_iter().map(BookingSummaryDto::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room not available for the requested dates")
    )
)]
pub async fn create_booking(
    State(state): State<BookingAppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> BookingResult<BookingDetailDto> {
    let detail = state
        .ledger
        .create_booking(
            &identity,
            request.room_id,
            request.check_in_date,
            request.check_out_date,
        )
        .await?;
    Ok(Json(ApiResponse::success(detail.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "All bookings", body = ApiResponse<Vec<BookingSummaryDto>>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_bookings(
    State(state): State<BookingAppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListBookingsQuery>,
) -> BookingResult<Vec<BookingSummaryDto>> {
    let bookings = state.ledger.list_all(&identity, query.newest_first).await?;
    Ok(Json(ApiResponse::success(summaries(bookings))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/mine",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's bookings, newest first", body = ApiResponse<Vec<BookingSummaryDto>>))
)]
pub async fn my_bookings(
    State(state): State<BookingAppState>,
    Extension(identity): Extension<Identity>,
) -> BookingResult<Vec<BookingSummaryDto>> {
    let bookings = state.ledger.list_for_user(&identity).await?;
    Ok(Json(ApiResponse::success(summaries(bookings))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{reference}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("reference" = String, Path, description = "Booking reference code")),
    responses(
        (status = 200, description = "Booking with room and guest", body = ApiResponse<BookingDetailDto>),
        (status = 404, description = "No such booking visible to the caller")
    )
)]
pub async fn get_booking(
    State(state): State<BookingAppState>,
    Extension(identity): Extension<Identity>,
    Path(reference): Path<String>,
) -> BookingResult<BookingDetailDto> {
    let detail = state.ledger.get_by_reference(&identity, &reference).await?;
    Ok(Json(ApiResponse::success(detail.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated", body = ApiResponse<BookingDetailDto>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Re-booking would overlap another booking")
    )
)]
pub async fn update_booking(
    State(state): State<BookingAppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<UpdateBookingRequest>,
) -> BookingResult<BookingDetailDto> {
    let detail = state
        .ledger
        .update_booking(&identity, request.id, request.patch())
        .await?;
    Ok(Json(ApiResponse::success(detail.into())))
}
