use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, client_info};
use super::{ApiError, ApiResponse, AppState, MessageResponse, ReservationDto, require_capability};
use crate::api::validation;
use crate::domain::Capability;

#[derive(Deserialize)]
pub struct ReservationRequest {
    pub equipment_id: i32,
    /// ISO calendar date (YYYY-MM-DD)
    pub reservation_date: String,
}

/// GET /reservations
/// The caller's own reservations, newest date first. Customers only.
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ReservationDto>>>, ApiError> {
    require_capability(&user, Capability::ReserveEquipment)?;

    let reservations = state.reservations().list_for_user(user.id).await?;

    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

/// POST /reservations
/// Reserve equipment for one calendar day. Customers only.
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<ReservationRequest>,
) -> Result<Json<ApiResponse<ReservationDto>>, ApiError> {
    require_capability(&user, Capability::ReserveEquipment)?;

    let date = validation::validate_reservation_date(&payload.reservation_date)?;

    let id = state
        .reservations()
        .reserve(&user, payload.equipment_id, date, &client_info(&headers))
        .await?;

    let reservation = state
        .store()
        .get_reservation(id)
        .await?
        .ok_or_else(|| ApiError::internal("Reservation vanished after insert"))?;

    Ok(Json(ApiResponse::success(ReservationDto::from(reservation))))
}

/// POST /reservations/{id}/cancel
/// Flip ACTIVE -> CANCELLED, owner only
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_capability(&user, Capability::ReserveEquipment)?;

    state.reservations().cancel(user.id, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reservation cancelled",
    ))))
}
